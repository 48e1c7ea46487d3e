//! Per-file resolution removal with retry/skip/abort on write failure.

use crate::error::SaveError;
use crate::png::{ChunkSequence, IEND, Tag, filter_out_tag, has_tag, load_chunks, save_chunks};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What to do after a failed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Try the write again.
    Retry,
    /// Leave this file as it is and carry on with the next one.
    Skip,
    /// Stop the whole batch.
    Abort,
}

/// Decides how to recover from a failed write. Called synchronously; the
/// batch waits for the answer.
pub trait FailureHandler {
    fn on_write_failure(&mut self, path: &Path, error: &SaveError) -> FailureAction;
}

impl<F> FailureHandler for F
where
    F: FnMut(&Path, &SaveError) -> FailureAction,
{
    fn on_write_failure(&mut self, path: &Path, error: &SaveError) -> FailureAction {
        self(path, error)
    }
}

/// Outcome of [`fix_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixResult {
    /// No chunk with the tag was present; nothing was written.
    Compliant,
    /// Every chunk with the tag was removed.
    Fixed {
        /// Number of chunks removed.
        removed: usize,
        /// Bytes the file shrank by.
        bytes_removed: u64,
    },
    /// The write failed and the handler chose to skip.
    Skipped,
    /// The write failed and the handler chose to stop the batch.
    Aborted,
    /// The file could not be loaded.
    Failed(String),
}

impl FixResult {
    /// Whether the enclosing batch must stop.
    pub fn is_abort(&self) -> bool {
        matches!(self, FixResult::Aborted)
    }
}

/// Remove every chunk tagged `tag` from the PNG at `path`.
///
/// Files that are not PNGs, or that carry no such chunk, are left alone.
pub fn fix_file<H>(path: &Path, tag: Tag, handler: &mut H) -> FixResult
where
    H: FailureHandler + ?Sized,
{
    fix_with_writer(path, tag, handler, save_chunks)
}

pub(crate) fn fix_with_writer<H, W>(path: &Path, tag: Tag, handler: &mut H, mut save: W) -> FixResult
where
    H: FailureHandler + ?Sized,
    W: FnMut(&Path, &ChunkSequence) -> Result<(), SaveError>,
{
    if tag == IEND {
        return FixResult::Failed(format!("refusing to remove the {} chunk", IEND));
    }

    let sequence = match load_chunks(path) {
        Ok(seq) => seq,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load");
            return FixResult::Failed(e.to_string());
        }
    };

    if !has_tag(&sequence, tag) {
        return FixResult::Compliant;
    }

    let filtered = filter_out_tag(&sequence, tag);
    let removed = sequence.chunks().len() - filtered.chunks().len();
    let bytes_removed = sequence.byte_len() - filtered.byte_len();

    loop {
        match save(path, &filtered) {
            Ok(()) => {
                info!(path = %path.display(), %tag, removed, "fixed");
                return FixResult::Fixed {
                    removed,
                    bytes_removed,
                };
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "write failed");
                match handler.on_write_failure(path, &e) {
                    FailureAction::Retry => continue,
                    FailureAction::Skip => return FixResult::Skipped,
                    FailureAction::Abort => return FixResult::Aborted,
                }
            }
        }
    }
}

/// Non-interactive handler with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Retry up to `max_retries` times per file, then skip.
    Retry { max_retries: u32 },
    Skip,
    Abort,
}

/// [`FailureHandler`] that applies a [`Policy`].
#[derive(Debug)]
pub struct PolicyHandler {
    policy: Policy,
    attempts: u32,
    current: Option<PathBuf>,
}

impl PolicyHandler {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            attempts: 0,
            current: None,
        }
    }
}

impl FailureHandler for PolicyHandler {
    fn on_write_failure(&mut self, path: &Path, _error: &SaveError) -> FailureAction {
        match self.policy {
            Policy::Skip => FailureAction::Skip,
            Policy::Abort => FailureAction::Abort,
            Policy::Retry { max_retries } => {
                if self.current.as_deref() != Some(path) {
                    self.current = Some(path.to_path_buf());
                    self.attempts = 0;
                }
                if self.attempts < max_retries {
                    self.attempts += 1;
                    FailureAction::Retry
                } else {
                    FailureAction::Skip
                }
            }
        }
    }
}
