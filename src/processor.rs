//! Batch processing pipeline.
//!
//! Finds PNG files, then either reports their resolution metadata (`scan`) or
//! strips it (`fix`). Files are handled one at a time in path order.

use crate::cli::{Config, Mode};
use crate::error::{Error, Result, SaveError};
use crate::normalizer::{self, FailureHandler, FixResult, Policy, PolicyHandler};
use crate::png::{self, ChunkSequence, Inspection, has_png_extension, inspect_file};
use crate::terminal::{
    ProcessingStats, Prompt, Suspended, file_progress, format_size, print_error, print_info,
    print_item, print_success, print_warning, spinner,
};
use colored::Colorize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use walkdir::WalkDir;

/// Counts from a `scan` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// PNG files found.
    pub images: usize,
    /// PNG files carrying the tag.
    pub tagged: usize,
    /// Files that could not be parsed.
    pub failed: usize,
}

/// Sequential batch processor.
pub struct Processor {
    config: Config,
    stats: ProcessingStats,
    start_time: Instant,
}

impl Processor {
    /// Create a new processor with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stats: ProcessingStats::new(),
            start_time: Instant::now(),
        }
    }

    /// Run the configured mode. Write failures are handled as `--on-error`
    /// says; the prompt becomes `skip` without a terminal to ask on.
    pub fn run(&mut self) -> Result<ProcessingStats> {
        match self.config.mode {
            Mode::Scan => {
                let summary = self.scan()?;
                self.stats.failed = summary.failed;
                Ok(self.stats.clone())
            }
            Mode::Fix => match self.config.policy() {
                Some(policy) => self.fix(&mut PolicyHandler::new(policy)),
                None if io::stdin().is_terminal() && io::stderr().is_terminal() => {
                    self.fix(&mut Prompt)
                }
                None => self.fix(&mut PolicyHandler::new(Policy::Skip)),
            },
        }
    }

    /// Report the resolution metadata of every PNG file.
    pub fn scan(&mut self) -> Result<ScanSummary> {
        let files = self.collect_files()?;
        let mut summary = ScanSummary::default();

        for path in &files {
            match inspect_file(path, self.config.tag) {
                Ok(Inspection::NotRecognized) => {
                    debug!(path = %path.display(), "not a PNG");
                }
                Ok(Inspection::Png {
                    resolution,
                    tagged_chunks,
                    ..
                }) => {
                    summary.images += 1;
                    if tagged_chunks > 0 {
                        summary.tagged += 1;
                    }
                    if self.config.quiet {
                        continue;
                    }

                    let desc = match resolution {
                        Some(res) if self.config.tag == png::PHYS => res.describe().yellow(),
                        _ if tagged_chunks > 0 => {
                            format!("{} x {}", tagged_chunks, self.config.tag).yellow()
                        }
                        _ => format!("no {}", self.config.tag).dimmed(),
                    };
                    print_item(&format!("{}  {}", path.display(), desc));
                }
                Err(e) => {
                    summary.failed += 1;
                    print_error(&format!("Failed to read {}: {}", path.display(), e));
                }
            }
        }

        if !self.config.quiet {
            print_info(&format!(
                "{} PNG image(s), {} with {}",
                summary.images, summary.tagged, self.config.tag
            ));
        }
        Ok(summary)
    }

    /// Strip the configured tag from every PNG file, stopping early if the
    /// handler aborts.
    pub fn fix<H>(&mut self, handler: &mut H) -> Result<ProcessingStats>
    where
        H: FailureHandler + ?Sized,
    {
        self.fix_with_writer(handler, png::save_chunks)
    }

    fn fix_with_writer<H, W>(&mut self, handler: &mut H, mut save: W) -> Result<ProcessingStats>
    where
        H: FailureHandler + ?Sized,
        W: FnMut(&Path, &ChunkSequence) -> std::result::Result<(), SaveError>,
    {
        let files = self.collect_files()?;

        if files.is_empty() {
            if !self.config.quiet {
                print_warning("No PNG files found");
            }
            return Ok(self.stats.clone());
        }

        if !self.config.quiet {
            print_info(&format!("Found {} PNG file(s) to check", files.len()));
        }

        let progress = file_progress(files.len(), self.config.quiet);

        for path in &files {
            progress.set_message(path.display().to_string());

            let result = if self.keeps_resolution(path) {
                FixResult::Compliant
            } else if self.config.dry_run {
                self.plan_fix(path)
            } else {
                let mut handler = Suspended::new(&progress, &mut *handler);
                normalizer::fix_with_writer(path, self.config.tag, &mut handler, &mut save)
            };

            let stop = result.is_abort();
            progress.suspend(|| self.handle_result(path, result));

            if stop {
                break;
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        self.stats.set_duration(self.start_time.elapsed());
        Ok(self.stats.clone())
    }

    /// Whether `path` already records the resolution `--keep-dpi` asks for.
    fn keeps_resolution(&self, path: &Path) -> bool {
        let Some(dpi) = self.config.keep_dpi else {
            return false;
        };
        if self.config.tag != png::PHYS {
            return false;
        }

        match inspect_file(path, png::PHYS) {
            Ok(Inspection::Png {
                resolution: Some(res),
                ..
            }) if res.matches_dpi(dpi) => {
                debug!(path = %path.display(), dpi, "resolution kept");
                true
            }
            _ => false,
        }
    }

    /// What `fix_file` would do, without writing.
    fn plan_fix(&self, path: &Path) -> FixResult {
        let sequence = match png::load_chunks(path) {
            Ok(seq) => seq,
            Err(e) => return FixResult::Failed(e.to_string()),
        };
        if !png::has_tag(&sequence, self.config.tag) {
            return FixResult::Compliant;
        }
        let filtered = png::filter_out_tag(&sequence, self.config.tag);
        FixResult::Fixed {
            removed: sequence.chunks().len() - filtered.chunks().len(),
            bytes_removed: sequence.byte_len() - filtered.byte_len(),
        }
    }

    /// Collect candidate files in a deterministic order.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let spinner = spinner("Looking for PNG files...", !self.config.quiet);
        let mut files = Vec::new();

        for path in &self.config.paths {
            let collected = if path.is_file() {
                files.push(path.clone());
                Ok(())
            } else if path.is_dir() {
                self.collect_from_directory(path, &mut files)
            } else {
                Err(Error::NotFound { path: path.clone() })
            };
            if let Err(e) = collected {
                spinner.finish_and_clear();
                return Err(e);
            }
        }

        spinner.finish_and_clear();
        debug!(count = files.len(), "collected files");
        Ok(files)
    }

    /// Walk `dir` in file-name order. Links to files are kept; links to
    /// folders are never entered.
    fn collect_from_directory(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let mut walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                Error::io_with_path(io::Error::from(e), path)
            })?;

            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file && has_png_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok(())
    }

    fn handle_result(&mut self, path: &Path, result: FixResult) {
        let quiet = self.config.quiet;
        let name = path.display().to_string().blue();

        match result {
            FixResult::Fixed { bytes_removed, .. } => {
                self.stats.add_fixed(bytes_removed);
                if !quiet {
                    let verb = if self.config.dry_run { "Would fix" } else { "Fixed" };
                    print_success(&format!(
                        "{} {} (removed {})",
                        verb,
                        name,
                        format_size(bytes_removed)
                    ));
                }
            }
            FixResult::Compliant => {
                self.stats.add_compliant();
                if !quiet && self.config.verbose > 0 {
                    print_item(&format!("{} is already clean", name));
                }
            }
            FixResult::Skipped => {
                self.stats.add_skipped();
                if !quiet {
                    print_warning(&format!("Skipped {}", name));
                }
            }
            FixResult::Aborted => {
                self.stats.set_aborted();
                print_error(&format!("Cancelled at {}", path.display()));
            }
            FixResult::Failed(reason) => {
                self.stats.add_failure();
                print_error(&format!("Failed to load {}: {}", path.display(), reason));
            }
        }
    }
}
