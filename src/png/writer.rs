//! Chunk stream writer.
//!
//! Replacement files are staged next to the destination and renamed over it
//! only once every byte has been written and synced.

use super::chunk::{ChunkSequence, IncludeSignature};
use crate::error::SaveError;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Replace the contents of `path` with `sequence`.
///
/// An empty sequence writes nothing: the destination is neither created,
/// truncated nor touched.
pub fn save_chunks(path: &Path, sequence: &ChunkSequence) -> Result<(), SaveError> {
    if sequence.is_empty() {
        debug!(path = %path.display(), "empty sequence, nothing written");
        return Ok(());
    }

    // Write through symlinks: the rename must land on the real file.
    let target = resolve_destination(path)?;
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(temp.as_file_mut());
        write_chunks(&mut out, sequence)?;
        out.flush()?;
    }
    temp.as_file().sync_all()?;

    // Keep the original's permissions; a fresh temp file is owner-only.
    match fs::metadata(&target) {
        Ok(meta) => temp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    temp.persist(&target).map_err(|e| SaveError::Persist {
        path: target.clone(),
        source: e.error,
    })?;

    debug!(
        path = %target.display(),
        bytes = sequence.byte_len(),
        chunks = sequence.chunks().len(),
        "wrote chunk stream"
    );
    Ok(())
}

/// The file `path` finally names, or `path` itself if it does not exist yet.
fn resolve_destination(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(real) => Ok(real),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}

/// Write every record of `sequence`, signature first, to `sink`.
pub fn write_chunks<W: Write>(sink: &mut W, sequence: &ChunkSequence) -> io::Result<()> {
    for record in sequence.records(IncludeSignature::Yes) {
        sink.write_all(record.raw())?;
    }
    Ok(())
}
