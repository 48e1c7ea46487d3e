//! Error types for dpifix.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for application-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing a chunk stream.
///
/// A stream that does not start with the PNG signature is not an error; the
/// reader reports it as an empty sequence instead.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The stream ended inside a record's framing.
    #[error("truncated chunk at offset {offset}{}", tag_suffix(.tag))]
    Truncated {
        /// Byte offset where the incomplete record starts.
        offset: u64,
        /// Tag of the incomplete record, if enough bytes were present to read it.
        tag: Option<[u8; 4]>,
    },
    /// The stream ended cleanly between records but never produced `IEND`.
    #[error("stream ended without an IEND chunk")]
    MissingTerminator,
    /// The underlying source failed.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

fn tag_suffix(tag: &Option<[u8; 4]>) -> String {
    match tag {
        Some(t) => format!(" ({})", String::from_utf8_lossy(t)),
        None => String::new(),
    }
}

/// Errors raised while writing a chunk stream back to disk.
#[derive(Error, Debug)]
pub enum SaveError {
    /// Creating, writing or syncing the replacement failed.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
    /// The finished replacement could not be moved over the original.
    #[error("could not replace '{}': {source}", .path.display())]
    Persist { path: PathBuf, source: io::Error },
}

/// Errors surfaced by the command-line shell.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error with optional path context.
    #[error("I/O error{}: {source}", path_suffix(.path))]
    Io {
        source: io::Error,
        path: Option<PathBuf>,
    },
    /// Path does not exist.
    #[error("Path not found: '{}'", .path.display())]
    NotFound { path: PathBuf },
    /// Permission denied.
    #[error("Permission denied: '{}'", .path.display())]
    PermissionDenied { path: PathBuf },
    /// Invalid command-line argument.
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },
    /// No path on the command line and none remembered from a previous run.
    #[error("No folder given and no previously used folder is remembered")]
    NoFolder,
    /// Settings file could not be serialized or parsed.
    #[error("Settings error for '{}': {source}", .path.display())]
    Settings {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" for '{}'", p.display()),
        None => String::new(),
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io {
            source: err,
            path: None,
        }
    }
}

impl Error {
    /// Create an I/O error with path context.
    pub fn io_with_path(err: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied { path },
            _ => Error::Io {
                source: err,
                path: Some(path),
            },
        }
    }
}
