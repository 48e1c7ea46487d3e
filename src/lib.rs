//! dpifix - strip resolution metadata from PNG images
//!
//! Finds PNG files, reports their `pHYs` (physical resolution) chunk and
//! rewrites them without it. Every other chunk is kept byte-for-byte: lengths
//! and CRCs are copied, never recomputed.
//!
//! # Example
//!
//! ```no_run
//! use dpifix::normalizer::{FailureAction, FixResult, fix_file};
//! use dpifix::png::PHYS;
//! use std::path::Path;
//!
//! let mut skip = |_: &Path, _: &dpifix::SaveError| FailureAction::Skip;
//! match fix_file(Path::new("screenshot.png"), PHYS, &mut skip) {
//!     FixResult::Fixed { bytes_removed, .. } => println!("removed {} bytes", bytes_removed),
//!     other => println!("{:?}", other),
//! }
//! ```

pub mod cli;
pub mod error;
pub mod normalizer;
pub mod png;
pub mod processor;
pub mod settings;
pub mod terminal;

pub use cli::Config;
pub use error::{Error, LoadError, Result, SaveError};
pub use normalizer::{FailureAction, FailureHandler, FixResult, fix_file};
pub use png::{ChunkSequence, filter_out_tag, has_tag, load_chunks, save_chunks};
pub use processor::Processor;
pub use settings::Settings;
