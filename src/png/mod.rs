//! PNG chunk stream codec.
//!
//! Loads a PNG file into its chunks, filters whole chunks out, and writes the
//! survivors back verbatim. Pixel data is never decoded and CRCs are never
//! checked or recomputed.

pub mod chunk;
pub mod reader;
pub mod resolution;
pub mod writer;

pub use chunk::{Chunk, ChunkSequence, IncludeSignature, Record, Signature, Tag};
pub use reader::{load_chunks, read_chunks};
pub use resolution::{Inspection, Resolution, Unit, inspect_file};
pub use writer::{save_chunks, write_chunks};

use std::path::Path;

/// PNG signature bytes.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Terminating chunk type.
pub const IEND: Tag = Tag(*b"IEND");

/// Physical pixel dimensions chunk type.
pub const PHYS: Tag = Tag(*b"pHYs");

/// Whether any chunk in `sequence` carries `tag`.
pub fn has_tag(sequence: &ChunkSequence, tag: Tag) -> bool {
    sequence.has_tag(tag)
}

/// A copy of `sequence` with every chunk carrying `tag` removed.
pub fn filter_out_tag(sequence: &ChunkSequence, tag: Tag) -> ChunkSequence {
    sequence.without_tag(tag)
}

/// Check if a path has a `.png` extension, ignoring case.
pub fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}
