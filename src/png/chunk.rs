//! Chunk records and the ordered sequence a PNG file is made of.
//!
//! A chunk is stored exactly as it appeared on disk:
//! - 4 bytes: data length (big-endian)
//! - 4 bytes: chunk type (ASCII)
//! - N bytes: data
//! - 4 bytes: CRC
//!
//! Nothing here ever recomputes the length or the CRC. A chunk is either kept
//! verbatim or dropped as a whole.

use super::{IEND, PNG_SIGNATURE};
use std::fmt;

/// Bytes of framing around a chunk's data: length, type and CRC.
pub const FRAMING_LEN: usize = 12;

/// A four-byte chunk type such as `IHDR` or `pHYs`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Parse a tag from a four-character ASCII string.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes: [u8; 4] = s.as_bytes().try_into().ok()?;
        if bytes.iter().all(u8::is_ascii_alphabetic) {
            Some(Tag(bytes))
        } else {
            None
        }
    }

    /// The raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

impl From<&[u8; 4]> for Tag {
    fn from(bytes: &[u8; 4]) -> Self {
        Tag(*bytes)
    }
}

/// One framed chunk, holding its exact on-disk bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    raw: Vec<u8>,
}

impl Chunk {
    /// Wrap raw chunk bytes.
    ///
    /// Returns `None` unless `raw` is exactly `12 + length` bytes long, where
    /// `length` is the big-endian value in its first four bytes.
    pub fn from_raw(raw: Vec<u8>) -> Option<Self> {
        if raw.len() < FRAMING_LEN {
            return None;
        }
        let declared = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        if raw.len() - FRAMING_LEN != declared {
            return None;
        }
        Some(Self { raw })
    }

    /// The chunk type.
    pub fn tag(&self) -> Tag {
        Tag([self.raw[4], self.raw[5], self.raw[6], self.raw[7]])
    }

    /// Declared data length.
    pub fn data_len(&self) -> usize {
        self.raw.len() - FRAMING_LEN
    }

    /// The chunk's data, without framing.
    pub fn data(&self) -> &[u8] {
        &self.raw[8..self.raw.len() - 4]
    }

    /// The trailing CRC field as stored. Never verified.
    pub fn crc(&self) -> u32 {
        let n = self.raw.len();
        u32::from_be_bytes([self.raw[n - 4], self.raw[n - 3], self.raw[n - 2], self.raw[n - 1]])
    }

    /// The complete on-disk bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Whether this is the terminating `IEND` chunk.
    pub fn is_terminator(&self) -> bool {
        self.tag() == IEND
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("tag", &self.tag())
            .field("data_len", &self.data_len())
            .field("crc", &format_args!("{:#010x}", self.crc()))
            .finish()
    }
}

/// The 8-byte magic prefix that opens every PNG file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature;

impl Signature {
    /// The magic bytes.
    pub fn raw(&self) -> &'static [u8; 8] {
        &PNG_SIGNATURE
    }

    /// First four magic bytes read as a tag. Only meaningful for callers that
    /// treat the signature as if it were a chunk.
    pub fn legacy_tag(&self) -> Tag {
        Tag([PNG_SIGNATURE[0], PNG_SIGNATURE[1], PNG_SIGNATURE[2], PNG_SIGNATURE[3]])
    }
}

/// Whether to yield the signature as the first item of [`ChunkSequence::records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeSignature {
    Yes,
    No,
}

/// An item of [`ChunkSequence::records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    Signature(Signature),
    Chunk(&'a Chunk),
}

impl Record<'_> {
    /// On-disk bytes of this record.
    pub fn raw(&self) -> &[u8] {
        match self {
            Record::Signature(sig) => sig.raw(),
            Record::Chunk(chunk) => chunk.raw(),
        }
    }

    /// Tag of this record; the signature reports its legacy tag.
    pub fn tag(&self) -> Tag {
        match self {
            Record::Signature(sig) => sig.legacy_tag(),
            Record::Chunk(chunk) => chunk.tag(),
        }
    }
}

/// The chunks of one PNG file, in file order.
///
/// An empty sequence means the source was not a PNG. A non-empty sequence
/// always carries the signature, and the reader guarantees it ends with the
/// one and only `IEND` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSequence {
    signature: Option<Signature>,
    chunks: Vec<Chunk>,
}

impl ChunkSequence {
    /// The sequence returned for sources that are not PNG files.
    pub fn not_recognized() -> Self {
        Self::default()
    }

    /// Build a sequence that follows the signature with `chunks`.
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            signature: Some(Signature),
            chunks,
        }
    }

    /// True when the source was not recognized as PNG.
    pub fn is_empty(&self) -> bool {
        self.signature.is_none()
    }

    /// The signature, if the source was recognized.
    pub fn signature(&self) -> Option<Signature> {
        self.signature
    }

    /// The chunks after the signature.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Iterate records, optionally starting with the signature.
    pub fn records(&self, include: IncludeSignature) -> impl Iterator<Item = Record<'_>> {
        let sig = match include {
            IncludeSignature::Yes => self.signature.map(Record::Signature),
            IncludeSignature::No => None,
        };
        sig.into_iter().chain(self.chunks.iter().map(Record::Chunk))
    }

    /// Whether any chunk carries `tag`.
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.chunks.iter().any(|c| c.tag() == tag)
    }

    /// A new sequence without any chunk carrying `tag`. `self` is untouched.
    pub fn without_tag(&self, tag: Tag) -> Self {
        Self {
            signature: self.signature,
            chunks: self
                .chunks
                .iter()
                .filter(|c| c.tag() != tag)
                .cloned()
                .collect(),
        }
    }

    /// Total size in bytes once written, signature included.
    pub fn byte_len(&self) -> u64 {
        self.records(IncludeSignature::Yes)
            .map(|r| r.raw().len() as u64)
            .sum()
    }
}

/// Frame a chunk around `data` with the given CRC bytes.
#[cfg(test)]
pub fn make_chunk(tag: &[u8; 4], data: &[u8], crc: u32) -> Chunk {
    let mut raw = Vec::with_capacity(FRAMING_LEN + data.len());
    raw.extend_from_slice(&(data.len() as u32).to_be_bytes());
    raw.extend_from_slice(tag);
    raw.extend_from_slice(data);
    raw.extend_from_slice(&crc.to_be_bytes());
    Chunk { raw }
}
