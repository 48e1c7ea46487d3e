//! Physical resolution metadata (`pHYs`).
//!
//! The chunk data is 9 bytes:
//! - 4 bytes: pixels per unit, X axis (big-endian)
//! - 4 bytes: pixels per unit, Y axis (big-endian)
//! - 1 byte: unit specifier (0 = unknown, 1 = metre)

use super::chunk::{Chunk, Tag};
use super::reader::load_chunks;
use super::PHYS;
use crate::error::LoadError;
use std::path::Path;

const PHYS_DATA_LEN: usize = 9;

const METERS_PER_INCH: f64 = 0.0254;

/// Unit of a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Only the aspect ratio is meaningful.
    Unknown,
    Meter,
}

/// Decoded `pHYs` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub pixels_per_unit_x: u32,
    pub pixels_per_unit_y: u32,
    pub unit: Unit,
}

impl Resolution {
    /// Decode a `pHYs` chunk. Any other chunk, or a malformed payload, gives `None`.
    pub fn from_chunk(chunk: &Chunk) -> Option<Self> {
        if chunk.tag() != PHYS {
            return None;
        }
        let data = chunk.data();
        if data.len() != PHYS_DATA_LEN {
            return None;
        }
        let unit = match data[8] {
            0 => Unit::Unknown,
            1 => Unit::Meter,
            _ => return None,
        };
        Some(Self {
            pixels_per_unit_x: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            pixels_per_unit_y: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            unit,
        })
    }

    /// Dots per inch on each axis, when the unit is metres.
    pub fn dpi(&self) -> Option<(f64, f64)> {
        match self.unit {
            Unit::Meter => Some((
                self.pixels_per_unit_x as f64 * METERS_PER_INCH,
                self.pixels_per_unit_y as f64 * METERS_PER_INCH,
            )),
            Unit::Unknown => None,
        }
    }

    /// Whether both axes round to `dpi` dots per inch. A resolution without a
    /// unit never matches.
    pub fn matches_dpi(&self, dpi: u32) -> bool {
        let want = f64::from(dpi);
        self.dpi()
            .is_some_and(|(x, y)| x.round() == want && y.round() == want)
    }

    /// Human readable description, e.g. `72 x 72 dpi`.
    pub fn describe(&self) -> String {
        match self.dpi() {
            Some((x, y)) => format!("{:.0} x {:.0} dpi", x, y),
            None => format!(
                "aspect {}:{} (no unit)",
                self.pixels_per_unit_x, self.pixels_per_unit_y
            ),
        }
    }
}

/// What a scan found in one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Inspection {
    /// Not a PNG file.
    NotRecognized,
    Png {
        /// First decodable `pHYs`, if any.
        resolution: Option<Resolution>,
        /// Number of chunks carrying the inspected tag.
        tagged_chunks: usize,
        /// Number of chunks after the signature.
        chunk_count: usize,
    },
}

/// Load `path` and report its resolution metadata along with how many chunks
/// carry `tag`.
pub fn inspect_file(path: &Path, tag: Tag) -> Result<Inspection, LoadError> {
    let sequence = load_chunks(path)?;
    if sequence.is_empty() {
        return Ok(Inspection::NotRecognized);
    }

    let chunks = sequence.chunks();
    Ok(Inspection::Png {
        resolution: chunks.iter().find_map(Resolution::from_chunk),
        tagged_chunks: chunks.iter().filter(|c| c.tag() == tag).count(),
        chunk_count: chunks.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::chunk::make_chunk;

    fn phys(x: u32, y: u32, unit: u8) -> Chunk {
        let mut data = Vec::with_capacity(9);
        data.extend_from_slice(&x.to_be_bytes());
        data.extend_from_slice(&y.to_be_bytes());
        data.push(unit);
        make_chunk(b"pHYs", &data, 0)
    }

    #[test]
    fn test_from_chunk_meter() {
        let res = Resolution::from_chunk(&phys(2835, 2835, 1)).unwrap();
        assert_eq!(res.pixels_per_unit_x, 2835);
        assert_eq!(res.unit, Unit::Meter);

        let (x, y) = res.dpi().unwrap();
        assert!((x - 72.0).abs() < 0.1);
        assert!((y - 72.0).abs() < 0.1);
        assert_eq!(res.describe(), "72 x 72 dpi");
    }

    #[test]
    fn test_from_chunk_unknown_unit() {
        let res = Resolution::from_chunk(&phys(1, 2, 0)).unwrap();
        assert_eq!(res.unit, Unit::Unknown);
        assert_eq!(res.dpi(), None);
        assert!(res.describe().contains("1:2"));
    }

    #[test]
    fn test_from_chunk_rejects_bad_payload() {
        assert!(Resolution::from_chunk(&make_chunk(b"pHYs", &[0; 8], 0)).is_none());
        assert!(Resolution::from_chunk(&phys(1, 1, 7)).is_none());
    }

    #[test]
    fn test_from_chunk_rejects_other_tags() {
        assert!(Resolution::from_chunk(&make_chunk(b"IHDR", &[0; 9], 0)).is_none());
    }

    #[test]
    fn test_inspect_file() {
        use crate::png::{ChunkSequence, write_chunks};
        use std::fs;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.png");
        let seq = ChunkSequence::new(vec![
            make_chunk(b"IHDR", &[0; 13], 0),
            make_chunk(b"pHYs", &[0; 3], 0),
            phys(3780, 3780, 1),
            make_chunk(b"IEND", &[], 0),
        ]);
        let mut data = Vec::new();
        write_chunks(&mut data, &seq).unwrap();
        fs::write(&path, data).unwrap();

        match inspect_file(&path, PHYS).unwrap() {
            Inspection::Png {
                resolution,
                tagged_chunks,
                chunk_count,
            } => {
                assert_eq!(resolution.map(|r| r.pixels_per_unit_x), Some(3780));
                assert_eq!(tagged_chunks, 2);
                assert_eq!(chunk_count, 4);
            }
            other => panic!("expected a PNG, got {:?}", other),
        }

        fs::write(&path, b"plain text").unwrap();
        assert_eq!(inspect_file(&path, PHYS).unwrap(), Inspection::NotRecognized);
    }

    #[test]
    fn test_96_dpi() {
        let res = Resolution::from_chunk(&phys(3780, 3780, 1)).unwrap();
        assert_eq!(res.describe(), "96 x 96 dpi");
    }

    #[test]
    fn test_matches_dpi() {
        // 96 dpi is 3779.5 pixels per metre, stored rounded either way.
        assert!(Resolution::from_chunk(&phys(3780, 3780, 1)).unwrap().matches_dpi(96));
        assert!(Resolution::from_chunk(&phys(3779, 3779, 1)).unwrap().matches_dpi(96));
        assert!(!Resolution::from_chunk(&phys(2835, 2835, 1)).unwrap().matches_dpi(96));
        assert!(!Resolution::from_chunk(&phys(3780, 2835, 1)).unwrap().matches_dpi(96));
        assert!(!Resolution::from_chunk(&phys(3780, 3780, 0)).unwrap().matches_dpi(96));
    }
}
