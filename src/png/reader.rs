//! Chunk stream reader.

use super::chunk::{Chunk, ChunkSequence, FRAMING_LEN};
use super::PNG_SIGNATURE;
use crate::error::LoadError;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Load every chunk of the PNG file at `path`, up to and including `IEND`.
///
/// Files that do not start with the PNG signature yield an empty sequence.
pub fn load_chunks(path: &Path) -> Result<ChunkSequence, LoadError> {
    let file = File::open(path)?;
    let sequence = read_chunks(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        chunks = sequence.chunks().len(),
        recognized = !sequence.is_empty(),
        "loaded chunk stream"
    );
    Ok(sequence)
}

/// Parse a chunk stream from any byte source.
pub fn read_chunks<R: Read>(mut source: R) -> Result<ChunkSequence, LoadError> {
    let mut magic = [0u8; 8];
    if read_full(&mut source, &mut magic)? < magic.len() || magic != PNG_SIGNATURE {
        return Ok(ChunkSequence::not_recognized());
    }

    let mut chunks = Vec::new();
    let mut offset = PNG_SIGNATURE.len() as u64;

    loop {
        // <length[4]><type[4]><data[length]><crc[4]>
        let mut header = [0u8; 8];
        match read_full(&mut source, &mut header)? {
            0 => return Err(LoadError::MissingTerminator),
            n if n < header.len() => return Err(LoadError::Truncated { offset, tag: None }),
            _ => {}
        }

        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let tag = [header[4], header[5], header[6], header[7]];
        let body_len = length + 4;

        // Grow with the bytes actually present rather than trusting `length`.
        let mut raw = Vec::with_capacity(FRAMING_LEN + length.min(64 * 1024) as usize);
        raw.extend_from_slice(&header);
        let got = (&mut source).take(body_len).read_to_end(&mut raw)? as u64;
        if got < body_len {
            return Err(LoadError::Truncated {
                offset,
                tag: Some(tag),
            });
        }

        let chunk_len = raw.len() as u64;
        let chunk = Chunk::from_raw(raw).ok_or(LoadError::Truncated {
            offset,
            tag: Some(tag),
        })?;
        offset += chunk_len;
        let done = chunk.is_terminator();
        chunks.push(chunk);

        if done {
            return Ok(ChunkSequence::new(chunks));
        }
    }
}

/// Fill `buf` as far as the source allows, returning the number of bytes read.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::chunk::make_chunk;
    use crate::png::{IEND, PHYS, Tag};
    use std::io::Cursor;

    fn tags(sequence: &ChunkSequence) -> Vec<Tag> {
        sequence.chunks().iter().map(Chunk::tag).collect()
    }

    fn png_bytes(chunks: &[Chunk]) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        for chunk in chunks {
            data.extend_from_slice(chunk.raw());
        }
        data
    }

    fn minimal_chunks() -> Vec<Chunk> {
        vec![
            make_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0], 0x3A7E9B55),
            make_chunk(b"pHYs", &[0, 0, 0x0E, 0xC4, 0, 0, 0x0E, 0xC4, 1], 0x952B0E1B),
            make_chunk(b"IDAT", &[0x78, 0x9C, 0x62, 0x60, 0, 0, 0, 2, 0, 1], 0x11223344),
            make_chunk(b"IEND", &[], 0xAE426082),
        ]
    }

    #[test]
    fn test_read_minimal_png() {
        let chunks = minimal_chunks();
        let seq = read_chunks(Cursor::new(png_bytes(&chunks))).unwrap();

        assert!(!seq.is_empty());
        assert_eq!(seq.chunks(), chunks.as_slice());
        assert_eq!(
            tags(&seq),
            vec![Tag(*b"IHDR"), PHYS, Tag(*b"IDAT"), IEND]
        );
    }

    #[test]
    fn test_not_png_is_empty_not_error() {
        let seq = read_chunks(Cursor::new(vec![0u8; 64])).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_short_input_is_empty() {
        let seq = read_chunks(Cursor::new(vec![0x89, 0x50, 0x4E])).unwrap();
        assert!(seq.is_empty());

        let seq = read_chunks(Cursor::new(Vec::new())).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_signature_only_is_missing_terminator() {
        let result = read_chunks(Cursor::new(PNG_SIGNATURE.to_vec()));
        assert!(matches!(result, Err(LoadError::MissingTerminator)));
    }

    #[test]
    fn test_no_iend_is_missing_terminator() {
        let chunks = &minimal_chunks()[..3];
        let result = read_chunks(Cursor::new(png_bytes(chunks)));
        assert!(matches!(result, Err(LoadError::MissingTerminator)));
    }

    #[test]
    fn test_declared_length_past_end_is_truncated() {
        let mut data = png_bytes(&minimal_chunks()[..1]);
        // Claims 100 bytes of data but supplies 5.
        data.extend_from_slice(&100u32.to_be_bytes());
        data.extend_from_slice(b"IDAT");
        data.extend_from_slice(&[1, 2, 3, 4, 5]);

        let result = read_chunks(Cursor::new(data));
        match result {
            Err(LoadError::Truncated { offset, tag }) => {
                assert_eq!(offset, 8 + 25);
                assert_eq!(tag, Some(*b"IDAT"));
            }
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_declared_length_is_truncated() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&u32::MAX.to_be_bytes());
        data.extend_from_slice(b"IDAT");
        let result = read_chunks(Cursor::new(data));
        assert!(matches!(result, Err(LoadError::Truncated { .. })));
    }

    #[test]
    fn test_missing_crc_is_truncated() {
        let mut data = png_bytes(&minimal_chunks()[..3]);
        let iend = make_chunk(b"IEND", &[], 0xAE426082);
        data.extend_from_slice(&iend.raw()[..10]);
        let result = read_chunks(Cursor::new(data));
        assert!(matches!(
            result,
            Err(LoadError::Truncated { tag: Some(t), .. }) if &t == b"IEND"
        ));
    }

    #[test]
    fn test_partial_header_is_truncated() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&[0, 0]);
        let result = read_chunks(Cursor::new(data));
        assert!(matches!(result, Err(LoadError::Truncated { tag: None, .. })));

        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&[0, 0, 0, 0, b'I', b'E']);
        let result = read_chunks(Cursor::new(data));
        assert!(matches!(result, Err(LoadError::Truncated { tag: None, .. })));
    }

    #[test]
    fn test_stops_at_iend() {
        let mut data = png_bytes(&minimal_chunks());
        data.extend_from_slice(b"trailing garbage after the end");
        let seq = read_chunks(Cursor::new(data)).unwrap();
        assert_eq!(seq.chunks().len(), 4);
        assert!(seq.chunks().last().unwrap().is_terminator());
    }

    #[test]
    fn test_io_error_is_propagated() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }
        let result = read_chunks(Failing);
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
