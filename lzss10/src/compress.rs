//! LZSS-10 compression
//!
//! A native encoder for the same stream format `decompress` accepts: greedy
//! longest-match search over a 0x1000-byte sliding window, match lengths
//! 3..=18. The match finder keeps per-3-byte-prefix position chains so that
//! multi-megabyte manual archives compress in one pass.

use std::collections::HashMap;

use tracing::debug;

use crate::{Error, LZSS10_MARKER, Result};

/// Sliding window size: displacements span 1..=0x1000.
const WINDOW: usize = 0x1000;
/// Longest match a token can express: nibble 0xF + 3.
const MAX_MATCH: usize = 18;
/// Shortest match worth a token.
const MIN_MATCH: usize = 3;
/// Chain positions examined per match search.
const MAX_CANDIDATES: usize = 256;

/// A pluggable LZSS-10 encoder.
///
/// The archive generator only needs `compress(bytes) -> bytes`; callers that
/// ship their own encoder (for bit-identical output against a particular
/// reference tool) implement this trait. [`NativeCompressor`] is the default.
pub trait Compressor {
    /// Compress `data` into a complete LZSS-10 stream, header included.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// The built-in greedy encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCompressor;

impl Compressor for NativeCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        compress(data)
    }
}

/// Compress `data` into a complete LZSS-10 stream, header included.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > 0xFF_FFFF {
        return Err(Error::InputTooLarge(data.len()));
    }

    let mut out = Vec::with_capacity(4 + data.len() / 2);
    out.push(LZSS10_MARKER);
    out.push(data.len() as u8);
    out.push((data.len() >> 8) as u8);
    out.push((data.len() >> 16) as u8);

    let mut chains: HashMap<[u8; 3], Vec<usize>> = HashMap::new();
    let mut pos = 0usize;

    while pos < data.len() {
        let control_at = out.len();
        out.push(0);

        for bit in (0..8).rev() {
            if pos >= data.len() {
                break;
            }

            match find_match(data, pos, &chains) {
                Some((length, displacement)) => {
                    out[control_at] |= 1 << bit;
                    let token = ((length - MIN_MATCH) as u16) << 12
                        | (displacement - 1) as u16;
                    out.push((token >> 8) as u8);
                    out.push(token as u8);
                    for covered in pos..pos + length {
                        index_position(data, covered, &mut chains);
                    }
                    pos += length;
                }
                None => {
                    out.push(data[pos]);
                    index_position(data, pos, &mut chains);
                    pos += 1;
                }
            }
        }
    }

    debug!("LZSS-10: {} bytes -> {} bytes", data.len(), out.len());
    Ok(out)
}

/// Record `pos` in the chain for its 3-byte prefix.
fn index_position(data: &[u8], pos: usize, chains: &mut HashMap<[u8; 3], Vec<usize>>) {
    if pos + MIN_MATCH <= data.len() {
        let key = [data[pos], data[pos + 1], data[pos + 2]];
        chains.entry(key).or_default().push(pos);
    }
}

/// Longest match for `data[pos..]` inside the window, newest candidate first.
fn find_match(
    data: &[u8],
    pos: usize,
    chains: &HashMap<[u8; 3], Vec<usize>>,
) -> Option<(usize, usize)> {
    if pos + MIN_MATCH > data.len() {
        return None;
    }

    let key = [data[pos], data[pos + 1], data[pos + 2]];
    let candidates = chains.get(&key)?;
    let window_start = pos.saturating_sub(WINDOW);
    let limit = MAX_MATCH.min(data.len() - pos);

    let mut best: Option<(usize, usize)> = None;
    for &candidate in candidates.iter().rev().take(MAX_CANDIDATES) {
        if candidate < window_start {
            break;
        }

        // Matches may run into the current position; the decoder copies
        // byte-by-byte, so overlapping references reproduce correctly.
        let mut length = 0;
        while length < limit && data[candidate + length] == data[pos + length] {
            length += 1;
        }

        if length >= MIN_MATCH && best.is_none_or(|(b, _)| length > b) {
            best = Some((length, pos - candidate));
            if length == limit {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress;

    #[test]
    fn test_roundtrip_literals() {
        let data = b"abcdefgh";
        let compressed = compress(data).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_repetitive() {
        let data = b"ff00ff00ff00ff00ff00ff00ff00ff00".repeat(32);
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_empty() {
        let compressed = compress(&[]).unwrap();
        assert_eq!(compressed, [0x10, 0x00, 0x00, 0x00]);
        assert_eq!(decompress(&compressed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_roundtrip_single_byte_run() {
        let data = vec![0u8; 5000];
        let compressed = compress(&data).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_header_declares_input_size() {
        let data = vec![7u8; 0x12345];
        let compressed = compress(&data).unwrap();
        assert_eq!(&compressed[..4], &[0x10, 0x45, 0x23, 0x01]);
    }

    #[test]
    fn test_compressor_trait_object() {
        let compressor: &dyn Compressor = &NativeCompressor;
        let data = b"trait object dispatch";
        let compressed = compressor.compress(data).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), data);
    }
}
