//! # LZSS-10
//!
//! Nintendo's LZSS-10 compression variant, as used for the archives inside
//! 3DS electronic-manual (BCMA) containers: a 4-byte header (`0x10` marker
//! plus little-endian 24-bit decompressed length) over a classic LZSS
//! literal/back-reference stream with big-endian 16-bit tokens.
//!
//! Both directions are provided. Decompression is fully specified by the
//! format; compression is a greedy longest-match encoder producing streams
//! any conforming decoder accepts, with a [`Compressor`] trait for callers
//! that need to substitute a specific external encoder.
//!
//! ```
//! let data = b"ff00ff00ff00";
//! let packed = lzss10::compress(data)?;
//! assert_eq!(lzss10::decompress(&packed)?, data);
//! # Ok::<(), lzss10::Error>(())
//! ```

mod compress;
mod decompress;
mod error;

pub use compress::{Compressor, NativeCompressor, compress};
pub use decompress::{decompress, decompress_raw};
pub use error::{Error, Result};

/// First header byte of every LZSS-10 stream
pub const LZSS10_MARKER: u8 = 0x10;
