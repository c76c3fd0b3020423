//! Error types for LZSS-10 compression and decompression

use thiserror::Error;

/// Result type for LZSS-10 operations
pub type Result<T> = std::result::Result<T, Error>;

/// LZSS-10 error types
#[derive(Error, Debug)]
pub enum Error {
    /// First header byte is not the LZSS-10 marker
    #[error("Invalid LZSS-10 header byte: {0:#04x} (expected 0x10)")]
    BadHeader(u8),

    /// Stream ended before the declared output size was produced
    #[error("Truncated data: needed {expected} more byte(s), got {actual}")]
    TruncatedData { expected: usize, actual: usize },

    /// Decompressed output does not match the declared size
    #[error("Decompressed size mismatch: expected {expected} bytes, produced {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Back-reference token points before the start of the output
    #[error("Back-reference displacement {displacement} exceeds output length {written}")]
    DisplacementOutOfRange { displacement: usize, written: usize },

    /// Input is too large for the 24-bit size header
    #[error("Input of {0} bytes does not fit the 24-bit size header")]
    InputTooLarge(usize),
}
