//! Error types for DARC parsing and writing

use thiserror::Error;

/// Result type for DARC operations
pub type Result<T> = std::result::Result<T, Error>;

/// DARC error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid archive magic bytes
    #[error("Invalid DARC magic: expected \"darc\", got {0:?}")]
    BadMagic([u8; 4]),

    /// A fixed header field holds an unexpected value
    #[error("Invalid DARC header field {field}: {value:#x}")]
    BadHeaderField { field: &'static str, value: u32 },

    /// A declared length disagrees with what the archive actually holds
    #[error("Length mismatch: header declares {declared} bytes, actual {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    /// A table entry points outside the archive
    #[error("Entry {name:?} spans {start:#x}..{end:#x}, past the archive end {limit:#x}")]
    EntryOutOfBounds {
        name: String,
        start: usize,
        end: usize,
        limit: usize,
    },

    /// A name in the pool is not terminated or not valid UTF-16
    #[error("Malformed UTF-16 name at pool offset {0:#x}")]
    BadName(usize),

    /// The file tree is deeper than the format supports
    #[error("Unsupported tree shape: {0}")]
    TreeShape(String),
}
