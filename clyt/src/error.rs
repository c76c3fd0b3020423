//! Error types for CLYT decoding and encoding

use thiserror::Error;

/// Result type for CLYT operations
pub type Result<T> = std::result::Result<T, Error>;

/// CLYT error types
#[derive(Error, Debug)]
pub enum Error {
    /// A read ran past the end of the buffer
    #[error("Unexpected end of data at offset {0:#x}")]
    UnexpectedEof(usize),

    /// Invalid file magic bytes
    #[error("Invalid CLYT magic: expected \"CLYT\", got {0:?}")]
    BadMagic([u8; 4]),

    /// A fixed header field holds an unexpected value
    #[error("Invalid CLYT header field {field}: {value:#x}")]
    BadHeaderField { field: &'static str, value: u32 },

    /// Section magic outside the known set
    #[error("Unknown section magic {0:?}")]
    UnknownSection([u8; 4]),

    /// A once-only section appeared twice
    #[error("Duplicate section {0:?}")]
    DuplicateSection([u8; 4]),

    /// A required section never appeared
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),

    /// Enum field value out of range
    #[error("Unknown value {value} for {field}")]
    UnknownEnum { field: &'static str, value: u32 },

    /// Name not present in its symbol table during encode
    #[error("Unknown {kind} name {name:?}")]
    UnknownSymbol { kind: &'static str, name: String },

    /// Table index out of range during decode
    #[error("{kind} index {index} out of range")]
    BadIndex { kind: &'static str, index: usize },

    /// Colour key not present in the layout's colour table
    #[error("Unknown colour key {0:?}")]
    UnknownColorKey(String),

    /// Panel or group tree inconsistency
    #[error("Malformed tree: {0}")]
    TreeShape(String),

    /// A name field holds invalid UTF-8
    #[error("Invalid UTF-8 in {0}")]
    BadString(&'static str),
}
