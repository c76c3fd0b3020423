//! Error types for manual extraction and generation

use thiserror::Error;

/// Result type for BCMA operations
pub type Result<T> = std::result::Result<T, Error>;

/// BCMA error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error (XML writing)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML syntax error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Layout codec error
    #[error("CLYT error: {0}")]
    Clyt(#[from] clyt::Error),

    /// Archive codec error
    #[error("DARC error: {0}")]
    Darc(#[from] darc::Error),

    /// Compression codec error
    #[error("LZSS error: {0}")]
    Lzss(#[from] lzss10::Error),

    /// Texture payload is not valid hex after run-length expansion
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Run-length text holds a character outside the codec alphabet
    #[error("Invalid run-length character {0:?}")]
    BadRle(char),

    /// Document tag outside the recognised grammar
    #[error("Unknown tag <{tag}> under <{parent}>")]
    UnknownTag { parent: String, tag: String },

    /// A required element never appeared
    #[error("Missing element <{0}>")]
    MissingElement(&'static str),

    /// A required attribute never appeared
    #[error("Missing attribute {attr:?} on <{tag}>")]
    MissingAttribute { tag: String, attr: &'static str },

    /// An attribute or text value failed to parse
    #[error("Bad value {value:?} for {what} on <{tag}>")]
    BadValue {
        tag: String,
        what: &'static str,
        value: String,
    },

    /// Region code outside the closed set
    #[error("Unknown region {0:?}")]
    UnknownRegion(String),

    /// Language code outside the closed set
    #[error("Unknown language {0:?}")]
    UnknownLanguage(String),

    /// Language not permitted for its region
    #[error("Language {language:?} is not permitted in region {region:?}")]
    LanguageNotPermitted {
        region: &'static str,
        language: &'static str,
    },

    /// A page layout file name does not follow `Page_<nnn>_<size>_<sub>`
    #[error("Unrecognised page file name {0:?}")]
    BadPageName(String),

    /// An inner archive misses the file the container contract requires
    #[error("Archive {archive:?} has no member {member:?}")]
    MissingMember { archive: String, member: String },

    /// CLIM footer probe failure
    #[error("Bad CLIM footer: {0}")]
    BadClim(String),
}
