//! # BCMA
//!
//! Bidirectional toolchain for the 3DS "BCMA" electronic-manual container:
//! a DARC of LZSS-10-compressed DARCs, each holding CLYT layout files and
//! CLIM textures, organised by region and language. Extraction flattens an
//! existing container into a single editable XML document; generation
//! rebuilds a console-accepted container from that document.
//!
//! ```no_run
//! use lzss10::NativeCompressor;
//!
//! # fn main() -> bcma::Result<()> {
//! let container = std::fs::read("Manual.bcma")?;
//! let document = bcma::extract_to_document(&container)?;
//!
//! // ... edit the document ...
//!
//! let rebuilt = bcma::generate_from_document(&document, &NativeCompressor)?;
//! std::fs::write("Manual.new.bcma", rebuilt)?;
//! # Ok(())
//! # }
//! ```

pub mod clim;
pub mod rle;
pub mod xml;

mod document;
mod error;
mod extract;
mod generate;
mod langs;
mod layout_xml;

pub use document::{
    COMMON_TEXTURE_ARC, ImageArc, LanguagePages, Manual, NamedImage, Page, PageSize, RegionPages,
    SubPage,
};
pub use error::{Error, Result};
pub use extract::extract;
pub use generate::generate;
pub use langs::{Language, Region, region_lang_key};
pub use layout_xml::{clyt_from_xml, clyt_to_xml};

use lzss10::Compressor;

/// Extract a BCMA container into its editable document text.
pub fn extract_to_document(data: &[u8]) -> Result<String> {
    extract(data)?.to_document_string()
}

/// Generate a BCMA container from editable document text.
pub fn generate_from_document(text: &str, compressor: &dyn Compressor) -> Result<Vec<u8>> {
    generate(&Manual::from_document_str(text)?, compressor)
}
