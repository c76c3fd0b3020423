//! # DARC
//!
//! Nintendo "Directory ARChive" codec: a flat entry table plus a UTF-16LE
//! name pool plus a data blob, encoding a shallow virtual filesystem. This
//! is the container format wrapping both the outside of a 3DS electronic
//! manual and each of its compressed members.
//!
//! Parsing accepts any DARC the console format allows; writing supports
//! trees of at most one folder level (all the manual container ever uses)
//! with the alignment and header conventions of the reference encoder, see
//! [`BuildOptions`].
//!
//! ```
//! use darc::{BuildOptions, Darc};
//!
//! let mut archive = Darc::default();
//! archive.push("blyt/Index.bclyt", vec![1, 2, 3, 4]);
//! let bytes = archive.build(&BuildOptions::default())?;
//! assert_eq!(Darc::parse(&bytes)?, archive);
//! # Ok::<(), darc::Error>(())
//! ```

mod archive;
mod builder;
mod error;

pub use archive::{DARC_MAGIC, Darc, DarcFile, FOLDER_FLAG, HEADER_LEN, VERSION};
pub use builder::BuildOptions;
pub use error::{Error, Result};
