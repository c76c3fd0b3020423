//! # CLYT
//!
//! Codec for Nintendo CLYT ("BCLYT") binary layout files, the section-based
//! 2D UI page description used throughout 3DS electronic manuals: a dozen
//! section kinds, nested panel and group trees, font/texture/material tables
//! referenced by index, packed material flag words, and user-data blocks
//! with heterogeneous payloads.
//!
//! [`Clyt::parse`] decodes a file into an owned tree with every symbol
//! resolved to its name and every colour interned into the layout's own
//! [`ColorTable`]; [`Clyt::build`] regenerates the byte form, rebuilding
//! symbol tables and packed flags from the tree. All codec state is scoped
//! to the single operation; nothing is shared across layouts.

pub mod bytes;

mod color;
mod decode;
mod document;
mod encode;
mod enums;
mod error;
mod geom;
mod group;
mod material;
mod panel;
mod userdata;

pub use color::{ColorRef, ColorTable, Rgba};
pub use decode::TEXT_DECODE_SENTINEL;
pub use document::{CLYT_MAGIC, Clyt, HEADER_LEN, Layout, REVISION};
pub use encode::EncodeOptions;
pub use enums::{
    BlendFactor, BlendOp, FilterMode, LineAlignment, LogicOp, MatrixType, OriginHorizontal,
    OriginType, OriginVertical, PanelFlags, PanelMagnificationFlags, TextureGenerationType,
    UsdDataType, WrapMode,
};
pub use error::{Error, Result};
pub use geom::{Vec2, Vec3};
pub use group::Group;
pub use material::{
    AlphaCompare, BlendMode, FontShadowParam, IndirectParam, Material, MaterialFlags,
    ProjTexGenParam, TevStage, TexCoordGen, TexMapEntry, TexMatrixEntry,
};
pub use panel::{
    Panel, PanelCommon, PanelKind, Picture, Text, TextureCoords, UvCoordSet, Window, WindowFrame,
};
pub use userdata::{UsdEntry, UsdMode, UsdValue};
