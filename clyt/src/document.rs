//! The decoded layout document

use crate::color::ColorTable;
use crate::enums::OriginType;
use crate::geom::Vec2;
use crate::group::Group;
use crate::material::Material;
use crate::panel::Panel;

/// File magic bytes
pub const CLYT_MAGIC: [u8; 4] = *b"CLYT";
/// Fixed header length
pub const HEADER_LEN: u16 = 0x14;
/// Format revision written by this encoder
pub const REVISION: u32 = 0x0202_0000;

/// The `lyt1` record: canvas origin convention and size.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub origin: OriginType,
    pub size: Vec2,
}

/// A complete CLYT layout document.
///
/// The colour table is in-memory state shared by every section of this one
/// layout; it is not itself a section. Fonts, textures and materials are
/// referenced by zero-based index on the wire and by name in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Clyt {
    pub layout: Layout,
    pub colors: ColorTable,
    pub textures: Vec<String>,
    pub fonts: Vec<String>,
    pub materials: Vec<Material>,
    pub root_panel: Panel,
    pub root_group: Group,
}

impl Clyt {
    /// Material table index of `name`, if present.
    pub fn material_index(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }
}
