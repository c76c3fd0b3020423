//! The panel tree
//!
//! Panels come in four kinds sharing one common attribute block: plain
//! (`pan1`), picture (`pic1`), text (`txt1`), and window (`wnd1`). Children
//! are owned by their parent; the decoder's parent back-references live only
//! on its descent stack and are gone once the tree is finished.

use crate::color::ColorRef;
use crate::enums::{
    LineAlignment, OriginHorizontal, OriginVertical, PanelFlags, PanelMagnificationFlags,
};
use crate::geom::{Vec2, Vec3};
use crate::userdata::UsdEntry;

/// Attribute block common to every panel kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelCommon {
    pub flags: PanelFlags,
    pub origin: (OriginHorizontal, OriginVertical),
    pub parent_origin: (OriginHorizontal, OriginVertical),
    pub alpha: u8,
    pub magnification_flags: PanelMagnificationFlags,
    /// Name, at most 24 bytes on the wire.
    pub name: String,
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec2,
    pub size: Vec2,
}

/// One texture coordinate quad of a picture panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextureCoords {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

/// `pic1` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub tl_color: ColorRef,
    pub tr_color: ColorRef,
    pub bl_color: ColorRef,
    pub br_color: ColorRef,
    /// Name from the layout's material table.
    pub material: String,
    pub texture_coords: Vec<TextureCoords>,
}

/// `txt1` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Spare capacity beyond the encoded string, in UTF-16 units.
    pub additional_chars: u16,
    pub material: String,
    pub font: String,
    pub another_origin: (OriginHorizontal, OriginVertical),
    pub line_alignment: LineAlignment,
    pub top_color: ColorRef,
    pub bottom_color: ColorRef,
    pub text_size: Vec2,
    pub character_size: f32,
    pub line_size: f32,
    pub text: String,
}

/// One UV quad of a window panel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvCoordSet {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

/// One frame of a window panel.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub material: String,
    pub flip: u8,
}

/// `wnd1` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub content_overflow_l: f32,
    pub content_overflow_r: f32,
    pub content_overflow_t: f32,
    pub content_overflow_b: f32,
    pub flag: u8,
    pub tl_color: ColorRef,
    pub tr_color: ColorRef,
    pub bl_color: ColorRef,
    pub br_color: ColorRef,
    pub material: String,
    pub uv_sets: Vec<UvCoordSet>,
    pub frames: Vec<WindowFrame>,
}

/// Kind-specific payload of a panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    Pan,
    Pic(Picture),
    Txt(Text),
    Wnd(Window),
}

impl PanelKind {
    /// The section magic this kind serializes under.
    pub fn magic(&self) -> &'static [u8; 4] {
        match self {
            Self::Pan => b"pan1",
            Self::Pic(_) => b"pic1",
            Self::Txt(_) => b"txt1",
            Self::Wnd(_) => b"wnd1",
        }
    }

    /// The document `type` attribute.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pan => "Pan1",
            Self::Pic(_) => "Pic1",
            Self::Txt(_) => "Txt1",
            Self::Wnd(_) => "Wnd1",
        }
    }
}

/// A node of the panel tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub common: PanelCommon,
    pub kind: PanelKind,
    pub user_data: Vec<UsdEntry>,
    pub children: Vec<Panel>,
}

impl Panel {
    pub fn new(common: PanelCommon, kind: PanelKind) -> Self {
        Self {
            common,
            kind,
            user_data: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of panels in this subtree, this one included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Panel::subtree_len).sum::<usize>()
    }
}
