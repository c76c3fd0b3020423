//! Closed, value-stable enumerations of the CLYT wire format
//!
//! Every enum decodes with [`from_raw`](WrapMode::from_raw) (out-of-range
//! values are an [`Error::UnknownEnum`]) and maps to/from the textual names
//! the editable document uses.

use crate::{Error, Result};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident: $field:literal {
            $($variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            /// Decode from the wire value.
            pub fn from_raw(raw: u32) -> Result<Self> {
                match raw {
                    $($value => Ok(Self::$variant),)+
                    value => Err(Error::UnknownEnum { field: $field, value }),
                }
            }

            /// The wire value.
            pub fn raw(self) -> u32 {
                self as u32
            }

            /// The document name.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            /// Look up by document name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

wire_enum! {
    /// Texture wrap mode of a tex-map axis
    WrapMode: "wrap mode" {
        Clamp = 0,
        Repeat = 1,
        Mirror = 2,
    }
}

wire_enum! {
    /// Texture sampling filter of a tex-map axis
    FilterMode: "filter mode" {
        Near = 0,
        Linear = 1,
    }
}

wire_enum! {
    /// Texture coordinate source for generation
    TextureGenerationType: "texture generation type" {
        Tex0 = 0,
        Tex1 = 1,
        Tex2 = 2,
        Ortho = 3,
        PaneBased = 4,
        PerspectiveProj = 5,
    }
}

wire_enum! {
    /// Blend factor selector
    BlendFactor: "blend factor" {
        Factor0 = 0,
        Factor1 = 1,
        DestColor = 2,
        DestInvColor = 3,
        SourceAlpha = 4,
        SourceInvAlpha = 5,
        DestAlpha = 6,
        DestInvAlpha = 7,
        SourceColor = 8,
        SourceInvColor = 9,
    }
}

wire_enum! {
    /// Blend equation selector
    BlendOp: "blend operation" {
        Disable = 0,
        Add = 1,
        Subtract = 2,
        ReverseSubtract = 3,
        SelectMin = 4,
        SelectMax = 5,
    }
}

wire_enum! {
    /// Framebuffer logic operation
    LogicOp: "logic operation" {
        Disable = 0,
        NoOp = 1,
        Clear = 2,
        Set = 3,
        Copy = 4,
        InvCopy = 5,
        Inv = 6,
        And = 7,
        Nand = 8,
        Or = 9,
        Nor = 10,
        Xor = 11,
        Equiv = 12,
        RevAnd = 13,
        InvAd = 14,
        RevOr = 15,
        InvOr = 16,
    }
}

wire_enum! {
    /// Layout coordinate origin convention
    OriginType: "origin type" {
        Classic = 0,
        Normal = 1,
    }
}

wire_enum! {
    /// Payload kind of a user-data entry
    UsdDataType: "user data type" {
        String = 0,
        Ints = 1,
        Floats = 2,
    }
}

wire_enum! {
    /// Horizontal anchor of a panel origin
    OriginHorizontal: "horizontal origin" {
        Center = 0,
        Left = 1,
        Right = 2,
    }
}

wire_enum! {
    /// Vertical anchor of a panel origin
    OriginVertical: "vertical origin" {
        Middle = 0,
        Top = 1,
        Bottom = 2,
    }
}

wire_enum! {
    /// Text line alignment inside a text panel
    LineAlignment: "line alignment" {
        NoAlign = 0,
        Left = 1,
        Center = 2,
        Right = 3,
    }
}

wire_enum! {
    /// Panel behavior flag byte
    PanelFlags: "panel flags" {
        Visible = 0,
        InfluencedAlpha = 1,
        LocationAdjust = 2,
    }
}

wire_enum! {
    /// Panel magnification flag byte
    PanelMagnificationFlags: "panel magnification flags" {
        IgnorePartsMagnify = 0,
        AdjustToPartsBounds = 1,
    }
}

/// Texture matrix kind of a coordinate generator.
///
/// Spelled out by hand for the underscored document name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixType {
    Matrix2x4 = 0,
}

impl MatrixType {
    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Matrix2x4),
            value => Err(Error::UnknownEnum {
                field: "matrix type",
                value,
            }),
        }
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        "Matrix_2x4"
    }

    pub fn from_name(name: &str) -> Option<Self> {
        (name == "Matrix_2x4").then_some(Self::Matrix2x4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        for raw in 0..=16 {
            let op = LogicOp::from_raw(raw).unwrap();
            assert_eq!(op.raw(), raw);
        }
        assert!(LogicOp::from_raw(17).is_err());
    }

    #[test]
    fn test_names_match_document_grammar() {
        assert_eq!(WrapMode::Mirror.name(), "Mirror");
        assert_eq!(TextureGenerationType::PerspectiveProj.name(), "PerspectiveProj");
        assert_eq!(BlendFactor::SourceInvAlpha.name(), "SourceInvAlpha");
        assert_eq!(MatrixType::Matrix2x4.name(), "Matrix_2x4");
        assert_eq!(LogicOp::InvAd.name(), "InvAd");
        assert_eq!(UsdDataType::String.name(), "String");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(OriginType::from_name("Normal"), Some(OriginType::Normal));
        assert_eq!(MatrixType::from_name("Matrix_2x4"), Some(MatrixType::Matrix2x4));
        assert_eq!(OriginVertical::from_name("Sideways"), None);
    }

    #[test]
    fn test_unknown_enum_error_names_field() {
        let err = PanelFlags::from_raw(7).unwrap_err();
        assert!(err.to_string().contains("panel flags"));
    }
}
