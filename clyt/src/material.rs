//! Materials and their optional sub-records
//!
//! A material is a 20-byte name, seven colour words, and a 32-bit packed
//! flag word that fully determines which sub-records follow and how many.
//! Sub-records appear in a fixed order: tex maps, tex matrices, coordinate
//! generators, TEV stages, alpha compare, colour blend mode, alpha blend
//! mode, indirect parameter, projected-texture parameters, font shadow.

use crate::color::ColorRef;
use crate::enums::{
    BlendFactor, BlendOp, FilterMode, LogicOp, MatrixType, TextureGenerationType, WrapMode,
};
use crate::geom::Vec2;
use crate::Result;

/// Texture reference with per-axis wrap and filter modes.
#[derive(Debug, Clone, PartialEq)]
pub struct TexMapEntry {
    /// Name from the layout's texture table.
    pub texture: String,
    pub wrap_s: WrapMode,
    pub min_filter: FilterMode,
    pub wrap_t: WrapMode,
    pub max_filter: FilterMode,
}

/// 2x4 texture transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TexMatrixEntry {
    pub translation: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

/// Texture coordinate generator.
#[derive(Debug, Clone, PartialEq)]
pub struct TexCoordGen {
    pub gen_type: MatrixType,
    pub source: TextureGenerationType,
}

/// One TEV combiner stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TevStage {
    pub rgb_mode: u8,
    pub alpha_mode: u8,
}

/// Alpha test against a reference value.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaCompare {
    pub compare_mode: u32,
    pub reference: f32,
}

/// Blend equation for either the colour or the alpha pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendMode {
    pub operation: BlendFactor,
    pub source_factor: BlendOp,
    pub dest_factor: BlendOp,
    pub logic: LogicOp,
}

/// Indirect texturing rotation and scale.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectParam {
    pub rotation: f32,
    pub scale: Vec2,
}

/// Projected texture generation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjTexGenParam {
    pub pos: Vec2,
    pub scale: Vec2,
    pub fits_layout: bool,
    pub fits_panel: bool,
    /// Decoded from `flags & 0b11` like the reference decoder (pending
    /// verification against a broader corpus); never written back.
    pub adjust_projection_sr: bool,
}

/// Font shadow gradient colours.
#[derive(Debug, Clone, PartialEq)]
pub struct FontShadowParam {
    pub black_r: u8,
    pub black_g: u8,
    pub black_b: u8,
    pub white_r: u8,
    pub white_g: u8,
    pub white_b: u8,
    pub white_a: u8,
}

/// A material table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Name, at most 20 bytes on the wire.
    pub name: String,
    pub tev_color: ColorRef,
    pub tev_constant_colors: [ColorRef; 6],
    pub tex_maps: Vec<TexMapEntry>,
    pub tex_matrices: Vec<TexMatrixEntry>,
    pub tex_coord_gens: Vec<TexCoordGen>,
    pub tev_stages: Vec<TevStage>,
    pub alpha_compare: Option<AlphaCompare>,
    pub color_blend_mode: Option<BlendMode>,
    /// Flag bit with no sub-record; carried only so the flag word
    /// round-trips.
    pub use_texture_only: bool,
    pub alpha_blend_mode: Option<BlendMode>,
    pub indirect_param: Option<IndirectParam>,
    pub proj_tex_gen_params: Vec<ProjTexGenParam>,
    pub font_shadow_param: Option<FontShadowParam>,
}

impl Material {
    /// Synthesize the packed flag word from counts and presence.
    pub fn flags_word(&self) -> u32 {
        let mut flags = 0u32;
        flags |= u32::from(self.font_shadow_param.is_some());
        flags <<= 2;
        flags |= self.proj_tex_gen_params.len() as u32 & 0b11;
        flags <<= 1;
        flags |= u32::from(self.indirect_param.is_some());
        flags <<= 1;
        flags |= u32::from(self.alpha_blend_mode.is_some());
        flags <<= 1;
        flags |= u32::from(self.use_texture_only);
        flags <<= 1;
        flags |= u32::from(self.color_blend_mode.is_some());
        flags <<= 1;
        flags |= u32::from(self.alpha_compare.is_some());
        flags <<= 3;
        flags |= self.tev_stages.len() as u32 & 0b111;
        flags <<= 2;
        flags |= self.tex_coord_gens.len() as u32 & 0b11;
        flags <<= 2;
        flags |= self.tex_matrices.len() as u32 & 0b11;
        flags <<= 2;
        flags |= self.tex_maps.len() as u32 & 0b11;
        flags
    }
}

/// Decoded view of the packed material flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialFlags {
    pub tex_map_count: u8,
    pub tex_matrix_count: u8,
    pub tex_coord_gen_count: u8,
    pub tev_stage_count: u8,
    pub has_alpha_compare: bool,
    pub has_color_blend_mode: bool,
    pub use_texture_only: bool,
    pub has_alpha_blend_mode: bool,
    pub has_indirect_param: bool,
    pub proj_tex_gen_param_count: u8,
    pub has_font_shadow_param: bool,
}

impl MaterialFlags {
    /// Unpack a flag word, LSB first.
    pub fn from_word(flags: u32) -> Self {
        Self {
            tex_map_count: (flags & 0b11) as u8,
            tex_matrix_count: (flags >> 2 & 0b11) as u8,
            tex_coord_gen_count: (flags >> 4 & 0b11) as u8,
            tev_stage_count: (flags >> 6 & 0b111) as u8,
            has_alpha_compare: flags >> 9 & 1 != 0,
            has_color_blend_mode: flags >> 10 & 1 != 0,
            use_texture_only: flags >> 11 & 1 != 0,
            has_alpha_blend_mode: flags >> 12 & 1 != 0,
            has_indirect_param: flags >> 13 & 1 != 0,
            proj_tex_gen_param_count: (flags >> 14 & 0b11) as u8,
            has_font_shadow_param: flags >> 16 & 1 != 0,
        }
    }

    /// Re-pack into the wire word.
    pub fn to_word(self) -> u32 {
        u32::from(self.tex_map_count & 0b11)
            | u32::from(self.tex_matrix_count & 0b11) << 2
            | u32::from(self.tex_coord_gen_count & 0b11) << 4
            | u32::from(self.tev_stage_count & 0b111) << 6
            | u32::from(self.has_alpha_compare) << 9
            | u32::from(self.has_color_blend_mode) << 10
            | u32::from(self.use_texture_only) << 11
            | u32::from(self.has_alpha_blend_mode) << 12
            | u32::from(self.has_indirect_param) << 13
            | u32::from(self.proj_tex_gen_param_count & 0b11) << 14
            | u32::from(self.has_font_shadow_param) << 16
    }
}

/// Wrap/filter byte pair of a tex map: wrap in the low bits, filter above.
pub(crate) fn pack_wrap_filter(wrap: WrapMode, filter: FilterMode) -> u8 {
    (wrap.raw() & 0b11) as u8 | ((filter.raw() & 0b11) as u8) << 2
}

pub(crate) fn unpack_wrap_filter(byte: u8) -> Result<(WrapMode, FilterMode)> {
    Ok((
        WrapMode::from_raw(u32::from(byte & 0b11))?,
        FilterMode::from_raw(u32::from(byte >> 2 & 0b11))?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_material() -> Material {
        Material {
            name: "M_test".into(),
            tev_color: "0".into(),
            tev_constant_colors: std::array::from_fn(|_| "0".to_owned()),
            tex_maps: Vec::new(),
            tex_matrices: Vec::new(),
            tex_coord_gens: Vec::new(),
            tev_stages: Vec::new(),
            alpha_compare: None,
            color_blend_mode: None,
            use_texture_only: false,
            alpha_blend_mode: None,
            indirect_param: None,
            proj_tex_gen_params: Vec::new(),
            font_shadow_param: None,
        }
    }

    #[test]
    fn test_flag_word_known_combination() {
        // One tex map, one coordgen, one TEV stage, one proj-tex-gen param.
        let mut mat = empty_material();
        mat.tex_maps.push(TexMapEntry {
            texture: "tex".into(),
            wrap_s: WrapMode::Clamp,
            min_filter: FilterMode::Linear,
            wrap_t: WrapMode::Clamp,
            max_filter: FilterMode::Linear,
        });
        mat.tex_coord_gens.push(TexCoordGen {
            gen_type: MatrixType::Matrix2x4,
            source: TextureGenerationType::Tex0,
        });
        mat.tev_stages.push(TevStage {
            rgb_mode: 0,
            alpha_mode: 0,
        });
        mat.proj_tex_gen_params.push(ProjTexGenParam {
            pos: Vec2::default(),
            scale: Vec2::default(),
            fits_layout: false,
            fits_panel: false,
            adjust_projection_sr: false,
        });
        assert_eq!(mat.flags_word(), 0x4000 | 0x40 | 0x10 | 0x01);
    }

    #[test]
    fn test_flag_word_invertible_over_all_fields() {
        for tex_maps in 0..4u8 {
            for tev_stages in 0..8u8 {
                for optional_bits in 0..32u32 {
                    let flags = MaterialFlags {
                        tex_map_count: tex_maps,
                        tex_matrix_count: tex_maps ^ 0b11,
                        tex_coord_gen_count: tex_maps,
                        tev_stage_count: tev_stages,
                        has_alpha_compare: optional_bits & 1 != 0,
                        has_color_blend_mode: optional_bits & 2 != 0,
                        use_texture_only: optional_bits & 4 != 0,
                        has_alpha_blend_mode: optional_bits & 8 != 0,
                        has_indirect_param: optional_bits & 16 != 0,
                        proj_tex_gen_param_count: tev_stages & 0b11,
                        has_font_shadow_param: tex_maps & 1 != 0,
                    };
                    assert_eq!(MaterialFlags::from_word(flags.to_word()), flags);
                }
            }
        }
    }

    #[test]
    fn test_use_texture_only_survives_without_sub_record() {
        let mut mat = empty_material();
        mat.use_texture_only = true;
        let word = mat.flags_word();
        assert!(MaterialFlags::from_word(word).use_texture_only);
    }

    #[test]
    fn test_wrap_filter_byte() {
        let byte = pack_wrap_filter(WrapMode::Mirror, FilterMode::Linear);
        assert_eq!(byte, 0b0110);
        assert_eq!(
            unpack_wrap_filter(byte).unwrap(),
            (WrapMode::Mirror, FilterMode::Linear)
        );
    }
}
