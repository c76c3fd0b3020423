//! CLYT decoding
//!
//! A file is a 20-byte header followed by back-to-back sections, each opened
//! by a 4-byte magic and an inclusive u32 size. Sections are dispatched by
//! magic; panel and group trees arrive linearised with `pas1`/`pae1` and
//! `grs1`/`gre1` descend/ascend markers and are rebuilt on a stack.

use tracing::{debug, trace, warn};

use crate::bytes::ByteReader;
use crate::color::{ColorRef, ColorTable};
use crate::document::{CLYT_MAGIC, Clyt, Layout};
use crate::enums::{
    BlendFactor, BlendOp, LineAlignment, LogicOp, MatrixType, OriginHorizontal, OriginType,
    OriginVertical, PanelFlags, PanelMagnificationFlags, TextureGenerationType,
};
use crate::geom::{Vec2, Vec3};
use crate::group::Group;
use crate::material::{
    AlphaCompare, BlendMode, FontShadowParam, IndirectParam, Material, MaterialFlags,
    ProjTexGenParam, TevStage, TexCoordGen, TexMapEntry, TexMatrixEntry, unpack_wrap_filter,
};
use crate::panel::{
    Panel, PanelCommon, PanelKind, Picture, Text, TextureCoords, UvCoordSet, Window, WindowFrame,
};
use crate::userdata;
use crate::{Error, Result};

/// Substituted for a `txt1` string that fails UTF-16 decoding.
pub const TEXT_DECODE_SENTINEL: &str = "!!!DECODE ERROR!!!";

#[derive(Default)]
struct DecodeState {
    layout: Option<Layout>,
    colors: ColorTable,
    fonts: Vec<String>,
    textures: Vec<String>,
    materials: Vec<Material>,
    // Rebuild stacks: `*_root` holds the finished (or not yet descended
    // into) root, `*_stack` the chain of open ancestors.
    panel_root: Option<Panel>,
    panel_stack: Vec<Panel>,
    group_root: Option<Group>,
    group_stack: Vec<Group>,
}

impl Clyt {
    /// Decode a complete CLYT file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(data);

        let magic = read_magic(&mut r)?;
        if magic != CLYT_MAGIC {
            return Err(Error::BadMagic(magic));
        }
        let bom = r.read_u16()?;
        if bom != 0xFEFF {
            return Err(Error::BadHeaderField {
                field: "byte order mark",
                value: u32::from(bom),
            });
        }
        let header_len = r.read_u16()?;
        if header_len != 0x14 {
            return Err(Error::BadHeaderField {
                field: "header length",
                value: u32::from(header_len),
            });
        }
        let _revision = r.read_u32()?;
        let _file_size = r.read_u32()?;
        let section_count = r.read_u32()?;
        debug!("CLYT: {section_count} sections");

        let mut state = DecodeState::default();
        for _ in 0..section_count {
            read_section(&mut r, &mut state)?;
        }

        if !state.panel_stack.is_empty() {
            return Err(Error::TreeShape("unterminated panel descent".into()));
        }
        if !state.group_stack.is_empty() {
            return Err(Error::TreeShape("unterminated group descent".into()));
        }
        Ok(Clyt {
            layout: state.layout.ok_or(Error::MissingSection("lyt1"))?,
            colors: state.colors,
            textures: state.textures,
            fonts: state.fonts,
            materials: state.materials,
            root_panel: state.panel_root.ok_or(Error::MissingSection("pan1"))?,
            root_group: state.group_root.ok_or(Error::MissingSection("grp1"))?,
        })
    }
}

fn read_magic(r: &mut ByteReader<'_>) -> Result<[u8; 4]> {
    let b = r.read_bytes(4)?;
    Ok([b[0], b[1], b[2], b[3]])
}

fn read_section(r: &mut ByteReader<'_>, state: &mut DecodeState) -> Result<()> {
    let magic = read_magic(r)?;
    let size = r.read_u32()? as usize;
    if size < 8 {
        return Err(Error::BadHeaderField {
            field: "section size",
            value: size as u32,
        });
    }
    let payload_len = size - 8;
    let mut section = r.section(r.abs_pos());
    trace!("section {:?}: {payload_len} payload bytes", magic);

    match &magic {
        b"lyt1" => {
            if state.layout.is_some() {
                return Err(Error::DuplicateSection(magic));
            }
            state.layout = Some(Layout {
                origin: OriginType::from_raw(section.read_u32()?)?,
                size: Vec2::read(&mut section)?,
            });
        }
        b"fnl1" => {
            if !state.fonts.is_empty() {
                return Err(Error::DuplicateSection(magic));
            }
            state.fonts = read_name_table(&mut section, "font name")?;
        }
        b"txl1" => {
            if !state.textures.is_empty() {
                return Err(Error::DuplicateSection(magic));
            }
            state.textures = read_name_table(&mut section, "texture name")?;
        }
        b"mat1" => {
            if !state.materials.is_empty() {
                return Err(Error::DuplicateSection(magic));
            }
            let count = section.read_u32()? as usize;
            let mut offsets = Vec::with_capacity(count);
            for _ in 0..count {
                offsets.push(section.read_u32()? as usize);
            }
            for off in offsets {
                // Material offsets count from the section start including
                // its 8-byte header.
                let body_off = off.checked_sub(8).ok_or(Error::BadHeaderField {
                    field: "material offset",
                    value: off as u32,
                })?;
                section.set_pos(body_off);
                let material = read_material(&mut section, state)?;
                state.materials.push(material);
            }
        }
        b"pan1" => {
            let common = read_panel_common(&mut section)?;
            attach_panel(state, Panel::new(common, PanelKind::Pan))?;
        }
        b"pic1" => {
            let common = read_panel_common(&mut section)?;
            let picture = read_picture(&mut section, state)?;
            attach_panel(state, Panel::new(common, PanelKind::Pic(picture)))?;
        }
        b"txt1" => {
            let common = read_panel_common(&mut section)?;
            let text = read_text(&mut section, state)?;
            attach_panel(state, Panel::new(common, PanelKind::Txt(text)))?;
        }
        b"wnd1" => {
            let common = read_panel_common(&mut section)?;
            let window = read_window(&mut section, state)?;
            attach_panel(state, Panel::new(common, PanelKind::Wnd(window)))?;
        }
        b"pas1" => match state.panel_stack.last_mut() {
            None => {
                let root = state
                    .panel_root
                    .take()
                    .ok_or_else(|| Error::TreeShape("descend before any panel".into()))?;
                state.panel_stack.push(root);
            }
            Some(top) => {
                let child = top
                    .children
                    .pop()
                    .ok_or_else(|| Error::TreeShape("descend into a childless panel".into()))?;
                state.panel_stack.push(child);
            }
        },
        b"pae1" => {
            let done = state
                .panel_stack
                .pop()
                .ok_or_else(|| Error::TreeShape("panel ascend past the root".into()))?;
            match state.panel_stack.last_mut() {
                Some(parent) => parent.children.push(done),
                None => state.panel_root = Some(done),
            }
        }
        b"usd1" => {
            let entries = userdata::read_entries(&mut section)?;
            let target = state
                .panel_stack
                .last_mut()
                .and_then(|top| top.children.last_mut())
                .ok_or_else(|| Error::TreeShape("user data before any child panel".into()))?;
            target.user_data.extend(entries);
        }
        b"grp1" => {
            let group = read_group(&mut section)?;
            attach_group(state, group)?;
        }
        b"grs1" => match state.group_stack.last_mut() {
            None => {
                let root = state
                    .group_root
                    .take()
                    .ok_or_else(|| Error::TreeShape("descend before any group".into()))?;
                state.group_stack.push(root);
            }
            Some(top) => {
                let child = top
                    .children
                    .pop()
                    .ok_or_else(|| Error::TreeShape("descend into a childless group".into()))?;
                state.group_stack.push(child);
            }
        },
        b"gre1" => {
            let done = state
                .group_stack
                .pop()
                .ok_or_else(|| Error::TreeShape("group ascend past the root".into()))?;
            match state.group_stack.last_mut() {
                Some(parent) => parent.children.push(done),
                None => state.group_root = Some(done),
            }
        }
        _ => return Err(Error::UnknownSection(magic)),
    }

    r.skip(payload_len);
    Ok(())
}

fn attach_panel(state: &mut DecodeState, panel: Panel) -> Result<()> {
    match state.panel_stack.last_mut() {
        Some(top) => top.children.push(panel),
        None => {
            if state.panel_root.is_some() {
                return Err(Error::TreeShape("second root panel".into()));
            }
            state.panel_root = Some(panel);
        }
    }
    Ok(())
}

fn attach_group(state: &mut DecodeState, group: Group) -> Result<()> {
    match state.group_stack.last_mut() {
        Some(top) => top.children.push(group),
        None => {
            if state.group_root.is_some() {
                return Err(Error::TreeShape("second root group".into()));
            }
            state.group_root = Some(group);
        }
    }
    Ok(())
}

/// `fnl1`/`txl1` payload: a count, offsets relative to the offset array
/// start, and NUL-terminated names.
fn read_name_table(r: &mut ByteReader<'_>, what: &'static str) -> Result<Vec<String>> {
    let count = r.read_u32()? as usize;
    let offsets_start = r.abs_pos();
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let off = r.read_u32()? as usize;
        let bytes = r.abs_cstring(offsets_start + off)?;
        names.push(String::from_utf8(bytes.to_vec()).map_err(|_| Error::BadString(what))?);
    }
    Ok(names)
}

fn trimmed_utf8(bytes: &[u8], what: &'static str) -> Result<String> {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    String::from_utf8(bytes[..end].to_vec()).map_err(|_| Error::BadString(what))
}

fn read_material(r: &mut ByteReader<'_>, state: &mut DecodeState) -> Result<Material> {
    let name = trimmed_utf8(r.read_bytes(0x14)?, "material name")?;
    let tev_color = state.colors.read_ref(r)?;
    let mut tev_constant_colors: [ColorRef; 6] = std::array::from_fn(|_| String::new());
    for slot in &mut tev_constant_colors {
        *slot = state.colors.read_ref(r)?;
    }

    let flags = MaterialFlags::from_word(r.read_u32()?);

    let mut tex_maps = Vec::with_capacity(flags.tex_map_count as usize);
    for _ in 0..flags.tex_map_count {
        let texture_index = r.read_u16()? as usize;
        let texture = state
            .textures
            .get(texture_index)
            .ok_or(Error::BadIndex {
                kind: "texture",
                index: texture_index,
            })?
            .clone();
        let (wrap_s, min_filter) = unpack_wrap_filter(r.read_u8()?)?;
        let (wrap_t, max_filter) = unpack_wrap_filter(r.read_u8()?)?;
        tex_maps.push(TexMapEntry {
            texture,
            wrap_s,
            min_filter,
            wrap_t,
            max_filter,
        });
    }

    let mut tex_matrices = Vec::with_capacity(flags.tex_matrix_count as usize);
    for _ in 0..flags.tex_matrix_count {
        let translation = Vec2::read(r)?;
        let rotation = r.read_f32()?;
        let scale = Vec2::read(r)?;
        tex_matrices.push(TexMatrixEntry {
            translation,
            rotation,
            scale,
        });
    }

    let mut tex_coord_gens = Vec::with_capacity(flags.tex_coord_gen_count as usize);
    for _ in 0..flags.tex_coord_gen_count {
        let gen_type = MatrixType::from_raw(u32::from(r.read_u8()?))?;
        let source = TextureGenerationType::from_raw(u32::from(r.read_u8()?))?;
        r.skip(2);
        tex_coord_gens.push(TexCoordGen { gen_type, source });
    }

    let mut tev_stages = Vec::with_capacity(flags.tev_stage_count as usize);
    for _ in 0..flags.tev_stage_count {
        let rgb_mode = r.read_u8()?;
        let alpha_mode = r.read_u8()?;
        r.skip(2);
        tev_stages.push(TevStage {
            rgb_mode,
            alpha_mode,
        });
    }

    let alpha_compare = if flags.has_alpha_compare {
        Some(AlphaCompare {
            compare_mode: r.read_u32()?,
            reference: r.read_f32()?,
        })
    } else {
        None
    };
    let color_blend_mode = if flags.has_color_blend_mode {
        Some(read_blend_mode(r)?)
    } else {
        None
    };
    let alpha_blend_mode = if flags.has_alpha_blend_mode {
        Some(read_blend_mode(r)?)
    } else {
        None
    };
    let indirect_param = if flags.has_indirect_param {
        Some(IndirectParam {
            rotation: r.read_f32()?,
            scale: Vec2::read(r)?,
        })
    } else {
        None
    };

    let mut proj_tex_gen_params = Vec::with_capacity(flags.proj_tex_gen_param_count as usize);
    for _ in 0..flags.proj_tex_gen_param_count {
        let pos = Vec2::read(r)?;
        let scale = Vec2::read(r)?;
        let param_flags = r.read_u8()?;
        r.skip(3);
        proj_tex_gen_params.push(ProjTexGenParam {
            pos,
            scale,
            fits_layout: param_flags & 0b01 != 0,
            fits_panel: param_flags & 0b10 != 0,
            adjust_projection_sr: param_flags & 0b11 != 0,
        });
    }

    let font_shadow_param = if flags.has_font_shadow_param {
        let b = r.read_bytes(7)?;
        let param = FontShadowParam {
            black_r: b[0],
            black_g: b[1],
            black_b: b[2],
            white_r: b[3],
            white_g: b[4],
            white_b: b[5],
            white_a: b[6],
        };
        r.skip(1);
        Some(param)
    } else {
        None
    };

    Ok(Material {
        name,
        tev_color,
        tev_constant_colors,
        tex_maps,
        tex_matrices,
        tex_coord_gens,
        tev_stages,
        alpha_compare,
        color_blend_mode,
        use_texture_only: flags.use_texture_only,
        alpha_blend_mode,
        indirect_param,
        proj_tex_gen_params,
        font_shadow_param,
    })
}

fn read_blend_mode(r: &mut ByteReader<'_>) -> Result<BlendMode> {
    Ok(BlendMode {
        operation: BlendFactor::from_raw(u32::from(r.read_u8()?))?,
        source_factor: BlendOp::from_raw(u32::from(r.read_u8()?))?,
        dest_factor: BlendOp::from_raw(u32::from(r.read_u8()?))?,
        logic: LogicOp::from_raw(u32::from(r.read_u8()?))?,
    })
}

fn read_panel_common(r: &mut ByteReader<'_>) -> Result<PanelCommon> {
    let flags = PanelFlags::from_raw(u32::from(r.read_u8()?))?;
    let origin_byte = r.read_u8()?;
    let alpha = r.read_u8()?;
    let magnification_flags = PanelMagnificationFlags::from_raw(u32::from(r.read_u8()?))?;

    let origin = (
        OriginHorizontal::from_raw(u32::from(origin_byte >> 6 & 0b11))?,
        OriginVertical::from_raw(u32::from(origin_byte >> 4 & 0b11))?,
    );
    let parent_origin = (
        OriginHorizontal::from_raw(u32::from(origin_byte >> 2 & 0b11))?,
        OriginVertical::from_raw(u32::from(origin_byte & 0b11))?,
    );

    let name = trimmed_utf8(r.read_bytes(0x18)?, "panel name")?;
    Ok(PanelCommon {
        flags,
        origin,
        parent_origin,
        alpha,
        magnification_flags,
        name,
        translation: Vec3::read(r)?,
        rotation: Vec3::read(r)?,
        scale: Vec2::read(r)?,
        size: Vec2::read(r)?,
    })
}

fn material_name(state: &DecodeState, index: usize) -> Result<String> {
    state
        .materials
        .get(index)
        .map(|m| m.name.clone())
        .ok_or(Error::BadIndex {
            kind: "material",
            index,
        })
}

fn read_picture(r: &mut ByteReader<'_>, state: &mut DecodeState) -> Result<Picture> {
    let tl_color = state.colors.read_ref(r)?;
    let tr_color = state.colors.read_ref(r)?;
    let bl_color = state.colors.read_ref(r)?;
    let br_color = state.colors.read_ref(r)?;
    let material = material_name(state, r.read_u16()? as usize)?;
    let coord_count = r.read_u16()? as usize;
    let mut texture_coords = Vec::with_capacity(coord_count);
    for _ in 0..coord_count {
        texture_coords.push(TextureCoords {
            top_left: Vec2::read(r)?,
            top_right: Vec2::read(r)?,
            bottom_left: Vec2::read(r)?,
            bottom_right: Vec2::read(r)?,
        });
    }
    Ok(Picture {
        tl_color,
        tr_color,
        bl_color,
        br_color,
        material,
        texture_coords,
    })
}

fn read_text(r: &mut ByteReader<'_>, state: &mut DecodeState) -> Result<Text> {
    let payload_start = r.start();
    let max_size = r.read_u16()?;
    let current_size = r.read_u16()?;
    let additional_chars = max_size.saturating_sub(current_size) >> 1;
    let material = material_name(state, r.read_u16()? as usize)?;
    let font_index = r.read_u16()? as usize;
    let font = state
        .fonts
        .get(font_index)
        .ok_or(Error::BadIndex {
            kind: "font",
            index: font_index,
        })?
        .clone();

    let origin_byte = r.read_u8()?;
    let another_origin = (
        OriginHorizontal::from_raw(u32::from(origin_byte >> 2 & 0b11))?,
        OriginVertical::from_raw(u32::from(origin_byte & 0b11))?,
    );
    let line_alignment = LineAlignment::from_raw(u32::from(r.read_u8()?))?;
    r.skip(2);

    let text_offset = r.read_u32()? as usize;
    let top_color = state.colors.read_ref(r)?;
    let bottom_color = state.colors.read_ref(r)?;
    let text_size = Vec2::read(r)?;
    let character_size = r.read_f32()?;
    let line_size = r.read_f32()?;

    // The stored offset counts from the section start including its header.
    let raw = r.abs_bytes(payload_start + text_offset - 8, current_size as usize)?;
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    let mut trimmed = raw[..end].to_vec();
    if trimmed.len() % 2 != 0 {
        trimmed.push(0);
    }
    let units: Vec<u16> = trimmed
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = match String::from_utf16(&units) {
        Ok(text) => text,
        Err(err) => {
            warn!("txt1 string is not valid UTF-16 ({err}); substituting sentinel");
            TEXT_DECODE_SENTINEL.to_owned()
        }
    };

    Ok(Text {
        additional_chars,
        material,
        font,
        another_origin,
        line_alignment,
        top_color,
        bottom_color,
        text_size,
        character_size,
        line_size,
        text,
    })
}

fn read_window(r: &mut ByteReader<'_>, state: &mut DecodeState) -> Result<Window> {
    let payload_start = r.start();
    let content_overflow_l = r.read_f32()?;
    let content_overflow_r = r.read_f32()?;
    let content_overflow_t = r.read_f32()?;
    let content_overflow_b = r.read_f32()?;
    let frame_count = r.read_u8()? as usize;
    let flag = r.read_u8()?;
    r.skip(2);
    let _content_offset = r.read_u32()?;
    let frame_offsets_offset = r.read_u32()? as usize;

    let tl_color = state.colors.read_ref(r)?;
    let tr_color = state.colors.read_ref(r)?;
    let bl_color = state.colors.read_ref(r)?;
    let br_color = state.colors.read_ref(r)?;
    let material = material_name(state, r.read_u16()? as usize)?;
    let uv_set_count = r.read_u16()? as usize;

    let mut uv_sets = Vec::with_capacity(uv_set_count);
    for _ in 0..uv_set_count {
        uv_sets.push(UvCoordSet {
            top_left: Vec2::read(r)?,
            top_right: Vec2::read(r)?,
            bottom_left: Vec2::read(r)?,
            bottom_right: Vec2::read(r)?,
        });
    }

    let offsets_at = payload_start + frame_offsets_offset - 8;
    let mut frames = Vec::with_capacity(frame_count);
    for i in 0..frame_count {
        let frame_off = r.abs_u32(offsets_at + i * 4)? as usize;
        let frame_bytes = r.abs_bytes(payload_start + frame_off - 8, 3)?;
        let material_index = u16::from_le_bytes([frame_bytes[0], frame_bytes[1]]) as usize;
        frames.push(WindowFrame {
            material: material_name(state, material_index)?,
            flip: frame_bytes[2],
        });
    }

    Ok(Window {
        content_overflow_l,
        content_overflow_r,
        content_overflow_t,
        content_overflow_b,
        flag,
        tl_color,
        tr_color,
        bl_color,
        br_color,
        material,
        uv_sets,
        frames,
    })
}

fn read_group(r: &mut ByteReader<'_>) -> Result<Group> {
    let name = trimmed_utf8(r.read_bytes(16)?, "group name")?;
    let ref_count = r.read_u32()? as usize;
    let mut panel_refs = Vec::with_capacity(ref_count);
    for _ in 0..ref_count {
        panel_refs.push(trimmed_utf8(r.read_bytes(16)?, "panel reference")?);
    }
    Ok(Group {
        name,
        panel_refs,
        children: Vec::new(),
    })
}
