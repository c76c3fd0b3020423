//! CLYT encoding
//!
//! Symbol tables (font, texture, material name → index) are built over the
//! whole document before any section is written, then sections go out in
//! document order: `lyt1`, `txl1`, `fnl1`, `mat1`, the panel tree, the group
//! tree. Empty name and material tables are elided. Panel children are
//! bracketed by `pas1`/`pae1`, group children by `grs1`/`gre1`; a panel's
//! user data follows its child bracket. Every section payload is zero-padded
//! to a multiple of four and sized inclusive of its 8-byte header.

use std::collections::HashMap;

use tracing::debug;

use crate::bytes::ByteWriter;
use crate::color::ColorTable;
use crate::document::{CLYT_MAGIC, Clyt, HEADER_LEN, REVISION};
use crate::group::Group;
use crate::material::{BlendMode, Material, pack_wrap_filter};
use crate::panel::{Panel, PanelKind, Picture, Text, Window};
use crate::userdata::{self, UsdMode};
use crate::{Error, Result};

/// Knobs for one encode operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Name placement rule applied to every `usd1` block in the layout.
    pub usd_mode: UsdMode,
}

struct Symbols<'a> {
    colors: &'a ColorTable,
    fonts: HashMap<&'a str, u16>,
    textures: HashMap<&'a str, u16>,
    materials: HashMap<&'a str, u16>,
}

impl<'a> Symbols<'a> {
    fn new(doc: &'a Clyt) -> Self {
        Self {
            colors: &doc.colors,
            fonts: doc
                .fonts
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_str(), i as u16))
                .collect(),
            textures: doc
                .textures
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_str(), i as u16))
                .collect(),
            materials: doc
                .materials
                .iter()
                .enumerate()
                .map(|(i, material)| (material.name.as_str(), i as u16))
                .collect(),
        }
    }

    fn font(&self, name: &str) -> Result<u16> {
        lookup(&self.fonts, "font", name)
    }

    fn texture(&self, name: &str) -> Result<u16> {
        lookup(&self.textures, "texture", name)
    }

    fn material(&self, name: &str) -> Result<u16> {
        lookup(&self.materials, "material", name)
    }
}

fn lookup(map: &HashMap<&str, u16>, kind: &'static str, name: &str) -> Result<u16> {
    map.get(name).copied().ok_or_else(|| Error::UnknownSymbol {
        kind,
        name: name.to_owned(),
    })
}

impl Clyt {
    /// Encode with default options.
    pub fn build_default(&self) -> Result<Vec<u8>> {
        self.build(&EncodeOptions::default())
    }

    /// Encode the layout into a complete CLYT file.
    pub fn build(&self, options: &EncodeOptions) -> Result<Vec<u8>> {
        let symbols = Symbols::new(self);
        let mut sections = ByteWriter::new();
        let mut count = 0u32;

        sections.write_bytes(b"lyt1");
        sections.write_u32(0x14);
        sections.write_u32(self.layout.origin.raw());
        self.layout.size.write(&mut sections);
        count += 1;

        if !self.textures.is_empty() {
            write_name_table(&mut sections, b"txl1", &self.textures);
            count += 1;
        }
        if !self.fonts.is_empty() {
            write_name_table(&mut sections, b"fnl1", &self.fonts);
            count += 1;
        }
        if !self.materials.is_empty() {
            write_material_table(&mut sections, &self.materials, &symbols)?;
            count += 1;
        }

        write_panel_tree(&mut sections, &mut count, &self.root_panel, &symbols, options.usd_mode)?;
        write_group_tree(&mut sections, &mut count, &self.root_group);

        let mut out = ByteWriter::new();
        out.write_bytes(&CLYT_MAGIC);
        out.write_u16(0xFEFF);
        out.write_u16(HEADER_LEN);
        out.write_u32(REVISION);
        out.write_u32(0); // file size, patched once known
        out.write_u32(count);
        out.write_bytes(sections.as_bytes());
        let total = out.len() as u32;
        out.patch_u32(12, total);

        debug!("CLYT built: {count} sections, {total} bytes");
        Ok(out.into_bytes())
    }
}

/// `txl1`/`fnl1`: count, offsets relative to the offset array, NUL-terminated
/// names padded to a four-byte boundary.
fn write_name_table(w: &mut ByteWriter, magic: &[u8; 4], names: &[String]) {
    let offset_base = names.len() * 4;
    let mut offsets = Vec::with_capacity(names.len());
    let mut pool = ByteWriter::new();
    for name in names {
        offsets.push((offset_base + pool.len()) as u32);
        pool.write_bytes(name.as_bytes());
        pool.write_u8(0);
    }
    pool.pad_to(4);

    w.write_bytes(magic);
    w.write_u32((8 + 4 + offset_base + pool.len()) as u32);
    w.write_u32(names.len() as u32);
    for off in offsets {
        w.write_u32(off);
    }
    w.write_bytes(pool.as_bytes());
}

fn write_material_table(w: &mut ByteWriter, materials: &[Material], symbols: &Symbols<'_>) -> Result<()> {
    // Offsets count from the section start including its 8-byte header.
    let offset_base = 8 + 4 + materials.len() * 4;
    let mut offsets = Vec::with_capacity(materials.len());
    let mut body = ByteWriter::new();
    for material in materials {
        offsets.push((offset_base + body.len()) as u32);
        write_material(&mut body, material, symbols)?;
    }

    w.write_bytes(b"mat1");
    w.write_u32((offset_base + body.len()) as u32);
    w.write_u32(materials.len() as u32);
    for off in offsets {
        w.write_u32(off);
    }
    w.write_bytes(body.as_bytes());
    Ok(())
}

fn write_material(w: &mut ByteWriter, material: &Material, symbols: &Symbols<'_>) -> Result<()> {
    w.write_padded_str(&material.name, 0x14);
    symbols.colors.write_ref(&material.tev_color, w)?;
    for key in &material.tev_constant_colors {
        symbols.colors.write_ref(key, w)?;
    }
    w.write_u32(material.flags_word());

    for map in &material.tex_maps {
        w.write_u16(symbols.texture(&map.texture)?);
        w.write_u8(pack_wrap_filter(map.wrap_s, map.min_filter));
        w.write_u8(pack_wrap_filter(map.wrap_t, map.max_filter));
    }
    for matrix in &material.tex_matrices {
        matrix.translation.write(w);
        w.write_f32(matrix.rotation);
        matrix.scale.write(w);
    }
    for tc_gen in &material.tex_coord_gens {
        w.write_u8(tc_gen.gen_type.raw() as u8);
        w.write_u8(tc_gen.source.raw() as u8);
        w.write_bytes(&[0, 0]);
    }
    for stage in &material.tev_stages {
        w.write_u8(stage.rgb_mode);
        w.write_u8(stage.alpha_mode);
        w.write_bytes(&[0, 0]);
    }
    if let Some(compare) = &material.alpha_compare {
        w.write_u32(compare.compare_mode);
        w.write_f32(compare.reference);
    }
    if let Some(mode) = &material.color_blend_mode {
        write_blend_mode(w, mode);
    }
    if let Some(mode) = &material.alpha_blend_mode {
        write_blend_mode(w, mode);
    }
    if let Some(indirect) = &material.indirect_param {
        w.write_f32(indirect.rotation);
        indirect.scale.write(w);
    }
    for param in &material.proj_tex_gen_params {
        param.pos.write(w);
        param.scale.write(w);
        let mut flags = 0u8;
        if param.fits_layout {
            flags |= 0b01;
        }
        if param.fits_panel {
            flags |= 0b10;
        }
        w.write_u8(flags);
        w.write_bytes(&[0, 0, 0]);
    }
    if let Some(shadow) = &material.font_shadow_param {
        w.write_bytes(&[
            shadow.black_r,
            shadow.black_g,
            shadow.black_b,
            shadow.white_r,
            shadow.white_g,
            shadow.white_b,
            shadow.white_a,
            0,
        ]);
    }
    Ok(())
}

fn write_blend_mode(w: &mut ByteWriter, mode: &BlendMode) {
    w.write_u8(mode.operation.raw() as u8);
    w.write_u8(mode.source_factor.raw() as u8);
    w.write_u8(mode.dest_factor.raw() as u8);
    w.write_u8(mode.logic.raw() as u8);
}

fn write_marker(w: &mut ByteWriter, magic: &[u8; 4]) {
    w.write_bytes(magic);
    w.write_u32(8);
}

fn write_panel_tree(
    w: &mut ByteWriter,
    count: &mut u32,
    panel: &Panel,
    symbols: &Symbols<'_>,
    usd_mode: UsdMode,
) -> Result<()> {
    let mut body = ByteWriter::new();
    write_panel_common(&mut body, panel);
    match &panel.kind {
        PanelKind::Pan => {}
        PanelKind::Pic(picture) => write_picture(&mut body, picture, symbols)?,
        PanelKind::Txt(text) => write_text(&mut body, text, symbols)?,
        PanelKind::Wnd(window) => write_window(&mut body, window, symbols)?,
    }
    body.pad_to(4);

    w.write_bytes(panel.kind.magic());
    w.write_u32((8 + body.len()) as u32);
    w.write_bytes(body.as_bytes());
    *count += 1;

    if !panel.children.is_empty() {
        write_marker(w, b"pas1");
        *count += 1;
        for child in &panel.children {
            write_panel_tree(w, count, child, symbols, usd_mode)?;
        }
        write_marker(w, b"pae1");
        *count += 1;
    }
    if !panel.user_data.is_empty() {
        userdata::write_section(w, &panel.user_data, usd_mode);
        *count += 1;
    }
    Ok(())
}

fn write_panel_common(w: &mut ByteWriter, panel: &Panel) {
    let common = &panel.common;
    let origin = (common.origin.0.raw() << 6
        | common.origin.1.raw() << 4
        | common.parent_origin.0.raw() << 2
        | common.parent_origin.1.raw()) as u8;
    w.write_u8(common.flags.raw() as u8);
    w.write_u8(origin);
    w.write_u8(common.alpha);
    w.write_u8(common.magnification_flags.raw() as u8);
    w.write_padded_str(&common.name, 0x18);
    common.translation.write(w);
    common.rotation.write(w);
    common.scale.write(w);
    common.size.write(w);
}

fn write_picture(w: &mut ByteWriter, picture: &Picture, symbols: &Symbols<'_>) -> Result<()> {
    symbols.colors.write_ref(&picture.tl_color, w)?;
    symbols.colors.write_ref(&picture.tr_color, w)?;
    symbols.colors.write_ref(&picture.bl_color, w)?;
    symbols.colors.write_ref(&picture.br_color, w)?;
    w.write_u16(symbols.material(&picture.material)?);
    w.write_u16(picture.texture_coords.len() as u16);
    for coords in &picture.texture_coords {
        coords.top_left.write(w);
        coords.top_right.write(w);
        coords.bottom_left.write(w);
        coords.bottom_right.write(w);
    }
    Ok(())
}

fn write_text(w: &mut ByteWriter, text: &Text, symbols: &Symbols<'_>) -> Result<()> {
    let mut encoded: Vec<u8> = Vec::new();
    if !text.text.is_empty() {
        for unit in text.text.encode_utf16() {
            encoded.extend_from_slice(&unit.to_le_bytes());
        }
        encoded.extend_from_slice(&[0, 0]);
    }
    let current_size = encoded.len() as u16;
    let max_size = current_size + text.additional_chars * 2;

    w.write_u16(max_size);
    w.write_u16(current_size);
    w.write_u16(symbols.material(&text.material)?);
    w.write_u16(symbols.font(&text.font)?);
    let origin = (text.another_origin.0.raw() << 2 | text.another_origin.1.raw()) as u8;
    w.write_u8(origin);
    w.write_u8(text.line_alignment.raw() as u8);
    w.write_bytes(&[0, 0]);
    // The only text offset the corpus ever shows.
    w.write_u32(0x74);
    symbols.colors.write_ref(&text.top_color, w)?;
    symbols.colors.write_ref(&text.bottom_color, w)?;
    text.text_size.write(w);
    w.write_f32(text.character_size);
    w.write_f32(text.line_size);
    w.write_bytes(&encoded);
    Ok(())
}

fn write_window(w: &mut ByteWriter, window: &Window, symbols: &Symbols<'_>) -> Result<()> {
    w.write_f32(window.content_overflow_l);
    w.write_f32(window.content_overflow_r);
    w.write_f32(window.content_overflow_t);
    w.write_f32(window.content_overflow_b);
    w.write_u8(window.frames.len() as u8);
    w.write_u8(window.flag);
    w.write_bytes(&[0, 0]);

    // Inline offsets, relative to the section start including its header:
    // content block at 0x68, frame offset array after the UV sets.
    let frames_offset = 0x7C + 32 * window.uv_sets.len() as u32;
    w.write_u32(0x68);
    w.write_u32(frames_offset);

    symbols.colors.write_ref(&window.tl_color, w)?;
    symbols.colors.write_ref(&window.tr_color, w)?;
    symbols.colors.write_ref(&window.bl_color, w)?;
    symbols.colors.write_ref(&window.br_color, w)?;
    w.write_u16(symbols.material(&window.material)?);
    w.write_u16(window.uv_sets.len() as u16);
    for uv in &window.uv_sets {
        uv.top_left.write(w);
        uv.top_right.write(w);
        uv.bottom_left.write(w);
        uv.bottom_right.write(w);
    }

    let first_frame = frames_offset + 4 * window.frames.len() as u32;
    for i in 0..window.frames.len() as u32 {
        w.write_u32(first_frame + 4 * i);
    }
    for frame in &window.frames {
        w.write_u16(symbols.material(&frame.material)?);
        w.write_u8(frame.flip);
        w.write_u8(0);
    }
    Ok(())
}

fn write_group_tree(w: &mut ByteWriter, count: &mut u32, group: &Group) {
    w.write_bytes(b"grp1");
    w.write_u32((8 + 16 + 4 + 16 * group.panel_refs.len()) as u32);
    w.write_padded_str(&group.name, 16);
    w.write_u32(group.panel_refs.len() as u32);
    for panel_ref in &group.panel_refs {
        w.write_padded_str(panel_ref, 16);
    }
    *count += 1;

    if !group.children.is_empty() {
        write_marker(w, b"grs1");
        *count += 1;
        for child in &group.children {
            write_group_tree(w, count, child);
        }
        write_marker(w, b"gre1");
        *count += 1;
    }
}
