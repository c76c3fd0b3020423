//! Layout tree ⇄ document elements
//!
//! Maps a decoded [`Clyt`] onto the `<BCLYT>` sub-document of the editable
//! artefact and back. Attribute and element names follow the established
//! document grammar: vectors are `<Vector2 name x y>` / `<Vector3 name x y
//! z>`, enumerations go by name, colours by their table key, and panel
//! origins ride in a `Vector2` whose components are origin enum names.

use clyt::{
    AlphaCompare, BlendFactor, BlendMode, BlendOp, Clyt, ColorTable, FilterMode, FontShadowParam,
    Group, IndirectParam, Layout, LineAlignment, LogicOp, Material, MatrixType, OriginHorizontal,
    OriginType, OriginVertical, Panel, PanelCommon, PanelFlags, PanelKind,
    PanelMagnificationFlags, Picture, ProjTexGenParam, Rgba, TevStage, TexCoordGen, TexMapEntry,
    TexMatrixEntry, Text, TextureCoords, TextureGenerationType, UsdDataType, UsdEntry, UsdValue,
    UvCoordSet, Vec2, Vec3, Window, WindowFrame, WrapMode,
};

use crate::xml::XmlNode;
use crate::{Error, Result};

// ---------------------------------------------------------------------------
// Shared helpers

fn fmt_f32(v: f32) -> String {
    v.to_string()
}

fn bad_value(node: &XmlNode, what: &'static str, value: &str) -> Error {
    Error::BadValue {
        tag: node.tag.clone(),
        what,
        value: value.to_owned(),
    }
}

fn attr_f32(node: &XmlNode, name: &'static str) -> Result<f32> {
    let raw = node.require_attr(name)?;
    raw.parse().map_err(|_| bad_value(node, name, raw))
}

fn attr_u32(node: &XmlNode, name: &'static str) -> Result<u32> {
    let raw = node.require_attr(name)?;
    raw.parse().map_err(|_| bad_value(node, name, raw))
}

fn attr_u16(node: &XmlNode, name: &'static str) -> Result<u16> {
    let raw = node.require_attr(name)?;
    raw.parse().map_err(|_| bad_value(node, name, raw))
}

fn attr_u8(node: &XmlNode, name: &'static str) -> Result<u8> {
    let raw = node.require_attr(name)?;
    raw.parse().map_err(|_| bad_value(node, name, raw))
}

fn attr_bool(node: &XmlNode, name: &'static str) -> Result<bool> {
    let raw = node.require_attr(name)?;
    let int: i64 = raw.parse().map_err(|_| bad_value(node, name, raw))?;
    Ok(int != 0)
}

fn attr_enum<T>(
    node: &XmlNode,
    name: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T> {
    let raw = node.require_attr(name)?;
    parse(raw).ok_or_else(|| bad_value(node, name, raw))
}

fn vec2_node(name: &str, v: Vec2) -> XmlNode {
    XmlNode::new("Vector2")
        .with_attr("name", name)
        .with_attr("x", fmt_f32(v.x))
        .with_attr("y", fmt_f32(v.y))
}

fn vec3_node(name: &str, v: Vec3) -> XmlNode {
    XmlNode::new("Vector3")
        .with_attr("name", name)
        .with_attr("x", fmt_f32(v.x))
        .with_attr("y", fmt_f32(v.y))
        .with_attr("z", fmt_f32(v.z))
}

fn origin_node(name: &str, origin: (OriginHorizontal, OriginVertical)) -> XmlNode {
    XmlNode::new("Vector2")
        .with_attr("name", name)
        .with_attr("x", origin.0.name())
        .with_attr("y", origin.1.name())
}

/// Find the `Vector2`/`Vector3` child carrying `name`.
fn named_vector<'a>(parent: &'a XmlNode, tag: &str, name: &str) -> Result<&'a XmlNode> {
    parent
        .children
        .iter()
        .find(|c| c.tag == tag && c.attr("name") == Some(name))
        .ok_or_else(|| Error::BadValue {
            tag: parent.tag.clone(),
            what: "missing vector",
            value: name.to_owned(),
        })
}

fn parse_vec2(node: &XmlNode) -> Result<Vec2> {
    Ok(Vec2::new(attr_f32(node, "x")?, attr_f32(node, "y")?))
}

fn parse_vec3(node: &XmlNode) -> Result<Vec3> {
    Ok(Vec3::new(
        attr_f32(node, "x")?,
        attr_f32(node, "y")?,
        attr_f32(node, "z")?,
    ))
}

fn parse_origin_pair(node: &XmlNode) -> Result<(OriginHorizontal, OriginVertical)> {
    Ok((
        attr_enum(node, "x", OriginHorizontal::from_name)?,
        attr_enum(node, "y", OriginVertical::from_name)?,
    ))
}

fn vector2_of(parent: &XmlNode, name: &str) -> Result<Vec2> {
    parse_vec2(named_vector(parent, "Vector2", name)?)
}

fn vector3_of(parent: &XmlNode, name: &str) -> Result<Vec3> {
    parse_vec3(named_vector(parent, "Vector3", name)?)
}

fn origin_of(parent: &XmlNode, name: &str) -> Result<(OriginHorizontal, OriginVertical)> {
    parse_origin_pair(named_vector(parent, "Vector2", name)?)
}

// ---------------------------------------------------------------------------
// Layout tree → document

/// Serialize a layout as a `<BCLYT>` element.
pub fn clyt_to_xml(doc: &Clyt) -> XmlNode {
    let mut root = XmlNode::new("BCLYT");

    root.push(
        XmlNode::new("Layout")
            .with_attr("origin_type", doc.layout.origin.name())
            .with_child(vec2_node("size", doc.layout.size)),
    );

    let mut colors = XmlNode::new("Colors");
    for (key, color) in doc.colors.iter() {
        colors.push(
            XmlNode::new("Color")
                .with_attr("index", key)
                .with_attr("r", color.r.to_string())
                .with_attr("g", color.g.to_string())
                .with_attr("b", color.b.to_string())
                .with_attr("a", color.a.to_string()),
        );
    }
    root.push(colors);

    let mut textures = XmlNode::new("Textures");
    for name in &doc.textures {
        textures.push(XmlNode::new("Texture").with_text(name));
    }
    root.push(textures);

    let mut fonts = XmlNode::new("Fonts");
    for name in &doc.fonts {
        fonts.push(XmlNode::new("Font").with_text(name));
    }
    root.push(fonts);

    let mut materials = XmlNode::new("Materials");
    for material in &doc.materials {
        materials.push(material_to_xml(material));
    }
    root.push(materials);

    root.push(panel_to_xml(&doc.root_panel));
    root.push(group_to_xml(&doc.root_group));
    root
}

fn material_to_xml(material: &Material) -> XmlNode {
    let mut node = XmlNode::new("Material")
        .with_attr("name", &material.name)
        .with_attr("tev_color", &material.tev_color);

    let mut tev = XmlNode::new("TevConstantColors");
    for key in &material.tev_constant_colors {
        tev.push(XmlNode::new("ColorIndex").with_text(key));
    }
    node.push(tev);

    for map in &material.tex_maps {
        node.push(
            XmlNode::new("TexMapEntry")
                .with_attr("texture_name", &map.texture)
                .with_attr("wrap_s_mode", map.wrap_s.name())
                .with_attr("min_filter_mode", map.min_filter.name())
                .with_attr("wrap_t_mode", map.wrap_t.name())
                .with_attr("max_filter_mode", map.max_filter.name()),
        );
    }
    for matrix in &material.tex_matrices {
        node.push(
            XmlNode::new("TexMatrixEntry")
                .with_attr("rotation", fmt_f32(matrix.rotation))
                .with_child(vec2_node("translation", matrix.translation))
                .with_child(vec2_node("scale", matrix.scale)),
        );
    }
    for tc_gen in &material.tex_coord_gens {
        node.push(
            XmlNode::new("TexCoordGen")
                .with_attr("gen_type", tc_gen.gen_type.name())
                .with_attr("source", tc_gen.source.name()),
        );
    }
    for stage in &material.tev_stages {
        node.push(
            XmlNode::new("TevStage")
                .with_attr("rgb_mode", stage.rgb_mode.to_string())
                .with_attr("alpha_mode", stage.alpha_mode.to_string()),
        );
    }
    if let Some(compare) = &material.alpha_compare {
        node.push(
            XmlNode::new("AlphaCompare")
                .with_attr("compare_mode", compare.compare_mode.to_string())
                .with_attr("reference", fmt_f32(compare.reference)),
        );
    }
    if let Some(mode) = &material.color_blend_mode {
        node.push(blend_to_xml("ColorBlendMode", mode));
    }
    if let Some(mode) = &material.alpha_blend_mode {
        node.push(blend_to_xml("AlphaBlendMode", mode));
    }
    if let Some(indirect) = &material.indirect_param {
        node.push(
            XmlNode::new("IndirectParam")
                .with_attr("rotation", fmt_f32(indirect.rotation))
                .with_child(vec2_node("scale", indirect.scale)),
        );
    }
    for param in &material.proj_tex_gen_params {
        node.push(
            XmlNode::new("ProjTexGenParam")
                .with_attr("fits_layout", u8::from(param.fits_layout).to_string())
                .with_attr("fits_panel", u8::from(param.fits_panel).to_string())
                .with_attr(
                    "adjust_projection_sr",
                    u8::from(param.adjust_projection_sr).to_string(),
                )
                .with_child(vec2_node("pos", param.pos))
                .with_child(vec2_node("scale", param.scale)),
        );
    }
    if let Some(shadow) = &material.font_shadow_param {
        node.push(
            XmlNode::new("FontShadowParam")
                .with_attr("black_r", shadow.black_r.to_string())
                .with_attr("black_g", shadow.black_g.to_string())
                .with_attr("black_b", shadow.black_b.to_string())
                .with_attr("white_r", shadow.white_r.to_string())
                .with_attr("white_g", shadow.white_g.to_string())
                .with_attr("white_b", shadow.white_b.to_string())
                .with_attr("white_a", shadow.white_a.to_string()),
        );
    }
    node
}

fn blend_to_xml(tag: &str, mode: &BlendMode) -> XmlNode {
    XmlNode::new(tag)
        .with_attr("blend_operation", mode.operation.name())
        .with_attr("source_factor", mode.source_factor.name())
        .with_attr("dest_factor", mode.dest_factor.name())
        .with_attr("logic_operation", mode.logic.name())
}

fn panel_to_xml(panel: &Panel) -> XmlNode {
    let mut node = XmlNode::new("Panel").with_attr("type", panel.kind.type_name());

    let common = &panel.common;
    let mut data = XmlNode::new("PanelData")
        .with_attr("flags", common.flags.name())
        .with_attr("alpha", common.alpha.to_string())
        .with_attr("magnification_flags", common.magnification_flags.name())
        .with_attr("name", &common.name);
    data.push(origin_node("origin", common.origin));
    data.push(origin_node("parent_origin", common.parent_origin));
    data.push(vec3_node("translation", common.translation));
    data.push(vec3_node("rotation", common.rotation));
    data.push(vec2_node("scale", common.scale));
    data.push(vec2_node("size", common.size));

    match &panel.kind {
        PanelKind::Pan => {}
        PanelKind::Pic(picture) => {
            data.attrs.push(("tl_color".into(), picture.tl_color.clone()));
            data.attrs.push(("tr_color".into(), picture.tr_color.clone()));
            data.attrs.push(("bl_color".into(), picture.bl_color.clone()));
            data.attrs.push(("br_color".into(), picture.br_color.clone()));
            data.attrs
                .push(("material_name".into(), picture.material.clone()));
            for coords in &picture.texture_coords {
                data.push(
                    XmlNode::new("TextureCoords")
                        .with_child(vec2_node("TopLeft", coords.top_left))
                        .with_child(vec2_node("TopRight", coords.top_right))
                        .with_child(vec2_node("BottomLeft", coords.bottom_left))
                        .with_child(vec2_node("BottomRight", coords.bottom_right)),
                );
            }
        }
        PanelKind::Txt(text) => {
            data.attrs
                .push(("additional_chars".into(), text.additional_chars.to_string()));
            data.attrs
                .push(("material_name".into(), text.material.clone()));
            data.attrs.push(("font_name".into(), text.font.clone()));
            data.attrs
                .push(("line_alignment".into(), text.line_alignment.name().into()));
            data.attrs.push(("top_color".into(), text.top_color.clone()));
            data.attrs
                .push(("bottom_color".into(), text.bottom_color.clone()));
            data.attrs
                .push(("character_size".into(), fmt_f32(text.character_size)));
            data.attrs.push(("line_size".into(), fmt_f32(text.line_size)));
            data.attrs.push(("text".into(), text.text.clone()));
            data.push(origin_node("another_origin", text.another_origin));
            data.push(vec2_node("text_size", text.text_size));
        }
        PanelKind::Wnd(window) => {
            data.attrs
                .push(("content_overflow_l".into(), fmt_f32(window.content_overflow_l)));
            data.attrs
                .push(("content_overflow_r".into(), fmt_f32(window.content_overflow_r)));
            data.attrs
                .push(("content_overflow_t".into(), fmt_f32(window.content_overflow_t)));
            data.attrs
                .push(("content_overflow_b".into(), fmt_f32(window.content_overflow_b)));
            data.attrs.push(("flag".into(), window.flag.to_string()));
            data.attrs.push(("tl_color".into(), window.tl_color.clone()));
            data.attrs.push(("tr_color".into(), window.tr_color.clone()));
            data.attrs.push(("bl_color".into(), window.bl_color.clone()));
            data.attrs.push(("br_color".into(), window.br_color.clone()));
            data.attrs
                .push(("material_name".into(), window.material.clone()));
            for uv in &window.uv_sets {
                data.push(
                    XmlNode::new("UVCoords")
                        .with_child(uv_node("tl", uv.top_left))
                        .with_child(uv_node("tr", uv.top_right))
                        .with_child(uv_node("bl", uv.bottom_left))
                        .with_child(uv_node("br", uv.bottom_right)),
                );
            }
            for frame in &window.frames {
                data.push(
                    XmlNode::new("WindowFrame")
                        .with_attr("material", &frame.material)
                        .with_attr("flip", frame.flip.to_string()),
                );
            }
        }
    }
    node.push(data);

    if !panel.user_data.is_empty() {
        let mut user_data = XmlNode::new("UserData");
        for entry in &panel.user_data {
            user_data.push(usd_to_xml(entry));
        }
        node.push(user_data);
    }

    for child in &panel.children {
        node.push(panel_to_xml(child));
    }
    node
}

fn uv_node(name: &str, v: Vec2) -> XmlNode {
    XmlNode::new("UVCoord")
        .with_attr("name", name)
        .with_attr("u", fmt_f32(v.x))
        .with_attr("v", fmt_f32(v.y))
}

fn usd_to_xml(entry: &UsdEntry) -> XmlNode {
    let mut node = XmlNode::new("Data")
        .with_attr("name", &entry.name)
        .with_attr("type", entry.value.data_type().name());
    match &entry.value {
        UsdValue::String(s) => node.push(XmlNode::new("String").with_text(s)),
        UsdValue::Ints(ints) => {
            for v in ints {
                node.push(XmlNode::new("Integer").with_text(v.to_string()));
            }
        }
        UsdValue::Floats(floats) => {
            for v in floats {
                node.push(XmlNode::new("Float").with_text(fmt_f32(*v)));
            }
        }
    }
    node
}

fn group_to_xml(group: &Group) -> XmlNode {
    let mut node = XmlNode::new("Group")
        .with_attr("name", &group.name)
        .with_attr("panels_count", group.panel_refs.len().to_string());
    for panel_ref in &group.panel_refs {
        node.push(XmlNode::new("PanelRef").with_attr("name", panel_ref));
    }
    for child in &group.children {
        node.push(group_to_xml(child));
    }
    node
}

// ---------------------------------------------------------------------------
// Document → layout tree

/// Rebuild a layout from a `<BCLYT>` element.
pub fn clyt_from_xml(root: &XmlNode) -> Result<Clyt> {
    let mut layout = None;
    let mut colors = ColorTable::new();
    let mut textures = Vec::new();
    let mut fonts = Vec::new();
    let mut materials = Vec::new();
    let mut root_panel = None;
    let mut root_group = None;

    for child in &root.children {
        match child.tag.as_str() {
            "Layout" => {
                layout = Some(Layout {
                    origin: attr_enum(child, "origin_type", OriginType::from_name)?,
                    size: vector2_of(child, "size")?,
                });
            }
            "Colors" => {
                for color in child.children_named("Color") {
                    colors.insert(
                        color.require_attr("index")?.to_owned(),
                        Rgba::new(
                            attr_u8(color, "r")?,
                            attr_u8(color, "g")?,
                            attr_u8(color, "b")?,
                            attr_u8(color, "a")?,
                        ),
                    );
                }
            }
            "Textures" => {
                textures = child
                    .children_named("Texture")
                    .map(|t| t.text.clone())
                    .collect();
            }
            "Fonts" => {
                fonts = child.children_named("Font").map(|f| f.text.clone()).collect();
            }
            "Materials" => {
                for material in child.children_named("Material") {
                    materials.push(material_from_xml(material)?);
                }
            }
            "Panel" => root_panel = Some(panel_from_xml(child)?),
            "Group" => root_group = Some(group_from_xml(child)?),
            other => {
                return Err(Error::UnknownTag {
                    parent: root.tag.clone(),
                    tag: other.to_owned(),
                });
            }
        }
    }

    Ok(Clyt {
        layout: layout.ok_or(Error::MissingElement("Layout"))?,
        colors,
        textures,
        fonts,
        materials,
        root_panel: root_panel.ok_or(Error::MissingElement("Panel"))?,
        root_group: root_group.ok_or(Error::MissingElement("Group"))?,
    })
}

fn material_from_xml(node: &XmlNode) -> Result<Material> {
    let tev = node.only_child("TevConstantColors")?;
    let keys: Vec<String> = tev
        .children_named("ColorIndex")
        .map(|c| c.text.clone())
        .collect();
    let tev_constant_colors: [String; 6] = keys.try_into().map_err(|keys: Vec<String>| {
        bad_value(tev, "constant color count", &keys.len().to_string())
    })?;

    let mut material = Material {
        name: node.require_attr("name")?.to_owned(),
        tev_color: node.require_attr("tev_color")?.to_owned(),
        tev_constant_colors,
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
    };

    for child in &node.children {
        match child.tag.as_str() {
            "TevConstantColors" => {}
            "TexMapEntry" => material.tex_maps.push(TexMapEntry {
                texture: child.require_attr("texture_name")?.to_owned(),
                wrap_s: attr_enum(child, "wrap_s_mode", WrapMode::from_name)?,
                min_filter: attr_enum(child, "min_filter_mode", FilterMode::from_name)?,
                wrap_t: attr_enum(child, "wrap_t_mode", WrapMode::from_name)?,
                max_filter: attr_enum(child, "max_filter_mode", FilterMode::from_name)?,
            }),
            "TexMatrixEntry" => material.tex_matrices.push(TexMatrixEntry {
                translation: vector2_of(child, "translation")?,
                rotation: attr_f32(child, "rotation")?,
                scale: vector2_of(child, "scale")?,
            }),
            "TexCoordGen" => material.tex_coord_gens.push(TexCoordGen {
                gen_type: attr_enum(child, "gen_type", MatrixType::from_name)?,
                source: attr_enum(child, "source", TextureGenerationType::from_name)?,
            }),
            "TevStage" => material.tev_stages.push(TevStage {
                rgb_mode: attr_u8(child, "rgb_mode")?,
                alpha_mode: attr_u8(child, "alpha_mode")?,
            }),
            "AlphaCompare" => {
                material.alpha_compare = Some(AlphaCompare {
                    compare_mode: attr_u32(child, "compare_mode")?,
                    reference: attr_f32(child, "reference")?,
                });
            }
            "ColorBlendMode" => material.color_blend_mode = Some(blend_from_xml(child)?),
            "AlphaBlendMode" => material.alpha_blend_mode = Some(blend_from_xml(child)?),
            "IndirectParam" => {
                material.indirect_param = Some(IndirectParam {
                    rotation: attr_f32(child, "rotation")?,
                    scale: vector2_of(child, "scale")?,
                });
            }
            "ProjTexGenParam" => material.proj_tex_gen_params.push(ProjTexGenParam {
                pos: vector2_of(child, "pos")?,
                scale: vector2_of(child, "scale")?,
                fits_layout: attr_bool(child, "fits_layout")?,
                fits_panel: attr_bool(child, "fits_panel")?,
                adjust_projection_sr: attr_bool(child, "adjust_projection_sr")?,
            }),
            "FontShadowParam" => {
                material.font_shadow_param = Some(FontShadowParam {
                    black_r: attr_u8(child, "black_r")?,
                    black_g: attr_u8(child, "black_g")?,
                    black_b: attr_u8(child, "black_b")?,
                    white_r: attr_u8(child, "white_r")?,
                    white_g: attr_u8(child, "white_g")?,
                    white_b: attr_u8(child, "white_b")?,
                    white_a: attr_u8(child, "white_a")?,
                });
            }
            other => {
                return Err(Error::UnknownTag {
                    parent: node.tag.clone(),
                    tag: other.to_owned(),
                });
            }
        }
    }
    Ok(material)
}

fn blend_from_xml(node: &XmlNode) -> Result<BlendMode> {
    Ok(BlendMode {
        operation: attr_enum(node, "blend_operation", BlendFactor::from_name)?,
        source_factor: attr_enum(node, "source_factor", BlendOp::from_name)?,
        dest_factor: attr_enum(node, "dest_factor", BlendOp::from_name)?,
        logic: attr_enum(node, "logic_operation", LogicOp::from_name)?,
    })
}

fn panel_from_xml(node: &XmlNode) -> Result<Panel> {
    let type_attr = node.require_attr("type")?;
    let data = node.only_child("PanelData")?;

    let common = PanelCommon {
        flags: attr_enum(data, "flags", PanelFlags::from_name)?,
        origin: origin_of(data, "origin")?,
        parent_origin: origin_of(data, "parent_origin")?,
        alpha: attr_u8(data, "alpha")?,
        magnification_flags: attr_enum(
            data,
            "magnification_flags",
            PanelMagnificationFlags::from_name,
        )?,
        name: data.require_attr("name")?.to_owned(),
        translation: vector3_of(data, "translation")?,
        rotation: vector3_of(data, "rotation")?,
        scale: vector2_of(data, "scale")?,
        size: vector2_of(data, "size")?,
    };

    let kind = match type_attr.to_ascii_lowercase().as_str() {
        "pan1" => PanelKind::Pan,
        "pic1" => PanelKind::Pic(picture_from_xml(data)?),
        "txt1" => PanelKind::Txt(text_from_xml(data)?),
        "wnd1" => PanelKind::Wnd(window_from_xml(data)?),
        other => return Err(bad_value(node, "panel type", other)),
    };

    let mut panel = Panel::new(common, kind);
    if let Some(user_data) = node.child_named("UserData") {
        for entry in &user_data.children {
            panel.user_data.push(usd_from_xml(entry)?);
        }
    }
    for child in node.children_named("Panel") {
        panel.children.push(panel_from_xml(child)?);
    }
    Ok(panel)
}

fn picture_from_xml(data: &XmlNode) -> Result<Picture> {
    let mut texture_coords = Vec::new();
    for coords in data.children_named("TextureCoords") {
        texture_coords.push(TextureCoords {
            top_left: vector2_of(coords, "TopLeft")?,
            top_right: vector2_of(coords, "TopRight")?,
            bottom_left: vector2_of(coords, "BottomLeft")?,
            bottom_right: vector2_of(coords, "BottomRight")?,
        });
    }
    Ok(Picture {
        tl_color: data.require_attr("tl_color")?.to_owned(),
        tr_color: data.require_attr("tr_color")?.to_owned(),
        bl_color: data.require_attr("bl_color")?.to_owned(),
        br_color: data.require_attr("br_color")?.to_owned(),
        material: data.require_attr("material_name")?.to_owned(),
        texture_coords,
    })
}

fn text_from_xml(data: &XmlNode) -> Result<Text> {
    Ok(Text {
        additional_chars: attr_u16(data, "additional_chars")?,
        material: data.require_attr("material_name")?.to_owned(),
        font: data.require_attr("font_name")?.to_owned(),
        another_origin: origin_of(data, "another_origin")?,
        line_alignment: attr_enum(data, "line_alignment", LineAlignment::from_name)?,
        top_color: data.require_attr("top_color")?.to_owned(),
        bottom_color: data.require_attr("bottom_color")?.to_owned(),
        text_size: vector2_of(data, "text_size")?,
        character_size: attr_f32(data, "character_size")?,
        line_size: attr_f32(data, "line_size")?,
        text: data.require_attr("text")?.to_owned(),
    })
}

fn window_from_xml(data: &XmlNode) -> Result<Window> {
    let mut uv_sets = Vec::new();
    for coords in data.children_named("UVCoords") {
        let uv_of = |name: &str| -> Result<Vec2> {
            let node = coords
                .children
                .iter()
                .find(|c| c.tag == "UVCoord" && c.attr("name") == Some(name))
                .ok_or_else(|| Error::BadValue {
                    tag: coords.tag.clone(),
                    what: "missing UV coordinate",
                    value: name.to_owned(),
                })?;
            Ok(Vec2::new(attr_f32(node, "u")?, attr_f32(node, "v")?))
        };
        uv_sets.push(UvCoordSet {
            top_left: uv_of("tl")?,
            top_right: uv_of("tr")?,
            bottom_left: uv_of("bl")?,
            bottom_right: uv_of("br")?,
        });
    }

    let mut frames = Vec::new();
    for frame in data.children_named("WindowFrame") {
        frames.push(WindowFrame {
            material: frame.require_attr("material")?.to_owned(),
            flip: attr_u8(frame, "flip")?,
        });
    }

    Ok(Window {
        content_overflow_l: attr_f32(data, "content_overflow_l")?,
        content_overflow_r: attr_f32(data, "content_overflow_r")?,
        content_overflow_t: attr_f32(data, "content_overflow_t")?,
        content_overflow_b: attr_f32(data, "content_overflow_b")?,
        flag: attr_u8(data, "flag")?,
        tl_color: data.require_attr("tl_color")?.to_owned(),
        tr_color: data.require_attr("tr_color")?.to_owned(),
        bl_color: data.require_attr("bl_color")?.to_owned(),
        br_color: data.require_attr("br_color")?.to_owned(),
        material: data.require_attr("material_name")?.to_owned(),
        uv_sets,
        frames,
    })
}

fn usd_from_xml(node: &XmlNode) -> Result<UsdEntry> {
    if node.tag != "Data" {
        return Err(Error::UnknownTag {
            parent: "UserData".into(),
            tag: node.tag.clone(),
        });
    }
    let name = node.require_attr("name")?.to_owned();
    let data_type = attr_enum(node, "type", UsdDataType::from_name)?;
    let value = match data_type {
        UsdDataType::String => UsdValue::String(node.only_child("String")?.text.clone()),
        UsdDataType::Ints => UsdValue::Ints(
            node.children_named("Integer")
                .map(|c| {
                    c.text
                        .parse()
                        .map_err(|_| bad_value(c, "integer", &c.text))
                })
                .collect::<Result<_>>()?,
        ),
        UsdDataType::Floats => UsdValue::Floats(
            node.children_named("Float")
                .map(|c| c.text.parse().map_err(|_| bad_value(c, "float", &c.text)))
                .collect::<Result<_>>()?,
        ),
    };
    Ok(UsdEntry { name, value })
}

fn group_from_xml(node: &XmlNode) -> Result<Group> {
    let mut group = Group::new(node.require_attr("name")?);
    for child in &node.children {
        match child.tag.as_str() {
            "PanelRef" => group.panel_refs.push(child.require_attr("name")?.to_owned()),
            "Group" => group.children.push(group_from_xml(child)?),
            other => {
                return Err(Error::UnknownTag {
                    parent: node.tag.clone(),
                    tag: other.to_owned(),
                });
            }
        }
    }
    Ok(group)
}
