//! Structural round-trip and wire-layout tests for the CLYT codec

use clyt::{
    AlphaCompare, BlendFactor, BlendMode, BlendOp, Clyt, ColorTable, EncodeOptions, Error,
    FilterMode, FontShadowParam, Group, IndirectParam, Layout, LineAlignment, LogicOp, Material,
    MatrixType, OriginHorizontal, OriginType, OriginVertical, Panel, PanelCommon, PanelFlags,
    PanelKind, PanelMagnificationFlags, Picture, ProjTexGenParam, Rgba, TEXT_DECODE_SENTINEL,
    TevStage, TexCoordGen, TexMapEntry, TexMatrixEntry, Text, TextureCoords,
    TextureGenerationType, UsdEntry, UsdMode, UsdValue, UvCoordSet, Vec2, Vec3, Window,
    WindowFrame, WrapMode,
};
use clyt::MaterialFlags;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn common(name: &str, size: Vec2) -> PanelCommon {
    PanelCommon {
        flags: PanelFlags::Visible,
        origin: (OriginHorizontal::Center, OriginVertical::Middle),
        parent_origin: (OriginHorizontal::Center, OriginVertical::Middle),
        alpha: 255,
        magnification_flags: PanelMagnificationFlags::IgnorePartsMagnify,
        name: name.into(),
        translation: Vec3::default(),
        rotation: Vec3::default(),
        scale: Vec2::new(1.0, 1.0),
        size,
    }
}

fn minimal_layout() -> Clyt {
    Clyt {
        layout: Layout {
            origin: OriginType::Normal,
            size: Vec2::new(320.0, 240.0),
        },
        colors: ColorTable::new(),
        textures: Vec::new(),
        fonts: Vec::new(),
        materials: Vec::new(),
        root_panel: Panel::new(common("root", Vec2::new(320.0, 240.0)), PanelKind::Pan),
        root_group: Group::new("RootGroup"),
    }
}

/// Walk the section stream, returning (magic, size) pairs.
fn sections_of(bytes: &[u8]) -> Vec<([u8; 4], usize)> {
    let mut out = Vec::new();
    let mut at = 0x14;
    while at < bytes.len() {
        let magic: [u8; 4] = bytes[at..at + 4].try_into().unwrap();
        let size = u32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap()) as usize;
        out.push((magic, size));
        at += size;
    }
    out
}

#[test]
fn test_minimal_layout_wire_shape() {
    let doc = minimal_layout();
    let bytes = doc.build_default().unwrap();

    // 20-byte header: magic, BOM, header size, revision, file size, count.
    assert_eq!(&bytes[0..4], b"CLYT");
    assert_eq!(&bytes[4..6], &[0xFF, 0xFE]);
    assert_eq!(&bytes[6..8], &[0x14, 0x00]);
    assert_eq!(&bytes[8..12], &0x0202_0000u32.to_le_bytes());
    assert_eq!(&bytes[12..16], &(bytes.len() as u32).to_le_bytes());

    // Empty tables are elided: lyt1, the root panel, the root group.
    let sections = sections_of(&bytes);
    let magics: Vec<&[u8; 4]> = sections.iter().map(|(m, _)| m).collect();
    assert_eq!(magics, [b"lyt1", b"pan1", b"grp1"]);
    assert_eq!(&bytes[16..20], &3u32.to_le_bytes());
    for (magic, size) in &sections {
        assert_eq!(size % 4, 0, "section {magic:?} not 4-byte aligned");
    }

    assert_eq!(Clyt::parse(&bytes).unwrap(), doc);
}

fn rich_layout() -> Clyt {
    let mut colors = ColorTable::new();
    // Interned in wire order so decode reproduces the same keys.
    let white = colors.intern(Rgba::new(255, 255, 255, 255));
    let black = colors.intern(Rgba::new(0, 0, 0, 255));
    let red = colors.intern(Rgba::new(255, 0, 0, 128));

    let textured = Material {
        name: "M_page".into(),
        tev_color: white.clone(),
        tev_constant_colors: std::array::from_fn(|_| black.clone()),
        tex_maps: vec![TexMapEntry {
            texture: "page_00".into(),
            wrap_s: WrapMode::Clamp,
            min_filter: FilterMode::Linear,
            wrap_t: WrapMode::Mirror,
            max_filter: FilterMode::Near,
        }],
        tex_matrices: vec![TexMatrixEntry {
            translation: Vec2::new(0.5, -0.5),
            rotation: 90.0,
            scale: Vec2::new(2.0, 2.0),
        }],
        tex_coord_gens: vec![TexCoordGen {
            gen_type: MatrixType::Matrix2x4,
            source: TextureGenerationType::Tex0,
        }],
        tev_stages: vec![TevStage {
            rgb_mode: 3,
            alpha_mode: 1,
        }],
        alpha_compare: None,
        color_blend_mode: None,
        use_texture_only: true,
        alpha_blend_mode: None,
        indirect_param: None,
        proj_tex_gen_params: vec![ProjTexGenParam {
            pos: Vec2::new(1.0, 2.0),
            scale: Vec2::new(3.0, 4.0),
            fits_layout: true,
            fits_panel: false,
            adjust_projection_sr: true,
        }],
        font_shadow_param: None,
    };
    let blended = Material {
        name: "M_text".into(),
        tev_color: red.clone(),
        tev_constant_colors: std::array::from_fn(|_| white.clone()),
        tex_maps: Vec::new(),
        tex_matrices: Vec::new(),
        tex_coord_gens: Vec::new(),
        tev_stages: Vec::new(),
        alpha_compare: Some(AlphaCompare {
            compare_mode: 4,
            reference: 0.5,
        }),
        color_blend_mode: Some(BlendMode {
            operation: BlendFactor::Factor1,
            source_factor: BlendOp::Add,
            dest_factor: BlendOp::Subtract,
            logic: LogicOp::NoOp,
        }),
        use_texture_only: false,
        alpha_blend_mode: Some(BlendMode {
            operation: BlendFactor::SourceAlpha,
            source_factor: BlendOp::SelectMin,
            dest_factor: BlendOp::SelectMax,
            logic: LogicOp::Xor,
        }),
        indirect_param: Some(IndirectParam {
            rotation: 45.0,
            scale: Vec2::new(1.5, 0.5),
        }),
        proj_tex_gen_params: Vec::new(),
        font_shadow_param: Some(FontShadowParam {
            black_r: 1,
            black_g: 2,
            black_b: 3,
            white_r: 4,
            white_g: 5,
            white_b: 6,
            white_a: 7,
        }),
    };

    let mut picture = Panel::new(
        common("P_picture", Vec2::new(64.0, 64.0)),
        PanelKind::Pic(Picture {
            tl_color: white.clone(),
            tr_color: white.clone(),
            bl_color: black.clone(),
            br_color: black.clone(),
            material: "M_page".into(),
            texture_coords: vec![TextureCoords {
                top_left: Vec2::new(0.0, 0.0),
                top_right: Vec2::new(1.0, 0.0),
                bottom_left: Vec2::new(0.0, 1.0),
                bottom_right: Vec2::new(1.0, 1.0),
            }],
        }),
    );
    picture.user_data = vec![
        UsdEntry {
            name: "LayoutIndex".into(),
            value: UsdValue::Ints(vec![7]),
        },
        UsdEntry {
            name: "Caption".into(),
            value: UsdValue::String("page one".into()),
        },
        UsdEntry {
            name: "Anchors".into(),
            value: UsdValue::Floats(vec![0.25, 0.75]),
        },
    ];

    let text = Panel::new(
        common("T_body", Vec2::new(200.0, 30.0)),
        PanelKind::Txt(Text {
            additional_chars: 4,
            material: "M_text".into(),
            font: "manual.bcfnt".into(),
            another_origin: (OriginHorizontal::Left, OriginVertical::Top),
            line_alignment: LineAlignment::Center,
            top_color: white.clone(),
            bottom_color: red.clone(),
            text_size: Vec2::new(16.0, 16.0),
            character_size: 1.0,
            line_size: 18.0,
            text: "Hello, world!".into(),
        }),
    );

    let window = Panel::new(
        common("W_frame", Vec2::new(120.0, 80.0)),
        PanelKind::Wnd(Window {
            content_overflow_l: 1.0,
            content_overflow_r: 2.0,
            content_overflow_t: 3.0,
            content_overflow_b: 4.0,
            flag: 1,
            tl_color: white.clone(),
            tr_color: white.clone(),
            bl_color: white.clone(),
            br_color: white.clone(),
            material: "M_page".into(),
            uv_sets: vec![UvCoordSet {
                top_left: Vec2::new(0.0, 0.0),
                top_right: Vec2::new(1.0, 0.0),
                bottom_left: Vec2::new(0.0, 1.0),
                bottom_right: Vec2::new(1.0, 1.0),
            }],
            frames: vec![
                WindowFrame {
                    material: "M_page".into(),
                    flip: 0,
                },
                WindowFrame {
                    material: "M_text".into(),
                    flip: 2,
                },
            ],
        }),
    );

    let mut root = Panel::new(common("root", Vec2::new(320.0, 240.0)), PanelKind::Pan);
    root.children = vec![picture, text, window];

    let mut root_group = Group::new("RootGroup");
    root_group.panel_refs = vec!["root".into()];
    let mut sub_group = Group::new("G_page");
    sub_group.panel_refs = vec!["P_picture".into(), "T_body".into()];
    root_group.children.push(sub_group);

    Clyt {
        layout: Layout {
            origin: OriginType::Normal,
            size: Vec2::new(320.0, 240.0),
        },
        colors,
        textures: vec!["page_00".into()],
        fonts: vec!["manual.bcfnt".into()],
        materials: vec![textured, blended],
        root_panel: root,
        root_group,
    }
}

#[test]
fn test_rich_layout_roundtrip() {
    let doc = rich_layout();
    let bytes = doc.build_default().unwrap();
    let decoded = Clyt::parse(&bytes).unwrap();
    assert_eq!(decoded, doc);

    // Encoding the decoded tree reproduces the bytes exactly.
    assert_eq!(decoded.build_default().unwrap(), bytes);
}

#[test]
fn test_section_order_and_alignment() {
    let bytes = rich_layout().build_default().unwrap();
    let sections = sections_of(&bytes);
    let magics: Vec<&[u8; 4]> = sections.iter().map(|(m, _)| m).collect();
    assert_eq!(
        magics,
        [
            b"lyt1", b"txl1", b"fnl1", b"mat1", b"pan1", b"pas1", b"pic1", b"usd1", b"txt1",
            b"wnd1", b"pae1", b"grp1", b"grs1", b"grp1", b"gre1",
        ]
    );
    for (magic, size) in &sections {
        assert_eq!(size % 4, 0, "section {magic:?} not 4-byte aligned");
    }

    // Declared section count covers markers and user data blocks.
    assert_eq!(&bytes[16..20], &15u32.to_le_bytes());
}

#[test]
fn test_color_table_dedups() {
    let doc = rich_layout();
    let bytes = doc.build_default().unwrap();
    let decoded = Clyt::parse(&bytes).unwrap();

    let colors: Vec<Rgba> = decoded.colors.iter().map(|(_, c)| c).collect();
    let mut unique = colors.clone();
    unique.dedup();
    assert_eq!(colors.len(), 3);
    assert_eq!(colors, unique);
}

#[test]
fn test_usd_modes_all_decode_identically() {
    let doc = rich_layout();
    let mut decoded_variants = Vec::new();
    for usd_mode in [UsdMode::Adjacent, UsdMode::Trailing, UsdMode::Auto] {
        let bytes = doc.build(&EncodeOptions { usd_mode }).unwrap();
        decoded_variants.push(Clyt::parse(&bytes).unwrap());
    }
    assert_eq!(decoded_variants[0], decoded_variants[1]);
    assert_eq!(decoded_variants[1], decoded_variants[2]);
    assert_eq!(decoded_variants[0], doc);
}

#[test]
fn test_text_decode_failure_is_recovered() {
    let mut doc = minimal_layout();
    doc.materials = vec![Material {
        name: "M".into(),
        tev_color: doc.colors.intern(Rgba::new(0, 0, 0, 0)),
        tev_constant_colors: std::array::from_fn(|_| doc.colors.intern(Rgba::new(0, 0, 0, 0))),
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
    }];
    doc.fonts = vec!["f.bcfnt".into()];
    doc.root_panel.children.push(Panel::new(
        common("T", Vec2::new(10.0, 10.0)),
        PanelKind::Txt(Text {
            additional_chars: 0,
            material: "M".into(),
            font: "f.bcfnt".into(),
            another_origin: (OriginHorizontal::Center, OriginVertical::Middle),
            line_alignment: LineAlignment::NoAlign,
            top_color: "0".into(),
            bottom_color: "0".into(),
            text_size: Vec2::default(),
            character_size: 1.0,
            line_size: 1.0,
            text: "AB".into(),
        }),
    ));

    let mut bytes = doc.build_default().unwrap();
    // Corrupt the UTF-16 payload into two lone high surrogates.
    let needle = [0x41, 0x00, 0x42, 0x00];
    let at = bytes
        .windows(4)
        .position(|win| win == needle)
        .expect("text payload present");
    bytes[at..at + 4].copy_from_slice(&[0x00, 0xD8, 0x00, 0xD8]);

    let decoded = Clyt::parse(&bytes).unwrap();
    let Panel { kind, .. } = &decoded.root_panel.children[0];
    match kind {
        PanelKind::Txt(text) => assert_eq!(text.text, TEXT_DECODE_SENTINEL),
        other => panic!("expected a text panel, got {other:?}"),
    }
}

#[test]
fn test_unknown_section_magic() {
    let mut bytes = minimal_layout().build_default().unwrap();
    bytes[0x14..0x18].copy_from_slice(b"zzz1");
    assert!(matches!(
        Clyt::parse(&bytes),
        Err(Error::UnknownSection(_))
    ));
}

#[test]
fn test_unknown_symbol_on_encode() {
    let mut doc = minimal_layout();
    doc.root_panel.children.push(Panel::new(
        common("P", Vec2::default()),
        PanelKind::Pic(Picture {
            tl_color: "0".into(),
            tr_color: "0".into(),
            bl_color: "0".into(),
            br_color: "0".into(),
            material: "M_missing".into(),
            texture_coords: Vec::new(),
        }),
    ));
    doc.colors.intern(Rgba::new(0, 0, 0, 0));
    assert!(matches!(
        doc.build_default(),
        Err(Error::UnknownSymbol { kind: "material", .. })
    ));
}

#[test]
fn test_ascend_past_root_is_rejected() {
    let doc = minimal_layout();
    let mut bytes = doc.build_default().unwrap();
    // Replace the root group section with a stray pae1 marker.
    let sections = sections_of(&bytes);
    let grp_at = 0x14
        + sections
            .iter()
            .take_while(|(magic, _)| magic != b"grp1")
            .map(|(_, size)| size)
            .sum::<usize>();
    bytes.truncate(grp_at);
    bytes.extend_from_slice(b"pae1");
    bytes.extend_from_slice(&8u32.to_le_bytes());
    let total = bytes.len() as u32;
    bytes[12..16].copy_from_slice(&total.to_le_bytes());

    assert!(matches!(Clyt::parse(&bytes), Err(Error::TreeShape(_))));
}

proptest! {
    /// Bits the flag word defines survive a decode/encode cycle untouched.
    #[test]
    fn prop_material_flag_word_invertible(word in any::<u32>()) {
        const DEFINED: u32 = 0x1FFFF;
        let decoded = MaterialFlags::from_word(word);
        prop_assert_eq!(decoded.to_word(), word & DEFINED);
        prop_assert_eq!(MaterialFlags::from_word(decoded.to_word()), decoded);
    }
}

#[test]
fn test_missing_layout_section() {
    // A file with zero sections fails on the missing lyt1.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"CLYT");
    bytes.extend_from_slice(&0xFEFFu16.to_le_bytes());
    bytes.extend_from_slice(&0x14u16.to_le_bytes());
    bytes.extend_from_slice(&0x0202_0000u32.to_le_bytes());
    bytes.extend_from_slice(&0x14u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    assert!(matches!(
        Clyt::parse(&bytes),
        Err(Error::MissingSection("lyt1"))
    ));
}
