//! Compliance fixes on a synthesized Iosevka Charon style.

use charon_font_metadata::{
    FontContext, METADATA_FIXES, fix_copyright_notice, fix_dotted_circle, fix_font_names,
    fix_font_revision, fix_fontbakery_metadata, fix_license_entries, fix_panose_monospace,
    fix_style_bits, fix_vertical_metrics, fix_windows_metrics, fix_zero_width_glyphs,
    strip_glyph_names, targets,
};
use charon_font_ops::{NamePlatform, NameRecords};
use font_types::{FWord, Fixed, GlyphId16, LongDateTime, NameId, UfWord, Version16Dot16};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::CurvePoint,
    types::GlyphId,
};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        gdef::Gdef,
        glyf::{Bbox, Contour, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        layout::ClassDef,
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

// ============================================================================
// Font synthesis
// ============================================================================

struct TestGlyph {
    name: &'static str,
    codepoint: Option<u32>,
    advance: u16,
    outlined: bool,
}

const fn glyph(name: &'static str, codepoint: Option<u32>, advance: u16, outlined: bool) -> TestGlyph {
    TestGlyph { name, codepoint, advance, outlined }
}

const SPACE: u16 = 1;
const ACUTE: u16 = 3;
const PUA: u16 = 4;
const BAR: u16 = 5;
const RING: u16 = 6;

/// Glyphs 3 and up have zero advances; 4 and up live past the long metrics.
const GLYPHS: [TestGlyph; 7] = [
    glyph(".notdef", None, 500, true),
    glyph("space", Some(0x20), 600, false),
    glyph("a", Some(0x61), 600, true),
    glyph("acutecomb", Some(0x301), 0, true),
    glyph("uniEF06", Some(0xEF06), 0, false),
    glyph("bar.alt", None, 0, true),
    glyph("ringmark", None, 0, true),
];
const NUM_LONG_METRICS: usize = 4;

fn rect(x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> Glyph {
    let points = vec![
        CurvePoint { x: x_min, y: y_min, on_curve: true },
        CurvePoint { x: x_max, y: y_min, on_curve: true },
        CurvePoint { x: x_max, y: y_max, on_curve: true },
        CurvePoint { x: x_min, y: y_max, on_curve: true },
    ];
    let contour: Contour = points.into();
    Glyph::Simple(SimpleGlyph {
        bbox: Bbox { x_min, y_min, x_max, y_max },
        contours: vec![contour],
        instructions: vec![],
    })
}

fn name_records(records: &[(u16, &str)]) -> Name {
    let mut names = Vec::new();
    for platform in NamePlatform::ALL {
        for &(name_id, value) in records {
            names.push(NameRecord::new(
                platform.platform_id,
                platform.encoding_id,
                platform.language_id,
                NameId::new(name_id),
                value.to_string().into(),
            ));
        }
    }
    names.sort_by_key(|r| (r.platform_id, r.encoding_id, r.language_id, r.name_id.to_u16()));
    Name::new(names)
}

/// One style as the build leaves it, before any compliance fix.
fn build_font(mac_style: MacStyle, names: &[(u16, &str)]) -> Vec<u8> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    for glyph in &GLYPHS {
        let outline = if glyph.outlined { rect(50, 0, 450, 700) } else { Glyph::Empty };
        glyf_builder.add_glyph(&outline).unwrap();
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let cmap = Cmap::from_mappings(GLYPHS.iter().enumerate().filter_map(|(gid, glyph)| {
        Some((char::from_u32(glyph.codepoint?)?, GlyphId::new(gid as u32)))
    }))
    .expect("cmap");

    let head = Head {
        font_revision: Fixed::from_f64(1.0),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: Flags::empty(),
        units_per_em: 1000,
        created: LongDateTime::new(0),
        modified: LongDateTime::new(0),
        x_min: 50,
        y_min: 0,
        x_max: 450,
        y_max: 700,
        mac_style,
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    };
    let hhea = Hhea {
        ascender: FWord::new(800),
        descender: FWord::new(-200),
        line_gap: FWord::new(90),
        advance_width_max: UfWord::new(600),
        min_left_side_bearing: FWord::new(0),
        min_right_side_bearing: FWord::new(0),
        x_max_extent: FWord::new(450),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: NUM_LONG_METRICS as u16,
    };
    let hmtx = Hmtx {
        h_metrics: GLYPHS[..NUM_LONG_METRICS]
            .iter()
            .map(|glyph| LongMetric { advance: glyph.advance, side_bearing: 50 })
            .collect(),
        left_side_bearings: vec![50; GLYPHS.len() - NUM_LONG_METRICS],
    };
    let maxp = Maxp {
        num_glyphs: GLYPHS.len() as u16,
        max_points: Some(4),
        max_contours: Some(1),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };
    // REGULAR is left set on every style, italics included
    let mut fs_selection = SelectionFlags::REGULAR;
    if mac_style.contains(MacStyle::ITALIC) {
        fs_selection.insert(SelectionFlags::ITALIC);
    }
    let os2 = Os2 {
        us_weight_class: 400,
        us_width_class: 5,
        fs_selection,
        s_typo_ascender: 800,
        s_typo_descender: -200,
        s_typo_line_gap: 90,
        us_win_ascent: 900,
        us_win_descent: 300,
        panose_10: [2, 0, 5, 3, 0, 0, 0, 0, 0, 0],
        ..Default::default()
    };
    let post = Post::new_v2(GLYPHS.iter().map(|glyph| glyph.name));
    let gdef = Gdef::new(
        Some(ClassDef::from_iter([(GlyphId16::new(ACUTE), 3), (GlyphId16::new(RING), 3)])),
        None,
        None,
        None,
    );

    let mut builder = FontBuilder::new();
    builder.add_table(&head).unwrap();
    builder.add_table(&hhea).unwrap();
    builder.add_table(&hmtx).unwrap();
    builder.add_table(&maxp).unwrap();
    builder.add_table(&os2).unwrap();
    builder.add_table(&cmap).unwrap();
    builder.add_table(&post).unwrap();
    builder.add_table(&glyf).unwrap();
    builder.add_table(&loca).unwrap();
    builder.add_table(&gdef).unwrap();
    builder.add_table(&name_records(names)).unwrap();
    builder.build()
}

fn default_names() -> Vec<(u16, &'static str)> {
    vec![
        (1, "Iosevka Charon Mono"),
        (2, "Italic"),
        (8, "Generated by FontBakery"),
        (9, "Belleve Invis"),
        (16, "Iosevka Charon Mono"),
        (17, "SemiBold Italic"),
    ]
}

fn semibold_italic() -> Vec<u8> {
    build_font(MacStyle::ITALIC, &default_names())
}

fn ctx() -> FontContext {
    FontContext::new("IosevkaCharonMono-SemiBoldItalic.ttf")
}

fn names(data: &[u8]) -> NameRecords {
    NameRecords::from_font(&FontRef::new(data).unwrap()).unwrap()
}

fn windows_name(data: &[u8], name_id: u16) -> Option<String> {
    names(data).get(name_id, NamePlatform::WINDOWS_ENGLISH).map(str::to_string)
}

fn advance(font: &FontRef, gid: u16) -> u16 {
    font.hmtx().unwrap().advance(GlyphId::new(gid as u32)).unwrap()
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn test_windows_metrics() {
    let fixed = fix_windows_metrics(&semibold_italic(), &ctx()).unwrap().unwrap();
    let os2 = FontRef::new(&fixed).unwrap().os2().unwrap();
    assert_eq!(os2.us_win_ascent(), 1198);
    assert_eq!(os2.us_win_descent(), 604);

    assert!(fix_windows_metrics(&fixed, &ctx()).unwrap().is_none());
}

#[test]
fn test_vertical_metrics() {
    let fixed = fix_vertical_metrics(&semibold_italic(), &ctx()).unwrap().unwrap();
    let font = FontRef::new(&fixed).unwrap();
    let hhea = font.hhea().unwrap();
    assert_eq!(hhea.ascender().to_i16(), 1015);
    assert_eq!(hhea.descender().to_i16(), -265);
    assert_eq!(hhea.line_gap().to_i16(), 0);

    let os2 = font.os2().unwrap();
    assert_eq!(os2.s_typo_ascender(), 1015);
    assert_eq!(os2.s_typo_descender(), -265);
    assert_eq!(os2.s_typo_line_gap(), 0);
    assert!(os2.fs_selection().contains(SelectionFlags::USE_TYPO_METRICS));
    assert!(os2.fs_selection().contains(SelectionFlags::ITALIC));

    assert!(fix_vertical_metrics(&fixed, &ctx()).unwrap().is_none());
}

#[test]
fn test_panose_monospace() {
    let fixed = fix_panose_monospace(&semibold_italic(), &ctx()).unwrap().unwrap();
    let os2 = FontRef::new(&fixed).unwrap().os2().unwrap();
    assert_eq!(os2.panose_10(), &[2, 0, 5, 9, 0, 0, 0, 0, 0, 0]);
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_font_revision() {
    let fixed = fix_font_revision(&semibold_italic(), &ctx()).unwrap().unwrap();
    let font = FontRef::new(&fixed).unwrap();
    assert_eq!(font.head().unwrap().font_revision(), Fixed::from_f64(32.5));
    assert_eq!(windows_name(&fixed, 5).as_deref(), Some("Version 32.5.0"));
    assert_eq!(
        names(&fixed).get(5, NamePlatform::MAC_ROMAN),
        Some(targets::VERSION_STRING)
    );

    assert!(fix_font_revision(&fixed, &ctx()).unwrap().is_none());
}

#[test]
fn test_copyright_and_license() {
    let fixed = fix_copyright_notice(&semibold_italic(), &ctx()).unwrap().unwrap();
    let fixed = fix_license_entries(&fixed, &ctx()).unwrap().unwrap();
    let names = names(&fixed);
    for platform in NamePlatform::ALL {
        assert_eq!(names.get(0, platform), Some(targets::COPYRIGHT));
        assert_eq!(names.get(13, platform), Some(targets::OFL_DESCRIPTION));
        assert_eq!(names.get(14, platform), Some(targets::OFL_URL));
    }
}

#[test]
fn test_fontbakery_metadata_removed() {
    let fixed = fix_fontbakery_metadata(&semibold_italic(), &ctx()).unwrap().unwrap();
    assert_eq!(windows_name(&fixed, 8), None);
    assert_eq!(windows_name(&fixed, 9).as_deref(), Some("Belleve Invis"));

    assert!(fix_fontbakery_metadata(&fixed, &ctx()).unwrap().is_none());
}

// ============================================================================
// Style
// ============================================================================

#[test]
fn test_font_names_non_ribbi() {
    let fixed = fix_font_names(&semibold_italic(), &ctx()).unwrap().unwrap();
    let font = FontRef::new(&fixed).unwrap();
    assert_eq!(font.os2().unwrap().us_weight_class(), 600);

    let names = names(&fixed);
    for platform in NamePlatform::ALL {
        assert_eq!(names.get(1, platform), Some("Iosevka Charon Mono Semibold"));
        assert_eq!(names.get(2, platform), Some("Italic"));
        assert_eq!(names.get(4, platform), Some("Iosevka Charon Mono Semibold Italic"));
        assert_eq!(names.get(6, platform), Some("IosevkaCharonMono-SemiboldItalic"));
        assert_eq!(names.get(16, platform), Some("Iosevka Charon Mono"));
        assert_eq!(names.get(17, platform), Some("Semibold Italic"));
    }

    assert!(fix_font_names(&fixed, &ctx()).unwrap().is_none());
}

#[test]
fn test_font_names_ribbi_drops_typographic_names() {
    let data = build_font(MacStyle::empty(), &default_names());
    let ctx = FontContext::new("IosevkaCharon-Bold.ttf");
    let fixed = fix_font_names(&data, &ctx).unwrap().unwrap();

    assert_eq!(FontRef::new(&fixed).unwrap().os2().unwrap().us_weight_class(), 700);
    // "Mono" in the existing family name wins over the file name
    assert_eq!(windows_name(&fixed, 1).as_deref(), Some("Iosevka Charon Mono"));
    assert_eq!(windows_name(&fixed, 2).as_deref(), Some("Bold"));
    assert_eq!(windows_name(&fixed, 4).as_deref(), Some("Iosevka Charon Mono Bold"));
    assert_eq!(windows_name(&fixed, 6).as_deref(), Some("IosevkaCharonMono-Bold"));
    assert_eq!(windows_name(&fixed, 16), None);
    assert_eq!(names(&fixed).get(17, NamePlatform::MAC_ROMAN), None);
}

#[test]
fn test_font_names_weight_from_os2() {
    let data = build_font(MacStyle::empty(), &[(1, "Iosevka Charon"), (2, "Regular")]);
    let fixed = fix_font_names(&data, &FontContext::new("IosevkaCharon.ttf")).unwrap().unwrap();
    assert_eq!(windows_name(&fixed, 4).as_deref(), Some("Iosevka Charon Regular"));
    assert_eq!(windows_name(&fixed, 6).as_deref(), Some("IosevkaCharon-Regular"));
    assert_eq!(FontRef::new(&fixed).unwrap().os2().unwrap().us_weight_class(), 400);
}

#[test]
fn test_style_bits() {
    let data = build_font(MacStyle::empty(), &[(1, "Iosevka Charon"), (2, "Bold Italic")]);
    let fixed = fix_style_bits(&data, &ctx()).unwrap().unwrap();
    let font = FontRef::new(&fixed).unwrap();

    let fs_selection = font.os2().unwrap().fs_selection();
    assert!(fs_selection.contains(SelectionFlags::ITALIC));
    assert!(fs_selection.contains(SelectionFlags::BOLD));
    assert!(!fs_selection.contains(SelectionFlags::REGULAR));
    assert_eq!(font.head().unwrap().mac_style(), MacStyle::BOLD | MacStyle::ITALIC);

    assert!(fix_style_bits(&fixed, &ctx()).unwrap().is_none());
}

#[test]
fn test_style_bits_regular() {
    let data = build_font(MacStyle::ITALIC, &[(1, "Iosevka Charon"), (2, "Regular")]);
    let fixed = fix_style_bits(&data, &ctx()).unwrap().unwrap();
    let font = FontRef::new(&fixed).unwrap();

    let fs_selection = font.os2().unwrap().fs_selection();
    assert!(fs_selection.contains(SelectionFlags::REGULAR));
    assert!(!fs_selection.contains(SelectionFlags::ITALIC));
    assert_eq!(font.head().unwrap().mac_style(), MacStyle::empty());
}

// ============================================================================
// Glyphs
// ============================================================================

#[test]
fn test_zero_width_glyphs() {
    let fixed = fix_zero_width_glyphs(&semibold_italic(), &ctx()).unwrap().unwrap();
    let font = FontRef::new(&fixed).unwrap();

    assert_eq!(advance(&font, SPACE), 600);
    // combining by cmap and by GDEF class
    assert_eq!(advance(&font, ACUTE), 0);
    assert_eq!(advance(&font, RING), 0);
    // known PUA glyph without outlines, and an unmapped outlined glyph
    assert_eq!(advance(&font, PUA), 600);
    assert_eq!(advance(&font, BAR), 600);

    let hhea = font.hhea().unwrap();
    assert_eq!(hhea.number_of_h_metrics(), GLYPHS.len() as u16);
    assert_eq!(hhea.advance_width_max().to_u16(), 600);
    assert_eq!(font.hmtx().unwrap().side_bearing(GlyphId::new(BAR as u32)), Some(50));

    assert!(fix_zero_width_glyphs(&fixed, &ctx()).unwrap().is_none());
}

#[test]
fn test_dotted_circle_mapped_to_space() {
    let fixed = fix_dotted_circle(&semibold_italic(), &ctx()).unwrap().unwrap();
    let font = FontRef::new(&fixed).unwrap();
    let cmap = font.cmap().unwrap();
    assert_eq!(cmap.map_codepoint(0x25CCu32), Some(GlyphId::new(SPACE as u32)));
    assert_eq!(cmap.map_codepoint(0x61u32), Some(GlyphId::new(2)));

    assert!(fix_dotted_circle(&fixed, &ctx()).unwrap().is_none());
}

#[test]
fn test_strip_glyph_names() {
    let fixed = strip_glyph_names(&semibold_italic(), &ctx()).unwrap().unwrap();
    let post = FontRef::new(&fixed).unwrap().post().unwrap();
    assert_eq!(post.version(), Version16Dot16::VERSION_3_0);
    assert_eq!(post.glyph_name(GlyphId16::new(SPACE)), None);

    assert!(strip_glyph_names(&fixed, &ctx()).unwrap().is_none());
}

// ============================================================================
// All fixes
// ============================================================================

fn apply_all(data: &[u8]) -> (Vec<u8>, Vec<&'static str>) {
    let mut data = data.to_vec();
    let mut fired = Vec::new();
    for (name, fix) in METADATA_FIXES {
        if let Some(fixed) = fix(&data, &ctx()).unwrap() {
            data = fixed;
            fired.push(name);
        }
    }
    (data, fired)
}

#[test]
fn test_all_fixes_fire_in_order() {
    let (fixed, fired) = apply_all(&semibold_italic());
    assert_eq!(
        fired,
        [
            "font_revision",
            "copyright_notice",
            "windows_metrics",
            "vertical_metrics",
            "fontbakery_metadata",
            "zero_width_glyphs",
            "font_names",
            "dotted_circle",
            "panose_monospace",
            "license_entries",
            "style_bits",
            "stripped_glyph_names",
        ]
    );

    let font = FontRef::new(&fixed).unwrap();
    let fs_selection = font.os2().unwrap().fs_selection();
    assert!(fs_selection.contains(SelectionFlags::ITALIC | SelectionFlags::USE_TYPO_METRICS));
    assert_eq!(font.head().unwrap().mac_style(), MacStyle::ITALIC);
}

#[test]
fn test_second_pass_changes_nothing() {
    let (fixed, _) = apply_all(&semibold_italic());
    let (_, fired) = apply_all(&fixed);
    assert!(fired.is_empty(), "fired again: {fired:?}");
}
