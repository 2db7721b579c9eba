//! Glyph-level fixes: advances, the dotted circle mapping, glyph names.

use std::collections::HashSet;

use anyhow::{Result, anyhow};
use charon_font_ops::{glyph_names, optional_table, rewrite_font_if};
use mark_anchors::{CharMap, dotted_circle::DOTTED_CIRCLE};
use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::{gdef::GlyphClassDef, glyf::Glyph},
    types::{GlyphId, GlyphId16, Version16Dot16},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        cmap::Cmap,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        post::Post,
    },
};

use crate::{
    FontContext,
    targets::{DOTTED_CIRCLE_PLACEHOLDERS, FALLBACK_ADVANCE, ZERO_WIDTH_PUA_GLYPHS},
};

/// Give zero-advance spacing glyphs the font's standard advance.
///
/// Combining marks, by cmap or by GDEF class, keep their zero advance. Other
/// zero-advance glyphs are widened when they are one of the known private use
/// glyphs or a simple glyph with outlines.
pub fn fix_zero_width_glyphs(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let (Some(hmtx), Some(hhea), Some(glyf), Some(loca)) = (
            optional_table(font.hmtx())?,
            optional_table(font.hhea())?,
            optional_table(font.glyf())?,
            optional_table(font.loca(None))?,
        ) else {
            return Ok(false);
        };

        let names = glyph_names(font);
        let mut advances: Vec<u16> = (0..names.len())
            .map(|gid| hmtx.advance(GlyphId::new(gid as u32)).unwrap_or(0))
            .collect();
        let side_bearings: Vec<i16> = (0..names.len())
            .map(|gid| hmtx.side_bearing(GlyphId::new(gid as u32)).unwrap_or(0))
            .collect();
        let width = standard_advance(&names, &advances);
        let marks = mark_glyphs(font)?;

        let mut fixed = 0;
        for (gid, name) in names.iter().enumerate() {
            if advances[gid] != 0 || marks.contains(&(gid as u32)) {
                continue;
            }
            let outlined = matches!(
                loca.get_glyf(GlyphId::new(gid as u32), &glyf),
                Ok(Some(Glyph::Simple(ref simple))) if simple.number_of_contours() > 0
            );
            if outlined || ZERO_WIDTH_PUA_GLYPHS.contains(&name.as_str()) {
                advances[gid] = width;
                fixed += 1;
            }
        }
        if fixed == 0 {
            return Ok(false);
        }
        debug!("widened {fixed} zero-advance glyphs to {width}");

        // only the trailing run sharing one advance can drop its long metrics
        let mut num_long = advances.len();
        while num_long > 1 && advances[num_long - 1] == advances[num_long - 2] {
            num_long -= 1;
        }
        let h_metrics = (0..num_long)
            .map(|gid| LongMetric { advance: advances[gid], side_bearing: side_bearings[gid] })
            .collect();
        let left_side_bearings = side_bearings[num_long..].to_vec();
        builder.add_table(&Hmtx::new(h_metrics, left_side_bearings))?;

        let mut hhea: Hhea = hhea.to_owned_table();
        hhea.number_of_h_metrics = num_long as u16;
        hhea.advance_width_max =
            advances[..num_long].iter().copied().max().unwrap_or_default().into();
        builder.add_table(&hhea)?;
        Ok(true)
    })
}

/// The advance of `space`, else the mean nonzero advance, else 500.
fn standard_advance(names: &[String], advances: &[u16]) -> u16 {
    if let Some(gid) = names.iter().position(|name| name == "space") {
        return advances[gid];
    }
    let nonzero: Vec<u32> = advances.iter().filter(|&&a| a > 0).map(|&a| a as u32).collect();
    if nonzero.is_empty() {
        return FALLBACK_ADVANCE;
    }
    (nonzero.iter().sum::<u32>() / nonzero.len() as u32) as u16
}

/// Glyphs that are marks by codepoint or by GDEF glyph class.
fn mark_glyphs(font: &FontRef) -> Result<HashSet<u32>> {
    let mut marks: HashSet<u32> =
        CharMap::from_font(font).combining_marks().map(|(_, gid)| gid.to_u32()).collect();
    if let Some(gdef) = optional_table(font.gdef())? {
        if let Some(class_def) = gdef.glyph_class_def().transpose()? {
            marks.extend(
                class_def
                    .iter()
                    .filter(|&(_, class)| class == GlyphClassDef::Mark as u16)
                    .map(|(gid, _)| gid.to_u32()),
            );
        }
    }
    Ok(marks)
}

/// Map U+25CC to a placeholder glyph when the font has no dotted circle.
pub fn fix_dotted_circle(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let charmap = CharMap::from_font(font);
        if charmap.is_empty() || charmap.glyph(DOTTED_CIRCLE).is_some() {
            return Ok(false);
        }
        let names = glyph_names(font);
        let placeholder = DOTTED_CIRCLE_PLACEHOLDERS.iter().find_map(|&(name, codepoint)| {
            names
                .iter()
                .position(|n| n == name)
                .and_then(|gid| u16::try_from(gid).ok())
                .map(GlyphId16::new)
                .or_else(|| charmap.glyph(codepoint))
        });
        let Some(placeholder) = placeholder else {
            warn!("no placeholder glyph for U+25CC");
            return Ok(false);
        };

        let mappings = charmap
            .iter()
            .chain([(DOTTED_CIRCLE, placeholder)])
            .filter_map(|(cp, gid)| Some((char::from_u32(cp)?, GlyphId::from(gid))));
        let cmap = Cmap::from_mappings(mappings)
            .map_err(|e| anyhow!("cannot rebuild cmap: {e:?}"))?;
        builder.add_table(&cmap)?;
        debug!("U+25CC mapped to glyph {}", placeholder.to_u32());
        Ok(true)
    })
}

/// Switch `post` to version 3, which stores no glyph names.
pub fn strip_glyph_names(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let Some(post) = optional_table(font.post())? else {
            return Ok(false);
        };
        if post.version() == Version16Dot16::VERSION_3_0 {
            return Ok(false);
        }
        let mut stripped = Post::new(
            post.italic_angle(),
            post.underline_position(),
            post.underline_thickness(),
            post.is_fixed_pitch(),
            post.min_mem_type42(),
            post.max_mem_type42(),
            post.min_mem_type1(),
            post.max_mem_type1(),
        );
        stripped.version = Version16Dot16::VERSION_3_0;
        builder.add_table(&stripped)?;
        Ok(true)
    })
}
