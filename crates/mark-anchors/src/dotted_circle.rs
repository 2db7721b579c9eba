//! Attachment of every combining mark to the dotted circle (U+25CC), the
//! base shapers insert for marks with nothing to attach to.

use font_types::GlyphId16;
use log::debug;
use read_fonts::types::GlyphId;
use write_fonts::tables::gpos::Gpos;

use crate::{
    Result,
    builder::{AnchorPoint, MarkBaseBuilder},
    charmap::CharMap,
    geometry::{GlyphGeometry, clamp_i16},
    gpos::{all_mark_base_subtables, anchor_pair, push_lookup, register_mark_lookup},
};

pub const DOTTED_CIRCLE: u32 = 0x25CC;
pub const DOTTED_CIRCLE_NAME: &str = "dottedcircle";

/// The dotted circle glyph: the cmap entry for U+25CC, else the glyph named
/// `dottedcircle`.
pub fn find_dotted_circle(charmap: &CharMap, glyph_names: &[String]) -> Option<GlyphId16> {
    charmap.glyph(DOTTED_CIRCLE).or_else(|| {
        glyph_names
            .iter()
            .position(|name| name == DOTTED_CIRCLE_NAME)
            .and_then(|index| u16::try_from(index).ok())
            .map(GlyphId16::new)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DottedCircleStats {
    pub marks: usize,
    pub lookup_index: u16,
    /// Whether the lookup was added to an existing `mark` feature.
    pub registered: bool,
}

pub struct DottedCircleFallback<'a, G> {
    geometry: &'a G,
    charmap: &'a CharMap,
    dotted: GlyphId16,
    ascender: i16,
}

impl<'a, G: GlyphGeometry> DottedCircleFallback<'a, G> {
    /// `ascender` is the base anchor height used when the dotted circle has no
    /// outline bounds.
    pub fn new(geometry: &'a G, charmap: &'a CharMap, dotted: GlyphId16, ascender: i16) -> Self {
        Self { geometry, charmap, dotted, ascender }
    }

    /// Combining marks no MarkToBase subtable attaches to the dotted circle.
    pub fn missing_marks(&self, gpos: &Gpos) -> Vec<GlyphId16> {
        let mut missing: Vec<GlyphId16> = self
            .charmap
            .combining_marks()
            .map(|(_, gid)| gid)
            .filter(|&mark| {
                !all_mark_base_subtables(gpos)
                    .any(|(_, subtable)| anchor_pair(subtable, mark, self.dotted).is_some())
            })
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    pub fn apply(&self, gpos: &mut Gpos) -> Result<Option<DottedCircleStats>> {
        let dotted = GlyphId::from(self.dotted);
        if !self.geometry.contains(dotted) {
            return Ok(None);
        }
        let Some(advance) = self.geometry.advance(dotted) else {
            return Ok(None);
        };
        let missing = self.missing_marks(gpos);
        if missing.is_empty() {
            return Ok(None);
        }

        let y = self.geometry.bounds(dotted).map_or(self.ascender, |b| clamp_i16(b.y_max));
        let mut builder = MarkBaseBuilder::new();
        for &mark in &missing {
            builder.add_mark(mark, 0, AnchorPoint::new(0, 0));
        }
        builder.add_base(self.dotted, 0, AnchorPoint::new((advance / 2) as i16, y));

        let Some(lookup) = builder.build_lookup() else {
            return Ok(None);
        };
        let lookup_index = push_lookup(gpos, lookup)?;
        let registered = register_mark_lookup(gpos, lookup_index, false);
        if !registered {
            debug!("no mark feature; dotted circle lookup {lookup_index} left unregistered");
        }
        Ok(Some(DottedCircleStats { marks: missing.len(), lookup_index, registered }))
    }
}
