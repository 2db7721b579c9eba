//! Synthesized MarkToBase coverage for combining marks the `mark` feature
//! does not attach.

use std::collections::{BTreeMap, BTreeSet};

use font_types::GlyphId16;
use log::debug;
use read_fonts::types::GlyphId;
use write_fonts::tables::gpos::Gpos;

use crate::{
    Result,
    builder::{AnchorPoint, MarkBaseBuilder},
    charmap::CharMap,
    classify::{MarkClass, MarkClassifier, is_combining},
    geometry::{GlyphGeometry, clamp_i16},
    gpos::{mark_feature_coverage, push_lookup, register_mark_lookup},
};

/// What a fallback lookup added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackStats {
    pub marks: usize,
    pub bases: usize,
    pub lookup_index: u16,
}

pub struct FallbackBuilder<'a, G> {
    geometry: &'a G,
    charmap: &'a CharMap,
    classifier: &'a MarkClassifier,
    gap: i32,
    num_glyphs: u16,
}

impl<'a, G: GlyphGeometry> FallbackBuilder<'a, G> {
    pub fn new(
        geometry: &'a G,
        charmap: &'a CharMap,
        classifier: &'a MarkClassifier,
        gap: i32,
        num_glyphs: u16,
    ) -> Self {
        Self { geometry, charmap, classifier, gap, num_glyphs }
    }

    /// Append a fallback lookup for uncovered marks and register it in the
    /// `mark` feature, creating the feature if needed.
    pub fn apply(&self, gpos: &mut Gpos) -> Result<Option<FallbackStats>> {
        let existing = mark_feature_coverage(gpos);
        let Some(builder) = self.plan(&existing) else {
            return Ok(None);
        };
        let (marks, bases) = (builder.mark_count(), builder.base_count());
        let Some(lookup) = builder.build_lookup() else {
            return Ok(None);
        };
        let lookup_index = push_lookup(gpos, lookup)?;
        register_mark_lookup(gpos, lookup_index, true);
        debug!("fallback lookup {lookup_index}: {marks} marks on {bases} bases");
        Ok(Some(FallbackStats { marks, bases, lookup_index }))
    }

    /// Anchors for every combining mark not in `existing`, on every usable
    /// base. `None` if there is nothing to attach.
    pub fn plan(&self, existing: &BTreeSet<GlyphId16>) -> Option<MarkBaseBuilder> {
        let marks: Vec<(u32, GlyphId16)> = self.charmap.combining_marks().collect();
        if marks.is_empty() {
            return None;
        }
        let mark_glyphs: BTreeSet<GlyphId16> = marks.iter().map(|&(_, gid)| gid).collect();
        if mark_glyphs.is_subset(existing) {
            return None;
        }

        let gaps = self.class_gaps(&marks);
        let mut builder = MarkBaseBuilder::new();
        let mut present: BTreeSet<MarkClass> = BTreeSet::new();

        for &(codepoint, glyph) in &marks {
            if existing.contains(&glyph) {
                continue;
            }
            let gid = GlyphId::from(glyph);
            if self.geometry.advance(gid).is_none() {
                continue;
            }
            let Some(bounds) = self.geometry.bounds(gid) else {
                continue;
            };
            let class = self.classifier.classify(codepoint);
            let y = match class {
                MarkClass::Above => bounds.y_min,
                MarkClass::Below => bounds.y_max,
                MarkClass::Overlay => bounds.y_mid(),
            };
            builder.add_mark(glyph, class.key(), AnchorPoint::new(clamp_i16(bounds.x_mid()), clamp_i16(y)));
            present.insert(class);
        }
        if present.is_empty() {
            return None;
        }

        for glyph in self.base_glyphs(&mark_glyphs) {
            let gid = GlyphId::from(glyph);
            let (Some(advance), Some(bounds)) = (self.geometry.advance(gid), self.geometry.bounds(gid))
            else {
                continue;
            };
            let x = (advance / 2) as i16;
            for &class in &present {
                let gap = gaps.get(&class).copied().unwrap_or(self.gap);
                let y = match class {
                    MarkClass::Above => bounds.y_max + gap,
                    MarkClass::Below => bounds.y_min - gap,
                    MarkClass::Overlay => bounds.y_mid(),
                };
                builder.add_base(glyph, class.key(), AnchorPoint::new(x, clamp_i16(y)));
            }
        }
        if builder.base_count() == 0 {
            return None;
        }
        Some(builder)
    }

    /// Mapped non-mark glyphs, then unmapped glyphs that exist in the outline
    /// store. Marks are never bases.
    fn base_glyphs(&self, marks: &BTreeSet<GlyphId16>) -> BTreeSet<GlyphId16> {
        let mapped = self
            .charmap
            .iter()
            .filter(|&(cp, gid)| !is_combining(cp) && !marks.contains(&gid))
            .map(|(_, gid)| gid);
        let unmapped = (0..self.num_glyphs).map(GlyphId16::new).filter(|&gid| {
            !self.charmap.is_mapped(gid)
                && !marks.contains(&gid)
                && self.geometry.contains(GlyphId::from(gid))
        });
        mapped.chain(unmapped).collect()
    }

    /// Vertical gap per mark class: half the average mark height, but never
    /// less than the configured gap.
    fn class_gaps(&self, marks: &[(u32, GlyphId16)]) -> BTreeMap<MarkClass, i32> {
        let mut heights: BTreeMap<MarkClass, Vec<i32>> = BTreeMap::new();
        for &(codepoint, glyph) in marks {
            if let Some(bounds) = self.geometry.bounds(GlyphId::from(glyph)) {
                heights.entry(self.classifier.classify(codepoint)).or_default().push(bounds.height());
            }
        }
        heights
            .into_iter()
            .map(|(class, heights)| {
                let average = heights.iter().sum::<i32>() / heights.len() as i32;
                (class, self.gap.max(average / 2))
            })
            .collect()
    }
}
