//! Anchor Y repair for existing MarkToBase subtables.
//!
//! Mark anchors are moved to the glyph's attaching edge (`yMax` for marks
//! hanging below the base, `yMin` for marks sitting above it). Base anchors are
//! then moved a fixed gap past the base outline, but never so close that the
//! attached mark would overlap the tracked mark extremum of its class.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use log::debug;
use read_fonts::types::GlyphId;
use write_fonts::tables::gpos::{Gpos, MarkBasePosFormat1};

use crate::{
    charmap::CharMap,
    classify::{MarkClass, MarkClassifier},
    geometry::{GlyphGeometry, clamp_i16},
    gpos::{anchor_y, mark_base_subtables_mut, set_anchor_y},
};

/// Number of anchors rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    pub marks: usize,
    pub bases: usize,
}

impl RepairStats {
    pub fn changed(&self) -> bool {
        self.marks > 0 || self.bases > 0
    }
}

impl AddAssign for RepairStats {
    fn add_assign(&mut self, other: Self) {
        self.marks += other.marks;
        self.bases += other.bases;
    }
}

/// Rewrites anchor Y coordinates from recomputed glyph bounds.
pub struct AnchorRepairer<'a, G> {
    geometry: &'a G,
    charmap: &'a CharMap,
    classifier: &'a MarkClassifier,
    gap: i32,
}

impl<'a, G: GlyphGeometry> AnchorRepairer<'a, G> {
    pub fn new(
        geometry: &'a G,
        charmap: &'a CharMap,
        classifier: &'a MarkClassifier,
        gap: i32,
    ) -> Self {
        Self { geometry, charmap, classifier, gap }
    }

    /// Repaired copy of one subtable. The input is left untouched.
    pub fn repair_subtable(&self, subtable: &MarkBasePosFormat1) -> (MarkBasePosFormat1, RepairStats) {
        let mut repaired = subtable.clone();
        let stats = self.repair_in_place(&mut repaired);
        (repaired, stats)
    }

    /// Repair every MarkToBase subtable in the lookup list, including those
    /// behind extension lookups.
    pub fn repair_gpos(&self, gpos: &mut Gpos) -> RepairStats {
        let mut total = RepairStats::default();
        for (index, lookup) in gpos.lookup_list.lookups.iter_mut().enumerate() {
            for subtable in mark_base_subtables_mut(lookup) {
                let stats = self.repair_in_place(subtable);
                if stats.changed() {
                    debug!(
                        "lookup {index}: repaired {} mark and {} base anchors",
                        stats.marks, stats.bases
                    );
                }
                total += stats;
            }
        }
        total
    }

    fn repair_in_place(&self, subtable: &mut MarkBasePosFormat1) -> RepairStats {
        let mut stats = RepairStats::default();
        let thresholds = self.repair_marks(subtable, &mut stats);
        if !thresholds.is_empty() {
            self.repair_bases(subtable, &thresholds, &mut stats);
        }
        stats
    }

    /// First pass. Returns the tracked `(kind, extremum)` per mark class id.
    fn repair_marks(
        &self,
        subtable: &mut MarkBasePosFormat1,
        stats: &mut RepairStats,
    ) -> BTreeMap<u16, (MarkClass, i32)> {
        let mut thresholds: BTreeMap<u16, (MarkClass, i32)> = BTreeMap::new();
        let glyphs: Vec<_> = subtable.mark_coverage.iter().collect();

        for (glyph, record) in glyphs.into_iter().zip(subtable.mark_array.mark_records.iter_mut()) {
            let Some(codepoint) = self.charmap.codepoint(glyph) else {
                continue;
            };
            let kind = self.classifier.classify(codepoint);
            if kind == MarkClass::Overlay {
                continue;
            }
            let Some(bounds) = self.geometry.bounds(GlyphId::from(glyph)) else {
                continue;
            };

            let target = match kind {
                MarkClass::Below => bounds.y_max,
                _ => bounds.y_min,
            };
            let anchor = &mut *record.mark_anchor;
            if anchor_y(anchor) != clamp_i16(target) {
                debug!("mark {} (U+{codepoint:04X}): y {} -> {target}", glyph.to_u16(), anchor_y(anchor));
                set_anchor_y(anchor, clamp_i16(target));
                stats.marks += 1;
            }

            thresholds
                .entry(record.mark_class)
                .and_modify(|(tracked_kind, extremum)| {
                    *tracked_kind = kind;
                    *extremum = match kind {
                        MarkClass::Below => (*extremum).min(target),
                        _ => (*extremum).max(target),
                    };
                })
                .or_insert((kind, target));
        }
        thresholds
    }

    fn repair_bases(
        &self,
        subtable: &mut MarkBasePosFormat1,
        thresholds: &BTreeMap<u16, (MarkClass, i32)>,
        stats: &mut RepairStats,
    ) {
        let glyphs: Vec<_> = subtable.base_coverage.iter().collect();

        for (glyph, record) in glyphs.into_iter().zip(subtable.base_array.base_records.iter_mut()) {
            let Some(bounds) = self.geometry.bounds(GlyphId::from(glyph)) else {
                continue;
            };
            for (&class, &(kind, threshold)) in thresholds {
                let Some(slot) = record.base_anchors.get_mut(class as usize) else {
                    continue;
                };
                let Some(anchor) = Option::as_mut(&mut **slot) else {
                    continue;
                };

                let target = match kind {
                    MarkClass::Below => (bounds.y_min - self.gap).min(threshold - 1),
                    _ => (bounds.y_max + self.gap).max(threshold + 1),
                };
                if anchor_y(anchor) != clamp_i16(target) {
                    debug!(
                        "base {} class {class}: y {} -> {target}",
                        glyph.to_u16(),
                        anchor_y(anchor)
                    );
                    set_anchor_y(anchor, clamp_i16(target));
                    stats.bases += 1;
                }
            }
        }
    }
}
