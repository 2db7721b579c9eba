//! Building MarkToBase subtables from anchor maps.

use std::collections::{BTreeMap, BTreeSet};

use font_types::GlyphId16;
use write_fonts::tables::{
    gpos::{
        AnchorTable, BaseArray, BaseRecord, MarkArray, MarkBasePosFormat1, MarkRecord,
        PositionLookup,
    },
    layout::{CoverageTable, Lookup, LookupFlag},
};

/// An anchor point in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorPoint {
    pub x: i16,
    pub y: i16,
}

impl AnchorPoint {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    fn to_table(self) -> AnchorTable {
        AnchorTable::format_1(self.x, self.y)
    }
}

/// Collects mark and base anchors keyed by glyph, then emits one subtable.
///
/// Coverage tables and record arrays are only produced together in
/// [`MarkBaseBuilder::build`], so they are always index-aligned. Class keys
/// are arbitrary; the built subtable numbers the classes used by marks
/// contiguously from zero in key order.
#[derive(Debug, Clone, Default)]
pub struct MarkBaseBuilder {
    marks: BTreeMap<GlyphId16, (u16, AnchorPoint)>,
    bases: BTreeMap<GlyphId16, BTreeMap<u16, AnchorPoint>>,
}

impl MarkBaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a mark's class and anchor. A later call for the same glyph wins.
    pub fn add_mark(&mut self, glyph: GlyphId16, class: u16, anchor: AnchorPoint) {
        self.marks.insert(glyph, (class, anchor));
    }

    /// Set a base's anchor for one class.
    pub fn add_base(&mut self, glyph: GlyphId16, class: u16, anchor: AnchorPoint) {
        self.bases.entry(glyph).or_default().insert(class, anchor);
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    pub fn base_count(&self) -> usize {
        self.bases.len()
    }

    /// Build the subtable, or `None` if there are no marks or no bases.
    pub fn build(self) -> Option<MarkBasePosFormat1> {
        if self.marks.is_empty() || self.bases.is_empty() {
            return None;
        }

        let class_ids: BTreeMap<u16, u16> = self
            .marks
            .values()
            .map(|(class, _)| *class)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(id, class)| (class, id as u16))
            .collect();

        let mark_glyphs: Vec<GlyphId16> = self.marks.keys().copied().collect();
        let mark_records = self
            .marks
            .values()
            .map(|(class, anchor)| MarkRecord::new(class_ids[class], anchor.to_table()))
            .collect();

        let base_glyphs: Vec<GlyphId16> = self.bases.keys().copied().collect();
        let base_records = self
            .bases
            .values()
            .map(|anchors| {
                let mut slots: Vec<Option<AnchorTable>> = vec![None; class_ids.len()];
                for (class, anchor) in anchors {
                    if let Some(&id) = class_ids.get(class) {
                        slots[id as usize] = Some(anchor.to_table());
                    }
                }
                BaseRecord::new(slots)
            })
            .collect();

        Some(MarkBasePosFormat1::new(
            CoverageTable::format_1(mark_glyphs),
            CoverageTable::format_1(base_glyphs),
            MarkArray::new(mark_records),
            BaseArray::new(base_records),
        ))
    }

    /// Build a single-subtable MarkToBase lookup with no lookup flags.
    pub fn build_lookup(self) -> Option<PositionLookup> {
        let subtable = self.build()?;
        Some(PositionLookup::MarkToBase(Lookup::new(LookupFlag::empty(), vec![subtable])))
    }
}
