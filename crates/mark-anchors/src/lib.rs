//! Mark-to-base anchor repair and fallback attachment.
//!
//! Works on owned `GPOS`/`GDEF` tables of one font:
//!
//! 1. [`repair`]: move existing mark and base anchors onto recomputed glyph
//!    bounds so marks never collide with their base.
//! 2. [`fallback`]: attach combining marks the `mark` feature misses with a
//!    synthesized lookup.
//! 3. [`dotted_circle`]: make every combining mark attach to U+25CC.
//! 4. [`gdef`]: mark glyph class for every combining mark.
//!
//! [`MarkAnchorFixer`] runs all four in that order and returns the rewritten
//! tables together with an [`AnchorReport`].

pub mod builder;
pub mod charmap;
pub mod classify;
pub mod dotted_circle;
pub mod error;
pub mod fallback;
pub mod gdef;
pub mod geometry;
pub mod gpos;
pub mod inspect;
pub mod repair;

pub use builder::{AnchorPoint, MarkBaseBuilder};
pub use charmap::CharMap;
pub use classify::{MarkClass, MarkClassifier};
pub use error::{Error, Result};
pub use geometry::{Bounds, FontGeometry, GlyphGeometry};
pub use inspect::{AnchorPairing, inspect_anchors};
pub use repair::RepairStats;

use indexmap::IndexMap;
use log::debug;
use read_fonts::{FontRef, ReadError, TableProvider};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{gdef::Gdef, gpos::Gpos},
};

use crate::{
    classify::{DEFAULT_BELOW_CLASSES, DEFAULT_OVERLAY_CLASSES},
    dotted_circle::{DottedCircleFallback, find_dotted_circle},
    fallback::FallbackBuilder,
    gdef::sync_mark_classes,
    repair::AnchorRepairer,
};

pub const FIXED_BROKEN_MARK_ANCHORS: &str = "fixed_broken_mark_anchors";
pub const FALLBACK_MARK_ANCHORS: &str = "fallback_mark_anchors";
pub const DOTTED_CIRCLE_FALLBACK: &str = "dotted_circle_fallback";
pub const GDEF_MARK_CLASSES: &str = "gdef_mark_classes";

/// Gap between base outline and base anchor, in units of a 1000 UPM font.
pub const DEFAULT_GAP: i32 = 60;

/// Tuning for the anchor fixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorConfig {
    /// Vertical clearance between base outline and base anchor.
    pub gap: i32,
    /// Canonical combining classes treated as below-base marks.
    pub below_classes: Vec<u8>,
    /// Canonical combining classes treated as overlay marks.
    pub overlay_classes: Vec<u8>,
    /// Scale `gap` by `unitsPerEm / 1000`.
    pub scale_gap_to_upm: bool,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            below_classes: DEFAULT_BELOW_CLASSES.to_vec(),
            overlay_classes: DEFAULT_OVERLAY_CLASSES.to_vec(),
            scale_gap_to_upm: false,
        }
    }
}

impl AnchorConfig {
    pub fn classifier(&self) -> MarkClassifier {
        MarkClassifier::new(self.below_classes.iter().copied(), self.overlay_classes.iter().copied())
    }

    /// The gap to use for a font with the given units per em.
    pub fn gap_for_upm(&self, units_per_em: u16) -> i32 {
        if self.scale_gap_to_upm && units_per_em > 0 {
            (self.gap as i64 * units_per_em as i64 / 1000) as i32
        } else {
            self.gap
        }
    }
}

/// Names and summaries of the fixes that changed something, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorReport {
    fixes: IndexMap<&'static str, String>,
}

impl AnchorReport {
    fn record(&mut self, name: &'static str, summary: String) {
        debug!("{name}: {summary}");
        self.fixes.insert(name, summary);
    }

    pub fn fired(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fixes.keys().copied()
    }

    pub fn summary(&self, name: &str) -> Option<&str> {
        self.fixes.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

/// Tables rewritten by [`MarkAnchorFixer::run`]. A table is only present if
/// it changed.
#[derive(Debug, Default)]
pub struct AnchorFixes {
    pub gpos: Option<Gpos>,
    pub gdef: Option<Gdef>,
    pub report: AnchorReport,
}

impl AnchorFixes {
    pub fn is_empty(&self) -> bool {
        self.gpos.is_none() && self.gdef.is_none()
    }

    /// Replace the changed tables in a font being rebuilt.
    pub fn write_into(&self, builder: &mut FontBuilder) -> Result<()> {
        if let Some(gpos) = &self.gpos {
            builder.add_table(gpos)?;
        }
        if let Some(gdef) = &self.gdef {
            builder.add_table(gdef)?;
        }
        Ok(())
    }
}

/// Runs the anchor fixes over one font.
pub struct MarkAnchorFixer<'a> {
    font: &'a FontRef<'a>,
    config: &'a AnchorConfig,
    glyph_names: Option<&'a [String]>,
}

impl<'a> MarkAnchorFixer<'a> {
    pub fn new(font: &'a FontRef<'a>, config: &'a AnchorConfig) -> Self {
        Self { font, config, glyph_names: None }
    }

    /// Look glyphs up by these names instead of the font's `post` table.
    ///
    /// Needed once `post` no longer stores names, as with version 3.
    pub fn with_glyph_names(mut self, glyph_names: &'a [String]) -> Self {
        self.glyph_names = Some(glyph_names);
        self
    }

    pub fn run(&self) -> Result<AnchorFixes> {
        let charmap = CharMap::from_font(self.font);
        let mut fixes = AnchorFixes::default();

        if let Some(gpos) = self.fix_gpos(&charmap, &mut fixes.report)? {
            fixes.gpos = Some(gpos);
        }

        let gdef = match self.font.gdef() {
            Ok(gdef) => Some(gdef),
            Err(ReadError::TableIsMissing(_)) => None,
            Err(e) => return Err(e.into()),
        };
        if let Some(gdef) = gdef {
            if let Some((synced, changed)) = sync_mark_classes(&gdef, &charmap)? {
                fixes.report.record(GDEF_MARK_CLASSES, format!("{changed} glyphs set to mark class"));
                fixes.gdef = Some(synced);
            }
        }
        Ok(fixes)
    }

    /// Repair, fallback and dotted circle passes. `None` if GPOS is unchanged
    /// or the font lacks GPOS or `glyf`.
    fn fix_gpos(&self, charmap: &CharMap, report: &mut AnchorReport) -> Result<Option<Gpos>> {
        let mut gpos: Gpos = match self.font.gpos() {
            Ok(gpos) => gpos.to_owned_table(),
            Err(ReadError::TableIsMissing(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let Some(geometry) = FontGeometry::new(self.font)? else {
            return Ok(None);
        };

        let classifier = self.config.classifier();
        let gap = self.config.gap_for_upm(self.font.head()?.units_per_em());
        let mut changed = false;

        let stats = AnchorRepairer::new(&geometry, charmap, &classifier, gap).repair_gpos(&mut gpos);
        if stats.changed() {
            report.record(
                FIXED_BROKEN_MARK_ANCHORS,
                format!("{} marks, {} bases", stats.marks, stats.bases),
            );
            changed = true;
        }

        let num_glyphs = u16::try_from(geometry.num_glyphs()).unwrap_or(u16::MAX);
        let fallback = FallbackBuilder::new(&geometry, charmap, &classifier, gap, num_glyphs);
        if let Some(stats) = fallback.apply(&mut gpos)? {
            report.record(
                FALLBACK_MARK_ANCHORS,
                format!("lookup {}: {} marks, {} bases", stats.lookup_index, stats.marks, stats.bases),
            );
            changed = true;
        }

        let post_names;
        let glyph_names = match self.glyph_names {
            _ if charmap.glyph(dotted_circle::DOTTED_CIRCLE).is_some() => &[][..],
            Some(names) => names,
            None => {
                post_names = charon_font_ops::glyph_names(self.font);
                &post_names[..]
            }
        };
        if let Some(dotted) = find_dotted_circle(charmap, glyph_names) {
            let ascender = self.font.hhea().map(|hhea| hhea.ascender().to_i16()).unwrap_or(0);
            let fallback = DottedCircleFallback::new(&geometry, charmap, dotted, ascender);
            if let Some(stats) = fallback.apply(&mut gpos)? {
                report.record(
                    DOTTED_CIRCLE_FALLBACK,
                    format!("lookup {}: {} marks", stats.lookup_index, stats.marks),
                );
                changed = true;
            }
        }

        Ok(changed.then_some(gpos))
    }
}
