//! Unicode to glyph mapping with a reverse index.

use std::collections::{BTreeMap, HashMap};

use read_fonts::{FontRef, types::GlyphId16};
use skrifa::MetadataProvider;

use crate::classify::is_combining;

/// The font's best Unicode cmap, keyed both ways.
#[derive(Debug, Clone, Default)]
pub struct CharMap {
    glyphs: BTreeMap<u32, GlyphId16>,
    codepoints: HashMap<GlyphId16, u32>,
}

impl CharMap {
    pub fn from_font(font: &FontRef) -> Self {
        Self::from_mappings(font.charmap().mappings().filter_map(|(cp, gid)| {
            u16::try_from(gid.to_u32()).ok().map(|gid| (cp, GlyphId16::new(gid)))
        }))
    }

    /// Build from `(codepoint, glyph)` pairs.
    ///
    /// When several codepoints map to one glyph, the highest codepoint is the
    /// glyph's reverse mapping.
    pub fn from_mappings(mappings: impl IntoIterator<Item = (u32, GlyphId16)>) -> Self {
        let glyphs: BTreeMap<u32, GlyphId16> = mappings.into_iter().collect();
        let codepoints = glyphs.iter().map(|(&cp, &gid)| (gid, cp)).collect();
        Self { glyphs, codepoints }
    }

    pub fn glyph(&self, codepoint: u32) -> Option<GlyphId16> {
        self.glyphs.get(&codepoint).copied()
    }

    pub fn codepoint(&self, gid: GlyphId16) -> Option<u32> {
        self.codepoints.get(&gid).copied()
    }

    /// Whether any codepoint maps to this glyph.
    pub fn is_mapped(&self, gid: GlyphId16) -> bool {
        self.codepoints.contains_key(&gid)
    }

    /// All mappings in codepoint order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, GlyphId16)> + '_ {
        self.glyphs.iter().map(|(&cp, &gid)| (cp, gid))
    }

    /// Mappings whose codepoint is a combining mark, in codepoint order.
    pub fn combining_marks(&self) -> impl Iterator<Item = (u32, GlyphId16)> + '_ {
        self.iter().filter(|&(cp, _)| is_combining(cp))
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
