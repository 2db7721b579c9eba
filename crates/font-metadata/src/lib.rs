//! Google Fonts compliance fixes for Iosevka Charon (names, metrics, style
//! bits, glyph widths).
//!
//! Every fix has the [`MetadataFix`] signature: it takes the font bytes and a
//! [`FontContext`] and returns the rewritten font, or `None` when the font
//! already complies.

use std::path::Path;

use anyhow::Result;

pub mod glyphs;
pub mod metrics;
pub mod names;
pub mod style;
pub mod targets;

pub use glyphs::{fix_dotted_circle, fix_zero_width_glyphs, strip_glyph_names};
pub use metrics::{fix_panose_monospace, fix_vertical_metrics, fix_windows_metrics};
pub use names::{
    fix_copyright_notice, fix_font_revision, fix_fontbakery_metadata, fix_license_entries,
};
pub use style::{StyleNames, Weight, fix_font_names, fix_style_bits};

/// Per-font information that is not stored in the font itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontContext {
    /// Source file name, e.g. `IosevkaCharonMono-SemiBoldItalic.ttf`.
    pub file_name: String,
}

impl FontContext {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into() }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default())
    }

    /// File name without its extension.
    pub fn file_stem(&self) -> &str {
        self.file_name.rsplit_once('.').map_or(&self.file_name, |(stem, _)| stem)
    }
}

pub type MetadataFix = fn(&[u8], &FontContext) -> Result<Option<Vec<u8>>>;

/// All metadata fixes in the order they are applied, with their report names.
pub const METADATA_FIXES: [(&str, MetadataFix); 12] = [
    ("font_revision", fix_font_revision),
    ("copyright_notice", fix_copyright_notice),
    ("windows_metrics", fix_windows_metrics),
    ("vertical_metrics", fix_vertical_metrics),
    ("fontbakery_metadata", fix_fontbakery_metadata),
    ("zero_width_glyphs", fix_zero_width_glyphs),
    ("font_names", fix_font_names),
    ("dotted_circle", fix_dotted_circle),
    ("panose_monospace", fix_panose_monospace),
    ("license_entries", fix_license_entries),
    ("style_bits", fix_style_bits),
    ("stripped_glyph_names", strip_glyph_names),
];
