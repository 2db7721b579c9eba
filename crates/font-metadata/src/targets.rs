//! Target values the compliance fixes write.

/// `head.fontRevision`.
pub const FONT_REVISION: f64 = 32.5;
/// Name ID 5.
pub const VERSION_STRING: &str = "Version 32.5.0";

pub const COPYRIGHT: &str =
    "Copyright 2015-2025 The Iosevka Project Authors (https://github.com/be5invis/Iosevka)";

pub const OFL_DESCRIPTION: &str = "This Font Software is licensed under the SIL Open Font License, Version 1.1. This license is available with a FAQ at: https://openfontlicense.org";
pub const OFL_URL: &str = "https://openfontlicense.org";

// Win metrics cover every glyph; hhea and typo metrics set the line spacing.
pub const WIN_ASCENT: u16 = 1198;
pub const WIN_DESCENT: u16 = 604;
pub const HHEA_ASCENDER: i16 = 1015;
pub const HHEA_DESCENDER: i16 = -265;
pub const HHEA_LINE_GAP: i16 = 0;

/// PANOSE proportion value for monospaced fonts.
pub const PANOSE_MONOSPACED: u8 = 9;

pub const FAMILY: &str = "Iosevka Charon";
pub const FAMILY_MONO: &str = "Iosevka Charon Mono";

/// Private use glyphs that ship with a zero advance but must have one.
pub const ZERO_WIDTH_PUA_GLYPHS: [&str; 7] =
    ["uniEF06", "uniEF07", "uniEF08", "uniEF09", "uniEF0A", "uniEF0B", "uniEF0C"];

/// Advance used when neither `space` nor any nonzero advance exists.
pub const FALLBACK_ADVANCE: u16 = 500;

/// Glyphs U+25CC may be mapped to when the font has no dotted circle, by name
/// and by codepoint, in order of preference.
pub const DOTTED_CIRCLE_PLACEHOLDERS: [(&str, u32); 3] =
    [("space", 0x20), ("period", 0x2E), ("uni00A0", 0xA0)];
