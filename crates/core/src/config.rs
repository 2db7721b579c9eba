//! Configuration constants for Iosevka Charon post-processing.

use read_fonts::types::Tag;

pub use charon_font_metadata::targets;
pub use mark_anchors::AnchorConfig;

/// Bulk mode input root; fonts sit at `<root>/<plan>/ttf/<font>.ttf`.
pub const BULK_INPUT_DIR: &str = "unprocessed_fonts";

/// Bulk mode output root, wiped at the start of every bulk run.
pub const BULK_OUTPUT_DIR: &str = "fonts";

/// Pattern matched under the bulk input root.
pub const FONT_GLOB: &str = "**/*.ttf";

/// Tables removed from every processed font.
pub const UNWANTED_TABLES: [Tag; 3] = [Tag::new(b"DSIG"), Tag::new(b"FFTM"), Tag::new(b"prop")];

/// Style spellings rewritten in bulk output file names.
pub const FILENAME_REPLACEMENTS: [(&str, &str); 3] =
    [("ExtraBold", "Extrabold"), ("ExtraLight", "Extralight"), ("SemiBold", "Semibold")];
