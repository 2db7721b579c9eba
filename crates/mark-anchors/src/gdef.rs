//! Keep GDEF glyph classes in step with the combining marks in the cmap.

use std::collections::BTreeMap;

use font_types::GlyphId16;
use read_fonts::tables::gdef::{Gdef, GlyphClassDef};
use write_fonts::{from_obj::ToOwnedTable, tables::layout::ClassDef};

use crate::{Result, charmap::CharMap};

const MARK_CLASS: u16 = GlyphClassDef::Mark as u16;

/// Give every mapped combining mark glyph class 3 (mark).
///
/// Returns the rewritten table and the number of glyphs reclassified, or
/// `None` when the table has no glyph class definition or nothing changed.
pub fn sync_mark_classes(
    gdef: &Gdef,
    charmap: &CharMap,
) -> Result<Option<(write_fonts::tables::gdef::Gdef, usize)>> {
    let Some(class_def) = gdef.glyph_class_def().transpose()? else {
        return Ok(None);
    };
    let mut classes: BTreeMap<GlyphId16, u16> = class_def.iter().collect();

    let mut changed = 0;
    for (_, glyph) in charmap.combining_marks() {
        if classes.insert(glyph, MARK_CLASS) != Some(MARK_CLASS) {
            changed += 1;
        }
    }
    if changed == 0 {
        return Ok(None);
    }

    let mut owned: write_fonts::tables::gdef::Gdef = gdef.to_owned_table();
    owned.glyph_class_def = Some(ClassDef::from_iter(classes)).into();
    Ok(Some((owned, changed)))
}
