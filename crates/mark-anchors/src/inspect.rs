//! Read-only view of the anchors a font provides for one mark/base pair.

use read_fonts::{FontRef, ReadError, TableProvider};
use write_fonts::{from_obj::ToOwnedTable, tables::gpos::Gpos};

use crate::{
    Result,
    charmap::CharMap,
    gpos::{all_mark_base_subtables, anchor_pair, anchor_x, anchor_y},
};

/// Anchors of one MarkToBase subtable that pairs a mark with a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPairing {
    pub lookup_index: usize,
    pub mark: (i16, i16),
    pub base: (i16, i16),
}

/// Every subtable pairing the glyphs of `mark` and `base` (codepoints).
///
/// Empty when either codepoint is unmapped or the font has no GPOS.
pub fn inspect_anchors(font: &FontRef, mark: u32, base: u32) -> Result<Vec<AnchorPairing>> {
    let charmap = CharMap::from_font(font);
    let (Some(mark), Some(base)) = (charmap.glyph(mark), charmap.glyph(base)) else {
        return Ok(Vec::new());
    };
    let gpos: Gpos = match font.gpos() {
        Ok(gpos) => gpos.to_owned_table(),
        Err(ReadError::TableIsMissing(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    Ok(all_mark_base_subtables(&gpos)
        .filter_map(|(lookup_index, subtable)| {
            let (mark_anchor, base_anchor) = anchor_pair(subtable, mark, base)?;
            Some(AnchorPairing {
                lookup_index,
                mark: (anchor_x(mark_anchor), anchor_y(mark_anchor)),
                base: (anchor_x(base_anchor), anchor_y(base_anchor)),
            })
        })
        .collect())
}
