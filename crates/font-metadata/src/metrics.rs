//! Vertical metrics and PANOSE.

use anyhow::Result;
use charon_font_ops::{optional_table, rewrite_font_if};
use font_types::FWord;
use read_fonts::TableProvider;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        hhea::Hhea,
        os2::{Os2, SelectionFlags},
    },
};

use crate::{
    FontContext,
    targets::{
        HHEA_ASCENDER, HHEA_DESCENDER, HHEA_LINE_GAP, PANOSE_MONOSPACED, WIN_ASCENT, WIN_DESCENT,
    },
};

/// Index of `bProportion` in the PANOSE bytes.
const PANOSE_PROPORTION: usize = 3;

/// Rewrite OS/2 through `f`, adding it to the font if it changed.
fn edit_os2(data: &[u8], f: impl FnOnce(&mut Os2)) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let Some(os2) = optional_table(font.os2())? else {
            return Ok(false);
        };
        let original: Os2 = os2.to_owned_table();
        let mut os2 = original.clone();
        f(&mut os2);
        if os2 == original {
            return Ok(false);
        }
        builder.add_table(&os2)?;
        Ok(true)
    })
}

/// `usWinAscent`/`usWinDescent` large enough to avoid clipping.
pub fn fix_windows_metrics(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    edit_os2(data, |os2| {
        os2.us_win_ascent = WIN_ASCENT;
        os2.us_win_descent = WIN_DESCENT;
    })
}

/// hhea line metrics, mirrored into the OS/2 typo metrics with
/// `USE_TYPO_METRICS` set.
pub fn fix_vertical_metrics(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let mut changed = false;

        if let Some(hhea) = optional_table(font.hhea())? {
            let original: Hhea = hhea.to_owned_table();
            let mut hhea = original.clone();
            hhea.ascender = FWord::new(HHEA_ASCENDER);
            hhea.descender = FWord::new(HHEA_DESCENDER);
            hhea.line_gap = FWord::new(HHEA_LINE_GAP);
            if hhea != original {
                builder.add_table(&hhea)?;
                changed = true;
            }
        }

        if let Some(os2) = optional_table(font.os2())? {
            let original: Os2 = os2.to_owned_table();
            let mut os2 = original.clone();
            os2.s_typo_ascender = HHEA_ASCENDER;
            os2.s_typo_descender = HHEA_DESCENDER;
            os2.s_typo_line_gap = HHEA_LINE_GAP;
            os2.fs_selection.insert(SelectionFlags::USE_TYPO_METRICS);
            if os2 != original {
                builder.add_table(&os2)?;
                changed = true;
            }
        }

        Ok(changed)
    })
}

pub fn fix_panose_monospace(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    edit_os2(data, |os2| os2.panose_10[PANOSE_PROPORTION] = PANOSE_MONOSPACED)
}
