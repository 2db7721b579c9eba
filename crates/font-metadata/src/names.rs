//! Name table strings: version, copyright, license, stale tool metadata.

use anyhow::Result;
use charon_font_ops::{optional_table, rewrite_font_if, rewrite_names, update_names};
use log::debug;
use read_fonts::TableProvider;
use write_fonts::{from_obj::ToOwnedTable, tables::head::Head, types::Fixed};

use crate::{
    FontContext,
    targets::{COPYRIGHT, FONT_REVISION, OFL_DESCRIPTION, OFL_URL, VERSION_STRING},
};

const NAME_ID_COPYRIGHT: u16 = 0;
const NAME_ID_VERSION: u16 = 5;
const NAME_ID_MANUFACTURER: u16 = 8;
const NAME_ID_DESIGNER: u16 = 9;
const NAME_ID_DESCRIPTION: u16 = 10;
const NAME_ID_LICENSE: u16 = 13;
const NAME_ID_LICENSE_URL: u16 = 14;

/// `head.fontRevision` 32.5 and name ID 5 `Version 32.5.0`.
pub fn fix_font_revision(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| {
        let mut changed = false;
        if let Some(head) = optional_table(font.head())? {
            let mut head: Head = head.to_owned_table();
            let revision = Fixed::from_f64(FONT_REVISION);
            if head.font_revision != revision {
                head.font_revision = revision;
                builder.add_table(&head)?;
                changed = true;
            }
        }
        changed |= update_names(font, builder, |names| {
            names.set_all(NAME_ID_VERSION, VERSION_STRING);
            Ok(())
        })?;
        Ok(changed)
    })
}

pub fn fix_copyright_notice(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_names(data, |_, names| {
        names.set_all(NAME_ID_COPYRIGHT, COPYRIGHT);
        Ok(())
    })
}

/// Drop manufacturer, designer and description records mentioning fontbakery.
pub fn fix_fontbakery_metadata(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_names(data, |_, names| {
        let removed = names.remove_where(|name_id, value| {
            matches!(name_id, NAME_ID_MANUFACTURER | NAME_ID_DESIGNER | NAME_ID_DESCRIPTION)
                && value.to_lowercase().contains("fontbakery")
        });
        if removed > 0 {
            debug!("removed {removed} fontbakery name records");
        }
        Ok(())
    })
}

/// OFL description (ID 13) and URL (ID 14) on both platforms.
pub fn fix_license_entries(data: &[u8], _ctx: &FontContext) -> Result<Option<Vec<u8>>> {
    rewrite_names(data, |_, names| {
        names.set_all(NAME_ID_LICENSE, OFL_DESCRIPTION);
        names.set_all(NAME_ID_LICENSE_URL, OFL_URL);
        Ok(())
    })
}
