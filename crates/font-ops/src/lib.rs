//! Generic font table manipulation utilities.

use anyhow::Result;
use read_fonts::{
    FontRef, ReadError, TableProvider,
    types::{GlyphId16, NameId, Tag},
};
use write_fonts::{
    FontBuilder,
    tables::name::{Name, NameRecord},
};

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// The function receives a reference to the source font and a mutable builder
/// that already contains all original tables.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Like [`rewrite_font`], but the transformation decides whether anything changed.
///
/// Returns `None` (and skips serialization) when `f` returns `false`.
pub fn rewrite_font_if(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<bool>,
) -> Result<Option<Vec<u8>>> {
    let mut changed = false;
    let rewritten = rewrite_font(data, |font, builder| {
        changed = f(font, builder)?;
        Ok(())
    })?;
    Ok(changed.then_some(rewritten))
}

/// Remove the given tables from a font.
///
/// Returns the new font data and the tags that were actually present, or `None`
/// if the font contained none of them.
pub fn drop_tables(data: &[u8], tags: &[Tag]) -> Result<Option<(Vec<u8>, Vec<Tag>)>> {
    let font = FontRef::new(data)?;
    let mut builder = FontBuilder::new();
    let mut removed = Vec::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if tags.contains(&tag) {
            removed.push(tag);
            continue;
        }
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    if removed.is_empty() {
        return Ok(None);
    }
    Ok(Some((builder.build(), removed)))
}

/// Treat a missing table as `None`; other read errors are returned.
pub fn optional_table<T>(table: std::result::Result<T, ReadError>) -> Result<Option<T>> {
    match table {
        Ok(table) => Ok(Some(table)),
        Err(ReadError::TableIsMissing(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Edit the `name` table, rewriting the font only if a record changed.
pub fn rewrite_names(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut NameRecords) -> Result<()>,
) -> Result<Option<Vec<u8>>> {
    rewrite_font_if(data, |font, builder| update_names(font, builder, |names| f(font, names)))
}

/// Apply `f` to the font's name records and add the resulting `name` table to
/// `builder` if anything changed. Returns whether it did.
pub fn update_names(
    font: &FontRef,
    builder: &mut FontBuilder,
    f: impl FnOnce(&mut NameRecords) -> Result<()>,
) -> Result<bool> {
    let original = NameRecords::from_font(font)?;
    let mut names = original.clone();
    f(&mut names)?;
    if names == original {
        return Ok(false);
    }
    builder.add_table(&names.into_table())?;
    Ok(true)
}

/// Glyph names in glyph order.
///
/// Names come from the `post` table when it carries them; glyphs without a
/// stored name get a synthetic `glyphNNNNN` name.
pub fn glyph_names(font: &FontRef) -> Vec<String> {
    let num_glyphs = font.maxp().map(|maxp| maxp.num_glyphs()).unwrap_or(0);
    let post = font.post().ok();

    (0..num_glyphs)
        .map(|gid| {
            post.as_ref()
                .and_then(|post| post.glyph_name(GlyphId16::new(gid)))
                .map(str::to_string)
                .unwrap_or_else(|| format!("glyph{gid:05}"))
        })
        .collect()
}

/// A `(platform, encoding, language)` triple addressing name records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamePlatform {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
}

impl NamePlatform {
    /// Windows, Unicode BMP, English (United States).
    pub const WINDOWS_ENGLISH: Self = Self { platform_id: 3, encoding_id: 1, language_id: 0x409 };
    /// Macintosh, Roman, English.
    pub const MAC_ROMAN: Self = Self { platform_id: 1, encoding_id: 0, language_id: 0 };
    /// The two platforms every compliance string is written to.
    pub const ALL: [Self; 2] = [Self::WINDOWS_ENGLISH, Self::MAC_ROMAN];

    fn matches(&self, record: &NameRecord) -> bool {
        record.platform_id == self.platform_id
            && record.encoding_id == self.encoding_id
            && record.language_id == self.language_id
    }
}

/// An editable copy of a font's name records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRecords {
    records: Vec<NameRecord>,
}

impl NameRecords {
    /// Read all decodable name records from a font. A font without a `name`
    /// table has no records.
    pub fn from_font(font: &FontRef) -> Result<Self> {
        let Some(name) = optional_table(font.name())? else {
            return Ok(Self::default());
        };
        let records = name
            .name_record()
            .iter()
            .filter_map(|record| {
                let value: String = record.string(name.string_data()).ok()?.chars().collect();
                Some(NameRecord::new(
                    record.platform_id(),
                    record.encoding_id(),
                    record.language_id(),
                    NameId::new(record.name_id().to_u16()),
                    value.into(),
                ))
            })
            .collect();
        Ok(Self { records })
    }

    /// Look up the string for a name ID on one platform.
    pub fn get(&self, name_id: u16, platform: NamePlatform) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.name_id.to_u16() == name_id && platform.matches(r))
            .map(|r| r.string.as_str())
    }

    /// Insert or replace the record for a name ID on one platform.
    pub fn set(&mut self, name_id: u16, platform: NamePlatform, value: &str) {
        match self
            .records
            .iter_mut()
            .find(|r| r.name_id.to_u16() == name_id && platform.matches(r))
        {
            Some(record) => *record.string = value.to_string(),
            None => self.records.push(NameRecord::new(
                platform.platform_id,
                platform.encoding_id,
                platform.language_id,
                NameId::new(name_id),
                value.to_string().into(),
            )),
        }
    }

    /// Insert or replace the record for a name ID on every platform in [`NamePlatform::ALL`].
    pub fn set_all(&mut self, name_id: u16, value: &str) {
        for platform in NamePlatform::ALL {
            self.set(name_id, platform, value);
        }
    }

    /// Remove every record for which `pred(name_id, value)` holds.
    ///
    /// Returns the number of records removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(u16, &str) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !pred(r.name_id.to_u16(), r.string.as_str()));
        before - self.records.len()
    }

    /// Build a `name` table, with records in the order the format requires.
    pub fn into_table(mut self) -> Name {
        self.records.sort_by_key(|r| {
            (r.platform_id, r.encoding_id, r.language_id, r.name_id.to_u16())
        });
        Name::new(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_tables_absent() {
        let data = font_test_data::CMAP12_FONT1;
        let result = drop_tables(data, &[Tag::new(b"DSIG")]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_drop_tables_present() {
        let data = font_test_data::CMAP12_FONT1;
        let (dropped, removed) = drop_tables(data, &[Tag::new(b"cmap")]).unwrap().unwrap();
        assert_eq!(removed, vec![Tag::new(b"cmap")]);
        let font = FontRef::new(&dropped).unwrap();
        assert!(font.table_data(Tag::new(b"cmap")).is_none());
    }

    #[test]
    fn test_optional_table() {
        let font = FontRef::new(font_test_data::CMAP12_FONT1).unwrap();
        assert!(optional_table(font.cmap()).unwrap().is_some());
        assert!(optional_table(font.gpos()).unwrap().is_none());
    }

    #[test]
    fn test_rewrite_font_if_unchanged() {
        let data = font_test_data::CMAP12_FONT1;
        let result = rewrite_font_if(data, |_, _| Ok(false)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_rewrite_names_only_on_change() {
        let data = font_test_data::CMAP12_FONT1;
        let unchanged = rewrite_names(data, |_, _| Ok(())).unwrap();
        assert!(unchanged.is_none());

        let changed = rewrite_names(data, |_, names| {
            names.set_all(13, "licensed");
            Ok(())
        })
        .unwrap()
        .unwrap();
        let font = FontRef::new(&changed).unwrap();
        let names = NameRecords::from_font(&font).unwrap();
        assert_eq!(names.get(13, NamePlatform::MAC_ROMAN), Some("licensed"));
    }

    #[test]
    fn test_name_records_set_and_get() {
        let mut names = NameRecords::default();
        names.set_all(13, "licensed");
        names.set(13, NamePlatform::WINDOWS_ENGLISH, "relicensed");

        assert_eq!(names.get(13, NamePlatform::WINDOWS_ENGLISH), Some("relicensed"));
        assert_eq!(names.get(13, NamePlatform::MAC_ROMAN), Some("licensed"));
        assert_eq!(names.get(14, NamePlatform::MAC_ROMAN), None);
    }

    #[test]
    fn test_name_records_remove_where() {
        let mut names = NameRecords::default();
        names.set_all(8, "Built with FontBakery");
        names.set_all(9, "Belleve Invis");

        let removed = names.remove_where(|id, value| {
            id == 8 && value.to_lowercase().contains("fontbakery")
        });
        assert_eq!(removed, 2);
        assert_eq!(names.get(9, NamePlatform::WINDOWS_ENGLISH), Some("Belleve Invis"));
    }
}
