//! Access to MarkToBase subtables and feature registration on an owned GPOS.

use std::collections::BTreeSet;

use font_types::GlyphId16;
use read_fonts::types::Tag;
use write_fonts::tables::{
    gpos::{AnchorTable, ExtensionSubtable, Gpos, MarkBasePosFormat1, PositionLookup},
    layout::{Feature, FeatureRecord, LangSys, Script, ScriptRecord},
};

use crate::{Error, Result};

pub const MARK_FEATURE: Tag = Tag::new(b"mark");
const DEFAULT_SCRIPT: Tag = Tag::new(b"DFLT");

/// MarkToBase subtables of a lookup, looking through extension lookups.
pub fn mark_base_subtables(lookup: &PositionLookup) -> Vec<&MarkBasePosFormat1> {
    match lookup {
        PositionLookup::MarkToBase(lookup) => lookup.subtables.iter().map(|s| &**s).collect(),
        PositionLookup::Extension(lookup) => lookup
            .subtables
            .iter()
            .filter_map(|s| match &**s {
                ExtensionSubtable::MarkToBase(ext) => Some(&*ext.extension),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Mutable counterpart of [`mark_base_subtables`].
pub fn mark_base_subtables_mut(lookup: &mut PositionLookup) -> Vec<&mut MarkBasePosFormat1> {
    match lookup {
        PositionLookup::MarkToBase(lookup) => {
            lookup.subtables.iter_mut().map(|s| &mut **s).collect()
        }
        PositionLookup::Extension(lookup) => lookup
            .subtables
            .iter_mut()
            .filter_map(|s| match &mut **s {
                ExtensionSubtable::MarkToBase(ext) => Some(&mut *ext.extension),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Every MarkToBase subtable in the lookup list, with its lookup index.
pub fn all_mark_base_subtables(gpos: &Gpos) -> impl Iterator<Item = (usize, &MarkBasePosFormat1)> {
    gpos.lookup_list
        .lookups
        .iter()
        .enumerate()
        .flat_map(|(i, lookup)| mark_base_subtables(lookup).into_iter().map(move |st| (i, st)))
}

/// Lookup indices referenced by any `mark` feature record.
pub fn mark_feature_lookups(gpos: &Gpos) -> BTreeSet<u16> {
    gpos.feature_list
        .feature_records
        .iter()
        .filter(|record| record.feature_tag == MARK_FEATURE)
        .flat_map(|record| record.feature.lookup_list_indices.iter().copied())
        .collect()
}

/// Glyphs already in the mark coverage of a MarkToBase subtable reachable from
/// the `mark` feature.
pub fn mark_feature_coverage(gpos: &Gpos) -> BTreeSet<GlyphId16> {
    let lookups = &gpos.lookup_list.lookups;
    mark_feature_lookups(gpos)
        .into_iter()
        .filter_map(|index| lookups.get(index as usize))
        .flat_map(|lookup| mark_base_subtables(lookup))
        .flat_map(|subtable| subtable.mark_coverage.iter().collect::<Vec<_>>())
        .collect()
}

/// Append a lookup to the lookup list, returning its index.
pub fn push_lookup(gpos: &mut Gpos, lookup: PositionLookup) -> Result<u16> {
    let lookups = &mut gpos.lookup_list.lookups;
    let index = u16::try_from(lookups.len()).map_err(|_| Error::LookupListFull(lookups.len()))?;
    lookups.push(lookup.into());
    Ok(index)
}

/// Add a lookup index to the first `mark` feature record.
///
/// With `create` set and no `mark` feature present, a new feature record is
/// appended and enabled in every language system. Returns whether the lookup
/// ended up registered.
pub fn register_mark_lookup(gpos: &mut Gpos, lookup_index: u16, create: bool) -> bool {
    let records = &mut gpos.feature_list.feature_records;
    if let Some(record) = records.iter_mut().find(|r| r.feature_tag == MARK_FEATURE) {
        record.feature.lookup_list_indices.push(lookup_index);
        return true;
    }
    if !create {
        return false;
    }
    let Ok(feature_index) = u16::try_from(records.len()) else {
        return false;
    };
    records.push(FeatureRecord::new(MARK_FEATURE, Feature::new(None, vec![lookup_index])));
    enable_feature(gpos, feature_index);
    true
}

/// Enable a feature index in every language system, creating a `DFLT` script
/// if the script list is empty.
fn enable_feature(gpos: &mut Gpos, feature_index: u16) {
    let scripts = &mut gpos.script_list.script_records;
    if scripts.is_empty() {
        let lang_sys = LangSys::new(vec![feature_index]);
        scripts.push(ScriptRecord::new(DEFAULT_SCRIPT, Script::new(Some(lang_sys), Vec::new())));
        return;
    }
    for record in scripts.iter_mut() {
        let script = &mut *record.script;
        if let Some(lang_sys) = Option::as_mut(&mut *script.default_lang_sys) {
            lang_sys.feature_indices.push(feature_index);
        }
        for lang_record in script.lang_sys_records.iter_mut() {
            lang_record.lang_sys.feature_indices.push(feature_index);
        }
    }
}

/// Y coordinate of an anchor, whatever its format.
pub fn anchor_y(anchor: &AnchorTable) -> i16 {
    match anchor {
        AnchorTable::Format1(a) => a.y_coordinate,
        AnchorTable::Format2(a) => a.y_coordinate,
        AnchorTable::Format3(a) => a.y_coordinate,
    }
}

pub fn anchor_x(anchor: &AnchorTable) -> i16 {
    match anchor {
        AnchorTable::Format1(a) => a.x_coordinate,
        AnchorTable::Format2(a) => a.x_coordinate,
        AnchorTable::Format3(a) => a.x_coordinate,
    }
}

/// Overwrite the Y coordinate of an anchor, keeping its format.
pub fn set_anchor_y(anchor: &mut AnchorTable, y: i16) {
    match anchor {
        AnchorTable::Format1(a) => a.y_coordinate = y,
        AnchorTable::Format2(a) => a.y_coordinate = y,
        AnchorTable::Format3(a) => a.y_coordinate = y,
    }
}

/// The mark and base anchors a subtable provides for `(mark, base)`, if any.
///
/// Requires both glyphs to be covered and the base record to have a non-null
/// anchor at the mark record's class.
pub fn anchor_pair<'a>(
    subtable: &'a MarkBasePosFormat1,
    mark: GlyphId16,
    base: GlyphId16,
) -> Option<(&'a AnchorTable, &'a AnchorTable)> {
    let mark_index = subtable.mark_coverage.iter().position(|g| g == mark)?;
    let base_index = subtable.base_coverage.iter().position(|g| g == base)?;
    let mark_record = subtable.mark_array.mark_records.get(mark_index)?;
    let base_record = subtable.base_array.base_records.get(base_index)?;
    let base_anchor = base_record.base_anchors.get(mark_record.mark_class as usize)?;
    Some((&*mark_record.mark_anchor, Option::as_ref(&**base_anchor)?))
}
