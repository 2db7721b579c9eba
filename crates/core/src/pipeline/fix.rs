//! Per-font processing: compliance fixes, anchor fixes, table removal.

use std::path::Path;

use anyhow::{Context, Result};
use charon_font_metadata::{FontContext, METADATA_FIXES};
use charon_font_ops::{drop_tables, glyph_names, rewrite_font_if};
use log::info;
use mark_anchors::{AnchorConfig, AnchorReport, MarkAnchorFixer};
use read_fonts::FontRef;

use crate::{config::UNWANTED_TABLES, io::FontFile};

/// A processed font and the names of the fixes that changed it, in run order.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub data: Vec<u8>,
    pub fixes: Vec<String>,
}

/// Run every fix over one font in memory.
pub fn fix_font_data(data: &[u8], ctx: &FontContext, anchors: &AnchorConfig) -> Result<FixOutcome> {
    // Names are read before `post` goes to version 3; glyph order never changes.
    let names = glyph_names(&FontRef::new(data).context("Failed to parse font")?);
    let mut data = data.to_vec();
    let mut fixes = Vec::new();

    for (name, fix) in METADATA_FIXES {
        if let Some(fixed) = fix(&data, ctx).with_context(|| format!("{name} failed"))? {
            data = fixed;
            fixes.push(name.to_string());
        }
    }

    let mut report = AnchorReport::default();
    let fixed = rewrite_font_if(&data, |font, builder| {
        let anchor_fixes = MarkAnchorFixer::new(font, anchors).with_glyph_names(&names).run()?;
        anchor_fixes.write_into(builder)?;
        report = anchor_fixes.report;
        Ok(anchor_fixes.gpos.is_some() || anchor_fixes.gdef.is_some())
    })
    .context("anchor fixes failed")?;
    if let Some(fixed) = fixed {
        data = fixed;
    }
    fixes.extend(report.fired().map(str::to_string));

    if let Some((stripped, removed)) = drop_tables(&data, &UNWANTED_TABLES)? {
        let removed: Vec<String> = removed.iter().map(ToString::to_string).collect();
        info!("removed unwanted tables: {}", removed.join(", "));
        fixes.push(format!("removed_tables({})", removed.join(",")));
        data = stripped;
    }

    Ok(FixOutcome { data, fixes })
}

/// Fix the font at `input` and write it to `output`, which may be the same
/// path. Returns the fired fixes.
pub fn process_font(input: &Path, output: &Path, anchors: &AnchorConfig) -> Result<Vec<String>> {
    let data = FontFile::new(input).read()?;
    let ctx = FontContext::from_path(input);
    let outcome = fix_font_data(&data, &ctx, anchors)
        .with_context(|| format!("Failed to process {}", input.display()))?;
    FontFile::new(output).write(&outcome.data)?;

    let fixes = if outcome.fixes.is_empty() { "none".to_string() } else { outcome.fixes.join(", ") };
    info!("{} -> {}: {fixes}", ctx.file_name, output.display());
    Ok(outcome.fixes)
}
