//! CLI command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use charon_core::{AnchorConfig, BatchResult, FontFile, bulk_process, fix_files};
use log::info;
use read_fonts::FontRef;

pub fn fix(
    fonts: &[PathBuf],
    output_dir: Option<&Path>,
    parallel: bool,
    anchors: &AnchorConfig,
) -> Result<()> {
    info!("Fixing {} font(s)", fonts.len());
    let result = fix_files(fonts, output_dir, parallel, anchors)?;
    report(&result)
}

pub fn bulk(input_dir: &Path, output_dir: &Path, anchors: &AnchorConfig) -> Result<()> {
    info!("Processing {} into {}", input_dir.display(), output_dir.display());
    let result = bulk_process(input_dir, output_dir, anchors)?;
    report(&result)
}

fn report(result: &BatchResult) -> Result<()> {
    if !result.all_succeeded() {
        println!("Failed fonts:");
        for path in &result.failed {
            println!("  - {}", path.display());
        }
    }
    println!("Processed {}/{} fonts successfully", result.succeeded, result.total());
    result.ok_or_bail("Post-processing")
}

pub fn inspect_anchors(font: &Path, mark: u32, base: u32) -> Result<()> {
    let data = FontFile::new(font).read()?;
    let font_ref = FontRef::new(&data)
        .with_context(|| format!("Failed to parse font: {}", font.display()))?;
    let pairings = charon_core::inspect_anchors(&font_ref, mark, base)?;

    if pairings.is_empty() {
        println!("No mark-to-base subtable pairs U+{mark:04X} with U+{base:04X}");
        return Ok(());
    }
    for pairing in pairings {
        println!(
            "lookup {}: mark U+{mark:04X} anchor y={}, base U+{base:04X} anchor y={} (mark x={}, base x={})",
            pairing.lookup_index, pairing.mark.1, pairing.base.1, pairing.mark.0, pairing.base.0,
        );
    }
    Ok(())
}
