//! Batch modes: explicit files, and the bulk tree of plan directories.

use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::info;
use mark_anchors::AnchorConfig;

use super::{clean::reset_output_dir, fix::process_font};
use crate::{
    config::{FILENAME_REPLACEMENTS, FONT_GLOB},
    io::glob_fonts,
    parallel::{BatchResult, run_parallel, run_sequential},
};

/// Where bulk mode writes a font found at `<input>/<plan>/ttf/<file>`:
/// `<output>/<plan lowercased, spaces removed>/<file with style spellings
/// normalized>`.
pub fn bulk_output_path(font: &Path, output_root: &Path) -> PathBuf {
    let plan = font
        .parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_lowercase().replace(' ', ""))
        .unwrap_or_default();
    let mut file_name =
        font.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    for (from, to) in FILENAME_REPLACEMENTS {
        file_name = file_name.replace(from, to);
    }
    output_root.join(plan).join(file_name)
}

/// Process every TTF under `input_dir` into a freshly wiped `output_dir`.
pub fn bulk_process(
    input_dir: &Path,
    output_dir: &Path,
    anchors: &AnchorConfig,
) -> Result<BatchResult> {
    let fonts = glob_fonts(input_dir, FONT_GLOB)?;
    if fonts.is_empty() {
        bail!("No TTF files found in {}", input_dir.display());
    }
    reset_output_dir(output_dir)?;

    info!(
        "Bulk processing {} fonts using {} workers",
        fonts.len(),
        rayon::current_num_threads()
    );
    Ok(run_parallel(&fonts, |font| {
        process_font(font, &bulk_output_path(font, output_dir), anchors).map(|_| ())
    }))
}

/// Process the given files, in place or into `output_dir`.
pub fn fix_files(
    fonts: &[PathBuf],
    output_dir: Option<&Path>,
    parallel: bool,
    anchors: &AnchorConfig,
) -> Result<BatchResult> {
    if let Some(dir) = output_dir {
        create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let op = |font: &Path| {
        let output = match (output_dir, font.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => font.to_path_buf(),
        };
        process_font(font, &output, anchors).map(|_| ())
    };

    if parallel && fonts.len() > 1 {
        info!("Processing {} fonts in parallel", fonts.len());
        Ok(run_parallel(fonts, op))
    } else {
        Ok(run_sequential(fonts, op))
    }
}
