use std::{
    fs::{create_dir_all, remove_dir_all},
    path::Path,
};

use anyhow::{Context, Result};
use log::info;

/// Remove `dir` if it exists and create it empty.
pub fn reset_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        info!("Cleaning existing output directory: {}", dir.display());
        remove_dir_all(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
    }
    create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}
