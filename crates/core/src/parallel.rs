//! Batch file processing, sequential or across all cores.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use log::error;
use rayon::prelude::*;

/// Result of a batch operation.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: usize,
    /// Inputs that failed, in input order.
    pub failed: Vec<PathBuf>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if !self.failed.is_empty() {
            bail!(
                "{operation} failed: {} succeeded, {} failed",
                self.succeeded,
                self.failed.len()
            );
        }
        Ok(())
    }

    fn collect(results: impl IntoIterator<Item = (PathBuf, Result<()>)>) -> Self {
        let mut batch = Self::default();
        for (path, result) in results {
            match result {
                Ok(()) => batch.succeeded += 1,
                Err(e) => {
                    error!("{}: {e:?}", path.display());
                    batch.failed.push(path);
                }
            }
        }
        batch
    }
}

/// Run `op` on every path, one after another.
pub fn run_sequential<T, F>(items: &[T], op: F) -> BatchResult
where
    T: AsRef<Path>,
    F: Fn(&Path) -> Result<()>,
{
    BatchResult::collect(items.iter().map(|item| {
        let path = item.as_ref();
        (path.to_path_buf(), op(path))
    }))
}

/// Run `op` on every path in parallel. A failure never stops the other items.
pub fn run_parallel<T, F>(items: &[T], op: F) -> BatchResult
where
    T: AsRef<Path> + Sync,
    F: Fn(&Path) -> Result<()> + Sync,
{
    let results: Vec<_> = items
        .par_iter()
        .map(|item| {
            let path = item.as_ref();
            (path.to_path_buf(), op(path))
        })
        .collect();
    BatchResult::collect(results)
}
