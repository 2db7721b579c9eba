//! Error types for mark anchor processing.

use std::result;

use read_fonts::ReadError;
use write_fonts::BuilderError;

/// Errors that can occur while repairing or synthesizing anchors.
///
/// Missing optional tables are not errors; they make the affected fix a no-op.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("lookup list is full, cannot append lookup {0}")]
    LookupListFull(usize),
}

pub type Result<T> = result::Result<T, Error>;
