//! Charon Core - the post-processing pipeline for Iosevka Charon fonts.
//!
//! Each font runs through the compliance fixes, then the mark anchor fixes,
//! then unwanted table removal, and is written back out.

pub mod config;
pub mod io;
pub mod parallel;
pub mod pipeline;

pub use charon_font_metadata::FontContext;
pub use config::AnchorConfig;
pub use io::{FontFile, glob_fonts};
pub use mark_anchors::{AnchorPairing, inspect_anchors};
pub use parallel::BatchResult;
pub use pipeline::{
    FixOutcome, bulk_output_path, bulk_process, fix_files, fix_font_data, process_font,
};
