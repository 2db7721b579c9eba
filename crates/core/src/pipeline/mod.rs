mod bulk;
mod clean;
mod fix;

pub use bulk::{bulk_output_path, bulk_process, fix_files};
pub use clean::reset_output_dir;
pub use fix::{FixOutcome, fix_font_data, process_font};
