pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{cog_output_path, grib2_output_path, mask_output_path, strip_source_suffixes};
pub use progress::ProgressReporter;
