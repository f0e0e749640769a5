//! Output formatting module
//!
//! Provides the console report and machine-readable formats for verification runs.

mod formatter;

pub use formatter::{write_results_to_file, OutputFormat, ResultFormatter};
