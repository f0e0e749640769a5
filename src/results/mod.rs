//! Results storage module
//!
//! Persists verification runs and exports them as JSON or CSV.

mod storage;

pub use storage::{ExportFormat, ResultsStorage, StoredRun};
