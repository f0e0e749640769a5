//! Data models for API contract verification
//!
//! Check results, run summaries, and the run-scoped state shared between checks.

mod check_result;
mod state;

pub use check_result::{CheckGroup, CheckResult, RunSummary};
pub use state::{DueCard, Prerequisite, RunState};
