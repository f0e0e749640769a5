//! Check execution engine
//!
//! Runs endpoint checks strictly one after another against a single API base.

mod runner;

#[cfg(test)]
pub(crate) mod stub_api;

pub use runner::{ContractVerifier, EndpointCheck, Passed};
