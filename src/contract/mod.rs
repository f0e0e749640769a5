//! Endpoint contracts for the tutoring API
//!
//! A declarative table maps each checked endpoint to its expected status and response
//! shape; `validate` applies those rules to a decoded JSON body.

mod endpoints;
mod shape;

pub use endpoints::{BodyKind, Endpoint, ExpectedStatus};
pub use shape::validate;
