//! HTTP client module for API contract checks

mod client;

pub use client::{HttpClient, HttpRequest};
