//! API client module
//!
//! HTTP client for the Predicta server's `/api/files` surface.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::ApiClient;
pub use types::*;
