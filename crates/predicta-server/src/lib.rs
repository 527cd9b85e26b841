//! Predicta Server Library
//!
//! HTTP server that ingests dataset files (CSV, Excel, JSON), stores them,
//! extracts lightweight metadata, and moves each file through an
//! asynchronous processing lifecycle.
//!
//! # Overview
//!
//! - **Intake**: multipart uploads are streamed to a staging file, validated
//!   (presence, MIME type, size) and persisted
//! - **Metadata**: CSV uploads get row count, column count and header names
//! - **File store**: PostgreSQL via SQLx, or an in-memory store for tests
//! - **Processing**: `uploaded → processing → processed | error`, completed
//!   by a deferred job after a configurable delay
//!
//! # Architecture
//!
//! Routes live in feature slices (`features/files`) split into commands
//! (upload, delete, start processing) and queries (list, get, download).
//! Each command or query validates its input and talks to the
//! [`store::FileStore`] trait or the [`processing::ProcessingService`].
//!
//! # Example
//!
//! ```no_run
//! use predicta_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod features;
pub mod metadata;
pub mod middleware;
pub mod processing;
pub mod staging;
pub mod store;

pub use api::{create_router, AppState};
pub use config::Config;
