//! Feature modules implementing the Predicta API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes:
//! - `commands/` - Write operations (upload, delete, start processing)
//! - `queries/` - Read operations (list, get, download)
//! - `routes.rs` - HTTP route definitions and error mapping

pub mod files;

use crate::{processing::ProcessingService, staging::StagingArea, store::SharedFileStore};
use axum::Router;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Durable file records
    pub store: SharedFileStore,
    /// Status transitions and deferred completion
    pub processing: ProcessingService,
    /// Where upload bodies are written while they stream in
    pub staging: StagingArea,
}

/// Creates the API router with all feature routes mounted
///
/// - `/files` - Dataset upload, retrieval, deletion and processing
pub fn router(state: FeatureState) -> Router<()> {
    let max_upload_bytes = state.staging.max_bytes();
    Router::new().nest("/files", files::files_routes(max_upload_bytes).with_state(state))
}
