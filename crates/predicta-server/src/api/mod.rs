pub mod response;

use crate::{
    config::{Config, CorsConfig},
    features, middleware,
    processing::{always_succeeds, OutcomeScheduler, ProcessingOutcome, ProcessingService, TokioScheduler},
    staging::StagingArea,
    store::{self, SharedFileStore},
};
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedFileStore,
    pub processing: ProcessingService,
    pub staging: StagingArea,
}

impl AppState {
    /// Wire the services around `store` with an explicit scheduler and outcome.
    pub fn new(
        config: &Config,
        store: SharedFileStore,
        scheduler: Arc<dyn OutcomeScheduler>,
        outcome: Arc<dyn ProcessingOutcome>,
    ) -> Self {
        let processing = ProcessingService::new(
            Arc::clone(&store),
            scheduler,
            outcome,
            Duration::from_secs(config.processing.delay_secs),
        );
        let staging = StagingArea::new(&config.intake.upload_dir, config.intake.max_upload_bytes);

        Self { store, processing, staging }
    }

    /// Production wiring: timers on the tokio runtime, every run succeeds.
    pub fn with_defaults(config: &Config, store: SharedFileStore) -> Self {
        Self::new(config, store, Arc::new(TokioScheduler::new()), always_succeeds())
    }
}

/// Connect the store, prepare staging, and serve until a shutdown signal.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = store::connect(&config.storage).await?;
    let state = AppState::with_defaults(&config, store);

    state.staging.prepare().await.with_context(|| {
        format!("Failed to create upload directory {}", state.staging.dir().display())
    })?;

    let app = create_router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .into_future(),
    );

    tokio::select! {
        result = &mut server => return Ok(result??),
        _ = shutdown_signal() => {},
    }

    let _ = stop_tx.send(true);
    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    info!("Waiting up to {} seconds for connections to close", grace.as_secs());

    match tokio::time::timeout(grace, server).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!("Shutdown grace period elapsed with connections still open"),
    }

    info!("Server shut down gracefully");
    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let feature_state = features::FeatureState {
        store: Arc::clone(&state.store),
        processing: state.processing.clone(),
        staging: state.staging.clone(),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .nest("/api", features::router(feature_state))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Predicta Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(state): State<AppState>) -> Response {
    let backend = state.store.backend();
    match state.store.health().await {
        Ok(()) => {
            (StatusCode::OK, Json(json!({ "status": "healthy", "storage": backend }))).into_response()
        },
        Err(e) => {
            tracing::error!("Storage health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "storage": backend })),
            )
                .into_response()
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
