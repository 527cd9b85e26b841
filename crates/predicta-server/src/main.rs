//! Predicta Server - Main entry point

use anyhow::Result;
use predicta_common::logging::{init_logging, LogConfig};
use tracing::info;

use predicta_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("predicta-server")
        .filter_directives("predicta_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!("Starting Predicta Server");

    let config = Config::load()?;
    info!(
        storage = if config.storage.is_memory() { "memory" } else { "postgres" },
        upload_dir = %config.intake.upload_dir.display(),
        "Configuration loaded - server will bind to {}:{}",
        config.server.host,
        config.server.port
    );

    api::serve(config).await
}
