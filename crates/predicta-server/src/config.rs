//! Configuration management

use predicta_common::MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default storage URL for local development.
pub const DEFAULT_STORAGE_URL: &str = "postgresql://localhost/predicta";

/// Storage URL that selects the in-process store.
pub const MEMORY_STORAGE_URL: &str = "memory://";

/// Default maximum database connections in the pool.
pub const DEFAULT_STORAGE_MAX_CONNECTIONS: u32 = 10;

/// Default database connection timeout in seconds.
pub const DEFAULT_STORAGE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default delay between accepting a processing request and recording its outcome.
pub const DEFAULT_PROCESSING_DELAY_SECS: u64 = 5;

/// Default CORS allowed origin. Any origin may call the API.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub intake: IntakeConfig,
    pub processing: ProcessingConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// File store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `memory://` or a PostgreSQL connection URL.
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl StorageConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_STORAGE_URL
    }
}

/// Upload intake configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Directory where request bodies are staged before they are stored.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
}

/// Processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub delay_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("PREDICTA_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_parse("PREDICTA_PORT")
                    .or_else(|| env_parse("PORT"))
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse("PREDICTA_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            storage: StorageConfig {
                url: std::env::var("PREDICTA_STORAGE_URL")
                    .or_else(|_| std::env::var("DATABASE_URL"))
                    .unwrap_or_else(|_| DEFAULT_STORAGE_URL.to_string()),
                max_connections: env_parse("PREDICTA_STORAGE_MAX_CONNECTIONS")
                    .unwrap_or(DEFAULT_STORAGE_MAX_CONNECTIONS),
                connect_timeout_secs: env_parse("PREDICTA_STORAGE_CONNECT_TIMEOUT")
                    .unwrap_or(DEFAULT_STORAGE_CONNECT_TIMEOUT_SECS),
            },
            intake: IntakeConfig {
                upload_dir: std::env::var("PREDICTA_UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| std::env::temp_dir().join("predicta-uploads")),
                max_upload_bytes: env_parse("PREDICTA_MAX_UPLOAD_BYTES")
                    .unwrap_or(MAX_UPLOAD_BYTES),
            },
            processing: ProcessingConfig {
                delay_secs: env_parse("PREDICTA_PROCESSING_DELAY_SECS")
                    .unwrap_or(DEFAULT_PROCESSING_DELAY_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS").unwrap_or(false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.storage.url.is_empty() {
            anyhow::bail!("Storage URL cannot be empty");
        }

        if !self.storage.is_memory() && !self.storage.url.starts_with("postgres") {
            anyhow::bail!(
                "Unsupported storage URL '{}': expected {} or a postgres:// URL",
                self.storage.url,
                MEMORY_STORAGE_URL
            );
        }

        if self.storage.max_connections == 0 {
            anyhow::bail!("Storage max_connections must be greater than 0");
        }

        if self.intake.max_upload_bytes == 0 {
            anyhow::bail!("Maximum upload size must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        if self.cors.allow_credentials && self.allows_any_origin() {
            tracing::warn!("CORS credentials are ignored while any origin is allowed");
        }

        Ok(())
    }

    fn allows_any_origin(&self) -> bool {
        self.cors.allowed_origins.is_empty() || self.cors.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            storage: StorageConfig {
                url: DEFAULT_STORAGE_URL.to_string(),
                max_connections: DEFAULT_STORAGE_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_STORAGE_CONNECT_TIMEOUT_SECS,
            },
            intake: IntakeConfig {
                upload_dir: std::env::temp_dir().join("predicta-uploads"),
                max_upload_bytes: MAX_UPLOAD_BYTES,
            },
            processing: ProcessingConfig {
                delay_secs: DEFAULT_PROCESSING_DELAY_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
        }
    }
}
