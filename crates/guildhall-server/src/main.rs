//! Guildhall backend server binary.
//!
//! Wires the Postgres/Dragonfly backend into the HTTP API and serves it.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `guildhall-config.yaml`
//! 3. Connect to `PostgreSQL` and Dragonfly
//! 4. Build the application state and serve the API

mod config;

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use guildhall_api::{AppState, ServerConfig, start_server};
use guildhall_db::{PgBackend, PostgresConfig};

use crate::config::AppConfig;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, database connection, or the HTTP
/// server fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("guildhall-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    // 3. Connect to Postgres and Dragonfly.
    let pg_config = PostgresConfig::new(&config.infrastructure.postgres_url);
    let backend = PgBackend::connect(&pg_config, &config.infrastructure.dragonfly_url).await?;
    info!("Storage backend connected");

    // 4. Serve the API.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = AppState::new(backend);
    start_server(&server_config, state).await?;

    info!("guildhall-server shut down cleanly");
    Ok(())
}

/// Load `guildhall-config.yaml` from the working directory, falling back
/// to defaults when the file does not exist.
fn load_config() -> anyhow::Result<AppConfig> {
    let path = Path::new("guildhall-config.yaml");
    if path.exists() {
        Ok(AppConfig::from_file(path)?)
    } else {
        info!("guildhall-config.yaml not found, using defaults");
        Ok(AppConfig::parse("{}")?)
    }
}
