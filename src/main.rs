use anyhow::{Context, Result};
use movlib_i18n::config::Config;
use movlib_i18n::db::Database;
use movlib_i18n::server::{self, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("movlib_i18n=info".parse()?),
        )
        .init();

    info!("Starting MovLib translation service");

    // Load configuration from environment
    let config = Config::from_env()?;

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create {}", parent.display()))?;
        }
    }
    let database_path = config
        .database_path
        .to_str()
        .context("DATABASE_PATH is not valid UTF-8")?;
    let database = Database::new(database_path)?;
    info!(
        "Database ready at {} ({} messages)",
        database_path,
        database.message_count()?
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config, database)?);
    info!(
        "Serving locales {:?} (default {})",
        state
            .registry
            .locales()
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>(),
        state.registry.default_locale()
    );
    if state.config.api_key.is_none() {
        info!("API_KEY not set, admin endpoints are disabled");
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .context(format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, server::router(state))
        .await
        .context("Server error")?;

    Ok(())
}
