use std::sync::Arc;

use anyhow::Context;

use household_api::app::{app, AppState};
use household_api::config::{AppConfig, DirectoryMode};
use household_api::database;
use household_api::services::directory::{AdminDirectory, IdentityDirectory, LocalDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting household API in {:?} mode", config.environment);

    let pool = database::connect_lazy(&config.database)?;
    let directory: Arc<dyn IdentityDirectory> = match config.directory.mode {
        DirectoryMode::Admin => Arc::new(AdminDirectory::new(config.directory.clone())),
        DirectoryMode::Local => Arc::new(LocalDirectory),
    };

    let state = AppState::new(pool, directory, config);
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("HOUSEHOLD_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("household API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
