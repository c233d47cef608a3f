//! # fiado-server: HTTP API for Fiado
//!
//! Startup sequence:
//! 1. Load `.env` (development convenience) and the env-var config
//! 2. Initialize tracing
//! 3. Open the SQLite pool and run migrations
//! 4. Spawn the idle-session sweeper
//! 5. Serve the router

use std::time::Duration;

use tracing::info;

mod config;
mod error;
mod routes;
mod state;

use config::ServerConfig;
use fiado_db::{Database, DbConfig};
use state::{AppState, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing .env is fine; production sets real environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fiado_server=debug".into()),
        )
        .init();

    let config = ServerConfig::load()?;
    info!(port = config.port, db = %config.database_path, "Starting fiado-server");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    let state = AppState {
        db,
        sessions: SessionStore::new(),
    };

    // Abandoned drafts never commit anything; they just take memory. The
    // sweeper drops them after the configured idle period.
    let sweeper_sessions = state.sessions.clone();
    let ttl = Duration::from_secs(config.session_ttl_secs);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            sweeper_sessions.sweep_idle(ttl);
        }
    });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
