//! Memvault Server
//!
//! HTTP surface for the fact ledger. Wires the SQLite store, the HMAC
//! signer, and the access gate (API-key auth + path exclusion + per-key
//! fixed-window write rate limiting) into an axum application.

#![warn(missing_docs)]

pub mod config;
pub mod gate;
pub mod handlers;
pub mod rate_limit;

use std::sync::Arc;

use config::ServerConfig;
use gate::{ApiKeyGateLayer, GateState};
use handlers::{create_router, AppState};
use memvault_crypto::HmacSigner;
use memvault_ledger::FactLedger;
use memvault_store::SqliteStore;
use rate_limit::FixedWindowLimiter;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Signer could not be initialized (startup-class failure)
    #[error("Crypto initialization error: {0}")]
    Crypto(#[from] memvault_crypto::CryptoError),

    /// Store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] memvault_domain::StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the Memvault HTTP server.
///
/// Loads configuration, initializes the store and signer (both are fatal if
/// unavailable), and serves the axum application.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Memvault fact ledger");
    info!("Bind address: {}", config.bind_addr());
    info!("Database path: {}", config.database_path);
    info!("Write rate limit: {}/min per key", config.rate_limit_per_minute);
    info!("Excluded paths: {:?}", config.exclude_paths);

    let store = SqliteStore::new(&config.database_path)?;
    // Bad key material must fail the process here, never per request
    let signer = HmacSigner::new(&config.secret_key)?;
    let ledger = Arc::new(FactLedger::new(store, signer, config.limits()));

    let gate = ApiKeyGateLayer::new(Arc::new(GateState::new(
        config.api_key.clone(),
        config.exclude_paths.clone(),
        FixedWindowLimiter::new(config.rate_limit_per_minute),
    )));

    let app = create_router(AppState { ledger }, gate);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Memvault listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
