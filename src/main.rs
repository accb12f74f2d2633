//! # Passkey Session Server
//!
//! Entry point: logging, configuration, session store selection, serving.

use axum::Router;
use passkey_session_server::{build_router, AppState, Config, SessionBackend};
use sqlx::sqlite::SqlitePool;
use tower_sessions::{session_store::ExpiredDeletion, MemoryStore};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main application entry point
///
/// 1. Sets up logging (`RUST_LOG` overrides the default filter)
/// 2. Loads configuration from the environment
/// 3. Builds the WebAuthn relying party
/// 4. Picks the session store; SQLite gets a background task that deletes
///    expired sessions
/// 5. Serves the API and the static frontend
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passkey_session_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config)?;
    tracing::info!(rp_id = %config.rp_id, rp_origin = %config.rp_origin, "Relying party ready");

    let app: Router = match &config.session_backend {
        SessionBackend::Memory => {
            tracing::warn!("Using in-memory sessions; registered credentials are lost on restart");
            build_router(app_state, MemoryStore::default())
        }
        SessionBackend::Sqlite(url) => {
            let pool = SqlitePool::connect(url).await?;
            let session_store = SqliteStore::new(pool);
            // Creates the session table if needed
            session_store.migrate().await?;

            // Expired sessions are never read again but stay on disk until
            // removed. Sweep every 10 minutes.
            let cleanup_store = session_store.clone();
            tokio::spawn(async move {
                tracing::debug!("Starting expired session cleanup task");
                if let Err(e) = cleanup_store
                    .continuously_delete_expired(tokio::time::Duration::from_secs(600))
                    .await
                {
                    tracing::error!("Session cleanup failed: {:?}", e);
                }
            });

            tracing::info!(database = %url, "Using SQLite session store");
            build_router(app_state, session_store)
        }
    };

    let bind_addr = config.bind_address();
    tracing::info!("Starting server on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
