// src/main.rs

// --- Modules ---
mod config;
mod db;
mod error;
mod models;
mod services;
mod state;
mod templates;
mod web;

// --- Imports ---
use crate::{config::AppConfig, services::user_service, state::AppState};
use axum::serve;
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "tutoring=debug,tower_http=info,sqlx=warn,tower_sessions=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Starting tutoring registration server...");

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // --- Database ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to initialise the database: {}", e);
            return Err(anyhow::anyhow!("Failed to connect/migrate database: {}", e));
        }
    };

    if let Some(account) = &config.bootstrap_coordinator {
        user_service::ensure_bootstrap_coordinator(&db_pool, account)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create bootstrap coordinator: {}", e))?;
    }

    // --- Sessions ---
    let session_store = SqliteStore::new(db_pool.clone());
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to migrate session store: {}", e))?;

    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = cleanup_store
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Session cleanup task failed: {:?}", e);
        }
    });
    tracing::info!("Session cleanup task started.");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.secure_cookies)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::hours(config.session_ttl_hours)));

    // --- Router ---
    let app_state = AppState { db_pool };
    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(session_layer),
    );

    // --- Serve ---
    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("Listening on http://{}", config.bind_addr);

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
