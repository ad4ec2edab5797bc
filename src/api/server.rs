use axum::{
    Router,
    routing::{get, post},
};
use color_eyre::eyre::{Result, WrapErr};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{exercises, users};
use crate::config::{Config, StoreKind};
use crate::db::{MemoryStore, SqliteStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Builds the full application. `static_dir` holds `views/index.html` and
/// the `public/` assets.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("views").join("index.html")))
        .nest_service("/public", ServeDir::new(static_dir.join("public")))
        .route("/health", get(|| async { "OK" }))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/{id}/exercises", post(exercises::add_exercise))
        .route("/api/users/{id}/logs", get(exercises::list_logs))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<()> {
    let state = match config.store {
        StoreKind::Sqlite => {
            let store = SqliteStore::connect(&config.database_url, config.max_connections)
                .await
                .wrap_err("failed to connect to the store")?;
            AppState::new(store)
        }
        StoreKind::Memory => {
            warn!("using in-memory store, records will not survive a restart");
            AppState::new(MemoryStore::new())
        }
    };
    let state = Arc::new(state);
    let app = router(state, &config.static_dir);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server failed")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
