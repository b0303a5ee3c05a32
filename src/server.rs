//! HTTP server: shared state, routes and the listener loop

use axum::extract::{Query, State};
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::auth::handlers::{list_users, login, require_token, signup};
use crate::auth::{FileUserStore, MemoryUserStore, PasswordHasher, Sha256Hasher, TokenIssuer, UserStore};
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::search::{ElasticIndex, RawSearchParams, SearchEngine};

/// Dependencies shared by all handlers
pub struct AppState {
    pub engine: SearchEngine,
    pub users: Arc<dyn UserStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Wire up the production backends from configuration
    pub fn from_config(config: &ServerConfig) -> Result<Self, AppError> {
        let index = ElasticIndex::new(config.index.url.as_str(), config.index.timeout)?;
        let engine = SearchEngine::new(Arc::new(index), config.index.name.clone());

        let users: Arc<dyn UserStore> = match &config.users_file {
            Some(path) => {
                let store = FileUserStore::new(path)?;
                info!("User store: {}", store.path().display());
                Arc::new(store)
            }
            None => {
                info!("User store: in-memory");
                Arc::new(MemoryUserStore::new())
            }
        };

        Ok(Self {
            engine,
            users,
            hasher: Arc::new(Sha256Hasher),
            tokens: TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl_secs),
        })
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        .route("/users", get(list_users))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/search", get(handle_search))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /search`: validated, filtered property search
pub async fn handle_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RawSearchParams>,
) -> Result<Json<Vec<Value>>, AppError> {
    debug!(?params, "Search request");
    let results = state.engine.search(&params).await?;
    Ok(Json(results))
}

/// Bind the listener and serve until Ctrl+C
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let collection = state.engine.collection().to_string();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);
    info!(
        "Search index: {} (collection '{}')",
        config.index.url, collection
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
