//! Router assembly and shared application state

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::config::ServerConfig;
use crate::db::Db;
use crate::error::ServerError;

// Handler modules
mod auth;
mod health;
mod invites;
mod proxy;
mod users;

/// Shared state available to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub http: reqwest::Client,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

impl AppState {
    /// Build state from a config, opening the database.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let db = Db::open(&config.db_path)?;
        Ok(Self {
            db,
            http: reqwest::Client::new(),
            config: Arc::new(config),
            started_at: Instant::now(),
        })
    }

    /// Build state over an in-memory database (tests).
    pub fn in_memory(config: ServerConfig) -> Result<Self, ServerError> {
        Ok(Self {
            db: Db::open_in_memory()?,
            http: reqwest::Client::new(),
            config: Arc::new(config),
            started_at: Instant::now(),
        })
    }
}

/// Build the API router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get).put(users::update).delete(users::remove),
        )
        .route("/api/invites", get(invites::list).post(invites::create))
        .route(
            "/api/invites/{id}",
            get(invites::get).delete(invites::revoke),
        )
        .route("/api/invites/redeem", post(invites::redeem))
        .route("/api/auth/login", post(auth::login))
        .route("/api/activity", get(health::activity))
        .route("/api/proxy", post(proxy::relay))
        .with_state(state)
}

/// Run the server until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let bind = config.bind;
    let state = AppState::new(config)?;
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %bind, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
