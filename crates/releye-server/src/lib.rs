//! RelEye API Server
//!
//! A thin HTTP layer over SQLite for user and invite management, plus a
//! relay that forwards LLM requests to exactly three providers with
//! server-held API keys.
//!
//! ## Endpoints
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET  /api/health` | liveness probe |
//! | `GET/POST /api/users`, `GET/PUT/DELETE /api/users/{id}` | user CRUD |
//! | `GET/POST /api/invites`, `GET/DELETE /api/invites/{id}` | invite CRUD |
//! | `POST /api/invites/redeem` | redeem a share token into an account |
//! | `POST /api/auth/login` | password check + login accounting |
//! | `GET  /api/activity` | recent activity log entries |
//! | `POST /api/proxy` | LLM provider relay |
//!
//! Every response is a `{success, data}` or `{success, error}` envelope;
//! see [`error::ApiError`] for the status mapping.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod proxy;
pub mod routes;

// Re-exports
pub use config::{ProviderConfig, ServerConfig};
pub use db::Db;
pub use error::{ApiError, ServerError};
pub use proxy::Provider;
pub use routes::{app, serve, AppState};
