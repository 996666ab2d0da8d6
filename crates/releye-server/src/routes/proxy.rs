//! Proxy relay handler

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use super::AppState;
use crate::error::{ok, ApiError};
use crate::proxy::{self, ProxyRequest};

pub async fn relay(
    State(state): State<AppState>,
    Json(request): Json<ProxyRequest>,
) -> Result<Json<Value>, ApiError> {
    let body = proxy::relay(&state.http, &state.config.providers, request).await?;
    Ok(ok(body))
}
