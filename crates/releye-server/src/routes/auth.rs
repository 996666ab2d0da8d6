//! Login handler

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::AppState;
use crate::auth;
use crate::error::{ok, ApiError};

/// Shared failure message - never reveals whether the email exists
const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let users = state.db.users();
    let Some((stored_hash, salt)) = users.credentials(&body.email)? else {
        warn!(email = %body.email, "login for unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !auth::verify_password(&body.password, &stored_hash, &salt) {
        warn!(email = %body.email, "login with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let user = users
        .get_by_email(&body.email)?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !user.is_active {
        warn!(user = %user.id, "login for deactivated account");
        return Err(ApiError::Unauthorized("account is deactivated".to_string()));
    }

    users.record_login(&user.id)?;
    state.db.activity().record(Some(&user.id), "login", None)?;
    info!(user = %user.id, "login");

    // Re-read so the response carries the bumped login_count
    let user = users
        .get(&user.id)?
        .ok_or_else(|| ApiError::Internal("user vanished during login".to_string()))?;
    Ok(ok(user))
}
