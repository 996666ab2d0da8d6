//! Invite handlers: mint, list, revoke, redeem

use axum::extract::{Path, State};
use axum::Json;
use releye_core::InviteToken;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::users::{validate_email, validate_password};
use super::AppState;
use crate::auth;
use crate::db::{NewInvite, NewUser};
use crate::error::{ok, ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateInviteBody {
    pub label: Option<String>,
    pub created_by: Option<String>,
    /// Seconds from now until the invite expires
    pub expires_in_secs: Option<i64>,
    pub max_uses: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateInviteBody>,
) -> Result<Json<Value>, ApiError> {
    if let Some(creator) = &body.created_by {
        if state.db.users().get(creator)?.is_none() {
            return Err(ApiError::BadRequest(format!(
                "unknown creating user: {creator}"
            )));
        }
    }
    if matches!(body.expires_in_secs, Some(secs) if secs <= 0) {
        return Err(ApiError::BadRequest(
            "expires_in_secs must be positive".to_string(),
        ));
    }
    if matches!(body.max_uses, Some(n) if n <= 0) {
        return Err(ApiError::BadRequest("max_uses must be positive".to_string()));
    }

    let expires_at = body
        .expires_in_secs
        .map(|secs| chrono::Utc::now().timestamp() + secs);

    let invite = state.db.invites().create(NewInvite {
        created_by: body.created_by,
        label: body.label,
        expires_at,
        max_uses: body.max_uses,
    })?;

    state.db.activity().record(
        invite.created_by.as_deref(),
        "invite_created",
        invite.label.as_deref(),
    )?;
    info!(invite = %invite.id, "created invite");
    Ok(ok(invite))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.db.invites().list()?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let invite = state
        .db
        .invites()
        .get(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("invite not found: {id}")))?;
    Ok(ok(invite))
}

pub async fn revoke(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.invites().revoke(&id)? {
        return Err(ApiError::NotFound(format!("invite not found: {id}")));
    }
    state.db.activity().record(None, "invite_revoked", Some(&id))?;
    info!(invite = %id, "revoked invite");
    Ok(ok(Value::Null))
}

#[derive(Debug, Deserialize)]
pub struct RedeemBody {
    /// The `releye-invite:...` share token
    pub token: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Redeem an invite: create the account it admits.
///
/// The database row decides redeemability - the token only identifies it.
pub async fn redeem(
    State(state): State<AppState>,
    Json(body): Json<RedeemBody>,
) -> Result<Json<Value>, ApiError> {
    // 400 for a token that doesn't even parse
    let token = InviteToken::decode(&body.token)?;

    let invites = state.db.invites();
    let invite = invites
        .get(&token.invite_id_hex())?
        .ok_or_else(|| ApiError::NotFound("unknown invite".to_string()))?;

    if !invite.is_redeemable(chrono::Utc::now().timestamp()) {
        return Err(ApiError::Gone(
            "invite expired, revoked, or exhausted".to_string(),
        ));
    }

    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let users = state.db.users();
    if users.email_exists(&body.email)? {
        return Err(ApiError::Conflict(format!(
            "email already registered: {}",
            body.email
        )));
    }

    let (password_hash, password_salt) =
        auth::hash_password(&body.password, state.config.password_rounds);
    let user = users.create(NewUser {
        email: body.email,
        display_name: body.display_name,
        role: "member".to_string(),
        password_hash,
        password_salt,
    })?;

    invites.record_use(&invite.id)?;
    state
        .db
        .activity()
        .record(Some(&user.id), "invite_redeemed", Some(&invite.id))?;
    info!(invite = %invite.id, user = %user.id, "redeemed invite");
    Ok(ok(user))
}
