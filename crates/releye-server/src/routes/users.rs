//! User CRUD handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::AppState;
use crate::auth;
use crate::db::{NewUser, UserUpdate};
use crate::error::{ok, ApiError};

/// Minimum accepted password length
pub(super) const MIN_PASSWORD_LEN: usize = 8;

/// Cheap shape check; real validation happens when mail is actually sent.
pub(super) fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("invalid email: {email}")))
    }
}

pub(super) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub role: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.db.users().list()?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<Json<Value>, ApiError> {
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
        role: body.role.unwrap_or_else(|| "member".to_string()),
        password_hash,
        password_salt,
    })?;

    state
        .db
        .activity()
        .record(Some(&user.id), "user_created", Some(&user.email))?;
    info!(user = %user.id, "created user");
    Ok(ok(user))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .db
        .users()
        .get(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {id}")))?;
    Ok(ok(user))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserBody>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .db
        .users()
        .update(
            &id,
            UserUpdate {
                display_name: body.display_name,
                role: body.role,
                is_active: body.is_active,
            },
        )?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {id}")))?;
    Ok(ok(user))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.db.users().delete(&id)? {
        return Err(ApiError::NotFound(format!("user not found: {id}")));
    }
    state
        .db
        .activity()
        .record(Some(&id), "user_deleted", None)?;
    info!(user = %id, "deleted user");
    Ok(ok(Value::Null))
}
