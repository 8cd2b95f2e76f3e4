use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput(
            "Username must not be empty".to_string(),
        ));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = hash_password(&request.password)?;
    let user = state.users.create(username, &password_hash).await?;
    let token = state.jwt.issue(user.id)?;

    tracing::info!(user_id = %user.id, "Account registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Handler for login; verifies credentials and issues a JWT
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state
        .users
        .find_by_username(request.username.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    let token = state.jwt.issue(user.id)?;
    Ok(Json(AuthResponse { token, user }))
}
