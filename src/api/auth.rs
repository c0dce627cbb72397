use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::require;
use crate::auth::{generate_salt, hash_password, verify_password};
use crate::db::UserRepository;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub token: Option<String>,
}

// Registration rejections answer with an empty token, not an error payload
fn empty_token() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(TokenResponse {
            access_token: String::new(),
        }),
    )
        .into_response()
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response, AppError> {
    let (username, password) = match (req.username, req.password) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => {
            (u.trim().to_string(), p)
        }
        _ => return Ok(empty_token()),
    };

    // Fast-path check; the UNIQUE constraint below closes the race
    if UserRepository::get_by_username(&state.db, &username)
        .await?
        .is_some()
    {
        return Ok(empty_token());
    }

    let salt = generate_salt();
    let password_hash = hash_password(&password, &salt)?;

    let user = match UserRepository::create(&state.db, &username, &password_hash, &salt).await {
        Ok(user) => user,
        Err(AppError::Database(e))
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) =>
        {
            return Ok(empty_token());
        }
        Err(e) => return Err(e),
    };

    let access_token = state.tokens.issue(&user.username)?;
    Ok(Json(TokenResponse { access_token }).into_response())
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let mut missing = Vec::new();
    let username = require(&mut missing, "username", req.username);
    let password = require(&mut missing, "password", req.password);
    let (Some(username), Some(password)) = (username, password) else {
        return Err(AppError::Validation(missing));
    };

    let user = UserRepository::get_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    let stored_hash: [u8; 32] = user
        .password_hash
        .as_slice()
        .try_into()
        .map_err(|_| AppError::Internal("Invalid stored password hash".to_string()))?;

    if !verify_password(&password, &stored_hash, &user.password_salt)? {
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let access_token = state.tokens.issue(&user.username)?;
    Ok(Json(TokenResponse { access_token }))
}

/// POST /api/logout - revokes the token carried in the body
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut missing = Vec::new();
    let Some(token) = require(&mut missing, "token", req.token) else {
        return Err(AppError::Validation(missing));
    };

    state
        .tokens
        .revoke(&token)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(Json(serde_json::json!({ "message": "token revoked" })))
}

/// POST /api/refresh - token arrives as the raw request body
pub async fn refresh(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<TokenResponse>, AppError> {
    let token = body.trim();
    if token.is_empty() {
        return Err(AppError::Validation(vec!["token"]));
    }

    let access_token = state.tokens.refresh(token)?;
    Ok(Json(TokenResponse { access_token }))
}

/// GET /api/protected (requires auth)
pub async fn protected(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "username": user.username,
        "address": user.address,
    }))
}
