//! Account registration, login, and session handlers.

use crate::api::{with_connection, ApiError};
use crate::middleware::{CurrentUser, SESSION_COOKIE};
use crate::AppState;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use parlor_auth::{authenticate, issue_session_token, register_user, AuthError, User};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Maximum length for a username.
const MAX_USERNAME_LEN: usize = 64;
/// Maximum length for a password.
const MAX_PASSWORD_LEN: usize = 512;

/// Request body for registration and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

fn validate_credentials(payload: &CredentialsRequest) -> Result<(), ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username is required".to_string()));
    }
    if payload.username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }
    if payload.password.len() > MAX_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Handler for `POST /api/auth/register`.
pub async fn register_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    validate_credentials(&payload)?;

    let user = with_connection(state, move |conn| {
        register_user(conn, payload.username.trim(), &payload.password).map_err(|e| match e {
            AuthError::UsernameTaken(_) => ApiError::Conflict(e.to_string()),
            other => {
                tracing::error!(error = %other, "registration failed");
                ApiError::InternalServerError("registration failed".to_string())
            }
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for `POST /api/auth/login`.
///
/// On success, sets the signed session cookie and returns the account.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<User>), ApiError> {
    validate_credentials(&payload)?;

    let secret = state.secret.clone();
    let user = with_connection(state, move |conn| {
        authenticate(conn, payload.username.trim(), &payload.password).map_err(|e| match e {
            AuthError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            other => {
                tracing::error!(error = %other, "login failed");
                ApiError::InternalServerError("login failed".to_string())
            }
        })
    })
    .await?;

    let token = issue_session_token(&secret, user.id);
    let jar = jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    );

    tracing::info!(user_id = user.id, "login");
    Ok((jar, Json(user)))
}

/// Handler for `POST /api/auth/logout`.
pub async fn logout_handler(
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    let jar = jar.remove(cookie);

    tracing::info!(user_id = user.id, "logout");
    (jar, Json(json!({ "status": "logged out" })))
}

/// Handler for `GET /api/auth/me`.
pub async fn me_handler(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
