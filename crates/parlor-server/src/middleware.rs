//! Session authentication for protected routes.

use crate::api::{with_connection, ApiError};
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use parlor_auth::{verify_session_token, User};
use std::sync::Arc;

/// Name of the session cookie issued at login.
pub const SESSION_COOKIE: &str = "parlor_session";

/// The authenticated account for the current request.
///
/// Resolved from the session cookie (or the same token presented as a
/// bearer header) plus a fresh user lookup, so a deleted account stops
/// authenticating immediately. Extracting this from an unauthenticated
/// request rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = parts
            .extensions
            .get::<Arc<AppState>>()
            .cloned()
            .ok_or_else(|| ApiError::InternalServerError("app state missing".to_string()))?;

        let token = session_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("login required".to_string()))?;

        let user_id = verify_session_token(&state.secret, &token)
            .ok_or_else(|| ApiError::Unauthorized("invalid session".to_string()))?;

        // Any lookup failure, including a since-deleted account, is a 401.
        let user = with_connection(state, move |conn| {
            parlor_auth::get_user(conn, user_id)
                .map_err(|_| ApiError::Unauthorized("invalid session".to_string()))
        })
        .await?;

        Ok(CurrentUser(user))
    }
}

/// Pulls the session token from the cookie or an `Authorization: Bearer`
/// header.
fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}
