//! Parlor server library logic.

pub mod api;
pub mod api_auth;
pub mod api_messages;
pub mod api_profile;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use parlor_db::DbSettings;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
///
/// Deliberately small: read-only database settings and the session secret.
/// Connections are never shared here; each request context opens its own.
#[derive(Clone)]
pub struct AppState {
    /// Settings for opening per-request database connections.
    pub db: DbSettings,
    /// Secret used to sign session tokens.
    pub secret: String,
}

/// Maximum request body size (64 KiB). Credentials, profiles, and messages
/// are all small.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(api_messages::list_messages_handler))
        .route("/api/auth/register", post(api_auth::register_handler))
        .route("/api/auth/login", post(api_auth::login_handler))
        .route("/api/auth/logout", post(api_auth::logout_handler))
        .route("/api/auth/me", get(api_auth::me_handler))
        .route(
            "/api/profile",
            get(api_profile::get_own_profile_handler).put(api_profile::update_profile_handler),
        )
        .route(
            "/api/users/{username}",
            get(api_profile::get_profile_handler),
        )
        .route(
            "/api/messages",
            get(api_messages::list_messages_handler)
                .post(api_messages::create_message_handler),
        )
        .route(
            "/api/messages/{messageId}",
            get(api_messages::get_message_handler)
                .put(api_messages::update_message_handler)
                .delete(api_messages::delete_message_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
