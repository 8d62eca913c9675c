//! Message handlers, including the index listing.

use crate::api::{with_connection, ApiError};
use crate::middleware::CurrentUser;
use crate::AppState;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::Json;
use parlor_messages::{
    create_message, delete_message, get_message, list_messages, update_message, Message,
    MessageError,
};
use serde::Deserialize;
use std::sync::Arc;

/// Maximum length for a message title.
const MAX_TITLE_LEN: usize = 256;
/// Maximum length for a message body.
const MAX_BODY_LEN: usize = 16 * 1024;

/// Request body for creating or replacing a message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub title: String,
    pub body: String,
}

fn validate_message(payload: &MessageRequest) -> Result<(), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    if payload.title.len() > MAX_TITLE_LEN {
        return Err(ApiError::BadRequest(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    if payload.body.len() > MAX_BODY_LEN {
        return Err(ApiError::BadRequest(format!(
            "body must be at most {MAX_BODY_LEN} characters"
        )));
    }
    Ok(())
}

/// Maps a [`MessageError`] to an API error, logging non-404 failures.
fn message_err_to_api(e: MessageError) -> ApiError {
    match e {
        MessageError::NotFound(id) => ApiError::NotFound(format!("message not found: {id}")),
        other => {
            tracing::error!(error = %other, "message operation failed");
            ApiError::InternalServerError("message operation failed".to_string())
        }
    }
}

/// Handler for `GET /` and `GET /api/messages`.
pub async fn list_messages_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = with_connection(state, move |conn| {
        list_messages(conn).map_err(message_err_to_api)
    })
    .await?;

    Ok(Json(messages))
}

/// Handler for `GET /api/messages/{messageId}`.
pub async fn get_message_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(message_id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    let message = with_connection(state, move |conn| {
        get_message(conn, message_id).map_err(message_err_to_api)
    })
    .await?;

    Ok(Json(message))
}

/// Handler for `POST /api/messages`.
pub async fn create_message_handler(
    Extension(state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<MessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    validate_message(&payload)?;

    let message = with_connection(state, move |conn| {
        create_message(conn, user.id, payload.title.trim(), &payload.body)
            .map_err(message_err_to_api)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Handler for `PUT /api/messages/{messageId}`. Author only.
pub async fn update_message_handler(
    Extension(state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(message_id): Path<i64>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<Message>, ApiError> {
    validate_message(&payload)?;

    let message = with_connection(state, move |conn| {
        let existing = get_message(conn, message_id).map_err(message_err_to_api)?;
        if existing.author_id != user.id {
            return Err(ApiError::Forbidden(
                "only the author may edit a message".to_string(),
            ));
        }

        update_message(conn, message_id, payload.title.trim(), &payload.body)
            .map_err(message_err_to_api)?;
        get_message(conn, message_id).map_err(message_err_to_api)
    })
    .await?;

    Ok(Json(message))
}

/// Handler for `DELETE /api/messages/{messageId}`. Author only.
pub async fn delete_message_handler(
    Extension(state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(message_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    with_connection(state, move |conn| {
        let existing = get_message(conn, message_id).map_err(message_err_to_api)?;
        if existing.author_id != user.id {
            return Err(ApiError::Forbidden(
                "only the author may delete a message".to_string(),
            ));
        }

        delete_message(conn, message_id).map_err(message_err_to_api)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
