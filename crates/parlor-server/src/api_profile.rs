//! Profile handlers.

use crate::api::{with_connection, ApiError};
use crate::middleware::CurrentUser;
use crate::AppState;
use axum::extract::{Extension, Path};
use axum::response::Json;
use parlor_profile::{
    get_profile, get_profile_by_id, update_profile, Profile, ProfileError, ProfileUpdate,
};
use std::sync::Arc;

/// Maximum length for a display name.
const MAX_DISPLAY_NAME_LEN: usize = 128;
/// Maximum length for a bio.
const MAX_BIO_LEN: usize = 2048;

/// Maps a [`ProfileError`] to an API error, logging non-404 failures.
fn profile_err_to_api(e: ProfileError) -> ApiError {
    match e {
        ProfileError::NotFound(subject) => {
            ApiError::NotFound(format!("profile not found: {subject}"))
        }
        other => {
            tracing::error!(error = %other, "profile operation failed");
            ApiError::InternalServerError("profile operation failed".to_string())
        }
    }
}

/// Handler for `GET /api/users/{username}`.
pub async fn get_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = with_connection(state, move |conn| {
        get_profile(conn, &username).map_err(profile_err_to_api)
    })
    .await?;

    Ok(Json(profile))
}

/// Handler for `GET /api/profile`.
pub async fn get_own_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = with_connection(state, move |conn| {
        get_profile_by_id(conn, user.id).map_err(profile_err_to_api)
    })
    .await?;

    Ok(Json(profile))
}

/// Handler for `PUT /api/profile`.
///
/// Partial update: absent fields keep their stored values. Returns the
/// profile as stored afterwards.
pub async fn update_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(updates): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
    if let Some(display_name) = &updates.display_name {
        if display_name.len() > MAX_DISPLAY_NAME_LEN {
            return Err(ApiError::BadRequest(format!(
                "display name must be at most {MAX_DISPLAY_NAME_LEN} characters"
            )));
        }
    }
    if let Some(bio) = &updates.bio {
        if bio.len() > MAX_BIO_LEN {
            return Err(ApiError::BadRequest(format!(
                "bio must be at most {MAX_BIO_LEN} characters"
            )));
        }
    }

    let profile = with_connection(state, move |conn| {
        update_profile(conn, user.id, &updates).map_err(profile_err_to_api)?;
        get_profile_by_id(conn, user.id).map_err(profile_err_to_api)
    })
    .await?;

    Ok(Json(profile))
}
