use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{ApiError, ApiResponse, AppError, AppState, CurrentUser, OutboundUser, User};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

#[tracing::instrument(skip(app_state, request), fields(user_id = %user.id))]
pub async fn change_password(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let old_password = request
        .old_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Enter your current password"))?;
    let new_password = request
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Enter your new password"))?;

    let updated = app_state
        .auth
        .change_password(user.id, &old_password, &new_password)
        .await?;

    Ok(ApiResponse::new(
        200,
        OutboundUser::from(updated),
        "Password Changed Successfully!",
    ))
}

#[tracing::instrument(skip(app_state), fields(user_id = %user.id))]
pub async fn current_user(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = fetch_user(&app_state, &user).await?;

    Ok(ApiResponse::new(
        200,
        OutboundUser::from(user),
        "Current User Fetched SuccessFully",
    ))
}

#[derive(Deserialize)]
pub struct UpdateUsernameRequest {
    #[serde(default)]
    pub username: String,
}

#[tracing::instrument(skip(app_state, request), fields(user_id = %user.id))]
pub async fn update_username(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateUsernameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .auth
        .update_username(user.id, &request.username)
        .await?;

    Ok(ApiResponse::new(
        200,
        OutboundUser::from(updated),
        "Username Updated Successfully",
    ))
}

#[tracing::instrument(skip(app_state, multipart), fields(user_id = %user.id))]
pub async fn update_avatar(
    State(app_state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (file_name, bytes) = file_field(multipart, "avatar")
        .await?
        .ok_or_else(|| AppError::Validation("Avatar file missing!".to_string()))?;

    let current = fetch_user(&app_state, &user).await?;
    let image = app_state.media.upload(bytes, &file_name).await?;

    // The old asset is removed only after the new one is stored, so a failed
    // upload never leaves the account without an avatar.
    if let Some(old_public_id) = current.avatar_public_id {
        if let Err(e) = app_state.media.delete(&old_public_id).await {
            tracing::warn!(error = ?e, "failed to delete replaced avatar");
        }
    }

    let updated = app_state
        .auth
        .set_avatar(user.id, image.url, image.public_id)
        .await?;

    Ok(ApiResponse::new(
        200,
        OutboundUser::from(updated),
        "Avatar Image Updated Successfully",
    ))
}

#[tracing::instrument(skip(app_state, multipart), fields(user_id = %user.id))]
pub async fn update_cover_image(
    State(app_state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (file_name, bytes) = file_field(multipart, "coverImage")
        .await?
        .ok_or_else(|| AppError::Validation("Cover Image file missing!".to_string()))?;

    let current = fetch_user(&app_state, &user).await?;
    let image = app_state.media.upload(bytes, &file_name).await?;

    if let Some(old_public_id) = current.cover_image_public_id {
        if let Err(e) = app_state.media.delete(&old_public_id).await {
            tracing::warn!(error = ?e, "failed to delete replaced cover image");
        }
    }

    let updated = app_state
        .auth
        .set_cover_image(user.id, image.url, image.public_id)
        .await?;

    Ok(ApiResponse::new(
        200,
        OutboundUser::from(updated),
        "Cover Image Updated Successfully",
    ))
}

async fn fetch_user(app_state: &AppState, user: &CurrentUser) -> Result<User, ApiError> {
    Ok(app_state
        .auth
        .get_user_info(user.id)
        .await?
        .ok_or(AppError::NotFound("user"))?)
}

/// Pulls the single expected file field out of a multipart body.
async fn file_field(
    mut multipart: Multipart,
    name: &str,
) -> Result<Option<(String, Vec<u8>)>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() == Some(name) {
            let file_name = field.file_name().unwrap_or(name).to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            return Ok(Some((file_name, bytes.to_vec())));
        }
    }

    Ok(None)
}
