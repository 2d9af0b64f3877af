use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, ApiResponse, AppError, AppState, CurrentUser};

/// Returns the caller's profile, creating it from the account record on
/// first access.
#[tracing::instrument(skip(app_state), fields(user_id = %user.id))]
pub async fn get_user_profile(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let account = app_state
        .auth
        .get_user_info(user.id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let profile = app_state.profiles.get_or_create_for(&account).await?;

    Ok(ApiResponse::new(
        200,
        profile,
        "User profile fetched successfully",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilesByServerRequest {
    #[serde(default)]
    pub server_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn get_profiles_by_server_id(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ProfilesByServerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let server_id = request
        .server_id
        .ok_or_else(|| AppError::Validation("Did not receive server id".to_string()))?;

    let profiles = app_state.profiles.get_by_server(server_id).await?;

    if profiles.is_empty() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "No profiles found for this server",
        ));
    }

    Ok(ApiResponse::new(
        200,
        profiles,
        "User profiles fetched successfully",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileByIdRequest {
    #[serde(default)]
    pub profile_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn get_profile_by_id(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ProfileByIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile_id = request
        .profile_id
        .ok_or_else(|| AppError::Validation("Cannot get profile Id".to_string()))?;

    let profile = app_state
        .profiles
        .get_by_id(profile_id)
        .await?
        .ok_or_else(|| AppError::Validation("Profile not found".to_string()))?;

    Ok(ApiResponse::new(200, profile, "Profile fetched successfully"))
}
