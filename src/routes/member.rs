use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, ApiResponse, AppError, AppState, CurrentUser, MemberRole};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersByServerRequest {
    #[serde(default)]
    pub server_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn get_members_by_server_id(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<MembersByServerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let server_id = request
        .server_id
        .ok_or_else(|| AppError::Validation("Cannot get server Id".to_string()))?;

    let members = app_state.community.members_by_server(server_id).await?;

    let message = if members.is_empty() {
        "No members found for this server"
    } else {
        "Members fetched successfully"
    };
    Ok(ApiResponse::new(200, members, message))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    #[serde(default)]
    pub member_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn change_role_to_guest(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let member_id = request
        .member_id
        .ok_or_else(|| AppError::Validation("Cannot get member Id".to_string()))?;

    let member = app_state
        .community
        .change_role(member_id, MemberRole::Guest)
        .await?;

    Ok(ApiResponse::new(
        200,
        member,
        "Role changed to guest successfully",
    ))
}

#[tracing::instrument(skip(app_state, request))]
pub async fn change_role_to_moderator(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let member_id = request
        .member_id
        .ok_or_else(|| AppError::Validation("Cannot get member Id".to_string()))?;

    let member = app_state
        .community
        .change_role(member_id, MemberRole::Moderator)
        .await?;

    Ok(ApiResponse::new(
        200,
        member,
        "Role changed to moderator successfully",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickMemberRequest {
    #[serde(default)]
    pub member_id: Option<Uuid>,
    #[serde(default)]
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub server_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn kick_out_member(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<KickMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let member_id = request
        .member_id
        .ok_or_else(|| AppError::Validation("Cannot get member Id".to_string()))?;
    let profile_id = request
        .profile_id
        .ok_or_else(|| AppError::Validation("Cannot get profile Id".to_string()))?;
    let server_id = request
        .server_id
        .ok_or_else(|| AppError::Validation("Cannot get server Id".to_string()))?;

    let profile = app_state
        .community
        .kick_member(member_id, profile_id, server_id)
        .await?;

    Ok(ApiResponse::new(
        200,
        profile,
        "Member kicked out and server removed from profile successfully",
    ))
}
