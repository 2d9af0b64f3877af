use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, ApiResponse, AppError, AppState, ChannelKind, CurrentUser, NewChannel};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsByServerRequest {
    #[serde(default)]
    pub server_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn get_channels_by_server_id(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ChannelsByServerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let server_id = request
        .server_id
        .ok_or_else(|| AppError::Validation("Cannot get server Id".to_string()))?;

    let channels = app_state.community.channels_by_server(server_id).await?;

    let message = if channels.is_empty() {
        "No channels found for this server"
    } else {
        "Channels fetched successfully"
    };
    Ok(ApiResponse::new(200, channels, message))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    #[serde(default)]
    pub server_id: Option<Uuid>,
    #[serde(default)]
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn create_channel(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<CreateChannelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(server_id), Some(profile_id), Some(channel_type), Some(channel_name)) = (
        request.server_id,
        request.profile_id,
        request.channel_type,
        request.channel_name.filter(|name| !name.trim().is_empty()),
    ) else {
        return Err(AppError::Validation("Cannot get data".to_string()).into());
    };

    let kind = match channel_type.as_str() {
        "TEXT" => ChannelKind::Text,
        "AUDIO" => ChannelKind::Audio,
        "VIDEO" => ChannelKind::Video,
        _ => return Err(AppError::Validation("Invalid channel type".to_string()).into()),
    };

    app_state
        .community
        .create_channel(NewChannel {
            name: channel_name,
            kind,
            profile_id,
            server_id,
        })
        .await?;

    Ok(ApiResponse::new(
        200,
        Vec::<Uuid>::new(),
        "Channel created successfully",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteChannelRequest {
    #[serde(default)]
    pub channel_id: Option<Uuid>,
    #[serde(default)]
    pub server_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn delete_channel(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<DeleteChannelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(channel_id), Some(server_id)) = (request.channel_id, request.server_id) else {
        return Err(
            AppError::Validation("Channel ID and Server ID are required".to_string()).into(),
        );
    };

    app_state
        .community
        .delete_channel(channel_id, server_id)
        .await?;

    Ok(ApiResponse::new(
        200,
        Vec::<Uuid>::new(),
        "Channel deleted successfully",
    ))
}
