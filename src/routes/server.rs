use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, ApiResponse, AppError, AppState, CurrentUser, JoinOutcome, NewServer};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServersForProfileRequest {
    #[serde(default)]
    pub profile_id: Option<Uuid>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn get_servers_where_user_is_member(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ServersForProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile_id = request
        .profile_id
        .ok_or_else(|| AppError::Validation("Cannot get profile Id".to_string()))?;

    let servers = app_state.community.servers_for_profile(profile_id).await?;

    let message = if servers.is_empty() {
        "No servers found for this user"
    } else {
        "Servers fetched successfully"
    };
    Ok(ApiResponse::new(200, servers, message))
}

/// Multipart form with `serverName` and `profileId` text fields plus an
/// optional `serverImage` file field.
#[tracing::instrument(skip(app_state, multipart))]
pub async fn create_server(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut server_name = String::new();
    let mut profile_id: Option<Uuid> = None;
    let mut server_image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        match field.name() {
            Some("serverName") => {
                server_name = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
            Some("profileId") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                profile_id = Uuid::parse_str(&raw).ok();
            }
            Some("serverImage") => {
                let file_name = field.file_name().unwrap_or("serverImage").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                server_image = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    if server_name.trim().is_empty() {
        return Err(AppError::Validation("Cannot get server name".to_string()).into());
    }
    let profile_id =
        profile_id.ok_or_else(|| AppError::Validation("Cannot get profile Id".to_string()))?;

    let image = match server_image {
        Some((file_name, bytes)) => match app_state.media.upload(bytes, &file_name).await {
            Ok(uploaded) => Some((uploaded.url, uploaded.public_id)),
            Err(e) => {
                tracing::warn!(error = ?e, "server image upload failed, creating without one");
                None
            }
        },
        None => None,
    };

    let server = app_state
        .community
        .create_server(NewServer::with_fresh_invite_code(
            server_name,
            image,
            profile_id,
        ))
        .await?;

    Ok(ApiResponse::new(200, server, "Server created successfully"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinServerRequest {
    #[serde(default)]
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub invite_code: Option<String>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn join_server(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<JoinServerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile_id = request
        .profile_id
        .ok_or_else(|| AppError::Validation("Cannot get profile Id".to_string()))?;
    let invite_code = request
        .invite_code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::Validation("Cannot get invite code".to_string()))?;

    let outcome = app_state
        .community
        .join_server(profile_id, &invite_code)
        .await?;

    let response = match outcome {
        JoinOutcome::Joined(server_id) => {
            ApiResponse::new(200, server_id, "Server joined successfully")
        }
        JoinOutcome::AlreadyMember(server_id) => {
            ApiResponse::new(200, server_id, "Already a member of the server")
        }
    };
    Ok(response)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerAndProfileRequest {
    #[serde(default)]
    pub server_id: Option<Uuid>,
    #[serde(default)]
    pub profile_id: Option<Uuid>,
}

impl ServerAndProfileRequest {
    fn into_ids(self) -> Result<(Uuid, Uuid), AppError> {
        let profile_id = self
            .profile_id
            .ok_or_else(|| AppError::Validation("Cannot get profile Id".to_string()))?;
        let server_id = self
            .server_id
            .ok_or_else(|| AppError::Validation("Cannot get server Id".to_string()))?;
        Ok((profile_id, server_id))
    }
}

#[tracing::instrument(skip(app_state, request))]
pub async fn leave_server(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ServerAndProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (profile_id, server_id) = request.into_ids()?;

    app_state
        .community
        .leave_server(profile_id, server_id)
        .await?;

    Ok(ApiResponse::new(
        200,
        Vec::<Uuid>::new(),
        "Left server successfully",
    ))
}

#[tracing::instrument(skip(app_state, request))]
pub async fn delete_server(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<ServerAndProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (profile_id, server_id) = request.into_ids()?;

    app_state
        .community
        .delete_server(profile_id, server_id)
        .await?;

    Ok(ApiResponse::new(
        200,
        Vec::<Uuid>::new(),
        "Server deleted successfully",
    ))
}
