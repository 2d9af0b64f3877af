use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiError, ApiResponse, AppError, AppState, CurrentUser};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoTokenRequest {
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
}

#[tracing::instrument(skip(app_state, request))]
pub async fn create_livekit_video_token(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<VideoTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(room_name), Some(participant_name)) = (
        request.room_name.filter(|name| !name.is_empty()),
        request.participant_name.filter(|name| !name.is_empty()),
    ) else {
        return Err(
            AppError::Validation("Room name and participant name are required".to_string()).into(),
        );
    };

    let token = app_state.video_tokens.issue(&room_name, &participant_name)?;

    Ok(ApiResponse::new(
        200,
        json!({ "token": token }),
        "LiveKit token generated successfully",
    ))
}
