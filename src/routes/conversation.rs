use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, ApiResponse, AppError, AppState, CurrentUser};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConversationRequest {
    #[serde(default)]
    pub current_user_member_id: Option<Uuid>,
    #[serde(default)]
    pub target_user_member_id: Option<Uuid>,
}

/// Resolves the direct conversation between two members, creating it on
/// first contact. Created conversations answer 201, existing ones 200.
#[tracing::instrument(skip(app_state, request))]
pub async fn fetch_conversation(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<FetchConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(current), Some(target)) = (
        request.current_user_member_id,
        request.target_user_member_id,
    ) else {
        return Err(AppError::Validation("Member IDs are required".to_string()).into());
    };

    let (conversation, created) = app_state.conversations.fetch_or_create(current, target).await?;

    let response = if created {
        ApiResponse::new(201, conversation, "Conversation created successfully")
    } else {
        ApiResponse::new(200, conversation, "Conversation fetched successfully")
    };
    Ok(response)
}
