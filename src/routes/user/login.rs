use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResponse, AppState, LoginError, OutboundUser};

use super::auth_cookie;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    user: OutboundUser,
    access_token: String,
    refresh_token: String,
}

#[tracing::instrument(skip(app_state, jar, request))]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identifier = request
        .username
        .or(request.email)
        .filter(|id| !id.trim().is_empty())
        .ok_or(LoginError::MissingIdentifier)?;

    let user = app_state.auth.login(&identifier, &request.password).await?;

    let access_token = app_state
        .tokens
        .issue_access(user.id, &user.username, &user.email)?;
    let refresh_token = app_state.tokens.issue_refresh(user.id)?;
    app_state
        .auth
        .store_refresh_token(user.id, Some(refresh_token.clone()))
        .await?;

    let jar = jar
        .add(auth_cookie(
            "accessToken",
            access_token.clone(),
            app_state.access_cookie_ttl,
        ))
        .add(auth_cookie(
            "refreshToken",
            refresh_token.clone(),
            app_state.refresh_cookie_ttl,
        ));

    let data = LoginData {
        user: user.into(),
        access_token,
        refresh_token,
    };

    Ok((jar, ApiResponse::new(200, data, "User logged in successfully")))
}
