use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResponse, AppState, TokenError};

use super::auth_cookie;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    access_token: String,
    refresh_token: String,
}

/// Redeems a refresh token (cookie or body) for a fresh token pair. The
/// presented token must match the copy stored at login; a rotated-out or
/// revoked token is rejected even when its signature is still valid.
#[tracing::instrument(skip(app_state, jar, body))]
pub async fn refresh_access_token(
    State(app_state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let incoming = jar
        .get("refreshToken")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|Json(request)| request.refresh_token))
        .ok_or(TokenError::Missing)?;

    let claims = app_state.tokens.verify_refresh(&incoming)?;

    let user = app_state
        .auth
        .get_user_info(claims.sub)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Invalid Refresh Token"))?;

    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        return Err(TokenError::Mismatch.into());
    }

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

    let data = RefreshData {
        access_token,
        refresh_token,
    };

    Ok((jar, ApiResponse::new(200, data, "Access Token Refreshed")))
}
