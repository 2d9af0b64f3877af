use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::{ApiError, ApiResponse, AppState, CurrentUser};

use super::expired_cookie;

/// Clears the auth cookies and revokes the stored refresh token so it can no
/// longer be redeemed.
#[tracing::instrument(skip(app_state, jar), fields(user_id = %user.id))]
pub async fn logout(
    State(app_state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    app_state.auth.store_refresh_token(user.id, None).await?;

    let jar = jar
        .remove(expired_cookie("accessToken"))
        .remove(expired_cookie("refreshToken"));

    Ok((jar, ApiResponse::new(200, json!({}), "User logged out")))
}
