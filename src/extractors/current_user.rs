use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{ApiError, AppState, ExtractError, User};

/// The authenticated caller, resolved from a verified access token. Handlers
/// take this as an argument; an unauthenticated request is rejected before
/// the handler body runs.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
        }
    }
}

/// The access token travels either in the `accessToken` cookie or an
/// `Authorization: Bearer` header; the cookie wins when both are present.
fn access_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get("accessToken") {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

impl CurrentUser {
    async fn from_parts(parts: &mut Parts, app_state: &AppState) -> Result<Self, ExtractError> {
        let jar = CookieJar::from_request_parts(parts, app_state)
            .await
            .map_err(|e| ExtractError::CookieError(e.to_string()))?;

        let token = access_token(&jar, &parts.headers).ok_or(ExtractError::NoToken)?;
        let claims = app_state
            .tokens
            .verify_access(&token)
            .map_err(ExtractError::BadToken)?;

        // The token may outlive the account; confirm against the database.
        let user = app_state
            .auth
            .get_user_info(claims.sub)
            .await
            .map_err(ExtractError::LookupError)?
            .ok_or(ExtractError::NoSuchUser)?;

        Ok(user.into())
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, app_state: &AppState) -> Result<Self, ApiError> {
        Self::from_parts(parts, app_state).await.map_err(|e| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );

        let token = access_token(&CookieJar::new(), &headers);
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn cookie_takes_precedence_over_header() {
        let jar = CookieJar::new().add(axum_extra::extract::cookie::Cookie::new(
            "accessToken",
            "from-cookie",
        ));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        let token = access_token(&jar, &headers);
        assert_eq!(token.as_deref(), Some("from-cookie"));
    }

    #[test]
    fn missing_credentials_yield_none() {
        assert!(access_token(&CookieJar::new(), &HeaderMap::new()).is_none());
    }

    #[test]
    fn non_bearer_scheme_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert!(access_token(&CookieJar::new(), &headers).is_none());
    }
}
