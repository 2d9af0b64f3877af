use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Uniform error envelope sent to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    pub errors: Vec<String>,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status_code: status.into(),
            message: message.to_string(),
            success: false,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_detail(status: StatusCode, message: &str, detail: String) -> Self {
        Self {
            status_code: status.into(),
            message: message.to_string(),
            success: false,
            errors: vec![detail],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::from_u16(self.status_code).expect("status code must be in range [100, 999]"),
            Json(self),
        )
            .into_response()
    }
}

#[derive(Debug)]
pub enum AppError {
    PoolError(String),
    QueryFailed(String),
    DuplicateKey(String),
    TaskFailed(String),
    NotFound(&'static str),
    Validation(String),
    Forbidden(&'static str),
    Upstream(String),
    Io(String),
    HashError(String),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::PoolError(s) => {
                Self::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "database connection failed", s)
            }
            AppError::QueryFailed(s) => {
                Self::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "query failed", s)
            }
            AppError::DuplicateKey(s) => {
                Self::with_detail(StatusCode::CONFLICT, "duplicate record", s)
            }
            AppError::TaskFailed(s) => {
                Self::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "task failed", s)
            }
            AppError::NotFound(what) => {
                Self::new(StatusCode::NOT_FOUND, &format!("{what} not found"))
            }
            AppError::Validation(s) => Self::new(StatusCode::BAD_REQUEST, &s),
            AppError::Forbidden(s) => Self::new(StatusCode::FORBIDDEN, s),
            AppError::Upstream(s) => {
                Self::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "upstream service failed", s)
            }
            AppError::Io(s) => {
                Self::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "io error", s)
            }
            AppError::HashError(s) => {
                Self::with_detail(StatusCode::INTERNAL_SERVER_ERROR, "password hashing failed", s)
            }
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => Self::DuplicateKey(info.message().to_string()),
            other => Self::QueryFailed(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::TaskFailed(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[derive(Debug)]
pub enum RegistrationError {
    MissingFields,
    AlreadyExists,
    System(AppError),
}

impl From<AppError> for RegistrationError {
    fn from(value: AppError) -> Self {
        Self::System(value)
    }
}

impl From<RegistrationError> for ApiError {
    fn from(value: RegistrationError) -> Self {
        match value {
            RegistrationError::MissingFields => {
                Self::new(StatusCode::BAD_REQUEST, "All fields are required")
            }
            RegistrationError::AlreadyExists => Self::new(
                StatusCode::CONFLICT,
                "User with this username or email already exists",
            ),
            RegistrationError::System(e) => e.into(),
        }
    }
}

pub enum LoginError {
    MissingIdentifier,
    NoSuchUser,
    InvalidPassword,
    IncorrectOldPassword,
    System(AppError),
}

impl From<AppError> for LoginError {
    fn from(value: AppError) -> Self {
        Self::System(value)
    }
}

impl From<LoginError> for ApiError {
    fn from(value: LoginError) -> Self {
        match value {
            LoginError::MissingIdentifier => {
                Self::new(StatusCode::BAD_REQUEST, "Username or Email is required")
            }
            LoginError::NoSuchUser => Self::new(StatusCode::BAD_REQUEST, "User does not exist"),
            LoginError::InvalidPassword => {
                Self::new(StatusCode::UNAUTHORIZED, "Incorrect Password!")
            }
            LoginError::IncorrectOldPassword => {
                Self::new(StatusCode::BAD_REQUEST, "Incorrect Old Password")
            }
            LoginError::System(e) => e.into(),
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Missing,
    Expired,
    Invalid(String),
    Mismatch,
    SigningFailed(String),
}

impl From<TokenError> for ApiError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Missing => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized request"),
            TokenError::Expired | TokenError::Mismatch => {
                Self::new(StatusCode::UNAUTHORIZED, "Refresh token has expired")
            }
            TokenError::Invalid(s) => {
                Self::with_detail(StatusCode::UNAUTHORIZED, "Invalid Access Token", s)
            }
            TokenError::SigningFailed(s) => Self::with_detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong while generating refresh or access token",
                s,
            ),
        }
    }
}

pub enum ExtractError {
    NoToken,
    CookieError(String),
    BadToken(TokenError),
    LookupError(AppError),
    NoSuchUser,
}

impl From<ExtractError> for ApiError {
    fn from(value: ExtractError) -> Self {
        match value {
            ExtractError::NoToken => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized request"),
            ExtractError::CookieError(s) => Self::with_detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                "error extracting cookie",
                s,
            ),
            ExtractError::BadToken(e) => e.into(),
            ExtractError::LookupError(e) => e.into(),
            ExtractError::NoSuchUser => Self::new(StatusCode::UNAUTHORIZED, "Invalid Access Token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_password_maps_to_401() {
        let api: ApiError = LoginError::InvalidPassword.into();
        assert_eq!(api.status_code, 401);
        assert!(!api.success);
    }

    #[test]
    fn wrong_old_password_maps_to_400() {
        let api: ApiError = LoginError::IncorrectOldPassword.into();
        assert_eq!(api.status_code, 400);
        assert_eq!(api.message, "Incorrect Old Password");
    }

    #[test]
    fn duplicate_registration_maps_to_409() {
        let api: ApiError = RegistrationError::AlreadyExists.into();
        assert_eq!(api.status_code, 409);
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let api = ApiError::new(StatusCode::BAD_REQUEST, "Cannot get server Id");
        let json = serde_json::to_value(&api).expect("serialize");
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["success"], false);
        assert!(json["errors"].as_array().expect("errors array").is_empty());
    }
}
