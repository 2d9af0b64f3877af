use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use diesel::prelude::*;
use rand_core::OsRng;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AppError, RegistrationError};

#[derive(Clone, Debug, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub refresh_token: Option<String>,
    pub avatar_url: Option<String>,
    pub avatar_public_id: Option<String>,
    pub cover_image_url: Option<String>,
    pub cover_image_public_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub avatar_public_id: Option<String>,
    pub cover_image_url: Option<String>,
    pub cover_image_public_id: Option<String>,
}

impl NewUser {
    /// Validates the registration fields and hashes the password.
    pub fn create(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationError> {
        if [username, email, password].iter().any(|f| f.trim().is_empty()) {
            return Err(RegistrationError::MissingFields);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| RegistrationError::from(AppError::HashError(e.to_string())))?
            .to_string();

        Ok(Self {
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            password: hash,
            avatar_url: None,
            avatar_public_id: None,
            cover_image_url: None,
            cover_image_public_id: None,
        })
    }
}

/// User as returned to clients: no password hash, no refresh token.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<User> for OutboundUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            cover_image_url: user.cover_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        assert!(matches!(
            NewUser::create("  ", "maki@example.com", "hunter2"),
            Err(RegistrationError::MissingFields)
        ));
        assert!(matches!(
            NewUser::create("maki", "maki@example.com", ""),
            Err(RegistrationError::MissingFields)
        ));
    }

    #[test]
    fn password_is_stored_hashed() {
        let new_user = NewUser::create("maki", "Maki@Example.com", "hunter2").expect("create");
        assert_ne!(new_user.password, "hunter2");
        assert!(new_user.password.starts_with("$argon2"));
        assert_eq!(new_user.email, "maki@example.com");
    }
}
