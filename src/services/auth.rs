use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use diesel::{
    BoolExpressionMethods, Connection, ExpressionMethods, OptionalExtension, PgConnection,
    QueryDsl, RunQueryDsl, SelectableHelper, r2d2::ConnectionManager,
};
use r2d2::Pool;
use uuid::Uuid;

use crate::schema::{profiles, users};
use crate::{AppError, LoginError, NewUser, RegistrationError, User};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register_user(&self, new_user: NewUser) -> Result<User, RegistrationError>;
    async fn login(&self, identifier: &str, password: &str) -> Result<User, LoginError>;
    async fn get_user_info(&self, user_id: Uuid) -> Result<Option<User>, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token: Option<String>,
    ) -> Result<(), AppError>;
    async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<User, LoginError>;
    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<User, AppError>;
    async fn set_avatar(&self, user_id: Uuid, url: String, public_id: String)
    -> Result<User, AppError>;
    async fn set_cover_image(
        &self,
        user_id: Uuid,
        url: String,
        public_id: String,
    ) -> Result<User, AppError>;
}

pub struct DbAuthService {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl DbAuthService {
    #[must_use]
    pub const fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    fn get_conn(
        &self,
    ) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, AppError> {
        self.pool
            .get()
            .map_err(|e| AppError::PoolError(e.to_string()))
    }
}

fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AppError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[async_trait]
impl AuthService for DbAuthService {
    #[tracing::instrument(skip(self, new_user))]
    async fn register_user(&self, new_user: NewUser) -> Result<User, RegistrationError> {
        let mut conn = self.get_conn().map_err(RegistrationError::System)?;

        let user = tokio::task::spawn_blocking(move || {
            let existing = users::table
                .filter(
                    users::username
                        .eq(&new_user.username)
                        .or(users::email.eq(&new_user.email)),
                )
                .select(users::id)
                .first::<Uuid>(&mut conn)
                .optional()?;

            if existing.is_some() {
                return Ok(None);
            }

            diesel::insert_into(users::table)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result(&mut conn)
                .map(Some)
        })
        .await
        .map_err(|e| RegistrationError::System(e.into()))?
        .map_err(|e: diesel::result::Error| match AppError::from(e) {
            AppError::DuplicateKey(_) => RegistrationError::AlreadyExists,
            other => RegistrationError::System(other),
        })?
        .ok_or(RegistrationError::AlreadyExists)?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, password))]
    async fn login(&self, identifier: &str, password: &str) -> Result<User, LoginError> {
        if identifier.trim().is_empty() {
            return Err(LoginError::MissingIdentifier);
        }

        let mut conn = self.get_conn().map_err(LoginError::System)?;

        let identifier = identifier.to_string();
        let user = tokio::task::spawn_blocking(move || {
            users::table
                .filter(users::username.eq(&identifier).or(users::email.eq(&identifier)))
                .select(User::as_select())
                .first(&mut conn)
                .optional()
        })
        .await
        .map_err(|e| LoginError::System(e.into()))?
        .map_err(|e| LoginError::System(e.into()))?
        .ok_or(LoginError::NoSuchUser)?;

        if verify_password(&user.password, password).map_err(LoginError::System)? {
            Ok(user)
        } else {
            Err(LoginError::InvalidPassword)
        }
    }

    async fn get_user_info(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let mut conn = self.get_conn()?;

        let user = tokio::task::spawn_blocking(move || {
            users::table
                .find(user_id)
                .select(User::as_select())
                .first(&mut conn)
                .optional()
        })
        .await??;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.get_conn()?;

        let username = username.to_string();
        let user = tokio::task::spawn_blocking(move || {
            users::table
                .filter(users::username.eq(username))
                .select(User::as_select())
                .first(&mut conn)
                .optional()
        })
        .await??;

        Ok(user)
    }

    #[tracing::instrument(skip(self, token))]
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        token: Option<String>,
    ) -> Result<(), AppError> {
        let mut conn = self.get_conn()?;

        tokio::task::spawn_blocking(move || {
            diesel::update(users::table.find(user_id))
                .set((
                    users::refresh_token.eq(token),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)
        })
        .await??;

        Ok(())
    }

    #[tracing::instrument(skip(self, old_password, new_password))]
    async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<User, LoginError> {
        let user = self
            .get_user_info(user_id)
            .await
            .map_err(LoginError::System)?
            .ok_or(LoginError::NoSuchUser)?;

        if !verify_password(&user.password, old_password).map_err(LoginError::System)? {
            return Err(LoginError::IncorrectOldPassword);
        }

        let hashed = NewUser::create(&user.username, &user.email, new_password)
            .map_err(|e| match e {
                RegistrationError::MissingFields => {
                    LoginError::System(AppError::Validation("Enter your new password".to_string()))
                }
                RegistrationError::AlreadyExists => {
                    LoginError::System(AppError::QueryFailed("unexpected duplicate".to_string()))
                }
                RegistrationError::System(inner) => LoginError::System(inner),
            })?
            .password;

        let mut conn = self.get_conn().map_err(LoginError::System)?;
        let user = tokio::task::spawn_blocking(move || {
            diesel::update(users::table.find(user_id))
                .set((
                    users::password.eq(hashed),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .returning(User::as_returning())
                .get_result(&mut conn)
        })
        .await
        .map_err(|e| LoginError::System(e.into()))?
        .map_err(|e| LoginError::System(e.into()))?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn update_username(&self, user_id: Uuid, username: &str) -> Result<User, AppError> {
        if username.trim().is_empty() {
            return Err(AppError::Validation("Enter New Username".to_string()));
        }

        if self.get_user_by_username(username).await?.is_some() {
            return Err(AppError::Validation("Username already taken".to_string()));
        }

        let mut conn = self.get_conn()?;
        let username = username.trim().to_string();
        let user = tokio::task::spawn_blocking(move || {
            diesel::update(users::table.find(user_id))
                .set((
                    users::username.eq(username),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .returning(User::as_returning())
                .get_result(&mut conn)
        })
        .await??;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn set_avatar(
        &self,
        user_id: Uuid,
        url: String,
        public_id: String,
    ) -> Result<User, AppError> {
        let mut conn = self.get_conn()?;

        let user = tokio::task::spawn_blocking(move || {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let user = diesel::update(users::table.find(user_id))
                    .set((
                        users::avatar_url.eq(&url),
                        users::avatar_public_id.eq(&public_id),
                        users::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(User::as_returning())
                    .get_result(conn)?;

                // The avatar is mirrored onto the profile record.
                let updated = diesel::update(profiles::table.filter(profiles::user_id.eq(user_id)))
                    .set((
                        profiles::image_url.eq(&url),
                        profiles::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)?;
                if updated == 0 {
                    return Err(diesel::result::Error::NotFound);
                }

                Ok(user)
            })
        })
        .await?
        .map_err(|e| match e {
            diesel::result::Error::NotFound => AppError::NotFound("profile"),
            other => other.into(),
        })?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn set_cover_image(
        &self,
        user_id: Uuid,
        url: String,
        public_id: String,
    ) -> Result<User, AppError> {
        let mut conn = self.get_conn()?;

        let user = tokio::task::spawn_blocking(move || {
            diesel::update(users::table.find(user_id))
                .set((
                    users::cover_image_url.eq(url),
                    users::cover_image_public_id.eq(public_id),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .returning(User::as_returning())
                .get_result(&mut conn)
        })
        .await??;

        Ok(user)
    }
}
