use async_trait::async_trait;
use diesel::{
    ExpressionMethods, JoinOnDsl, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl,
    SelectableHelper, r2d2::ConnectionManager,
};
use r2d2::Pool;
use uuid::Uuid;

use crate::schema::{members, profiles};
use crate::{AppError, NewProfile, Profile, User};

#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Lazy get-or-create: the first fetch synthesizes the profile from the
    /// user record, later fetches return the stored row unchanged.
    async fn get_or_create_for(&self, user: &User) -> Result<Profile, AppError>;
    async fn get_by_id(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError>;
    async fn get_by_server(&self, server_id: Uuid) -> Result<Vec<Profile>, AppError>;
}

pub struct DbProfileService {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl DbProfileService {
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

#[async_trait]
impl ProfileService for DbProfileService {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn get_or_create_for(&self, user: &User) -> Result<Profile, AppError> {
        let mut conn = self.get_conn()?;

        let new_profile = NewProfile::from(user);
        let user_id = user.id;
        let profile = tokio::task::spawn_blocking(move || {
            if let Some(existing) = profiles::table
                .filter(profiles::user_id.eq(user_id))
                .select(Profile::as_select())
                .first(&mut conn)
                .optional()?
            {
                return Ok(existing);
            }

            // A concurrent first fetch may have inserted in between; the
            // unique index on user_id makes the insert a no-op, so re-read.
            let inserted = diesel::insert_into(profiles::table)
                .values(&new_profile)
                .on_conflict(profiles::user_id)
                .do_nothing()
                .returning(Profile::as_returning())
                .get_result(&mut conn)
                .optional()?;

            match inserted {
                Some(profile) => Ok(profile),
                None => profiles::table
                    .filter(profiles::user_id.eq(user_id))
                    .select(Profile::as_select())
                    .first(&mut conn),
            }
        })
        .await??;

        Ok(profile)
    }

    async fn get_by_id(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        let mut conn = self.get_conn()?;

        let profile = tokio::task::spawn_blocking(move || {
            profiles::table
                .find(profile_id)
                .select(Profile::as_select())
                .first(&mut conn)
                .optional()
        })
        .await??;

        Ok(profile)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_server(&self, server_id: Uuid) -> Result<Vec<Profile>, AppError> {
        let mut conn = self.get_conn()?;

        let profiles = tokio::task::spawn_blocking(move || {
            members::table
                .filter(members::server_id.eq(server_id))
                .inner_join(profiles::table.on(profiles::id.eq(members::profile_id)))
                .select(Profile::as_select())
                .load(&mut conn)
        })
        .await??;

        Ok(profiles)
    }
}
