use async_trait::async_trait;
use diesel::{
    BoolExpressionMethods, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl,
    RunQueryDsl, SelectableHelper, r2d2::ConnectionManager,
};
use r2d2::Pool;
use uuid::Uuid;

use crate::schema::embedded_files;
use crate::{AppError, EmbeddedFile, NewEmbeddedFile};

/// Bookkeeping for which user embedded which document. Ownership checks for
/// query/delete against the vector index go through here.
#[async_trait]
pub trait FileLibraryService: Send + Sync {
    async fn record(&self, new_file: NewEmbeddedFile) -> Result<EmbeddedFile, AppError>;
    async fn find_owned(
        &self,
        user_id: Uuid,
        file_name: &str,
    ) -> Result<Option<EmbeddedFile>, AppError>;
    async fn delete(&self, file_id: Uuid) -> Result<(), AppError>;
    async fn list_names_for(&self, user_id: Uuid) -> Result<Vec<String>, AppError>;
}

pub struct DbFileLibraryService {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl DbFileLibraryService {
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
impl FileLibraryService for DbFileLibraryService {
    #[tracing::instrument(skip(self, new_file), fields(file_name = %new_file.file_name))]
    async fn record(&self, new_file: NewEmbeddedFile) -> Result<EmbeddedFile, AppError> {
        let mut conn = self.get_conn()?;

        let file = tokio::task::spawn_blocking(move || {
            diesel::insert_into(embedded_files::table)
                .values(&new_file)
                .returning(EmbeddedFile::as_returning())
                .get_result(&mut conn)
        })
        .await??;

        Ok(file)
    }

    async fn find_owned(
        &self,
        user_id: Uuid,
        file_name: &str,
    ) -> Result<Option<EmbeddedFile>, AppError> {
        let mut conn = self.get_conn()?;

        let file_name = file_name.to_string();
        let file = tokio::task::spawn_blocking(move || {
            embedded_files::table
                .filter(
                    embedded_files::user_id
                        .eq(user_id)
                        .and(embedded_files::file_name.eq(file_name)),
                )
                .select(EmbeddedFile::as_select())
                .first(&mut conn)
                .optional()
        })
        .await??;

        Ok(file)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, file_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.get_conn()?;

        tokio::task::spawn_blocking(move || {
            diesel::delete(embedded_files::table.find(file_id)).execute(&mut conn)
        })
        .await??;

        Ok(())
    }

    async fn list_names_for(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let mut conn = self.get_conn()?;

        let names = tokio::task::spawn_blocking(move || {
            embedded_files::table
                .filter(embedded_files::user_id.eq(user_id))
                .select(embedded_files::file_name)
                .load(&mut conn)
        })
        .await??;

        Ok(names)
    }
}
