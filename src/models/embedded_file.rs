use diesel::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A document a user has embedded into the vector index. The Pinecone
/// namespace is named after the file.
#[derive(Clone, Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::embedded_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedFile {
    pub id: Uuid,
    pub file_name: String,
    pub namespace: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::embedded_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewEmbeddedFile {
    pub file_name: String,
    pub namespace: String,
    pub user_id: Uuid,
}
