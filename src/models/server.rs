use diesel::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A community. Always owns at least one channel ("general") and one member
/// (its creator, as admin) after creation.
#[derive(Clone, Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "serverImage")]
    pub image_url: Option<String>,
    #[serde(skip_serializing)]
    pub image_public_id: Option<String>,
    pub invite_code: String,
    pub profile_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewServer {
    pub name: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub invite_code: String,
    pub profile_id: Uuid,
}

impl NewServer {
    #[must_use]
    pub fn with_fresh_invite_code(
        name: String,
        image: Option<(String, String)>,
        profile_id: Uuid,
    ) -> Self {
        let (image_url, image_public_id) = match image {
            Some((url, public_id)) => (Some(url), Some(public_id)),
            None => (None, None),
        };

        Self {
            name,
            image_url,
            image_public_id,
            invite_code: Uuid::new_v4().to_string(),
            profile_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_are_unique_per_server() {
        let a = NewServer::with_fresh_invite_code("Math".to_string(), None, Uuid::new_v4());
        let b = NewServer::with_fresh_invite_code("Math".to_string(), None, Uuid::new_v4());
        assert_ne!(a.invite_code, b.invite_code);
        assert_eq!(a.invite_code.len(), 36);
    }
}
