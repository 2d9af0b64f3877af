use std::io::Write;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsExpression, FromSqlRow, Serialize, Deserialize)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChannelKind {
    Text,
    Audio,
    Video,
}

impl ChannelKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Audio => "AUDIO",
            Self::Video => "VIDEO",
        }
    }
}

impl ToSql<Text, Pg> for ChannelKind {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for ChannelKind {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"TEXT" => Ok(Self::Text),
            b"AUDIO" => Ok(Self::Audio),
            b"VIDEO" => Ok(Self::Video),
            other => Err(format!("unrecognized channel kind: {}", String::from_utf8_lossy(other)).into()),
        }
    }
}

/// A named communication room scoped to one server.
#[derive(Clone, Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::channels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub profile_id: Uuid,
    pub server_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::channels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewChannel {
    pub name: String,
    pub kind: ChannelKind,
    pub profile_id: Uuid,
    pub server_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_upper_case() {
        assert_eq!(
            serde_json::to_value(ChannelKind::Text).expect("serialize"),
            serde_json::json!("TEXT")
        );
        assert_eq!(
            serde_json::from_value::<ChannelKind>(serde_json::json!("VIDEO")).expect("deserialize"),
            ChannelKind::Video
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(serde_json::from_value::<ChannelKind>(serde_json::json!("VOICE")).is_err());
    }
}
