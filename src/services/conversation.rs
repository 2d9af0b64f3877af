use async_trait::async_trait;
use diesel::{
    BoolExpressionMethods, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl,
    RunQueryDsl, SelectableHelper, r2d2::ConnectionManager,
};
use r2d2::Pool;
use uuid::Uuid;

use crate::schema::{conversations, members};
use crate::{AppError, Conversation, NewConversation, canonical_pair};

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Resolves the single conversation for an unordered pair of members,
    /// creating it on first use. The boolean is true when a row was created.
    async fn fetch_or_create(&self, a: Uuid, b: Uuid) -> Result<(Conversation, bool), AppError>;
}

pub struct DbConversationService {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl DbConversationService {
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
impl ConversationService for DbConversationService {
    #[tracing::instrument(skip(self))]
    async fn fetch_or_create(&self, a: Uuid, b: Uuid) -> Result<(Conversation, bool), AppError> {
        if a == b {
            return Err(AppError::Validation(
                "Cannot open a conversation with yourself".to_string(),
            ));
        }

        let (one, two) = canonical_pair(a, b);
        let mut conn = self.get_conn()?;

        let result = tokio::task::spawn_blocking(move || {
            let participants = members::table
                .filter(members::id.eq(one).or(members::id.eq(two)))
                .count()
                .get_result::<i64>(&mut conn)?;
            if participants != 2 {
                return Ok(None);
            }

            if let Some(existing) = conversations::table
                .filter(
                    conversations::member_id_one
                        .eq(one)
                        .and(conversations::member_id_two.eq(two)),
                )
                .select(Conversation::as_select())
                .first(&mut conn)
                .optional()?
            {
                return Ok(Some((existing, false)));
            }

            // A concurrent first fetch may win the insert; the unique pair
            // constraint turns ours into a no-op and the row is re-read.
            let inserted = diesel::insert_into(conversations::table)
                .values(&NewConversation::between(one, two))
                .on_conflict((conversations::member_id_one, conversations::member_id_two))
                .do_nothing()
                .returning(Conversation::as_returning())
                .get_result(&mut conn)
                .optional()?;

            match inserted {
                Some(conversation) => Ok(Some((conversation, true))),
                None => conversations::table
                    .filter(
                        conversations::member_id_one
                            .eq(one)
                            .and(conversations::member_id_two.eq(two)),
                    )
                    .select(Conversation::as_select())
                    .first(&mut conn)
                    .map(|c| Some((c, false))),
            }
        })
        .await??
        .ok_or_else(|| AppError::Validation("This member does not exist".to_string()))?;

        Ok(result)
    }
}
