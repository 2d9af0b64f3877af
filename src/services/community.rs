use async_trait::async_trait;
use diesel::{
    BoolExpressionMethods, Connection, ExpressionMethods, OptionalExtension, PgConnection,
    QueryDsl, RunQueryDsl, SelectableHelper, r2d2::ConnectionManager,
};
use r2d2::Pool;
use uuid::Uuid;

use crate::schema::{channels, members, profiles, servers};
use crate::{
    AppError, Channel, ChannelKind, Member, MemberRole, NewChannel, NewMember, NewServer, Profile,
    Server,
};

/// Outcome of a join-by-invite-code request. Joining a server the profile is
/// already a member of is an idempotent success.
pub enum JoinOutcome {
    Joined(Uuid),
    AlreadyMember(Uuid),
}

#[async_trait]
pub trait CommunityService: Send + Sync {
    async fn create_server(&self, new_server: NewServer) -> Result<Server, AppError>;
    async fn servers_for_profile(&self, profile_id: Uuid) -> Result<Vec<Server>, AppError>;
    async fn join_server(&self, profile_id: Uuid, invite_code: &str)
    -> Result<JoinOutcome, AppError>;
    async fn leave_server(&self, profile_id: Uuid, server_id: Uuid) -> Result<(), AppError>;
    async fn delete_server(&self, profile_id: Uuid, server_id: Uuid) -> Result<(), AppError>;

    async fn channels_by_server(&self, server_id: Uuid) -> Result<Vec<Channel>, AppError>;
    async fn create_channel(&self, new_channel: NewChannel) -> Result<Channel, AppError>;
    async fn delete_channel(&self, channel_id: Uuid, server_id: Uuid) -> Result<(), AppError>;

    async fn members_by_server(&self, server_id: Uuid) -> Result<Vec<Member>, AppError>;
    async fn change_role(&self, member_id: Uuid, role: MemberRole) -> Result<Member, AppError>;
    async fn kick_member(
        &self,
        member_id: Uuid,
        profile_id: Uuid,
        server_id: Uuid,
    ) -> Result<Profile, AppError>;
}

pub struct DbCommunityService {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl DbCommunityService {
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
impl CommunityService for DbCommunityService {
    /// Creates the server, its default "general" text channel, and the
    /// creator's admin membership in one transaction: either all three rows
    /// exist afterwards or none do.
    #[tracing::instrument(skip(self, new_server), fields(name = %new_server.name))]
    async fn create_server(&self, new_server: NewServer) -> Result<Server, AppError> {
        let mut conn = self.get_conn()?;

        let server = tokio::task::spawn_blocking(move || {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let server: Server = diesel::insert_into(servers::table)
                    .values(&new_server)
                    .returning(Server::as_returning())
                    .get_result(conn)?;

                diesel::insert_into(channels::table)
                    .values(&NewChannel {
                        name: "general".to_string(),
                        kind: ChannelKind::Text,
                        profile_id: server.profile_id,
                        server_id: server.id,
                    })
                    .execute(conn)?;

                diesel::insert_into(members::table)
                    .values(&NewMember {
                        role: MemberRole::Admin,
                        profile_id: server.profile_id,
                        server_id: server.id,
                    })
                    .execute(conn)?;

                Ok(server)
            })
        })
        .await??;

        Ok(server)
    }

    #[tracing::instrument(skip(self))]
    async fn servers_for_profile(&self, profile_id: Uuid) -> Result<Vec<Server>, AppError> {
        let mut conn = self.get_conn()?;

        let servers = tokio::task::spawn_blocking(move || {
            let server_ids = members::table
                .filter(members::profile_id.eq(profile_id))
                .select(members::server_id)
                .load::<Uuid>(&mut conn)?;

            servers::table
                .filter(servers::id.eq_any(server_ids))
                .select(Server::as_select())
                .load(&mut conn)
        })
        .await??;

        Ok(servers)
    }

    #[tracing::instrument(skip(self))]
    async fn join_server(
        &self,
        profile_id: Uuid,
        invite_code: &str,
    ) -> Result<JoinOutcome, AppError> {
        let mut conn = self.get_conn()?;

        let invite_code = invite_code.to_string();
        let outcome = tokio::task::spawn_blocking(move || -> Result<Option<JoinOutcome>, AppError> {
            let server_id = servers::table
                .filter(servers::invite_code.eq(invite_code))
                .select(servers::id)
                .first::<Uuid>(&mut conn)
                .optional()?;
            let Some(server_id) = server_id else {
                return Ok(None);
            };

            // The unique (profile_id, server_id) index makes a racing second
            // join a no-op rather than a duplicate membership.
            let inserted = diesel::insert_into(members::table)
                .values(&NewMember {
                    role: MemberRole::Guest,
                    profile_id,
                    server_id,
                })
                .on_conflict((members::profile_id, members::server_id))
                .do_nothing()
                .execute(&mut conn)?;

            if inserted == 0 {
                Ok(Some(JoinOutcome::AlreadyMember(server_id)))
            } else {
                Ok(Some(JoinOutcome::Joined(server_id)))
            }
        })
        .await??
        .ok_or_else(|| AppError::Validation("Invalid invite code".to_string()))?;

        Ok(outcome)
    }

    #[tracing::instrument(skip(self))]
    async fn leave_server(&self, profile_id: Uuid, server_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.get_conn()?;

        tokio::task::spawn_blocking(move || {
            diesel::delete(
                members::table.filter(
                    members::profile_id
                        .eq(profile_id)
                        .and(members::server_id.eq(server_id)),
                ),
            )
            .execute(&mut conn)
        })
        .await??;

        Ok(())
    }

    /// Only the creating profile may delete a server. Channels, members and
    /// their conversations are removed by the cascading foreign keys.
    #[tracing::instrument(skip(self))]
    async fn delete_server(&self, profile_id: Uuid, server_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.get_conn()?;

        let deleted = tokio::task::spawn_blocking(move || -> Result<Deletion, AppError> {
            let owner = servers::table
                .find(server_id)
                .select(servers::profile_id)
                .first::<Uuid>(&mut conn)
                .optional()?;

            match owner {
                None => Ok(Deletion::Missing),
                Some(owner) if owner != profile_id => Ok(Deletion::NotOwner),
                Some(_) => {
                    diesel::delete(servers::table.find(server_id)).execute(&mut conn)?;
                    Ok(Deletion::Done)
                }
            }
        })
        .await??;

        match deleted {
            Deletion::Done => Ok(()),
            Deletion::Missing => Err(AppError::Validation("Server not found".to_string())),
            Deletion::NotOwner => Err(AppError::Forbidden("only the server creator can delete it")),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn channels_by_server(&self, server_id: Uuid) -> Result<Vec<Channel>, AppError> {
        let mut conn = self.get_conn()?;

        let channels = tokio::task::spawn_blocking(move || {
            channels::table
                .filter(channels::server_id.eq(server_id))
                .select(Channel::as_select())
                .load(&mut conn)
        })
        .await??;

        Ok(channels)
    }

    #[tracing::instrument(skip(self, new_channel), fields(name = %new_channel.name))]
    async fn create_channel(&self, new_channel: NewChannel) -> Result<Channel, AppError> {
        let mut conn = self.get_conn()?;

        let channel = tokio::task::spawn_blocking(move || {
            let existing = channels::table
                .filter(
                    channels::server_id
                        .eq(new_channel.server_id)
                        .and(channels::name.eq(&new_channel.name)),
                )
                .select(channels::id)
                .first::<Uuid>(&mut conn)
                .optional()?;

            if existing.is_some() {
                return Ok(None);
            }

            diesel::insert_into(channels::table)
                .values(&new_channel)
                .returning(Channel::as_returning())
                .get_result(&mut conn)
                .map(Some)
        })
        .await??
        .ok_or_else(|| {
            AppError::Validation(
                "A channel with this name already exist please use another name".to_string(),
            )
        })?;

        Ok(channel)
    }

    /// The channel must belong to the claimed server; a mismatched pair is a
    /// validation error, not a delete of someone else's channel.
    #[tracing::instrument(skip(self))]
    async fn delete_channel(&self, channel_id: Uuid, server_id: Uuid) -> Result<(), AppError> {
        let mut conn = self.get_conn()?;

        let deleted = tokio::task::spawn_blocking(move || {
            diesel::delete(
                channels::table.filter(
                    channels::id
                        .eq(channel_id)
                        .and(channels::server_id.eq(server_id)),
                ),
            )
            .execute(&mut conn)
        })
        .await??;

        if deleted == 0 {
            return Err(AppError::NotFound("channel"));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn members_by_server(&self, server_id: Uuid) -> Result<Vec<Member>, AppError> {
        let mut conn = self.get_conn()?;

        let members = tokio::task::spawn_blocking(move || {
            members::table
                .filter(members::server_id.eq(server_id))
                .select(Member::as_select())
                .load(&mut conn)
        })
        .await??;

        Ok(members)
    }

    #[tracing::instrument(skip(self))]
    async fn change_role(&self, member_id: Uuid, role: MemberRole) -> Result<Member, AppError> {
        let mut conn = self.get_conn()?;

        let member = tokio::task::spawn_blocking(move || {
            diesel::update(members::table.find(member_id))
                .set((
                    members::role.eq(role),
                    members::updated_at.eq(diesel::dsl::now),
                ))
                .returning(Member::as_returning())
                .get_result(&mut conn)
                .optional()
        })
        .await??
        .ok_or_else(|| AppError::Validation("This member does not exist".to_string()))?;

        Ok(member)
    }

    /// The member must match both the claimed profile and server before the
    /// row is deleted. Returns the kicked profile.
    #[tracing::instrument(skip(self))]
    async fn kick_member(
        &self,
        member_id: Uuid,
        profile_id: Uuid,
        server_id: Uuid,
    ) -> Result<Profile, AppError> {
        let mut conn = self.get_conn()?;

        let profile = tokio::task::spawn_blocking(move || {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                let deleted = diesel::delete(
                    members::table.filter(
                        members::id
                            .eq(member_id)
                            .and(members::profile_id.eq(profile_id))
                            .and(members::server_id.eq(server_id)),
                    ),
                )
                .execute(conn)?;
                if deleted == 0 {
                    return Err(diesel::result::Error::NotFound);
                }

                profiles::table
                    .find(profile_id)
                    .select(Profile::as_select())
                    .first(conn)
            })
        })
        .await?
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                AppError::Validation("This member does not exist".to_string())
            }
            other => other.into(),
        })?;

        Ok(profile)
    }
}

enum Deletion {
    Done,
    Missing,
    NotOwner,
}
