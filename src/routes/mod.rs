use axum::routing::{get, patch, post};

use crate::AppState;

mod channel;
mod conversation;
mod gpt;
mod member;
mod profile;
mod server;
mod user;
mod video;

pub struct Api;

impl Api {
    pub fn new() -> axum::Router<AppState> {
        axum::Router::new()
            .route("/users/register", post(user::register))
            .route("/users/login", post(user::login))
            .route("/users/refresh-token", post(user::refresh_access_token))
            .route("/users/logout", post(user::logout))
            .route("/users/change-password", post(user::change_password))
            .route("/users/current-user", get(user::current_user))
            .route("/users/update-username", patch(user::update_username))
            .route("/users/avatar", patch(user::update_avatar))
            .route("/users/cover-image", patch(user::update_cover_image))
            .route("/profiles/getUserProfile", get(profile::get_user_profile))
            .route(
                "/profiles/getProfilesByServerId",
                post(profile::get_profiles_by_server_id),
            )
            .route("/profiles/getProfileById", post(profile::get_profile_by_id))
            .route(
                "/servers/getServersWhereUserIsMember",
                post(server::get_servers_where_user_is_member),
            )
            .route("/servers/createServer", post(server::create_server))
            .route("/servers/joinServer", post(server::join_server))
            .route("/servers/leaveServer", post(server::leave_server))
            .route("/servers/deleteServer", post(server::delete_server))
            .route(
                "/members/getMembersByServerId",
                post(member::get_members_by_server_id),
            )
            .route("/members/changeRoleToGuest", post(member::change_role_to_guest))
            .route(
                "/members/changeRoleToModerator",
                post(member::change_role_to_moderator),
            )
            .route("/members/kickOutMember", post(member::kick_out_member))
            .route(
                "/channels/getChannelsByServerId",
                post(channel::get_channels_by_server_id),
            )
            .route("/channels/createChannel", post(channel::create_channel))
            .route("/channels/deleteChannel", post(channel::delete_channel))
            .route(
                "/conversations/fetchConversation",
                post(conversation::fetch_conversation),
            )
            .route(
                "/video/createLivekitVideoToken",
                post(video::create_livekit_video_token),
            )
            .route(
                "/gpt/getFileCreateEmbeddingStoreInPinecone",
                post(gpt::embed_file_into_index),
            )
            .route(
                "/gpt/fetchSimilarChunkFromPinecone",
                post(gpt::fetch_similar_chunks),
            )
            .route(
                "/gpt/deleteNamespaceFromPinecone",
                post(gpt::delete_namespace),
            )
            .route("/gpt/fetchAllFilesFromDB", get(gpt::fetch_all_files))
    }
}
