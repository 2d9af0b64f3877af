diesel::table! {
    users (id) {
        id -> Uuid,
        username -> Text,
        email -> Text,
        password -> Text,
        refresh_token -> Nullable<Text>,
        avatar_url -> Nullable<Text>,
        avatar_public_id -> Nullable<Text>,
        cover_image_url -> Nullable<Text>,
        cover_image_public_id -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    profiles (id) {
        id -> Uuid,
        user_id -> Uuid,
        username -> Text,
        image_url -> Text,
        email -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    servers (id) {
        id -> Uuid,
        name -> Text,
        image_url -> Nullable<Text>,
        image_public_id -> Nullable<Text>,
        invite_code -> Text,
        profile_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    channels (id) {
        id -> Uuid,
        name -> Text,
        kind -> Text,
        profile_id -> Uuid,
        server_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    members (id) {
        id -> Uuid,
        role -> Text,
        profile_id -> Uuid,
        server_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    conversations (id) {
        id -> Uuid,
        member_id_one -> Uuid,
        member_id_two -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    embedded_files (id) {
        id -> Uuid,
        file_name -> Text,
        namespace -> Text,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(profiles -> users (user_id));
diesel::joinable!(servers -> profiles (profile_id));
diesel::joinable!(channels -> servers (server_id));
diesel::joinable!(members -> profiles (profile_id));
diesel::joinable!(members -> servers (server_id));
diesel::joinable!(embedded_files -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    profiles,
    servers,
    channels,
    members,
    conversations,
    embedded_files,
);
