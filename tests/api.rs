mod common;

use anyhow::Result;
use common::{ApiClient, spawn_app, unique_name};
use serde_json::json;

// These scenarios need a running Postgres at DATABASE_URL (default
// postgres://postgres@localhost/postgres) with the migrations applied.

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn register_login_and_fetch_profile() -> Result<()> {
    let port = spawn_app().await;
    let mut client = ApiClient::new(port);

    let username = unique_name("maki");
    let email = format!("{username}@example.com");

    let registered = client.register(&username, &email, "hunter2").await?;
    assert_eq!(registered["success"], true);
    assert_eq!(registered["data"]["username"], username.as_str());
    assert!(registered["data"]["password"].is_null());

    let logged_in = client.login(&username, "hunter2").await?;
    assert!(logged_in["data"]["accessToken"].is_string());
    assert!(logged_in["data"]["refreshToken"].is_string());

    let me = client.get_json("/users/current-user").await?;
    assert_eq!(me["data"]["email"], email.as_str());

    // First fetch creates the profile from the account record.
    let profile = client.get_json("/profiles/getUserProfile").await?;
    assert_eq!(profile["data"]["username"], username.as_str());
    assert!(profile["data"]["id"].is_string());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn wrong_password_is_rejected() -> Result<()> {
    let port = spawn_app().await;
    let mut client = ApiClient::new(port);

    let username = unique_name("maki");
    let email = format!("{username}@example.com");
    client.register(&username, &email, "hunter2").await?;

    let response = client
        .post_raw(
            "/users/login",
            &json!({ "username": username, "password": "wrong" }),
        )
        .await?;
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Incorrect Password!");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn duplicate_registration_conflicts() -> Result<()> {
    let port = spawn_app().await;
    let client = ApiClient::new(port);

    let username = unique_name("maki");
    let email = format!("{username}@example.com");
    client.register(&username, &email, "hunter2").await?;

    let second = client.register(&username, &email, "hunter2").await;
    assert!(second.is_err());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn server_lifecycle_with_two_members() -> Result<()> {
    let port = spawn_app().await;

    // Owner registers and creates a server.
    let mut owner = ApiClient::new(port);
    let owner_name = unique_name("owner");
    owner
        .register(&owner_name, &format!("{owner_name}@example.com"), "pass")
        .await?;
    owner.login(&owner_name, "pass").await?;

    let owner_profile = owner.get_json("/profiles/getUserProfile").await?;
    let owner_profile_id = owner_profile["data"]["id"].as_str().unwrap().to_string();

    let server = owner.create_server("homework club", &owner_profile_id).await?;
    let server_id = server["data"]["id"].as_str().unwrap().to_string();
    let invite_code = server["data"]["inviteCode"].as_str().unwrap().to_string();

    // Creation also produced the default channel and the admin membership.
    let channels = owner
        .post_json(
            "/channels/getChannelsByServerId",
            &json!({ "serverId": server_id }),
        )
        .await?;
    assert_eq!(channels["data"][0]["name"], "general");
    assert_eq!(channels["data"][0]["type"], "TEXT");

    // A guest joins through the invite code.
    let mut guest = ApiClient::new(port);
    let guest_name = unique_name("guest");
    guest
        .register(&guest_name, &format!("{guest_name}@example.com"), "pass")
        .await?;
    guest.login(&guest_name, "pass").await?;

    let guest_profile = guest.get_json("/profiles/getUserProfile").await?;
    let guest_profile_id = guest_profile["data"]["id"].as_str().unwrap().to_string();

    let joined = guest
        .post_json(
            "/servers/joinServer",
            &json!({ "profileId": guest_profile_id, "inviteCode": invite_code }),
        )
        .await?;
    assert_eq!(joined["message"], "Server joined successfully");

    // Joining twice is an idempotent success.
    let rejoined = guest
        .post_json(
            "/servers/joinServer",
            &json!({ "profileId": guest_profile_id, "inviteCode": invite_code }),
        )
        .await?;
    assert_eq!(rejoined["message"], "Already a member of the server");

    let members = owner
        .post_json(
            "/members/getMembersByServerId",
            &json!({ "serverId": server_id }),
        )
        .await?;
    assert_eq!(members["data"].as_array().unwrap().len(), 2);

    let guest_member_id = members["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["profileId"] == guest_profile_id.as_str())
        .and_then(|m| m["id"].as_str())
        .unwrap()
        .to_string();
    let owner_member = members["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["profileId"] == owner_profile_id.as_str())
        .unwrap();
    // The creator was enrolled as the server admin.
    assert_eq!(owner_member["role"], "ADMIN");
    let owner_member_id = owner_member["id"].as_str().unwrap().to_string();

    // Direct conversation between the two members: created once, then reused
    // regardless of argument order.
    let created = owner
        .post_json(
            "/conversations/fetchConversation",
            &json!({
                "currentUserMemberId": owner_member_id,
                "targetUserMemberId": guest_member_id,
            }),
        )
        .await?;
    assert_eq!(created["statusCode"], 201);

    let fetched = owner
        .post_json(
            "/conversations/fetchConversation",
            &json!({
                "currentUserMemberId": guest_member_id,
                "targetUserMemberId": owner_member_id,
            }),
        )
        .await?;
    assert_eq!(fetched["statusCode"], 200);
    assert_eq!(fetched["data"]["id"], created["data"]["id"]);

    // Promote the guest, then kick them out.
    let promoted = owner
        .post_json(
            "/members/changeRoleToModerator",
            &json!({ "memberId": guest_member_id }),
        )
        .await?;
    assert_eq!(promoted["data"]["role"], "MODERATOR");

    let kicked = owner
        .post_json(
            "/members/kickOutMember",
            &json!({
                "memberId": guest_member_id,
                "profileId": guest_profile_id,
                "serverId": server_id,
            }),
        )
        .await?;
    assert_eq!(kicked["success"], true);

    let members_after = owner
        .post_json(
            "/members/getMembersByServerId",
            &json!({ "serverId": server_id }),
        )
        .await?;
    assert_eq!(members_after["data"].as_array().unwrap().len(), 1);

    // The kicked profile's server list no longer contains the server.
    let guest_servers = guest
        .post_json(
            "/servers/getServersWhereUserIsMember",
            &json!({ "profileId": guest_profile_id }),
        )
        .await?;
    assert!(guest_servers["data"].as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn only_the_owner_can_delete_a_server() -> Result<()> {
    let port = spawn_app().await;

    let mut owner = ApiClient::new(port);
    let owner_name = unique_name("owner");
    owner
        .register(&owner_name, &format!("{owner_name}@example.com"), "pass")
        .await?;
    owner.login(&owner_name, "pass").await?;
    let owner_profile = owner.get_json("/profiles/getUserProfile").await?;
    let owner_profile_id = owner_profile["data"]["id"].as_str().unwrap().to_string();

    let server = owner.create_server("ephemeral", &owner_profile_id).await?;
    let server_id = server["data"]["id"].as_str().unwrap().to_string();
    let invite_code = server["data"]["inviteCode"].as_str().unwrap().to_string();

    let mut guest = ApiClient::new(port);
    let guest_name = unique_name("guest");
    guest
        .register(&guest_name, &format!("{guest_name}@example.com"), "pass")
        .await?;
    guest.login(&guest_name, "pass").await?;
    let guest_profile = guest.get_json("/profiles/getUserProfile").await?;
    let guest_profile_id = guest_profile["data"]["id"].as_str().unwrap().to_string();

    guest
        .post_json(
            "/servers/joinServer",
            &json!({ "profileId": guest_profile_id, "inviteCode": invite_code }),
        )
        .await?;

    let forbidden = guest
        .post_raw(
            "/servers/deleteServer",
            &json!({ "profileId": guest_profile_id, "serverId": server_id }),
        )
        .await?;
    assert_eq!(forbidden.status(), 403);

    let deleted = owner
        .post_json(
            "/servers/deleteServer",
            &json!({ "profileId": owner_profile_id, "serverId": server_id }),
        )
        .await?;
    assert_eq!(deleted["message"], "Server deleted successfully");

    // Cascade removed the membership rows too.
    let guest_servers = guest
        .post_json(
            "/servers/getServersWhereUserIsMember",
            &json!({ "profileId": guest_profile_id }),
        )
        .await?;
    assert!(guest_servers["data"].as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn deleted_channels_disappear_from_the_server_listing() -> Result<()> {
    let port = spawn_app().await;

    let mut client = ApiClient::new(port);
    let username = unique_name("maki");
    client
        .register(&username, &format!("{username}@example.com"), "pass")
        .await?;
    client.login(&username, "pass").await?;

    let profile = client.get_json("/profiles/getUserProfile").await?;
    let profile_id = profile["data"]["id"].as_str().unwrap().to_string();

    let server = client.create_server("workshop", &profile_id).await?;
    let server_id = server["data"]["id"].as_str().unwrap().to_string();

    client
        .post_json(
            "/channels/createChannel",
            &json!({
                "serverId": server_id,
                "profileId": profile_id,
                "channelType": "TEXT",
                "channelName": "planning",
            }),
        )
        .await?;

    let channels = client
        .post_json(
            "/channels/getChannelsByServerId",
            &json!({ "serverId": server_id }),
        )
        .await?;
    let planning_id = channels["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "planning")
        .and_then(|c| c["id"].as_str())
        .unwrap()
        .to_string();

    // A delete scoped to the wrong server must not touch the channel.
    let mismatched = client
        .post_raw(
            "/channels/deleteChannel",
            &json!({
                "channelId": planning_id,
                "serverId": uuid::Uuid::new_v4(),
            }),
        )
        .await?;
    assert_eq!(mismatched.status(), 404);

    let deleted = client
        .post_json(
            "/channels/deleteChannel",
            &json!({ "channelId": planning_id, "serverId": server_id }),
        )
        .await?;
    assert_eq!(deleted["message"], "Channel deleted successfully");

    let remaining = client
        .post_json(
            "/channels/getChannelsByServerId",
            &json!({ "serverId": server_id }),
        )
        .await?;
    let names: Vec<&str> = remaining["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["general"]);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn listing_profiles_of_an_unknown_server_is_a_404() -> Result<()> {
    let port = spawn_app().await;

    let mut client = ApiClient::new(port);
    let username = unique_name("maki");
    client
        .register(&username, &format!("{username}@example.com"), "pass")
        .await?;
    client.login(&username, "pass").await?;

    let response = client
        .post_raw(
            "/profiles/getProfilesByServerId",
            &json!({ "serverId": uuid::Uuid::new_v4() }),
        )
        .await?;
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No profiles found for this server");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn changing_the_password_checks_the_old_one() -> Result<()> {
    let port = spawn_app().await;

    let mut client = ApiClient::new(port);
    let username = unique_name("maki");
    client
        .register(&username, &format!("{username}@example.com"), "hunter2")
        .await?;
    client.login(&username, "hunter2").await?;

    let rejected = client
        .post_raw(
            "/users/change-password",
            &json!({ "oldPassword": "wrong", "newPassword": "hunter3" }),
        )
        .await?;
    assert_eq!(rejected.status(), 400);

    let body: serde_json::Value = rejected.json().await?;
    assert_eq!(body["message"], "Incorrect Old Password");

    let changed = client
        .post_json(
            "/users/change-password",
            &json!({ "oldPassword": "hunter2", "newPassword": "hunter3" }),
        )
        .await?;
    assert_eq!(changed["message"], "Password Changed Successfully!");

    client.login(&username, "hunter3").await?;

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn refresh_token_rotation() -> Result<()> {
    let port = spawn_app().await;
    let mut client = ApiClient::new(port);

    let username = unique_name("maki");
    client
        .register(&username, &format!("{username}@example.com"), "hunter2")
        .await?;
    let logged_in = client.login(&username, "hunter2").await?;
    let refresh_token = logged_in["data"]["refreshToken"].as_str().unwrap().to_string();

    let refreshed = client
        .post_json(
            "/users/refresh-token",
            &json!({ "refreshToken": refresh_token }),
        )
        .await?;
    assert_eq!(refreshed["message"], "Access Token Refreshed");
    assert!(refreshed["data"]["accessToken"].is_string());

    // The old token was rotated out and can no longer be redeemed.
    let stale = client
        .post_raw(
            "/users/refresh-token",
            &json!({ "refreshToken": refresh_token }),
        )
        .await?;
    assert_eq!(stale.status(), 401);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn unauthenticated_requests_are_rejected() -> Result<()> {
    let port = spawn_app().await;
    let client = ApiClient::new(port);

    let response = client
        .post_raw("/channels/getChannelsByServerId", &json!({}))
        .await?;
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["message"], "Unauthorized request");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local Postgres"]
async fn duplicate_channel_names_are_rejected_per_server() -> Result<()> {
    let port = spawn_app().await;

    let mut client = ApiClient::new(port);
    let username = unique_name("maki");
    client
        .register(&username, &format!("{username}@example.com"), "pass")
        .await?;
    client.login(&username, "pass").await?;

    let profile = client.get_json("/profiles/getUserProfile").await?;
    let profile_id = profile["data"]["id"].as_str().unwrap().to_string();

    let server = client.create_server("study hall", &profile_id).await?;
    let server_id = server["data"]["id"].as_str().unwrap().to_string();

    let created = client
        .post_json(
            "/channels/createChannel",
            &json!({
                "serverId": server_id,
                "profileId": profile_id,
                "channelType": "AUDIO",
                "channelName": "voice",
            }),
        )
        .await?;
    assert_eq!(created["message"], "Channel created successfully");

    let duplicate = client
        .post_raw(
            "/channels/createChannel",
            &json!({
                "serverId": server_id,
                "profileId": profile_id,
                "channelType": "AUDIO",
                "channelName": "voice",
            }),
        )
        .await?;
    assert_eq!(duplicate.status(), 400);

    let invalid_kind = client
        .post_raw(
            "/channels/createChannel",
            &json!({
                "serverId": server_id,
                "profileId": profile_id,
                "channelType": "VOICE",
                "channelName": "other",
            }),
        )
        .await?;
    assert_eq!(invalid_kind.status(), 400);
    let body: serde_json::Value = invalid_kind.json().await?;
    assert_eq!(body["message"], "Invalid channel type");

    Ok(())
}
