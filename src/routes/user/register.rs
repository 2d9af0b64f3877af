use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{ApiError, ApiResponse, AppError, AppState, NewUser, OutboundUser};

/// Multipart form with `username`, `email` and `password` text fields plus
/// optional `avatar` and `coverImage` file fields.
#[tracing::instrument(skip(app_state, multipart))]
pub async fn register(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut username = String::new();
    let mut email = String::new();
    let mut password = String::new();
    let mut avatar: Option<(String, Vec<u8>)> = None;
    let mut cover_image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_field)? {
        match field.name() {
            Some("username") => username = field.text().await.map_err(bad_field)?,
            Some("email") => email = field.text().await.map_err(bad_field)?,
            Some("password") => password = field.text().await.map_err(bad_field)?,
            Some("avatar") => {
                let file_name = field.file_name().unwrap_or("avatar").to_string();
                let bytes = field.bytes().await.map_err(bad_field)?;
                avatar = Some((file_name, bytes.to_vec()));
            }
            Some("coverImage") => {
                let file_name = field.file_name().unwrap_or("coverImage").to_string();
                let bytes = field.bytes().await.map_err(bad_field)?;
                cover_image = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let mut new_user = NewUser::create(&username, &email, &password)?;

    // Image uploads are best effort at registration time; the account is
    // still created when the media provider is unavailable.
    if let Some((file_name, bytes)) = avatar {
        match app_state.media.upload(bytes, &file_name).await {
            Ok(image) => {
                new_user.avatar_url = Some(image.url);
                new_user.avatar_public_id = Some(image.public_id);
            }
            Err(e) => tracing::warn!(error = ?e, "avatar upload failed, registering without one"),
        }
    }
    if let Some((file_name, bytes)) = cover_image {
        match app_state.media.upload(bytes, &file_name).await {
            Ok(image) => {
                new_user.cover_image_url = Some(image.url);
                new_user.cover_image_public_id = Some(image.public_id);
            }
            Err(e) => tracing::warn!(error = ?e, "cover image upload failed, registering without one"),
        }
    }

    let user = app_state.auth.register_user(new_user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            200,
            OutboundUser::from(user),
            "User registered successfully",
        )),
    ))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    AppError::Validation(e.to_string()).into()
}
