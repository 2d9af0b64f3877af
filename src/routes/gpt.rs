use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiError, ApiResponse, AppError, AppState, CurrentUser, NewEmbeddedFile};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedFileRequest {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Reads a text file from disk, chunks and embeds it, and stores the vectors
/// under a namespace named after the file. The file is registered to the
/// caller so later queries can check ownership.
#[tracing::instrument(skip(app_state, request), fields(user_id = %user.id))]
pub async fn embed_file_into_index(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<EmbedFileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let file_path = request
        .file_path
        .filter(|path| !path.is_empty())
        .ok_or_else(|| AppError::Validation("Cannot Get File Path".to_string()))?;
    let file_name = request
        .file_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("Cannot Get File Name".to_string()))?;

    let contents = tokio::fs::read_to_string(&file_path)
        .await
        .map_err(AppError::from)?;
    if contents.is_empty() {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "File content is empty."));
    }

    let chunks = app_state.embedder.embed_document(&contents).await?;
    app_state.vectors.upsert(&file_name, &chunks).await?;

    let saved_file = app_state
        .files
        .record(NewEmbeddedFile {
            file_name: file_name.clone(),
            namespace: file_name,
            user_id: user.id,
        })
        .await?;

    Ok(ApiResponse::new(
        200,
        json!({ "savedFile": saved_file }),
        "File processed and data stored in Pinecone successfully",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarChunkRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

const QUERY_TOP_K: usize = 5;

#[tracing::instrument(skip(app_state, request), fields(user_id = %user.id))]
pub async fn fetch_similar_chunks(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SimilarChunkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = request
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Query is required.".to_string()))?;
    let file_name = request
        .file_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("File name is required.".to_string()))?;

    let file = app_state
        .files
        .find_owned(user.id, &file_name)
        .await?
        .ok_or(AppError::Forbidden(
            "You do not have permission to access this file.",
        ))?;

    let query_vector = app_state.embedder.embed_one(&query).await?;
    let matches = app_state
        .vectors
        .query(&file.namespace, &query_vector, QUERY_TOP_K)
        .await?;

    Ok(ApiResponse::new(
        200,
        json!({ "queryResponse": { "matches": matches, "namespace": file.namespace } }),
        "Query to Pinecone successful",
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNamespaceRequest {
    #[serde(default)]
    pub file_name: Option<String>,
}

#[tracing::instrument(skip(app_state, request), fields(user_id = %user.id))]
pub async fn delete_namespace(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<DeleteNamespaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let file_name = request
        .file_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("File name is required.".to_string()))?;

    let file = app_state
        .files
        .find_owned(user.id, &file_name)
        .await?
        .ok_or(AppError::Forbidden(
            "You do not have permission to delete this file.",
        ))?;

    app_state.vectors.delete_namespace(&file.namespace).await?;
    app_state.files.delete(file.id).await?;

    let message = format!("Namespace {file_name} deleted successfully from Pinecone.");
    Ok(ApiResponse::new(200, serde_json::Value::Null, &message))
}

#[tracing::instrument(skip(app_state), fields(user_id = %user.id))]
pub async fn fetch_all_files(
    State(app_state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let file_names = app_state.files.list_names_for(user.id).await?;

    let message = if file_names.is_empty() {
        "No files found for this user."
    } else {
        "File names fetched successfully from the database."
    };
    Ok(ApiResponse::new(200, json!({ "fileNames": file_names }), message))
}
