//! Helpers shared by the feature routers.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::backend::RepositoryError;
use crate::media::{ImageUpload, MediaError, MAX_IMAGE_BYTES};

/// Headroom over the image cap so oversized uploads reach validation.
pub(crate) const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ImageQuery {
    #[serde(default)]
    pub(crate) file_name: Option<String>,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

/// Run a blocking store call on the blocking pool.
pub(crate) async fn offload<T, F>(task: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|error| {
        tracing::error!(%error, "blocking task failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "request task failed")
    })
}

pub(crate) fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Unavailable(_) => StatusCode::BAD_GATEWAY,
        RepositoryError::Rejected { .. } | RepositoryError::Decode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn repository_error_response(error: &RepositoryError) -> Response {
    let status = repository_status(error);
    if status.is_server_error() {
        tracing::error!(%error, "backend request failed");
    }
    error_response(status, error.to_string())
}

pub(crate) fn media_error_response(error: &MediaError) -> Response {
    match error {
        MediaError::Storage(source) => repository_error_response(source),
        other => error_response(StatusCode::UNPROCESSABLE_ENTITY, other.to_string()),
    }
}

/// Raw request body plus its `Content-Type` as an upload.
pub(crate) fn image_upload(
    headers: &HeaderMap,
    file_name: Option<String>,
    body: Bytes,
) -> ImageUpload {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    ImageUpload {
        file_name: file_name.unwrap_or_default(),
        content_type,
        bytes: body.to_vec(),
    }
}
