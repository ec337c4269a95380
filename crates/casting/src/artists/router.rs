use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::backend::ObjectStorage;
use crate::http::{
    error_response, image_upload, media_error_response, offload, repository_error_response,
    UPLOAD_BODY_LIMIT,
};
use crate::media::ImageFolder;

use super::admin::{AdminError, ArtistAdmin, ArtistDraft};
use super::catalog::{CastingCatalog, CastingFilter};
use super::domain::ArtistId;
use super::repository::ArtistRepository;

/// Public casting pages.
pub fn casting_router<A>(catalog: Arc<CastingCatalog<A>>) -> Router
where
    A: ArtistRepository + 'static,
{
    Router::new()
        .route("/api/v1/casting", get(casting_handler::<A>))
        .route("/api/v1/casting/:slug", get(profile_handler::<A>))
        .with_state(catalog)
}

/// Admin roster management and image uploads.
pub fn artist_admin_router<A, O>(admin: Arc<ArtistAdmin<A, O>>) -> Router
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/artists",
            get(list_handler::<A, O>).post(create_handler::<A, O>),
        )
        .route(
            "/api/v1/admin/artists/:id",
            get(detail_handler::<A, O>)
                .put(update_handler::<A, O>)
                .delete(delete_handler::<A, O>),
        )
        .route(
            "/api/v1/admin/artists/:id/visibility",
            post(visibility_handler::<A, O>),
        )
        .route(
            "/api/v1/admin/uploads",
            post(upload_handler::<A, O>).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(admin)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadQuery {
    folder: ImageFolder,
    #[serde(default)]
    file_name: Option<String>,
}

fn admin_error_response(error: AdminError) -> Response {
    match error {
        AdminError::NotFound(id) => {
            error_response(StatusCode::NOT_FOUND, format!("artist {id} not found"))
        }
        AdminError::Media(media) => media_error_response(&media),
        AdminError::Repository(source) => repository_error_response(&source),
        other => error_response(StatusCode::UNPROCESSABLE_ENTITY, other.to_string()),
    }
}

pub(crate) async fn casting_handler<A>(
    State(catalog): State<Arc<CastingCatalog<A>>>,
    Query(filter): Query<CastingFilter>,
) -> Response
where
    A: ArtistRepository + 'static,
{
    match offload(move || catalog.page(&filter)).await {
        Ok(Ok(page)) => (StatusCode::OK, Json(page)).into_response(),
        Ok(Err(error)) => repository_error_response(&error),
        Err(response) => response,
    }
}

pub(crate) async fn profile_handler<A>(
    State(catalog): State<Arc<CastingCatalog<A>>>,
    Path(slug): Path<String>,
) -> Response
where
    A: ArtistRepository + 'static,
{
    match offload(move || catalog.profile(&slug)).await {
        Ok(Ok(profile)) => (StatusCode::OK, Json(profile)).into_response(),
        Ok(Err(error)) => repository_error_response(&error),
        Err(response) => response,
    }
}

pub(crate) async fn list_handler<A, O>(
    State(admin): State<Arc<ArtistAdmin<A, O>>>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    match offload(move || admin.list(query.search.as_deref())).await {
        Ok(Ok(artists)) => (StatusCode::OK, Json(artists)).into_response(),
        Ok(Err(error)) => admin_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn create_handler<A, O>(
    State(admin): State<Arc<ArtistAdmin<A, O>>>,
    Json(draft): Json<ArtistDraft>,
) -> Response
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    match offload(move || admin.create(draft)).await {
        Ok(Ok(detail)) => (StatusCode::CREATED, Json(detail)).into_response(),
        Ok(Err(error)) => admin_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn detail_handler<A, O>(
    State(admin): State<Arc<ArtistAdmin<A, O>>>,
    Path(id): Path<String>,
) -> Response
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    let id = ArtistId(id);
    match offload(move || admin.get(&id)).await {
        Ok(Ok(detail)) => (StatusCode::OK, Json(detail)).into_response(),
        Ok(Err(error)) => admin_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn update_handler<A, O>(
    State(admin): State<Arc<ArtistAdmin<A, O>>>,
    Path(id): Path<String>,
    Json(draft): Json<ArtistDraft>,
) -> Response
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    let id = ArtistId(id);
    match offload(move || admin.update(&id, draft)).await {
        Ok(Ok(detail)) => (StatusCode::OK, Json(detail)).into_response(),
        Ok(Err(error)) => admin_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn delete_handler<A, O>(
    State(admin): State<Arc<ArtistAdmin<A, O>>>,
    Path(id): Path<String>,
) -> Response
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    let id = ArtistId(id);
    match offload(move || admin.delete(&id)).await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(error)) => admin_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn visibility_handler<A, O>(
    State(admin): State<Arc<ArtistAdmin<A, O>>>,
    Path(id): Path<String>,
) -> Response
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    let id = ArtistId(id);
    match offload(move || admin.toggle_visibility(&id)).await {
        Ok(Ok(visible)) => (StatusCode::OK, Json(json!({ "is_visible": visible }))).into_response(),
        Ok(Err(error)) => admin_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn upload_handler<A, O>(
    State(admin): State<Arc<ArtistAdmin<A, O>>>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    let folder = query.folder;
    let upload = image_upload(&headers, query.file_name, body);
    match offload(move || admin.upload_image(folder, &upload)).await {
        Ok(Ok(url)) => (StatusCode::CREATED, Json(json!({ "url": url }))).into_response(),
        Ok(Err(error)) => admin_error_response(error),
        Err(response) => response,
    }
}
