use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::artists::repository::ArtistRepository;
use crate::backend::ObjectStorage;
use crate::http::{
    error_response, image_upload, media_error_response, offload, repository_error_response,
    repository_status, ImageQuery, UPLOAD_BODY_LIMIT,
};

use super::domain::{SubmissionForm, SubmissionId, SubmissionStatus};
use super::intake::{IntakeError, SubmissionIntake};
use super::moderation::{ModerationError, ModerationService, ValidationError};
use super::repository::SubmissionRepository;

/// Public intake endpoints.
pub fn intake_router<S, O>(intake: Arc<SubmissionIntake<S, O>>) -> Router
where
    S: SubmissionRepository + 'static,
    O: ObjectStorage + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(submit_handler::<S, O>))
        .route(
            "/api/v1/submissions/images",
            post(upload_handler::<S, O>).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(intake)
}

/// Admin moderation endpoints.
pub fn moderation_router<S, A>(service: Arc<ModerationService<S, A>>) -> Router
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/submissions", get(list_handler::<S, A>))
        .route(
            "/api/v1/admin/submissions/reconcile",
            post(reconcile_handler::<S, A>),
        )
        .route("/api/v1/admin/submissions/:id", get(detail_handler::<S, A>))
        .route(
            "/api/v1/admin/submissions/:id/approve",
            post(approve_handler::<S, A>),
        )
        .route(
            "/api/v1/admin/submissions/:id/reject",
            post(reject_handler::<S, A>),
        )
        .route(
            "/api/v1/admin/submissions/:id/promotion",
            delete(discard_promotion_handler::<S, A>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusFilter {
    #[serde(default)]
    status: Option<SubmissionStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewRequest {
    #[serde(default)]
    notes: Option<String>,
}

fn intake_error_response(error: IntakeError) -> Response {
    match error {
        IntakeError::Violation(violation) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, violation.to_string())
        }
        IntakeError::Media(media) => media_error_response(&media),
        IntakeError::Repository(source) => repository_error_response(&source),
    }
}

pub(crate) fn moderation_error_response(error: ModerationError) -> Response {
    match error {
        ModerationError::Validation(ValidationError::UnknownSubmission(id)) => {
            error_response(StatusCode::NOT_FOUND, format!("submission {id} not found"))
        }
        ModerationError::Validation(ValidationError::NoPendingPromotion(id)) => error_response(
            StatusCode::NOT_FOUND,
            format!("no outstanding promotion for submission {id}"),
        ),
        ModerationError::Validation(other) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, other.to_string())
        }
        ModerationError::AlreadyReviewed { id, status } => {
            let payload = json!({
                "error": format!("submission {id} was already {status}"),
                "submission_id": id,
                "status": status,
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ModerationError::PromotionRecoverable { id, status } => {
            let payload = json!({
                "error": format!("submission {id} is {status}; run reconcile instead"),
                "submission_id": id,
                "status": status,
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ModerationError::Persistence { step, source } => {
            let status = repository_status(&source);
            if status.is_server_error() {
                tracing::error!(%step, error = %source, "moderation write failed");
            }
            let payload = json!({
                "error": source.to_string(),
                "step": step,
            });
            (status, Json(payload)).into_response()
        }
        ModerationError::InconsistentState {
            artist_id,
            submission_id,
            source,
        } => {
            let payload = json!({
                "error": format!("artist created but submission update failed: {source}"),
                "artist_id": artist_id,
                "submission_id": submission_id,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn submit_handler<S, O>(
    State(intake): State<Arc<SubmissionIntake<S, O>>>,
    Json(form): Json<SubmissionForm>,
) -> Response
where
    S: SubmissionRepository + 'static,
    O: ObjectStorage + 'static,
{
    match offload(move || intake.submit(form)).await {
        Ok(Ok(record)) => (StatusCode::ACCEPTED, Json(record)).into_response(),
        Ok(Err(error)) => intake_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn upload_handler<S, O>(
    State(intake): State<Arc<SubmissionIntake<S, O>>>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: SubmissionRepository + 'static,
    O: ObjectStorage + 'static,
{
    let upload = image_upload(&headers, query.file_name, body);
    match offload(move || intake.upload_profile_image(&upload)).await {
        Ok(Ok(url)) => (StatusCode::CREATED, Json(json!({ "url": url }))).into_response(),
        Ok(Err(error)) => intake_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn list_handler<S, A>(
    State(service): State<Arc<ModerationService<S, A>>>,
    Query(filter): Query<StatusFilter>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    match offload(move || service.list_submissions(filter.status)).await {
        Ok(Ok(records)) => (StatusCode::OK, Json(records)).into_response(),
        Ok(Err(error)) => moderation_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn detail_handler<S, A>(
    State(service): State<Arc<ModerationService<S, A>>>,
    Path(id): Path<String>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    let id = SubmissionId(id);
    match offload(move || service.get_submission(&id)).await {
        Ok(Ok(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(Err(error)) => moderation_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn approve_handler<S, A>(
    State(service): State<Arc<ModerationService<S, A>>>,
    Path(id): Path<String>,
    request: Option<Json<ReviewRequest>>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    let id = SubmissionId(id);
    let notes = request.and_then(|Json(request)| request.notes);
    match offload(move || service.approve(&id, notes)).await {
        Ok(Ok(promotion)) => (StatusCode::CREATED, Json(promotion)).into_response(),
        Ok(Err(error)) => moderation_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn reject_handler<S, A>(
    State(service): State<Arc<ModerationService<S, A>>>,
    Path(id): Path<String>,
    request: Option<Json<ReviewRequest>>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    let id = SubmissionId(id);
    let notes = request.and_then(|Json(request)| request.notes);
    match offload(move || service.reject(&id, notes)).await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(error)) => moderation_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn reconcile_handler<S, A>(
    State(service): State<Arc<ModerationService<S, A>>>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    match offload(move || service.reconcile()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn discard_promotion_handler<S, A>(
    State(service): State<Arc<ModerationService<S, A>>>,
    Path(id): Path<String>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: ArtistRepository + 'static,
{
    let id = SubmissionId(id);
    match offload(move || service.discard_promotion(&id)).await {
        Ok(Ok(entry)) => (StatusCode::OK, Json(entry)).into_response(),
        Ok(Err(error)) => moderation_error_response(error),
        Err(response) => response,
    }
}
