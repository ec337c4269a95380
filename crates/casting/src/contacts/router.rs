use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::http::{error_response, offload, repository_error_response};

use super::domain::{ContactForm, ContactId, ContactStatus};
use super::repository::ContactRepository;
use super::service::{ContactDesk, ContactError};

/// Public contact form endpoint.
pub fn contact_router<C>(desk: Arc<ContactDesk<C>>) -> Router
where
    C: ContactRepository + 'static,
{
    Router::new()
        .route("/api/v1/contact", post(submit_handler::<C>))
        .with_state(desk)
}

/// Admin inbox for contact requests.
pub fn contact_admin_router<C>(desk: Arc<ContactDesk<C>>) -> Router
where
    C: ContactRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/contacts", get(list_handler::<C>))
        .route(
            "/api/v1/admin/contacts/:id/status",
            put(status_handler::<C>),
        )
        .route("/api/v1/admin/contacts/:id/notes", put(notes_handler::<C>))
        .with_state(desk)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusFilter {
    #[serde(default)]
    status: Option<ContactStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    status: ContactStatus,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotesUpdate {
    #[serde(default)]
    notes: Option<String>,
}

fn contact_error_response(error: ContactError) -> Response {
    match error {
        ContactError::NotFound(id) => error_response(
            StatusCode::NOT_FOUND,
            format!("contact request {id} not found"),
        ),
        ContactError::Repository(source) => repository_error_response(&source),
        other => error_response(StatusCode::UNPROCESSABLE_ENTITY, other.to_string()),
    }
}

pub(crate) async fn submit_handler<C>(
    State(desk): State<Arc<ContactDesk<C>>>,
    Json(form): Json<ContactForm>,
) -> Response
where
    C: ContactRepository + 'static,
{
    match offload(move || desk.submit(form)).await {
        Ok(Ok(record)) => (StatusCode::CREATED, Json(record)).into_response(),
        Ok(Err(error)) => contact_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn list_handler<C>(
    State(desk): State<Arc<ContactDesk<C>>>,
    Query(filter): Query<StatusFilter>,
) -> Response
where
    C: ContactRepository + 'static,
{
    match offload(move || desk.list(filter.status)).await {
        Ok(Ok(records)) => (StatusCode::OK, Json(records)).into_response(),
        Ok(Err(error)) => contact_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn status_handler<C>(
    State(desk): State<Arc<ContactDesk<C>>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    C: ContactRepository + 'static,
{
    let id = ContactId(id);
    match offload(move || desk.update_status(&id, update.status)).await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(error)) => contact_error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn notes_handler<C>(
    State(desk): State<Arc<ContactDesk<C>>>,
    Path(id): Path<String>,
    Json(update): Json<NotesUpdate>,
) -> Response
where
    C: ContactRepository + 'static,
{
    let id = ContactId(id);
    match offload(move || desk.save_notes(&id, update.notes)).await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(error)) => contact_error_response(error),
        Err(response) => response,
    }
}
