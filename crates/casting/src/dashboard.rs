//! Admin landing page numbers.
//!
//! Counts are read through on every request; nothing is cached between calls.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::artists::domain::ArtistStats;
use crate::artists::repository::ArtistRepository;
use crate::backend::RepositoryError;
use crate::contacts::domain::ContactStatus;
use crate::contacts::repository::ContactRepository;
use crate::http::{offload, repository_error_response};
use crate::submissions::domain::SubmissionStatus;
use crate::submissions::repository::SubmissionRepository;

/// Items waiting on an admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingCounts {
    pub submissions: usize,
    pub contacts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub artists: ArtistStats,
    pub pending: PendingCounts,
}

pub struct Dashboard<A, S, C> {
    artists: Arc<A>,
    submissions: Arc<S>,
    contacts: Arc<C>,
}

impl<A, S, C> Dashboard<A, S, C>
where
    A: ArtistRepository + 'static,
    S: SubmissionRepository + 'static,
    C: ContactRepository + 'static,
{
    pub fn new(artists: Arc<A>, submissions: Arc<S>, contacts: Arc<C>) -> Self {
        Self {
            artists,
            submissions,
            contacts,
        }
    }

    pub fn pending_counts(&self) -> Result<PendingCounts, RepositoryError> {
        Ok(PendingCounts {
            submissions: self.submissions.count(SubmissionStatus::Pending)?,
            contacts: self.contacts.count(ContactStatus::Pending)?,
        })
    }

    pub fn snapshot(&self) -> Result<DashboardSnapshot, RepositoryError> {
        let artists = self.artists.list(None)?;
        Ok(DashboardSnapshot {
            artists: ArtistStats::from_records(&artists),
            pending: self.pending_counts()?,
        })
    }
}

pub fn dashboard_router<A, S, C>(dashboard: Arc<Dashboard<A, S, C>>) -> Router
where
    A: ArtistRepository + 'static,
    S: SubmissionRepository + 'static,
    C: ContactRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/dashboard", get(snapshot_handler::<A, S, C>))
        .with_state(dashboard)
}

pub(crate) async fn snapshot_handler<A, S, C>(
    State(dashboard): State<Arc<Dashboard<A, S, C>>>,
) -> Response
where
    A: ArtistRepository + 'static,
    S: SubmissionRepository + 'static,
    C: ContactRepository + 'static,
{
    match offload(move || dashboard.snapshot()).await {
        Ok(Ok(snapshot)) => (StatusCode::OK, Json(snapshot)).into_response(),
        Ok(Err(error)) => repository_error_response(&error),
        Err(response) => response,
    }
}
