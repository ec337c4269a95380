use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::artists::domain::Category;
use crate::backend::{InMemoryBackend, RepositoryError};
use crate::submissions::domain::{
    NewSubmission, Review, SubmissionForm, SubmissionId, SubmissionRecord, SubmissionStatus,
};
use crate::submissions::guard::SubmissionGuard;
use crate::submissions::repository::SubmissionRepository;
use crate::submissions::{ModerationService, SubmissionIntake};

pub(super) fn form() -> SubmissionForm {
    SubmissionForm {
        name: "Ana Clara".to_string(),
        email: "ana.clara@example.com".to_string(),
        phone: "(11) 98765-4321".to_string(),
        bio: "Cantora de MPB com dez anos de palco em bares e festivais do interior paulista."
            .to_string(),
        profile_image: "https://cdn.example.com/artist-images/submissions/ana.jpg".to_string(),
        category: Category::Cantor,
        city: "Campinas".to_string(),
        state: "SP".to_string(),
        experience_years: Some(10),
        genres: vec!["MPB".to_string()],
        instagram: Some("@anaclara".to_string()),
        youtube: Some(String::new()),
        spotify: None,
    }
}

pub(super) fn guard() -> SubmissionGuard {
    SubmissionGuard::default()
}

pub(super) fn seed(backend: &InMemoryBackend, form: SubmissionForm) -> SubmissionRecord {
    let submission = guard().sanitize(form).expect("fixture passes intake");
    SubmissionRepository::insert(backend, submission).expect("seeded")
}

/// Insert a row directly, bypassing the guard.
pub(super) fn seed_raw(backend: &InMemoryBackend, submission: NewSubmission) -> SubmissionRecord {
    SubmissionRepository::insert(backend, submission).expect("seeded")
}

pub(super) fn moderation(
    backend: &InMemoryBackend,
) -> ModerationService<InMemoryBackend, InMemoryBackend> {
    let shared = Arc::new(backend.clone());
    ModerationService::new(shared.clone(), shared)
}

pub(super) fn intake(backend: &InMemoryBackend) -> SubmissionIntake<InMemoryBackend, InMemoryBackend> {
    let shared = Arc::new(backend.clone());
    SubmissionIntake::new(shared.clone(), shared)
}

/// Submission store whose review updates fail a fixed number of times.
#[derive(Clone)]
pub(super) struct FlakySubmissions {
    pub(super) inner: InMemoryBackend,
    failures: Arc<AtomicUsize>,
}

impl FlakySubmissions {
    pub(super) fn failing(inner: InMemoryBackend, failures: usize) -> Self {
        Self {
            inner,
            failures: Arc::new(AtomicUsize::new(failures)),
        }
    }
}

impl SubmissionRepository for FlakySubmissions {
    fn insert(&self, submission: NewSubmission) -> Result<SubmissionRecord, RepositoryError> {
        SubmissionRepository::insert(&self.inner, submission)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        SubmissionRepository::fetch(&self.inner, id)
    }

    fn list(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        SubmissionRepository::list(&self.inner, status)
    }

    fn count(&self, status: SubmissionStatus) -> Result<usize, RepositoryError> {
        SubmissionRepository::count(&self.inner, status)
    }

    fn mark_reviewed(&self, id: &SubmissionId, review: &Review) -> Result<bool, RepositoryError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner.mark_reviewed(id, review)
    }
}

/// Store that refuses every call, as when the backend is unreachable.
pub(super) struct OfflineSubmissions;

impl SubmissionRepository for OfflineSubmissions {
    fn insert(&self, _submission: NewSubmission) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn list(
        &self,
        _status: Option<SubmissionStatus>,
    ) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn count(&self, _status: SubmissionStatus) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }

    fn mark_reviewed(&self, _id: &SubmissionId, _review: &Review) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("backend offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
