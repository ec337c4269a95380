use std::sync::Arc;

use crate::backend::{ObjectStorage, RepositoryError};
use crate::media::{store_image, ImageFolder, ImageUpload, MediaError};

use super::domain::{SubmissionForm, SubmissionRecord};
use super::guard::{IntakeViolation, SubmissionGuard};
use super::repository::SubmissionRepository;

/// Public self-service intake: profile image upload and the pending submission row.
pub struct SubmissionIntake<S, O> {
    guard: Arc<SubmissionGuard>,
    submissions: Arc<S>,
    storage: Arc<O>,
}

impl<S, O> SubmissionIntake<S, O>
where
    S: SubmissionRepository + 'static,
    O: ObjectStorage + 'static,
{
    pub fn new(submissions: Arc<S>, storage: Arc<O>) -> Self {
        Self::with_guard(SubmissionGuard::default(), submissions, storage)
    }

    pub fn with_guard(guard: SubmissionGuard, submissions: Arc<S>, storage: Arc<O>) -> Self {
        Self {
            guard: Arc::new(guard),
            submissions,
            storage,
        }
    }

    /// Validate a form and store it with status `pending`.
    pub fn submit(&self, form: SubmissionForm) -> Result<SubmissionRecord, IntakeError> {
        let submission = self.guard.sanitize(form)?;
        let stored = self.submissions.insert(submission)?;
        tracing::info!(submission_id = %stored.id, category = stored.category.code(), "submission received");
        Ok(stored)
    }

    /// Store the applicant's profile picture under `submissions/`.
    pub fn upload_profile_image(&self, upload: &ImageUpload) -> Result<String, IntakeError> {
        Ok(store_image(
            self.storage.as_ref(),
            ImageFolder::Submissions,
            upload,
        )?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Violation(#[from] IntakeViolation),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
