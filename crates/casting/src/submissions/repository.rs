use crate::backend::RepositoryError;

use super::domain::{NewSubmission, Review, SubmissionId, SubmissionRecord, SubmissionStatus};

/// Storage abstraction over the `artist_submissions` table.
pub trait SubmissionRepository: Send + Sync {
    /// Write a new row with status `pending`; the store assigns `id` and `created_at`.
    fn insert(&self, submission: NewSubmission) -> Result<SubmissionRecord, RepositoryError>;

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;

    /// Rows newest first, optionally restricted to one status.
    fn list(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<SubmissionRecord>, RepositoryError>;

    fn count(&self, status: SubmissionStatus) -> Result<usize, RepositoryError>;

    /// Apply `review` only while the row is still `pending`.
    ///
    /// Returns `false` when no row matched (missing, or already reviewed).
    fn mark_reviewed(&self, id: &SubmissionId, review: &Review) -> Result<bool, RepositoryError>;
}
