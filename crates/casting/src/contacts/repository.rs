use crate::backend::RepositoryError;

use super::domain::{ContactId, ContactRecord, ContactStatus, NewContactRequest};

/// Storage abstraction over the `contact_requests` table.
pub trait ContactRepository: Send + Sync {
    fn insert(&self, request: NewContactRequest) -> Result<ContactRecord, RepositoryError>;
    fn fetch(&self, id: &ContactId) -> Result<Option<ContactRecord>, RepositoryError>;
    fn list(&self, status: Option<ContactStatus>) -> Result<Vec<ContactRecord>, RepositoryError>;
    fn count(&self, status: ContactStatus) -> Result<usize, RepositoryError>;
    fn update_status(&self, id: &ContactId, status: ContactStatus) -> Result<(), RepositoryError>;
    fn update_notes(&self, id: &ContactId, notes: Option<String>) -> Result<(), RepositoryError>;
}
