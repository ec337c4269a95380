//! Adapters for the hosted data/storage service backing the casting site.
//!
//! Every table is reached through a typed repository trait declared next to its
//! domain (`submissions`, `artists`, `contacts`). This module holds the pieces the
//! adapters share: the error type, the object storage trait, and the two
//! implementations (process-local and PostgREST over HTTP).

pub mod memory;
pub mod rest;

pub use memory::InMemoryBackend;
pub use rest::RestBackend;

/// Error enumeration for repository and storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("conflicting record: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("backend rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected backend payload: {0}")]
    Decode(String),
}

impl RepositoryError {
    /// Transport-level failures where the request may never have reached the store.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_))
    }
}

/// File-object store holding profile and gallery images.
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `path` inside the configured bucket and return its public URL.
    fn upload(&self, path: &str, content_type: &str, bytes: &[u8])
        -> Result<String, RepositoryError>;
}
