use crate::backend::RepositoryError;

use super::domain::{ArtistFields, ArtistId, ArtistPhoto, ArtistRecord, NewPhoto};

/// Storage abstraction over the `artists` and `artist_photos` tables.
///
/// Implementations must reject a second artist with the same slug with
/// [`RepositoryError::Conflict`].
pub trait ArtistRepository: Send + Sync {
    fn insert(&self, fields: ArtistFields) -> Result<ArtistRecord, RepositoryError>;
    fn update(&self, id: &ArtistId, fields: ArtistFields) -> Result<ArtistRecord, RepositoryError>;
    fn set_visibility(&self, id: &ArtistId, visible: bool) -> Result<(), RepositoryError>;
    /// Remove the artist together with its photos.
    fn delete(&self, id: &ArtistId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ArtistId) -> Result<Option<ArtistRecord>, RepositoryError>;
    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ArtistRecord>, RepositoryError>;
    /// Artists newest first; `Some(true)` restricts to the public roster.
    fn list(&self, visible: Option<bool>) -> Result<Vec<ArtistRecord>, RepositoryError>;
    /// Photos in ascending `order_index`.
    fn photos(&self, id: &ArtistId) -> Result<Vec<ArtistPhoto>, RepositoryError>;
    /// Delete the current gallery and insert `photos` in its place.
    fn replace_photos(
        &self,
        id: &ArtistId,
        photos: Vec<NewPhoto>,
    ) -> Result<Vec<ArtistPhoto>, RepositoryError>;
}
