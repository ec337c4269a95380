//! Published roster: the public casting pages and back-office CRUD.

pub mod admin;
pub mod catalog;
pub mod domain;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use admin::{AdminError, ArtistAdmin, ArtistDraft, PhotoDraft};
pub use catalog::{ArtistProfile, CastingCatalog, CastingFilter, CastingPage};
pub use domain::{
    ArtistFields, ArtistId, ArtistPhoto, ArtistRecord, ArtistStats, Category, NewPhoto,
};
pub use repository::ArtistRepository;
pub use router::{artist_admin_router, casting_router};
