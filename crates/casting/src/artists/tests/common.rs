use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::artists::admin::{ArtistAdmin, ArtistDraft, PhotoDraft};
use crate::artists::catalog::CastingCatalog;
use crate::artists::domain::{ArtistRecord, Category};
use crate::backend::InMemoryBackend;

pub(super) fn draft(name: &str, category: Category, state: &str, genres: &[&str]) -> ArtistDraft {
    ArtistDraft {
        bio: Some(format!("{name} se apresenta em eventos corporativos e festas.")),
        category: Some(category),
        city: Some("São Paulo".to_string()),
        state: Some(state.to_string()),
        genres: genres.iter().map(|genre| genre.to_string()).collect(),
        ..ArtistDraft::named(name)
    }
}

pub(super) fn photo(url: &str) -> PhotoDraft {
    PhotoDraft {
        image_url: url.to_string(),
        caption: None,
    }
}

pub(super) fn admin(backend: &InMemoryBackend) -> ArtistAdmin<InMemoryBackend, InMemoryBackend> {
    let shared = Arc::new(backend.clone());
    ArtistAdmin::new(shared.clone(), shared)
}

pub(super) fn catalog(backend: &InMemoryBackend) -> CastingCatalog<InMemoryBackend> {
    CastingCatalog::new(Arc::new(backend.clone()))
}

/// Roster used by the catalog tests: three visible artists and one hidden.
pub(super) fn seeded_roster(backend: &InMemoryBackend) -> Vec<ArtistRecord> {
    let admin = admin(backend);
    let mut hidden = draft("Trio Oculto", Category::Banda, "MG", &["Forró"]);
    hidden.is_visible = false;

    [
        draft("Ana Clara", Category::Cantor, "SP", &["MPB", "Samba"]),
        draft("DJ Kaio", Category::Dj, "RJ", &["Funk", "House"]),
        draft("Banda Maré", Category::Banda, "BA", &["Axé", "MPB"]),
        hidden,
    ]
    .into_iter()
    .map(|draft| admin.create(draft).expect("seeded").artist)
    .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
