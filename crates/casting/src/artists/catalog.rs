use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::RepositoryError;
use crate::fields::optional_text;

use super::domain::{ArtistPhoto, ArtistRecord, Category};
use super::repository::ArtistRepository;

/// Filters offered on the public casting page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CastingFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl CastingFilter {
    fn matches(&self, artist: &ArtistRecord, search: Option<&str>) -> bool {
        let fields = &artist.fields;

        if let Some(needle) = search {
            if !fields.name.to_lowercase().contains(needle) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if fields.category != Some(category) {
                return false;
            }
        }
        if let Some(state) = self.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !fields
                .state
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(state))
            {
                return false;
            }
        }
        if let Some(genre) = self.genre.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            if !fields.genres.iter().any(|own| own == genre) {
                return false;
            }
        }
        true
    }
}

/// Visible roster plus the genres that can be filtered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastingPage {
    pub artists: Vec<ArtistRecord>,
    pub genres: Vec<String>,
}

/// Public artist profile with its gallery in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistProfile {
    #[serde(flatten)]
    pub artist: ArtistRecord,
    pub photos: Vec<ArtistPhoto>,
}

/// Read side of the public casting pages.
pub struct CastingCatalog<A> {
    artists: Arc<A>,
}

impl<A> CastingCatalog<A>
where
    A: ArtistRepository + 'static,
{
    pub fn new(artists: Arc<A>) -> Self {
        Self { artists }
    }

    /// Visible artists, newest first, narrowed by `filter`.
    pub fn list_visible(
        &self,
        filter: &CastingFilter,
    ) -> Result<Vec<ArtistRecord>, RepositoryError> {
        let search = optional_text(filter.search.clone()).map(|text| text.to_lowercase());
        let visible = self.artists.list(Some(true))?;
        Ok(visible
            .into_iter()
            .filter(|artist| filter.matches(artist, search.as_deref()))
            .collect())
    }

    /// Sorted, de-duplicated genres across the visible roster.
    pub fn available_genres(&self) -> Result<Vec<String>, RepositoryError> {
        let visible = self.artists.list(Some(true))?;
        let genres: BTreeSet<String> = visible
            .into_iter()
            .flat_map(|artist| artist.fields.genres)
            .collect();
        Ok(genres.into_iter().collect())
    }

    /// Listing and genre facets in one read.
    pub fn page(&self, filter: &CastingFilter) -> Result<CastingPage, RepositoryError> {
        Ok(CastingPage {
            artists: self.list_visible(filter)?,
            genres: self.available_genres()?,
        })
    }

    /// Hidden and unknown slugs both resolve to `NotFound`.
    pub fn profile(&self, slug: &str) -> Result<ArtistProfile, RepositoryError> {
        let artist = self
            .artists
            .fetch_by_slug(slug)?
            .filter(ArtistRecord::is_visible)
            .ok_or(RepositoryError::NotFound)?;
        let photos = self.artists.photos(&artist.id)?;
        Ok(ArtistProfile { artist, photos })
    }
}
