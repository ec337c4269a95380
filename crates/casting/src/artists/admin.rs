use std::sync::Arc;

use serde::Deserialize;

use crate::backend::{ObjectStorage, RepositoryError};
use crate::fields::{is_known_state, normalize_genres, optional_text};
use crate::media::{store_image, ImageFolder, ImageUpload, MediaError};
use crate::slug::slugify;

use super::catalog::ArtistProfile;
use super::domain::{ArtistFields, ArtistId, ArtistRecord, ArtistStats, Category, NewPhoto};
use super::repository::ArtistRepository;

const MAX_EXPERIENCE_YEARS: i64 = 50;

fn default_visible() -> bool {
    true
}

/// Gallery entry as edited in the admin form; position decides display order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoDraft {
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Admin create/edit payload. Only `name` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtistDraft {
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub experience_years: Option<i64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub spotify: Option<String>,
    #[serde(default)]
    pub youtube_video_url: Option<String>,
    #[serde(default)]
    pub photos: Vec<PhotoDraft>,
}

impl ArtistDraft {
    /// Minimal draft carrying just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bio: None,
            profile_image: None,
            is_visible: true,
            category: None,
            city: None,
            state: None,
            experience_years: None,
            genres: Vec::new(),
            instagram: None,
            youtube: None,
            spotify: None,
            youtube_video_url: None,
            photos: Vec::new(),
        }
    }

    fn into_parts(self) -> Result<(ArtistFields, Vec<NewPhoto>), AdminError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AdminError::MissingName);
        }

        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(AdminError::EmptySlug(name));
        }

        let state = optional_text(self.state).map(|code| code.to_ascii_uppercase());
        if let Some(code) = &state {
            if !is_known_state(code) {
                return Err(AdminError::UnknownState(code.clone()));
            }
        }

        let experience_years = match self.experience_years {
            None => None,
            Some(years) if (0..=MAX_EXPERIENCE_YEARS).contains(&years) => u8::try_from(years).ok(),
            Some(years) => return Err(AdminError::ExperienceOutOfRange(years)),
        };

        let photos = self
            .photos
            .into_iter()
            .filter_map(|photo| {
                optional_text(Some(photo.image_url)).map(|image_url| (image_url, photo.caption))
            })
            .enumerate()
            .map(|(position, (image_url, caption))| NewPhoto {
                image_url,
                caption: optional_text(caption),
                order_index: i32::try_from(position).unwrap_or(i32::MAX),
            })
            .collect();

        let fields = ArtistFields {
            name,
            slug,
            bio: optional_text(self.bio),
            profile_image: optional_text(self.profile_image),
            is_visible: self.is_visible,
            category: self.category,
            city: optional_text(self.city),
            state,
            experience_years,
            genres: normalize_genres(self.genres),
            instagram: optional_text(self.instagram),
            youtube: optional_text(self.youtube),
            spotify: optional_text(self.spotify),
            youtube_video_url: optional_text(self.youtube_video_url),
        };

        Ok((fields, photos))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("artist name is required")]
    MissingName,
    #[error("name '{0}' produces an empty slug")]
    EmptySlug(String),
    #[error("unknown state code '{0}'")]
    UnknownState(String),
    #[error("experience_years must be between 0 and 50 (found {0})")]
    ExperienceOutOfRange(i64),
    #[error("uploads are not accepted into the '{0}' folder")]
    UnsupportedFolder(ImageFolder),
    #[error("artist {0} not found")]
    NotFound(ArtistId),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Back-office management of the roster and its galleries.
pub struct ArtistAdmin<A, O> {
    artists: Arc<A>,
    storage: Arc<O>,
}

impl<A, O> ArtistAdmin<A, O>
where
    A: ArtistRepository + 'static,
    O: ObjectStorage + 'static,
{
    pub fn new(artists: Arc<A>, storage: Arc<O>) -> Self {
        Self { artists, storage }
    }

    fn existing(&self, id: &ArtistId) -> Result<ArtistRecord, AdminError> {
        self.artists
            .fetch(id)?
            .ok_or_else(|| AdminError::NotFound(id.clone()))
    }

    fn not_found_as(id: &ArtistId) -> impl FnOnce(RepositoryError) -> AdminError + '_ {
        move |error| match error {
            RepositoryError::NotFound => AdminError::NotFound(id.clone()),
            other => AdminError::Repository(other),
        }
    }

    /// Every artist newest first, optionally narrowed by a name fragment.
    pub fn list(&self, search: Option<&str>) -> Result<Vec<ArtistRecord>, AdminError> {
        let needle = optional_text(search.map(str::to_string)).map(|text| text.to_lowercase());
        let artists = self.artists.list(None)?;
        Ok(match needle {
            Some(needle) => artists
                .into_iter()
                .filter(|artist| artist.fields.name.to_lowercase().contains(&needle))
                .collect(),
            None => artists,
        })
    }

    pub fn get(&self, id: &ArtistId) -> Result<ArtistProfile, AdminError> {
        let artist = self.existing(id)?;
        let photos = self.artists.photos(id)?;
        Ok(ArtistProfile { artist, photos })
    }

    pub fn create(&self, draft: ArtistDraft) -> Result<ArtistProfile, AdminError> {
        let (fields, photos) = draft.into_parts()?;
        let artist = self.artists.insert(fields)?;
        let photos = self.artists.replace_photos(&artist.id, photos)?;
        tracing::info!(artist_id = %artist.id, slug = artist.slug(), "artist created");
        Ok(ArtistProfile { artist, photos })
    }

    /// Overwrite an artist, regenerating its slug and replacing the gallery.
    pub fn update(&self, id: &ArtistId, draft: ArtistDraft) -> Result<ArtistProfile, AdminError> {
        let (fields, photos) = draft.into_parts()?;
        let artist = self
            .artists
            .update(id, fields)
            .map_err(Self::not_found_as(id))?;
        let photos = self
            .artists
            .replace_photos(id, photos)
            .map_err(Self::not_found_as(id))?;
        tracing::info!(artist_id = %id, slug = artist.slug(), photos = photos.len(), "artist updated");
        Ok(ArtistProfile { artist, photos })
    }

    /// Flip `is_visible`, returning the new value.
    pub fn toggle_visibility(&self, id: &ArtistId) -> Result<bool, AdminError> {
        let visible = !self.existing(id)?.is_visible();
        self.artists
            .set_visibility(id, visible)
            .map_err(Self::not_found_as(id))?;
        tracing::info!(artist_id = %id, visible, "artist visibility changed");
        Ok(visible)
    }

    pub fn delete(&self, id: &ArtistId) -> Result<(), AdminError> {
        self.artists.delete(id).map_err(Self::not_found_as(id))?;
        tracing::info!(artist_id = %id, "artist deleted");
        Ok(())
    }

    /// Store a profile or gallery image and return its public URL.
    pub fn upload_image(
        &self,
        folder: ImageFolder,
        upload: &ImageUpload,
    ) -> Result<String, AdminError> {
        if folder == ImageFolder::Submissions {
            return Err(AdminError::UnsupportedFolder(folder));
        }
        Ok(store_image(self.storage.as_ref(), folder, upload)?)
    }

    pub fn stats(&self) -> Result<ArtistStats, AdminError> {
        let artists = self.artists.list(None)?;
        Ok(ArtistStats::from_records(&artists))
    }
}
