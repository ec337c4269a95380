use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::submissions::domain::SubmissionRecord;

/// Identifier wrapper for published roster entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub String);

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roster category shared by submissions and published artists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cantor,
    Dj,
    Musico,
    Banda,
    Influenciador,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Cantor,
        Category::Dj,
        Category::Musico,
        Category::Banda,
        Category::Influenciador,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Category::Cantor => "cantor",
            Category::Dj => "dj",
            Category::Musico => "musico",
            Category::Banda => "banda",
            Category::Influenciador => "influenciador",
        }
    }

    /// Display label used on the public site.
    pub const fn label(self) -> &'static str {
        match self {
            Category::Cantor => "Cantor(a)",
            Category::Dj => "DJ",
            Category::Musico => "Músico",
            Category::Banda => "Banda",
            Category::Influenciador => "Influenciador(a)",
        }
    }
}

/// Writable columns of an `artists` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistFields {
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub is_visible: bool,
    pub category: Option<Category>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub experience_years: Option<u8>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub genres: Vec<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub spotify: Option<String>,
    pub youtube_video_url: Option<String>,
}

impl ArtistFields {
    /// Map an approved submission onto a visible roster entry.
    ///
    /// `youtube_video_url` is never carried over; submissions do not collect it.
    pub fn from_submission(submission: &SubmissionRecord, slug: String) -> Self {
        Self {
            name: submission.name.clone(),
            slug,
            bio: Some(submission.bio.clone()),
            profile_image: Some(submission.profile_image.clone()),
            is_visible: true,
            category: Some(submission.category),
            city: Some(submission.city.clone()),
            state: Some(submission.state.clone()),
            experience_years: submission.experience_years,
            genres: submission.genres.clone(),
            instagram: submission.instagram.clone(),
            youtube: submission.youtube.clone(),
            spotify: submission.spotify.clone(),
            youtube_video_url: None,
        }
    }
}

/// Stored `artists` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub id: ArtistId,
    #[serde(flatten)]
    pub fields: ArtistFields,
    pub created_at: DateTime<Utc>,
}

impl ArtistRecord {
    pub fn slug(&self) -> &str {
        &self.fields.slug
    }

    pub fn is_visible(&self) -> bool {
        self.fields.is_visible
    }
}

/// Gallery entry owned by an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistPhoto {
    pub id: String,
    pub artist_id: ArtistId,
    pub image_url: String,
    pub caption: Option<String>,
    pub order_index: i32,
}

/// Photo payload written alongside an artist edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub order_index: i32,
}

/// Visible/hidden split shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArtistStats {
    pub total: usize,
    pub visible: usize,
    pub hidden: usize,
}

impl ArtistStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ArtistRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut stats, record| {
                stats.total += 1;
                if record.is_visible() {
                    stats.visible += 1;
                } else {
                    stats.hidden += 1;
                }
                stats
            })
    }
}

pub(crate) fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
