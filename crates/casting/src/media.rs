//! Image uploads into the `artist-images` bucket.

use std::fmt;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::{ObjectStorage, RepositoryError};

/// Upper bound on a single uploaded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Raw image as received from a form post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Bucket folder an image is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFolder {
    Submissions,
    Profiles,
    Gallery,
}

impl ImageFolder {
    pub const fn prefix(self) -> &'static str {
        match self {
            ImageFolder::Submissions => "submissions",
            ImageFolder::Profiles => "profiles",
            ImageFolder::Gallery => "gallery",
        }
    }
}

impl fmt::Display for ImageFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("upload is empty")]
    Empty,
    #[error("content type '{0}' is not an image")]
    NotAnImage(String),
    #[error("image exceeds {max} bytes (found {found})")]
    TooLarge { max: usize, found: usize },
    #[error("image storage failed: {0}")]
    Storage(#[from] RepositoryError),
}

impl ImageUpload {
    /// Reject non-image content types, empty bodies, and oversized files.
    pub fn validate(&self) -> Result<mime::Mime, MediaError> {
        let parsed: mime::Mime = self
            .content_type
            .parse()
            .map_err(|_| MediaError::NotAnImage(self.content_type.clone()))?;
        if parsed.type_() != mime::IMAGE {
            return Err(MediaError::NotAnImage(self.content_type.clone()));
        }
        if self.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(MediaError::TooLarge {
                max: MAX_IMAGE_BYTES,
                found: self.bytes.len(),
            });
        }
        Ok(parsed)
    }

    /// Extension for the stored object. The client's own extension is kept
    /// only when it names the validated image format.
    fn extension(&self, parsed: &mime::Mime) -> String {
        let implied = implied_extension(parsed);
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| *ext == implied || extension_aliases(&implied).contains(&ext.as_str()))
            .unwrap_or(implied)
    }
}

fn implied_extension(parsed: &mime::Mime) -> String {
    match parsed.subtype().as_str().to_ascii_lowercase().as_str() {
        "jpeg" | "pjpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        "x-icon" | "vnd.microsoft.icon" => "ico".to_string(),
        other => other.chars().filter(char::is_ascii_alphanumeric).collect(),
    }
}

fn extension_aliases(extension: &str) -> &'static [&'static str] {
    match extension {
        "jpg" => &["jpeg", "jpe", "jfif"],
        "tiff" => &["tif"],
        _ => &[],
    }
}

/// Object key for an upload.
///
/// Submission images are keyed by upload time plus a short random suffix; admin
/// uploads use a fresh UUID.
pub fn object_path(folder: ImageFolder, extension: &str) -> String {
    match folder {
        ImageFolder::Submissions => {
            let token = Uuid::new_v4().simple().to_string();
            format!(
                "{}/{}-{}.{}",
                folder.prefix(),
                Utc::now().timestamp_millis(),
                &token[..8],
                extension
            )
        }
        ImageFolder::Profiles | ImageFolder::Gallery => {
            format!("{}/{}.{}", folder.prefix(), Uuid::new_v4(), extension)
        }
    }
}

/// Validate and store an image, returning its public URL.
pub fn store_image<O: ObjectStorage + ?Sized>(
    storage: &O,
    folder: ImageFolder,
    upload: &ImageUpload,
) -> Result<String, MediaError> {
    let parsed = upload.validate()?;
    let path = object_path(folder, &upload.extension(&parsed));
    let url = storage.upload(&path, parsed.essence_str(), &upload.bytes)?;
    tracing::info!(%folder, %path, size = upload.bytes.len(), "image stored");
    Ok(url)
}
