use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::artists::domain::{ArtistFields, ArtistId, ArtistPhoto, ArtistRecord, NewPhoto};
use crate::artists::repository::ArtistRepository;
use crate::contacts::domain::{ContactId, ContactRecord, ContactStatus, NewContactRequest};
use crate::contacts::repository::ContactRepository;
use crate::submissions::domain::{
    NewSubmission, Review, SubmissionId, SubmissionRecord, SubmissionStatus,
};
use crate::submissions::repository::SubmissionRepository;

use super::{ObjectStorage, RepositoryError};

const DEFAULT_PUBLIC_BASE: &str = "memory://artist-images";

/// Process-local stand-in for the hosted backend.
///
/// Enforces the same constraints the hosted tables carry: unique artist slugs,
/// photo cascade on artist delete, and review updates conditional on `pending`.
#[derive(Clone)]
pub struct InMemoryBackend {
    tables: Arc<Mutex<Tables>>,
    public_base: Arc<str>,
}

#[derive(Default)]
struct Tables {
    sequence: u64,
    submissions: HashMap<SubmissionId, Row<SubmissionRecord>>,
    artists: HashMap<ArtistId, Row<ArtistRecord>>,
    photos: HashMap<ArtistId, Vec<ArtistPhoto>>,
    contacts: HashMap<ContactId, Row<ContactRecord>>,
    objects: BTreeMap<String, StoredObject>,
}

struct Row<T> {
    sequence: u64,
    record: T,
}

/// Uploaded object kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Tables {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::with_public_base(DEFAULT_PUBLIC_BASE)
    }
}

impl InMemoryBackend {
    pub fn with_public_base(public_base: &str) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            public_base: Arc::from(public_base.trim_end_matches('/')),
        }
    }

    /// Object previously stored under `path`, if any.
    pub fn object(&self, path: &str) -> Option<StoredObject> {
        self.tables().objects.get(path).cloned()
    }

    pub fn object_paths(&self) -> Vec<String> {
        self.tables().objects.keys().cloned().collect()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Newest first; the insertion sequence breaks timestamp ties.
fn newest_first<T>(
    rows: impl Iterator<Item = (DateTime<Utc>, u64, T)>,
) -> Vec<T> {
    let mut rows: Vec<_> = rows.collect();
    rows.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
    rows.into_iter().map(|(_, _, record)| record).collect()
}

impl SubmissionRepository for InMemoryBackend {
    fn insert(&self, submission: NewSubmission) -> Result<SubmissionRecord, RepositoryError> {
        let mut tables = self.tables();
        let record = SubmissionRecord {
            id: SubmissionId(new_id()),
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            bio: submission.bio,
            profile_image: submission.profile_image,
            category: submission.category,
            city: submission.city,
            state: submission.state,
            experience_years: submission.experience_years,
            genres: submission.genres,
            instagram: submission.instagram,
            youtube: submission.youtube,
            spotify: submission.spotify,
            status: SubmissionStatus::Pending,
            admin_notes: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };
        let sequence = tables.next_sequence();
        tables.submissions.insert(
            record.id.clone(),
            Row {
                sequence,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Ok(self
            .tables()
            .submissions
            .get(id)
            .map(|row| row.record.clone()))
    }

    fn list(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let tables = self.tables();
        Ok(newest_first(
            tables
                .submissions
                .values()
                .filter(|row| status.map_or(true, |status| row.record.status == status))
                .map(|row| (row.record.created_at, row.sequence, row.record.clone())),
        ))
    }

    fn count(&self, status: SubmissionStatus) -> Result<usize, RepositoryError> {
        Ok(self
            .tables()
            .submissions
            .values()
            .filter(|row| row.record.status == status)
            .count())
    }

    fn mark_reviewed(&self, id: &SubmissionId, review: &Review) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        match tables.submissions.get_mut(id) {
            Some(row) if row.record.status == SubmissionStatus::Pending => {
                row.record.status = review.status;
                row.record.admin_notes = review.admin_notes.clone();
                row.record.reviewed_at = Some(review.reviewed_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl ArtistRepository for InMemoryBackend {
    fn insert(&self, fields: ArtistFields) -> Result<ArtistRecord, RepositoryError> {
        let mut tables = self.tables();
        if tables
            .artists
            .values()
            .any(|row| row.record.fields.slug == fields.slug)
        {
            return Err(RepositoryError::Conflict(format!(
                "artist slug '{}' already exists",
                fields.slug
            )));
        }

        let record = ArtistRecord {
            id: ArtistId(new_id()),
            fields,
            created_at: Utc::now(),
        };
        let sequence = tables.next_sequence();
        tables.artists.insert(
            record.id.clone(),
            Row {
                sequence,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn update(&self, id: &ArtistId, fields: ArtistFields) -> Result<ArtistRecord, RepositoryError> {
        let mut tables = self.tables();
        if tables
            .artists
            .values()
            .any(|row| &row.record.id != id && row.record.fields.slug == fields.slug)
        {
            return Err(RepositoryError::Conflict(format!(
                "artist slug '{}' already exists",
                fields.slug
            )));
        }

        let row = tables.artists.get_mut(id).ok_or(RepositoryError::NotFound)?;
        row.record.fields = fields;
        Ok(row.record.clone())
    }

    fn set_visibility(&self, id: &ArtistId, visible: bool) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let row = tables.artists.get_mut(id).ok_or(RepositoryError::NotFound)?;
        row.record.fields.is_visible = visible;
        Ok(())
    }

    fn delete(&self, id: &ArtistId) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        tables.artists.remove(id).ok_or(RepositoryError::NotFound)?;
        tables.photos.remove(id);
        Ok(())
    }

    fn fetch(&self, id: &ArtistId) -> Result<Option<ArtistRecord>, RepositoryError> {
        Ok(self.tables().artists.get(id).map(|row| row.record.clone()))
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ArtistRecord>, RepositoryError> {
        Ok(self
            .tables()
            .artists
            .values()
            .find(|row| row.record.fields.slug == slug)
            .map(|row| row.record.clone()))
    }

    fn list(&self, visible: Option<bool>) -> Result<Vec<ArtistRecord>, RepositoryError> {
        let tables = self.tables();
        Ok(newest_first(
            tables
                .artists
                .values()
                .filter(|row| visible.map_or(true, |visible| row.record.is_visible() == visible))
                .map(|row| (row.record.created_at, row.sequence, row.record.clone())),
        ))
    }

    fn photos(&self, id: &ArtistId) -> Result<Vec<ArtistPhoto>, RepositoryError> {
        let mut photos = self.tables().photos.get(id).cloned().unwrap_or_default();
        photos.sort_by_key(|photo| photo.order_index);
        Ok(photos)
    }

    fn replace_photos(
        &self,
        id: &ArtistId,
        photos: Vec<NewPhoto>,
    ) -> Result<Vec<ArtistPhoto>, RepositoryError> {
        let mut tables = self.tables();
        if !tables.artists.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }

        let stored: Vec<ArtistPhoto> = photos
            .into_iter()
            .map(|photo| ArtistPhoto {
                id: new_id(),
                artist_id: id.clone(),
                image_url: photo.image_url,
                caption: photo.caption,
                order_index: photo.order_index,
            })
            .collect();
        tables.photos.insert(id.clone(), stored.clone());
        Ok(stored)
    }
}

impl ContactRepository for InMemoryBackend {
    fn insert(&self, request: NewContactRequest) -> Result<ContactRecord, RepositoryError> {
        let mut tables = self.tables();
        let record = ContactRecord {
            id: ContactId(new_id()),
            name: request.name,
            company: request.company,
            email: request.email,
            phone: request.phone,
            event_type: request.event_type,
            event_date: request.event_date,
            message: request.message,
            status: ContactStatus::Pending,
            admin_notes: None,
            created_at: Utc::now(),
        };
        let sequence = tables.next_sequence();
        tables.contacts.insert(
            record.id.clone(),
            Row {
                sequence,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn fetch(&self, id: &ContactId) -> Result<Option<ContactRecord>, RepositoryError> {
        Ok(self.tables().contacts.get(id).map(|row| row.record.clone()))
    }

    fn list(&self, status: Option<ContactStatus>) -> Result<Vec<ContactRecord>, RepositoryError> {
        let tables = self.tables();
        Ok(newest_first(
            tables
                .contacts
                .values()
                .filter(|row| status.map_or(true, |status| row.record.status == status))
                .map(|row| (row.record.created_at, row.sequence, row.record.clone())),
        ))
    }

    fn count(&self, status: ContactStatus) -> Result<usize, RepositoryError> {
        Ok(self
            .tables()
            .contacts
            .values()
            .filter(|row| row.record.status == status)
            .count())
    }

    fn update_status(&self, id: &ContactId, status: ContactStatus) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let row = tables.contacts.get_mut(id).ok_or(RepositoryError::NotFound)?;
        row.record.status = status;
        Ok(())
    }

    fn update_notes(&self, id: &ContactId, notes: Option<String>) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let row = tables.contacts.get_mut(id).ok_or(RepositoryError::NotFound)?;
        row.record.admin_notes = notes;
        Ok(())
    }
}

impl ObjectStorage for InMemoryBackend {
    fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, RepositoryError> {
        let mut tables = self.tables();
        if tables.objects.contains_key(path) {
            return Err(RepositoryError::Conflict(format!(
                "object '{path}' already exists"
            )));
        }
        tables.objects.insert(
            path.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        Ok(format!("{}/{}", self.public_base, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artists::domain::Category;

    fn fields(name: &str, slug: &str, visible: bool) -> ArtistFields {
        ArtistFields {
            name: name.to_string(),
            slug: slug.to_string(),
            bio: None,
            profile_image: None,
            is_visible: visible,
            category: Some(Category::Dj),
            city: None,
            state: None,
            experience_years: None,
            genres: Vec::new(),
            instagram: None,
            youtube: None,
            spotify: None,
            youtube_video_url: None,
        }
    }

    #[test]
    fn artist_slugs_are_unique() {
        let backend = InMemoryBackend::default();
        ArtistRepository::insert(&backend, fields("Ana", "ana", true)).expect("first insert");

        match ArtistRepository::insert(&backend, fields("ANA", "ana", true)) {
            Err(RepositoryError::Conflict(message)) => assert!(message.contains("ana")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn update_keeps_own_slug_but_rejects_foreign_one() {
        let backend = InMemoryBackend::default();
        let ana = ArtistRepository::insert(&backend, fields("Ana", "ana", true)).expect("insert");
        ArtistRepository::insert(&backend, fields("Bia", "bia", true)).expect("insert");

        ArtistRepository::update(&backend, &ana.id, fields("Ana", "ana", false))
            .expect("same slug is fine");
        assert!(matches!(
            ArtistRepository::update(&backend, &ana.id, fields("Bia", "bia", true)),
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn delete_cascades_photos() {
        let backend = InMemoryBackend::default();
        let artist = ArtistRepository::insert(&backend, fields("Ana", "ana", true)).expect("insert");
        backend
            .replace_photos(
                &artist.id,
                vec![NewPhoto {
                    image_url: "memory://a.jpg".to_string(),
                    caption: None,
                    order_index: 0,
                }],
            )
            .expect("photos stored");

        ArtistRepository::delete(&backend, &artist.id).expect("delete");
        assert!(backend.photos(&artist.id).expect("photos").is_empty());
        assert!(matches!(
            ArtistRepository::delete(&backend, &artist.id),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn list_orders_newest_first_and_filters_visibility() {
        let backend = InMemoryBackend::default();
        ArtistRepository::insert(&backend, fields("One", "one", true)).expect("insert");
        ArtistRepository::insert(&backend, fields("Two", "two", false)).expect("insert");
        ArtistRepository::insert(&backend, fields("Three", "three", true)).expect("insert");

        let all: Vec<String> = ArtistRepository::list(&backend, None)
            .expect("list")
            .into_iter()
            .map(|artist| artist.fields.slug)
            .collect();
        assert_eq!(all, vec!["three", "two", "one"]);

        let visible = ArtistRepository::list(&backend, Some(true)).expect("list");
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(ArtistRecord::is_visible));
    }

    #[test]
    fn uploads_return_public_url_and_refuse_overwrite() {
        let backend = InMemoryBackend::with_public_base("https://cdn.example/artist-images/");
        let url = backend
            .upload("profiles/a.png", "image/png", &[1, 2, 3])
            .expect("upload");
        assert_eq!(url, "https://cdn.example/artist-images/profiles/a.png");
        assert_eq!(
            backend.object("profiles/a.png").map(|object| object.bytes),
            Some(vec![1, 2, 3])
        );
        assert!(matches!(
            backend.upload("profiles/a.png", "image/png", &[4]),
            Err(RepositoryError::Conflict(_))
        ));
    }
}
