use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::artists::domain::{ArtistFields, ArtistId, ArtistPhoto, ArtistRecord, NewPhoto};
use crate::artists::repository::ArtistRepository;
use crate::contacts::domain::{ContactId, ContactRecord, ContactStatus, NewContactRequest};
use crate::contacts::repository::ContactRepository;
use crate::submissions::domain::{
    NewSubmission, Review, SubmissionId, SubmissionRecord, SubmissionStatus,
};
use crate::submissions::repository::SubmissionRepository;

use super::{ObjectStorage, RepositoryError};

const ARTISTS: &str = "artists";
const ARTIST_PHOTOS: &str = "artist_photos";
const SUBMISSIONS: &str = "artist_submissions";
const CONTACTS: &str = "contact_requests";

const NEWEST_FIRST: &str = "created_at.desc";
const RETURN_ROWS: &str = "return=representation";
const COUNT_EXACT: &str = "count=exact";

/// Client for the hosted PostgREST tables and storage bucket.
#[derive(Clone)]
pub struct RestBackend {
    base_url: String,
    api_key: String,
    bucket: String,
    agent: ureq::Agent,
}

impl RestBackend {
    pub fn new(base_url: &str, api_key: &str, bucket: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_global(Some(timeout))
                .build(),
        );

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
            agent,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        let bearer = format!("Bearer {}", self.api_key);
        request
            .header("apikey", self.api_key.as_str())
            .header("Authorization", bearer.as_str())
    }

    fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order: Option<&str>,
    ) -> Result<Vec<T>, RepositoryError> {
        let mut request = self.agent.get(self.table_url(table)).query("select", "*");
        for (column, condition) in filters {
            request = request.query(*column, condition.as_str());
        }
        if let Some(order) = order {
            request = request.query("order", order);
        }

        debug!(table, "select");
        let mut response = self.authorize(request).call().map_err(map_error)?;
        response
            .body_mut()
            .read_json::<Vec<T>>()
            .map_err(|err| RepositoryError::Decode(err.to_string()))
    }

    fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>, RepositoryError> {
        Ok(self.select(table, filters, None)?.into_iter().next())
    }

    /// Exact row count from PostgREST's `Content-Range` total; no rows are
    /// transferred.
    fn count_rows(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<usize, RepositoryError> {
        let mut request = self
            .agent
            .head(self.table_url(table))
            .query("select", "id")
            .header("Prefer", COUNT_EXACT);
        for (column, condition) in filters {
            request = request.query(*column, condition.as_str());
        }

        debug!(table, "count");
        let response = self.authorize(request).call().map_err(map_error)?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                RepositoryError::Decode(format!("count on {table} returned no Content-Range"))
            })?;
        range_total(range).ok_or_else(|| {
            RepositoryError::Decode(format!("count on {table} returned Content-Range '{range}'"))
        })
    }

    fn insert_rows<P: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        payload: &P,
    ) -> Result<Vec<T>, RepositoryError> {
        debug!(table, "insert");
        let request = self
            .agent
            .post(self.table_url(table))
            .header("Prefer", RETURN_ROWS);
        let mut response = self
            .authorize(request)
            .send_json(payload)
            .map_err(map_error)?;
        response
            .body_mut()
            .read_json::<Vec<T>>()
            .map_err(|err| RepositoryError::Decode(err.to_string()))
    }

    fn insert_one<P: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        payload: &P,
    ) -> Result<T, RepositoryError> {
        self.insert_rows(table, payload)?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::Decode(format!("insert into {table} returned no row")))
    }

    /// PATCH every row matching `filters`, returning the updated rows.
    fn patch<P: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: &P,
    ) -> Result<Vec<T>, RepositoryError> {
        debug!(table, "update");
        let mut request = self
            .agent
            .patch(self.table_url(table))
            .header("Prefer", RETURN_ROWS);
        for (column, condition) in filters {
            request = request.query(*column, condition.as_str());
        }

        let mut response = self
            .authorize(request)
            .send_json(patch)
            .map_err(map_error)?;
        response
            .body_mut()
            .read_json::<Vec<T>>()
            .map_err(|err| RepositoryError::Decode(err.to_string()))
    }

    fn remove(&self, table: &str, filters: &[(&str, String)]) -> Result<usize, RepositoryError> {
        debug!(table, "delete");
        let mut request = self
            .agent
            .delete(self.table_url(table))
            .header("Prefer", RETURN_ROWS);
        for (column, condition) in filters {
            request = request.query(*column, condition.as_str());
        }

        let mut response = self.authorize(request).call().map_err(map_error)?;
        let rows: Vec<Value> = response
            .body_mut()
            .read_json()
            .map_err(|err| RepositoryError::Decode(err.to_string()))?;
        Ok(rows.len())
    }
}

fn eq(value: impl AsRef<str>) -> String {
    format!("eq.{}", value.as_ref())
}

fn map_error(err: ureq::Error) -> RepositoryError {
    match err {
        ureq::Error::StatusCode(409) => {
            RepositoryError::Conflict("unique constraint violated".to_string())
        }
        ureq::Error::StatusCode(404) => RepositoryError::NotFound,
        ureq::Error::StatusCode(status) => RepositoryError::Rejected {
            status,
            message: format!("request failed with HTTP {status}"),
        },
        other => RepositoryError::Unavailable(other.to_string()),
    }
}

/// Total after the slash in `0-24/318` or `*/0`.
fn range_total(content_range: &str) -> Option<usize> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse().ok()
}

fn first_or_not_found<T>(rows: Vec<T>) -> Result<T, RepositoryError> {
    rows.into_iter().next().ok_or(RepositoryError::NotFound)
}

impl SubmissionRepository for RestBackend {
    fn insert(&self, submission: NewSubmission) -> Result<SubmissionRecord, RepositoryError> {
        self.insert_one(SUBMISSIONS, &submission)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        self.select_one(SUBMISSIONS, &[("id", eq(&id.0))])
    }

    fn list(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let filters: Vec<(&str, String)> = status
            .map(|status| vec![("status", eq(status.label()))])
            .unwrap_or_default();
        self.select(SUBMISSIONS, &filters, Some(NEWEST_FIRST))
    }

    fn count(&self, status: SubmissionStatus) -> Result<usize, RepositoryError> {
        self.count_rows(SUBMISSIONS, &[("status", eq(status.label()))])
    }

    fn mark_reviewed(&self, id: &SubmissionId, review: &Review) -> Result<bool, RepositoryError> {
        let rows: Vec<Value> = self.patch(
            SUBMISSIONS,
            &[
                ("id", eq(&id.0)),
                ("status", eq(SubmissionStatus::Pending.label())),
            ],
            review,
        )?;
        Ok(!rows.is_empty())
    }
}

#[derive(Serialize)]
struct PhotoRow<'a> {
    artist_id: &'a ArtistId,
    image_url: String,
    caption: Option<String>,
    order_index: i32,
}

impl ArtistRepository for RestBackend {
    fn insert(&self, fields: ArtistFields) -> Result<ArtistRecord, RepositoryError> {
        self.insert_one(ARTISTS, &fields)
    }

    fn update(&self, id: &ArtistId, fields: ArtistFields) -> Result<ArtistRecord, RepositoryError> {
        first_or_not_found(self.patch(ARTISTS, &[("id", eq(&id.0))], &fields)?)
    }

    fn set_visibility(&self, id: &ArtistId, visible: bool) -> Result<(), RepositoryError> {
        let rows: Vec<Value> = self.patch(
            ARTISTS,
            &[("id", eq(&id.0))],
            &json!({ "is_visible": visible }),
        )?;
        first_or_not_found(rows).map(|_| ())
    }

    /// The artist row goes first; gallery rows are only cleared once it is
    /// gone, and are usually already removed by the foreign-key cascade.
    fn delete(&self, id: &ArtistId) -> Result<(), RepositoryError> {
        if self.remove(ARTISTS, &[("id", eq(&id.0))])? == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.remove(ARTIST_PHOTOS, &[("artist_id", eq(&id.0))])?;
        Ok(())
    }

    fn fetch(&self, id: &ArtistId) -> Result<Option<ArtistRecord>, RepositoryError> {
        self.select_one(ARTISTS, &[("id", eq(&id.0))])
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<ArtistRecord>, RepositoryError> {
        self.select_one(ARTISTS, &[("slug", eq(slug))])
    }

    fn list(&self, visible: Option<bool>) -> Result<Vec<ArtistRecord>, RepositoryError> {
        let filters: Vec<(&str, String)> = visible
            .map(|visible| vec![("is_visible", eq(visible.to_string()))])
            .unwrap_or_default();
        self.select(ARTISTS, &filters, Some(NEWEST_FIRST))
    }

    fn photos(&self, id: &ArtistId) -> Result<Vec<ArtistPhoto>, RepositoryError> {
        self.select(
            ARTIST_PHOTOS,
            &[("artist_id", eq(&id.0))],
            Some("order_index.asc"),
        )
    }

    fn replace_photos(
        &self,
        id: &ArtistId,
        photos: Vec<NewPhoto>,
    ) -> Result<Vec<ArtistPhoto>, RepositoryError> {
        self.remove(ARTIST_PHOTOS, &[("artist_id", eq(&id.0))])?;
        if photos.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<PhotoRow<'_>> = photos
            .into_iter()
            .map(|photo| PhotoRow {
                artist_id: id,
                image_url: photo.image_url,
                caption: photo.caption,
                order_index: photo.order_index,
            })
            .collect();
        self.insert_rows(ARTIST_PHOTOS, &rows)
    }
}

impl ContactRepository for RestBackend {
    fn insert(&self, request: NewContactRequest) -> Result<ContactRecord, RepositoryError> {
        self.insert_one(CONTACTS, &request)
    }

    fn fetch(&self, id: &ContactId) -> Result<Option<ContactRecord>, RepositoryError> {
        self.select_one(CONTACTS, &[("id", eq(&id.0))])
    }

    fn list(&self, status: Option<ContactStatus>) -> Result<Vec<ContactRecord>, RepositoryError> {
        let filters: Vec<(&str, String)> = status
            .map(|status| vec![("status", eq(status.label()))])
            .unwrap_or_default();
        self.select(CONTACTS, &filters, Some(NEWEST_FIRST))
    }

    fn count(&self, status: ContactStatus) -> Result<usize, RepositoryError> {
        self.count_rows(CONTACTS, &[("status", eq(status.label()))])
    }

    fn update_status(&self, id: &ContactId, status: ContactStatus) -> Result<(), RepositoryError> {
        let rows: Vec<Value> = self.patch(
            CONTACTS,
            &[("id", eq(&id.0))],
            &json!({ "status": status }),
        )?;
        first_or_not_found(rows).map(|_| ())
    }

    fn update_notes(&self, id: &ContactId, notes: Option<String>) -> Result<(), RepositoryError> {
        let rows: Vec<Value> = self.patch(
            CONTACTS,
            &[("id", eq(&id.0))],
            &json!({ "admin_notes": notes }),
        )?;
        first_or_not_found(rows).map(|_| ())
    }
}

impl ObjectStorage for RestBackend {
    fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, RepositoryError> {
        debug!(bucket = %self.bucket, path, size = bytes.len(), "upload object");
        let request = self
            .agent
            .post(self.object_url(path))
            .header("Content-Type", content_type)
            .header("x-upsert", "false");
        self.authorize(request).send(bytes).map_err(map_error)?;
        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn backend() -> RestBackend {
        RestBackend::new(
            "https://project.supabase.co/",
            "service-key",
            "artist-images",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn urls_follow_postgrest_and_storage_layout() {
        let backend = backend();
        assert_eq!(
            backend.table_url(SUBMISSIONS),
            "https://project.supabase.co/rest/v1/artist_submissions"
        );
        assert_eq!(
            backend.object_url("submissions/1-abc.jpg"),
            "https://project.supabase.co/storage/v1/object/artist-images/submissions/1-abc.jpg"
        );
        assert_eq!(
            backend.public_url("submissions/1-abc.jpg"),
            "https://project.supabase.co/storage/v1/object/public/artist-images/submissions/1-abc.jpg"
        );
    }

    #[test]
    fn status_codes_map_to_repository_errors() {
        assert!(matches!(
            map_error(ureq::Error::StatusCode(409)),
            RepositoryError::Conflict(_)
        ));
        assert_eq!(map_error(ureq::Error::StatusCode(404)), RepositoryError::NotFound);
        assert!(matches!(
            map_error(ureq::Error::StatusCode(403)),
            RepositoryError::Rejected { status: 403, .. }
        ));
        assert!(map_error(ureq::Error::HostNotFound).is_unavailable());
    }

    #[test]
    fn equality_filters_use_postgrest_syntax() {
        assert_eq!(eq("pending"), "eq.pending");
        assert_eq!(eq(true.to_string()), "eq.true");
    }

    #[test]
    fn content_range_totals_are_parsed() {
        assert_eq!(range_total("0-0/318"), Some(318));
        assert_eq!(range_total("*/0"), Some(0));
        assert_eq!(range_total("0-24/*"), None);
        assert_eq!(range_total("0-24"), None);
    }

    fn reply(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut text = format!("HTTP/1.1 {status}\r\n");
        for (name, value) in headers {
            text.push_str(&format!("{name}: {value}\r\n"));
        }
        text.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ));
        text
    }

    /// Local store stand-in: one connection per reply, returning the
    /// lowercased request heads in arrival order.
    fn local_store(replies: Vec<String>) -> (RestBackend, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let handle = thread::spawn(move || {
            let mut heads = Vec::new();
            for reply in replies {
                let (mut stream, _) = listener.accept().expect("accept");
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                while !head.windows(4).any(|window| window == b"\r\n\r\n") {
                    let read = stream.read(&mut chunk).expect("read request");
                    if read == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..read]);
                }
                heads.push(String::from_utf8_lossy(&head).to_ascii_lowercase());
                stream.write_all(reply.as_bytes()).expect("write reply");
            }
            heads
        });
        let backend = RestBackend::new(
            &base_url,
            "service-key",
            "artist-images",
            Duration::from_secs(5),
        );
        (backend, handle)
    }

    #[test]
    fn counts_come_from_the_content_range_total() {
        let (backend, store) = local_store(vec![reply(
            "200 OK",
            &[("Content-Range", "0-1/5")],
            "",
        )]);

        let pending = SubmissionRepository::count(&backend, SubmissionStatus::Pending)
            .expect("count succeeds");
        assert_eq!(pending, 5);

        let heads = store.join().expect("store thread");
        assert!(heads[0].starts_with("head /rest/v1/artist_submissions?"));
        assert!(heads[0].contains("status=eq.pending"));
        assert!(heads[0].contains("prefer: count=exact"));
    }

    #[test]
    fn count_without_content_range_is_a_decode_error() {
        let (backend, store) = local_store(vec![reply("200 OK", &[], "")]);

        let error = ContactRepository::count(&backend, ContactStatus::Pending)
            .expect_err("count needs a total");
        assert!(matches!(error, RepositoryError::Decode(_)));
        store.join().expect("store thread");
    }

    #[test]
    fn artist_row_is_deleted_before_its_gallery() {
        let (backend, store) = local_store(vec![
            reply("200 OK", &[("Content-Type", "application/json")], r#"[{"id":"a1"}]"#),
            reply("200 OK", &[("Content-Type", "application/json")], "[]"),
        ]);

        ArtistRepository::delete(&backend, &ArtistId("a1".to_string())).expect("delete");

        let heads = store.join().expect("store thread");
        assert_eq!(heads.len(), 2);
        assert!(heads[0].starts_with("delete /rest/v1/artists?id=eq.a1"));
        assert!(heads[1].starts_with("delete /rest/v1/artist_photos?artist_id=eq.a1"));
    }

    #[test]
    fn failed_artist_delete_leaves_the_gallery_alone() {
        let (backend, store) = local_store(vec![reply("500 Internal Server Error", &[], "")]);

        let error = ArtistRepository::delete(&backend, &ArtistId("a1".to_string()))
            .expect_err("store failure surfaces");
        assert!(matches!(error, RepositoryError::Rejected { status: 500, .. }));

        let heads = store.join().expect("store thread");
        assert_eq!(heads.len(), 1);
        assert!(heads[0].starts_with("delete /rest/v1/artists?"));
    }
}
