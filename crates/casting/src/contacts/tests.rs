use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::NaiveDate;
use serde_json::json;
use tower::ServiceExt;

use super::domain::{ContactForm, ContactId, ContactStatus};
use super::repository::ContactRepository;
use super::router::{contact_admin_router, contact_router};
use super::service::{ContactDesk, ContactError};
use crate::backend::InMemoryBackend;

fn form() -> ContactForm {
    ContactForm {
        name: "Marina Alves".to_string(),
        company: Some("Eventos Alves".to_string()),
        email: "marina@eventosalves.com.br".to_string(),
        phone: Some(" ".to_string()),
        event_type: Some("Casamento".to_string()),
        event_date: NaiveDate::from_ymd_opt(2026, 12, 12),
        message: "Procuramos uma banda para a festa.".to_string(),
    }
}

fn desk(backend: &InMemoryBackend) -> ContactDesk<InMemoryBackend> {
    ContactDesk::new(Arc::new(backend.clone()))
}

#[test]
fn submit_stores_pending_request_with_blank_optionals_dropped() {
    let backend = InMemoryBackend::default();
    let record = desk(&backend).submit(form()).expect("stored");

    assert_eq!(record.status, ContactStatus::Pending);
    assert_eq!(record.phone, None);
    assert_eq!(record.company.as_deref(), Some("Eventos Alves"));
    assert_eq!(record.event_date, NaiveDate::from_ymd_opt(2026, 12, 12));
}

#[test]
fn submit_requires_name_email_and_message() {
    let backend = InMemoryBackend::default();
    let desk = desk(&backend);

    let mut no_message = form();
    no_message.message = "   ".to_string();
    assert!(matches!(
        desk.submit(no_message),
        Err(ContactError::MissingField("message"))
    ));

    let mut bad_email = form();
    bad_email.email = "marina".to_string();
    assert!(matches!(desk.submit(bad_email), Err(ContactError::InvalidEmail)));

    assert!(desk.list(None).expect("list").is_empty());
}

#[test]
fn status_moves_freely_and_notes_are_saved() {
    let backend = InMemoryBackend::default();
    let desk = desk(&backend);
    let record = desk.submit(form()).expect("stored");

    desk.update_status(&record.id, ContactStatus::Archived)
        .expect("archived");
    desk.update_status(&record.id, ContactStatus::Pending)
        .expect("reopened");
    desk.save_notes(&record.id, Some("Ligar na segunda".to_string()))
        .expect("notes");

    let stored = backend.fetch(&record.id).expect("fetch").expect("row");
    assert_eq!(stored.status, ContactStatus::Pending);
    assert_eq!(stored.admin_notes.as_deref(), Some("Ligar na segunda"));

    desk.save_notes(&record.id, Some(String::new())).expect("cleared");
    let cleared = backend.fetch(&record.id).expect("fetch").expect("row");
    assert_eq!(cleared.admin_notes, None);
}

#[test]
fn unknown_requests_are_not_found() {
    let backend = InMemoryBackend::default();
    let missing = ContactId("missing".to_string());

    assert!(matches!(
        desk(&backend).update_status(&missing, ContactStatus::Contacted),
        Err(ContactError::NotFound(_))
    ));
}

#[tokio::test]
async fn contact_routes_round_trip() {
    let backend = InMemoryBackend::default();
    let desk = Arc::new(desk(&backend));
    let public = contact_router(desk.clone());
    let admin = contact_admin_router(desk);

    let created = public
        .oneshot(
            Request::post("/api/v1/contact")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "name": "Marina",
                        "email": "marina@example.com",
                        "message": "Orçamento para show",
                        "event_date": "2026-12-12"
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(created.into_body(), 16 * 1024)
        .await
        .expect("body");
    let record: serde_json::Value = serde_json::from_slice(&body).expect("json");
    let id = record["id"].as_str().expect("id").to_string();

    let updated = admin
        .clone()
        .oneshot(
            Request::put(format!("/api/v1/admin/contacts/{id}/status"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "contacted" }).to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(updated.status(), StatusCode::NO_CONTENT);

    let listed = admin
        .oneshot(
            Request::get("/api/v1/admin/contacts?status=contacted")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(listed.status(), StatusCode::OK);
    let body = axum::body::to_bytes(listed.into_body(), 16 * 1024)
        .await
        .expect("body");
    let rows: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
    assert_eq!(rows[0]["id"], id.as_str());
}
