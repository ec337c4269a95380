use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Extension, Json, Router};
use casting::artists::{
    artist_admin_router, casting_router, ArtistAdmin, ArtistRepository, CastingCatalog,
};
use casting::auth::{require_admin, AdminGuard};
use casting::backend::ObjectStorage;
use casting::contacts::{contact_admin_router, contact_router, ContactDesk, ContactRepository};
use casting::dashboard::{dashboard_router, Dashboard};
use casting::submissions::{
    intake_router, moderation_router, ModerationService, SubmissionIntake, SubmissionRepository,
};
use serde_json::json;
use std::sync::Arc;

/// Public pages, admin API behind the bearer guard, and the operational probes.
pub(crate) fn with_casting_routes<B>(backend: Arc<B>, guard: AdminGuard) -> Router
where
    B: SubmissionRepository + ArtistRepository + ContactRepository + ObjectStorage + 'static,
{
    let intake = Arc::new(SubmissionIntake::new(backend.clone(), backend.clone()));
    let moderation = Arc::new(ModerationService::new(backend.clone(), backend.clone()));
    let catalog = Arc::new(CastingCatalog::new(backend.clone()));
    let artist_admin = Arc::new(ArtistAdmin::new(backend.clone(), backend.clone()));
    let contacts = Arc::new(ContactDesk::new(backend.clone()));
    let dashboard = Arc::new(Dashboard::new(backend.clone(), backend.clone(), backend));

    let admin = moderation_router(moderation)
        .merge(artist_admin_router(artist_admin))
        .merge(contact_admin_router(contacts.clone()))
        .merge(dashboard_router(dashboard))
        .route_layer(middleware::from_fn_with_state(guard, require_admin));

    intake_router(intake)
        .merge(casting_router(catalog))
        .merge(contact_router(contacts))
        .merge(admin)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use casting::artists::Category;
    use casting::auth::{AppMetadata, Claims};
    use casting::backend::InMemoryBackend;
    use casting::submissions::SubmissionForm;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const SECRET: &str = "route-test-secret";

    fn app(ready: bool) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_casting_routes(
            Arc::new(InMemoryBackend::default()),
            AdminGuard::new(SECRET, "authenticated"),
        )
        .layer(Extension(state))
    }

    fn admin_token(role: &str) -> String {
        let claims = Claims {
            sub: "admin-1".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            aud: "authenticated".to_string(),
            email: Some("admin@7produtora.com.br".to_string()),
            app_metadata: AppMetadata {
                role: Some(role.to_string()),
            },
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("token encodes");
        format!("Bearer {token}")
    }

    fn form() -> SubmissionForm {
        SubmissionForm {
            name: "Ana Clara".to_string(),
            email: "ana.clara@example.com".to_string(),
            phone: "11987654321".to_string(),
            bio: "Cantora de MPB com repertório autoral e agenda em casas de show de Campinas."
                .to_string(),
            profile_image: "https://cdn.example.com/artist-images/submissions/ana.jpg".to_string(),
            category: Category::Cantor,
            city: "Campinas".to_string(),
            state: "SP".to_string(),
            experience_years: Some(8),
            genres: vec!["MPB".to_string()],
            instagram: None,
            youtube: None,
            spotify: None,
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn probes_report_health_and_readiness() {
        let router = app(false);

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(health.status(), StatusCode::OK);

        let ready = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(ready).await["status"], "initializing");
    }

    #[tokio::test]
    async fn admin_routes_require_an_admin_token() {
        let router = app(true);

        let anonymous = router
            .clone()
            .oneshot(
                Request::get("/api/v1/admin/dashboard")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let member = router
            .clone()
            .oneshot(
                Request::get("/api/v1/admin/dashboard")
                    .header(header::AUTHORIZATION, admin_token("member"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(member.status(), StatusCode::FORBIDDEN);

        let public = router
            .oneshot(
                Request::get("/api/v1/casting")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(public.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn submission_flows_from_intake_to_public_profile() {
        let router = app(true);
        let payload = serde_json::to_string(&form()).expect("form json");

        let submitted = router
            .clone()
            .oneshot(
                Request::post("/api/v1/submissions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(submitted.status(), StatusCode::ACCEPTED);
        let id = json_body(submitted).await["id"]
            .as_str()
            .expect("submission id")
            .to_string();

        let approved = router
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/admin/submissions/{id}/approve"))
                    .header(header::AUTHORIZATION, admin_token("admin"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(approved.status(), StatusCode::CREATED);
        assert_eq!(json_body(approved).await["slug"], "ana-clara");

        let profile = router
            .clone()
            .oneshot(
                Request::get("/api/v1/casting/ana-clara")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(profile.status(), StatusCode::OK);
        assert_eq!(json_body(profile).await["genres"][0], "MPB");

        let dashboard = router
            .oneshot(
                Request::get("/api/v1/admin/dashboard")
                    .header(header::AUTHORIZATION, admin_token("admin"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(dashboard.status(), StatusCode::OK);
        let snapshot = json_body(dashboard).await;
        assert_eq!(snapshot["artists"]["visible"], 1);
        assert_eq!(snapshot["pending"]["submissions"], 0);
    }
}
