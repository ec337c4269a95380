//! Bearer-token check for the admin API.
//!
//! Tokens are issued by the hosted auth provider and signed with its shared
//! HS256 secret. Admins carry `app_metadata.role = "admin"`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::http::error_response;

const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

/// Claims read from provider access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

/// Caller admitted to the admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub subject: String,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("authorization header must use the Bearer scheme")]
    MalformedHeader,
    #[error("invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
    #[error("admin role required")]
    NotAdmin,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::NotAdmin => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

struct Verifier {
    key: DecodingKey,
    validation: Validation,
}

/// Verifies admin bearer tokens; with no secret configured every caller is let through.
#[derive(Clone)]
pub struct AdminGuard {
    verifier: Option<Arc<Verifier>>,
}

impl AdminGuard {
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        Self {
            verifier: Some(Arc::new(Verifier {
                key: DecodingKey::from_secret(secret.as_bytes()),
                validation,
            })),
        }
    }

    pub fn open() -> Self {
        Self { verifier: None }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        match &config.jwt_secret {
            Some(secret) => Self::new(secret, &config.audience),
            None => Self::open(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.verifier.is_none()
    }

    /// Check an `Authorization` header value.
    ///
    /// Returns `Ok(None)` when the guard is open.
    pub fn authorize(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<AdminIdentity>, AuthError> {
        let Some(verifier) = &self.verifier else {
            return Ok(None);
        };

        let value = authorization.ok_or(AuthError::MissingToken)?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MalformedHeader)?;

        let claims = decode::<Claims>(token, &verifier.key, &verifier.validation)
            .map_err(AuthError::InvalidToken)?
            .claims;

        if claims.app_metadata.role.as_deref() != Some(ADMIN_ROLE) {
            return Err(AuthError::NotAdmin);
        }

        Ok(Some(AdminIdentity {
            subject: claims.sub,
            email: claims.email,
        }))
    }
}

/// Route layer for admin routers: `middleware::from_fn_with_state(guard, require_admin)`.
pub async fn require_admin(
    State(guard): State<AdminGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match guard.authorize(authorization) {
        Ok(identity) => {
            if let Some(identity) = identity {
                tracing::debug!(
                    subject = %identity.subject,
                    path = %request.uri().path(),
                    "admin request"
                );
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        Err(error) => {
            tracing::warn!(%error, path = %request.uri().path(), "admin request refused");
            error_response(error.status(), error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn token(role: Option<&str>, audience: &str, expires_in: Duration) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            exp: (Utc::now() + expires_in).timestamp(),
            aud: audience.to_string(),
            email: Some("admin@7produtora.com.br".to_string()),
            app_metadata: AppMetadata {
                role: role.map(str::to_string),
            },
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("token encodes")
    }

    fn bearer(token: String) -> String {
        format!("Bearer {token}")
    }

    fn guard() -> AdminGuard {
        AdminGuard::new(SECRET, "authenticated")
    }

    #[test]
    fn admits_admin_tokens() {
        let bearer = bearer(token(Some("admin"), "authenticated", Duration::hours(1)));
        let identity = guard()
            .authorize(Some(&bearer))
            .expect("authorized")
            .expect("identity");
        assert_eq!(identity.subject, "user-1");
    }

    #[test]
    fn refuses_missing_malformed_and_non_admin_tokens() {
        let guard = guard();
        assert!(matches!(guard.authorize(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            guard.authorize(Some("Basic abc")),
            Err(AuthError::MalformedHeader)
        ));

        let member = bearer(token(None, "authenticated", Duration::hours(1)));
        let refused = guard.authorize(Some(&member)).unwrap_err();
        assert!(matches!(refused, AuthError::NotAdmin));
        assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn refuses_expired_or_foreign_audience_tokens() {
        let guard = guard();
        let expired = bearer(token(Some("admin"), "authenticated", Duration::hours(-2)));
        assert!(matches!(
            guard.authorize(Some(&expired)),
            Err(AuthError::InvalidToken(_))
        ));

        let foreign = bearer(token(Some("admin"), "other-app", Duration::hours(1)));
        assert!(matches!(
            guard.authorize(Some(&foreign)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn open_guard_admits_everyone() {
        let guard = AdminGuard::from_config(&AuthConfig {
            jwt_secret: None,
            audience: "authenticated".to_string(),
        });
        assert!(guard.is_open());
        assert_eq!(guard.authorize(None).expect("open"), None);
    }

    #[tokio::test]
    async fn middleware_blocks_anonymous_requests() {
        let router = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(guard(), require_admin));

        let anonymous = router
            .clone()
            .oneshot(
                axum::http::Request::get("/admin")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let admin = router
            .oneshot(
                axum::http::Request::get("/admin")
                    .header(
                        header::AUTHORIZATION,
                        bearer(token(Some("admin"), "authenticated", Duration::hours(1))),
                    )
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(admin.status(), StatusCode::OK);
    }
}
