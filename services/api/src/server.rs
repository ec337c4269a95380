use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_casting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use casting::artists::ArtistRepository;
use casting::auth::AdminGuard;
use casting::backend::{InMemoryBackend, ObjectStorage, RestBackend};
use casting::config::{AppConfig, BackendKind, ConfigError};
use casting::contacts::ContactRepository;
use casting::error::AppError;
use casting::submissions::SubmissionRepository;
use casting::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(kind) = args.backend.take() {
        config.backend.kind = kind;
        config.backend.validate()?;
    }

    telemetry::init(&config.telemetry)?;

    let guard = AdminGuard::from_config(&config.auth);
    if guard.is_open() {
        warn!("APP_JWT_SECRET is not set; admin routes accept unauthenticated requests");
    }

    match config.backend.kind {
        BackendKind::Memory => {
            info!("using in-memory backend; data is lost on restart");
            serve(config, guard, Arc::new(InMemoryBackend::default())).await
        }
        BackendKind::Rest => {
            let url = config
                .backend
                .url
                .as_deref()
                .ok_or(ConfigError::MissingBackendSetting("APP_BACKEND_URL"))?;
            let api_key = config
                .backend
                .api_key
                .as_deref()
                .ok_or(ConfigError::MissingBackendSetting("APP_BACKEND_KEY"))?;
            let backend = RestBackend::new(
                url,
                api_key,
                &config.backend.bucket,
                config.backend.timeout,
            );
            info!(%url, bucket = %config.backend.bucket, "using REST backend");
            serve(config, guard, Arc::new(backend)).await
        }
    }
}

async fn serve<B>(config: AppConfig, guard: AdminGuard, backend: Arc<B>) -> Result<(), AppError>
where
    B: SubmissionRepository + ArtistRepository + ContactRepository + ObjectStorage + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_casting_routes(backend, guard)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "casting back-office ready");

    axum::serve(listener, app).await?;
    Ok(())
}
