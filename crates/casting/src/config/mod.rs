use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BUCKET: &str = "artist-images";
const DEFAULT_AUDIENCE: &str = "authenticated";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub backend: BackendConfig,
    pub auth: AuthConfig,
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let kind = env::var("APP_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse::<BackendKind>()?;
        let timeout_secs = match optional_var("APP_BACKEND_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let backend = BackendConfig {
            kind,
            url: optional_var("APP_BACKEND_URL"),
            api_key: optional_var("APP_BACKEND_KEY"),
            bucket: optional_var("APP_STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };
        backend.validate()?;

        let auth = AuthConfig {
            jwt_secret: optional_var("APP_JWT_SECRET"),
            audience: optional_var("APP_JWT_AUDIENCE")
                .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
        };
        if environment == AppEnvironment::Production && auth.jwt_secret.is_none() {
            return Err(ConfigError::MissingJwtSecret);
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            backend,
            auth,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which data store adapter the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Rest,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "rest" | "supabase" | "postgrest" => Ok(Self::Rest),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

/// Hosted data/storage connection settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub bucket: String,
    pub timeout: Duration,
}

impl BackendConfig {
    /// The REST adapter needs both a base URL and a service key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind == BackendKind::Rest {
            if self.url.is_none() {
                return Err(ConfigError::MissingBackendSetting("APP_BACKEND_URL"));
            }
            if self.api_key.is_none() {
                return Err(ConfigError::MissingBackendSetting("APP_BACKEND_KEY"));
            }
        }
        Ok(())
    }
}

/// Admin token verification settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub audience: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBackend(String),
    MissingBackendSetting(&'static str),
    InvalidTimeout(String),
    MissingJwtSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBackend(value) => {
                write!(f, "APP_BACKEND must be 'memory' or 'rest' (found '{value}')")
            }
            ConfigError::MissingBackendSetting(key) => {
                write!(f, "{key} is required when APP_BACKEND=rest")
            }
            ConfigError::InvalidTimeout(value) => write!(
                f,
                "APP_BACKEND_TIMEOUT_SECS must be a positive integer (found '{value}')"
            ),
            ConfigError::MissingJwtSecret => {
                write!(f, "APP_JWT_SECRET is required in production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBackend(_)
            | ConfigError::MissingBackendSetting(_)
            | ConfigError::InvalidTimeout(_)
            | ConfigError::MissingJwtSecret => None,
        }
    }
}
