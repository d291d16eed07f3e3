/**
 * Server Configuration
 *
 * This module loads and validates server configuration from environment
 * variables, including the JWT settings, the public endpoint rules and the
 * optional PostgreSQL database connection.
 *
 * # Configuration Sources
 *
 * Values are read through a lookup function. `AppConfig::from_env` uses the
 * process environment (after loading `.env`); tests pass a map instead.
 *
 * # Error Handling
 *
 * Invalid security configuration aborts startup. A missing or unreachable
 * database does not: the server falls back to in-memory stores.
 */

use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::PgPool;
use thiserror::Error;

use crate::backend::auth::public_endpoints::PublicEndpoints;

pub const ENV_JWT_SECRET: &str = "KRAWL_SECURITY_JWT_SECRET";
pub const ENV_JWT_EXPIRATION_MS: &str = "KRAWL_SECURITY_JWT_EXPIRATION_MS";
pub const ENV_JWT_REFRESH_EXPIRATION_MS: &str = "KRAWL_SECURITY_JWT_REFRESH_EXPIRATION_MS";
pub const ENV_JWT_CLOCK_SKEW_SECONDS: &str = "KRAWL_SECURITY_JWT_CLOCK_SKEW_SECONDS";
pub const ENV_PUBLIC_ENDPOINTS_FILE: &str = "KRAWL_PUBLIC_ENDPOINTS_FILE";
pub const ENV_REVOCATION_SWEEP_SECONDS: &str = "KRAWL_REVOCATION_SWEEP_SECONDS";
pub const ENV_CORS_ALLOWED_ORIGINS: &str = "KRAWL_CORS_ALLOWED_ORIGINS";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SERVER_PORT: &str = "SERVER_PORT";

/// Minimum HMAC secret length in bytes (256 bits for HS256)
pub const MIN_SECRET_LENGTH: usize = 32;

const DEFAULT_ACCESS_TTL: Duration = Duration::from_millis(86_400_000);
const DEFAULT_REFRESH_TTL: Duration = Duration::from_millis(2_592_000_000);
const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(86_400);
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_CORS_MAX_AGE: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingValue(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("JWT secret must be at least 32 bytes, got {0}")]
    WeakSecret(usize),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("invalid public endpoint rule: {0}")]
    InvalidEndpoint(String),
    #[error("failed to parse public endpoint rules: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// JWT signing and lifetime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Leeway applied to `exp` during validation
    pub clock_skew: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            clock_skew: DEFAULT_CLOCK_SKEW,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingValue(ENV_JWT_SECRET));
        }
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::WeakSecret(self.secret.len()));
        }
        if self.access_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration(ENV_JWT_EXPIRATION_MS));
        }
        if self.refresh_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration(ENV_JWT_REFRESH_EXPIRATION_MS));
        }
        Ok(())
    }
}

/// Cross-origin settings
///
/// Credentials are allowed, so every origin must be listed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    /// How long browsers may cache a preflight response
    pub max_age: Duration,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            max_age: DEFAULT_CORS_MAX_AGE,
        }
    }
}

impl CorsConfig {
    /// Parse a comma-separated origin list
    pub fn from_origin_list(list: &str) -> Result<Self, ConfigError> {
        let allowed_origins = list
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        let config = Self {
            allowed_origins,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for origin in &self.allowed_origins {
            if origin == "*" || HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::InvalidValue {
                    name: ENV_CORS_ALLOWED_ORIGINS,
                    value: origin.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn origin_headers(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect()
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    /// `None` runs the server on in-memory stores
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub public_endpoints: PublicEndpoints,
    pub cors: CorsConfig,
    pub revocation_sweep_interval: Duration,
}

impl AppConfig {
    pub fn builder(secret: impl Into<String>) -> AppConfigBuilder {
        AppConfigBuilder::new(secret)
    }

    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let secret = var(ENV_JWT_SECRET).ok_or(ConfigError::MissingValue(ENV_JWT_SECRET))?;
        let mut builder = Self::builder(secret);

        if let Some(ms) = var(ENV_JWT_EXPIRATION_MS) {
            builder = builder.access_ttl(Duration::from_millis(parse(ENV_JWT_EXPIRATION_MS, &ms)?));
        }
        if let Some(ms) = var(ENV_JWT_REFRESH_EXPIRATION_MS) {
            builder = builder.refresh_ttl(Duration::from_millis(parse(ENV_JWT_REFRESH_EXPIRATION_MS, &ms)?));
        }
        if let Some(secs) = var(ENV_JWT_CLOCK_SKEW_SECONDS) {
            builder = builder.clock_skew(Duration::from_secs(parse(ENV_JWT_CLOCK_SKEW_SECONDS, &secs)?));
        }
        if let Some(secs) = var(ENV_REVOCATION_SWEEP_SECONDS) {
            builder = builder.revocation_sweep_interval(Duration::from_secs(parse(
                ENV_REVOCATION_SWEEP_SECONDS,
                &secs,
            )?));
        }
        if let Some(port) = var(ENV_SERVER_PORT) {
            builder = builder.server_port(parse(ENV_SERVER_PORT, &port)?);
        }
        if let Some(url) = var(ENV_DATABASE_URL) {
            builder = builder.database_url(url);
        }
        if let Some(origins) = var(ENV_CORS_ALLOWED_ORIGINS) {
            builder = builder.cors(CorsConfig::from_origin_list(&origins)?);
        }
        if let Some(path) = var(ENV_PUBLIC_ENDPOINTS_FILE) {
            builder = builder.public_endpoints(load_public_endpoints(PathBuf::from(path))?);
        }

        builder.build()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        self.cors.validate()?;
        if self.revocation_sweep_interval.is_zero() {
            return Err(ConfigError::ZeroDuration(ENV_REVOCATION_SWEEP_SECONDS));
        }
        Ok(())
    }
}

/// Builder for [`AppConfig`], starting from the defaults
#[derive(Debug, Clone)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    fn new(secret: impl Into<String>) -> Self {
        Self {
            config: AppConfig {
                server_port: DEFAULT_SERVER_PORT,
                database_url: None,
                jwt: JwtConfig::new(secret),
                public_endpoints: PublicEndpoints::default(),
                cors: CorsConfig::default(),
                revocation_sweep_interval: DEFAULT_SWEEP_INTERVAL,
            },
        }
    }

    pub fn server_port(mut self, port: u16) -> Self {
        self.config.server_port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn access_ttl(mut self, ttl: Duration) -> Self {
        self.config.jwt.access_ttl = ttl;
        self
    }

    pub fn refresh_ttl(mut self, ttl: Duration) -> Self {
        self.config.jwt.refresh_ttl = ttl;
        self
    }

    pub fn clock_skew(mut self, skew: Duration) -> Self {
        self.config.jwt.clock_skew = skew;
        self
    }

    pub fn public_endpoints(mut self, endpoints: PublicEndpoints) -> Self {
        self.config.public_endpoints = endpoints;
        self
    }

    pub fn cors(mut self, cors: CorsConfig) -> Self {
        self.config.cors = cors;
        self
    }

    pub fn revocation_sweep_interval(mut self, interval: Duration) -> Self {
        self.config.revocation_sweep_interval = interval;
        self
    }

    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

fn load_public_endpoints(path: PathBuf) -> Result<PublicEndpoints, ConfigError> {
    let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let endpoints = PublicEndpoints::from_toml_str(&source)?;
    tracing::info!("Loaded {} public endpoint rules from {}", endpoints.len(), path.display());
    Ok(endpoints)
}

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if no URL is configured or the connection fails
///
/// Migration failures are logged; the pool is still returned since the
/// schema may already be current.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!(
            "{} not set. Using in-memory identity and revocation stores; no user can authenticate in this mode.",
            ENV_DATABASE_URL
        );
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!(
                "Falling back to in-memory identity and revocation stores; no user can authenticate in this mode."
            );
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(()) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
