use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    /// Key set endpoint; `{issuer}/jwks` unless `AUTH_JWKS_URL` is set
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for attachment bytes
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Bucket holding every attachment blob
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Key prefix under which attachment blobs are written
    pub key_prefix: String,
}

/// Per-call deadlines for the record and blob stores.
///
/// A call exceeding its deadline fails with a retryable 504 instead of hanging the request.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    pub record_timeout: Duration,
    pub blob_timeout: Duration,
}

/// Read `key` from the environment, falling back to `default`, and parse it.
fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        _ => Ok(default),
    }
}

fn required_env(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{} environment variable is required", key))
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            store: StoreConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 12 * 1024 * 1024; // 12MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_env::<u16>("APP_PORT", 8000)?;

        // Comma-separated list, "*" allows any origin
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size =
            parse_env("MAX_REQUEST_BODY_SIZE", Self::DEFAULT_MAX_REQUEST_BODY_SIZE)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let issuer = required_env("AUTH_ISSUER")?;
        let audience = required_env("AUTH_AUDIENCE")?;
        let jwks_url = env::var("AUTH_JWKS_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("{}/jwks", issuer.trim_end_matches('/')));
        let jwks_cache_ttl_secs =
            parse_env("JWKS_CACHE_TTL_SECS", Self::DEFAULT_JWKS_CACHE_TTL_SECS)?;
        let jwt_leeway_secs = parse_env("JWT_LEEWAY_SECS", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        Ok(Self {
            issuer,
            audience,
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Credentials only count when non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Laminar API".to_string());
        let version =
            env::var("SWAGGER_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Aircraft maintenance records API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            endpoint: env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            access_key: env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| "laminar-attachments".to_string()),
            region: env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            key_prefix: env::var("MINIO_KEY_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_else(|_| "attachments".to_string()),
        })
    }
}

impl StoreConfig {
    const DEFAULT_RECORD_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_BLOB_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let record_secs = parse_env(
            "RECORD_STORE_TIMEOUT_SECS",
            Self::DEFAULT_RECORD_TIMEOUT_SECS,
        )?;
        let blob_secs = parse_env("BLOB_STORE_TIMEOUT_SECS", Self::DEFAULT_BLOB_TIMEOUT_SECS)?;
        if record_secs == 0 || blob_secs == 0 {
            return Err("Store timeouts must be greater than zero".to_string());
        }

        Ok(Self {
            record_timeout: Duration::from_secs(record_secs),
            blob_timeout: Duration::from_secs(blob_secs),
        })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            record_timeout: Duration::from_secs(Self::DEFAULT_RECORD_TIMEOUT_SECS),
            blob_timeout: Duration::from_secs(Self::DEFAULT_BLOB_TIMEOUT_SECS),
        }
    }
}
