//! Configuration module
//!
//! Environment-driven configuration for the authorizer and upload surfaces:
//! server settings, identity-provider key-set, storage backend and upload policy.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CDN_BASE_URL, DEFAULT_JWKS_URL, DEFAULT_RESIZE_QUALITY, MAX_UPLOAD_BYTES,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const JWKS_CACHE_TTL_SECS: u64 = 3600;
const JWKS_FETCH_TIMEOUT_SECS: u64 = 10;
const RESIZE_TIMEOUT_SECS: u64 = 30;
const STORAGE_TIMEOUT_SECS: u64 = 30;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    /// `json` or `pretty`
    pub log_format: String,
}

/// Identity-provider and token validation settings
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwks_url: String,
    /// `None` means keys never expire by age and are only refreshed on a miss.
    pub jwks_cache_ttl: Option<Duration>,
    pub jwks_fetch_timeout: Duration,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

/// Storage backend settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
}

/// Upload surface settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub cdn_base_url: String,
    pub max_upload_bytes: usize,
    pub default_quality: u8,
    pub resize_timeout: Duration,
    pub storage_timeout: Duration,
    pub require_auth: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let base = BaseConfig {
            server_port: var("SERVER_PORT")
                .or_else(|| var("PORT"))
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            environment,
            log_format: var("LOG_FORMAT")
                .unwrap_or_else(|| "pretty".to_string())
                .to_lowercase(),
        };

        let cache_ttl_secs: u64 = var("JWKS_CACHE_TTL_SECS")
            .unwrap_or_else(|| JWKS_CACHE_TTL_SECS.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("JWKS_CACHE_TTL_SECS must be a whole number of seconds"))?;

        let auth = AuthConfig {
            jwks_url: var("JWKS_URL").unwrap_or_else(|| DEFAULT_JWKS_URL.to_string()),
            jwks_cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
            jwks_fetch_timeout: Duration::from_secs(
                var("JWKS_FETCH_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(JWKS_FETCH_TIMEOUT_SECS),
            ),
            issuer: var("JWT_ISSUER"),
            audience: var("JWT_AUDIENCE"),
            leeway_seconds: var("JWT_LEEWAY_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        };

        let backend = match var("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: var("S3_BUCKET").or_else(|| var("Bucket")),
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
        };

        let upload = UploadConfig {
            cdn_base_url: var("CDN_BASE_URL").unwrap_or_else(|| DEFAULT_CDN_BASE_URL.to_string()),
            max_upload_bytes: var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|| MAX_UPLOAD_BYTES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a valid number"))?,
            default_quality: var("DEFAULT_RESIZE_QUALITY")
                .unwrap_or_else(|| DEFAULT_RESIZE_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DEFAULT_RESIZE_QUALITY must be between 1 and 100"))?,
            resize_timeout: Duration::from_secs(
                var("RESIZE_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(RESIZE_TIMEOUT_SECS),
            ),
            storage_timeout: Duration::from_secs(
                var("STORAGE_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(STORAGE_TIMEOUT_SECS),
            ),
            require_auth: var("UPLOAD_REQUIRE_AUTH")
                .unwrap_or_else(|| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
        };

        let config = Config {
            base,
            auth,
            storage,
            upload,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be non-zero"));
        }

        if !is_http_url(&self.auth.jwks_url) {
            return Err(anyhow::anyhow!("JWKS_URL must be an http(s) URL"));
        }

        if !is_http_url(&self.upload.cdn_base_url) {
            return Err(anyhow::anyhow!("CDN_BASE_URL must be an http(s) URL"));
        }

        if self.upload.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_BYTES must be greater than zero"));
        }

        if !(1..=100).contains(&self.upload.default_quality) {
            return Err(anyhow::anyhow!(
                "DEFAULT_RESIZE_QUALITY must be between 1 and 100"
            ));
        }

        for (name, timeout) in [
            ("JWKS_FETCH_TIMEOUT_SECS", self.auth.jwks_fetch_timeout),
            ("RESIZE_TIMEOUT_SECS", self.upload.resize_timeout),
            ("STORAGE_TIMEOUT_SECS", self.upload.storage_timeout),
        ] {
            if timeout.is_zero() {
                return Err(anyhow::anyhow!("{} must be greater than zero", name));
            }
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn log_json(&self) -> bool {
        self.base.log_format == "json"
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
