use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "S3rpent";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_AWS_REGION: &str = "us-west-2";
pub const DEFAULT_UPLOADS_BUCKET: &str = "s3rpent-uploads";
pub const DEFAULT_RESULTS_BUCKET: &str = "s3rpent-results";
pub const DEFAULT_KNOWLEDGE_BASE_ID: &str = "WYB2IFQ7KZ";
pub const DEFAULT_MODEL_ARN: &str =
    "arn:aws:bedrock:us-west-2::foundation-model/cohere.command-r-plus-v1:0";
pub const DEFAULT_STRATEGY_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "https://datathon2025-ashen.vercel.app",
];
/// 50 MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "s3rpent=info,s3rpent_lib=info,tower_http=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBindAddr { value: String, reason: String },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Static AWS credentials supplied through the environment.
///
/// When absent the SDK's default provider chain is used instead.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Process-wide settings, read once at startup.
///
/// Empty service settings (bucket names, knowledge base, model ids) are kept
/// as empty strings; the client layer treats those services as unavailable.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub region: String,
    pub credentials: Option<StaticCredentials>,
    pub uploads_bucket: String,
    pub results_bucket: String,
    pub knowledge_base_id: String,
    pub model_arn: String,
    pub strategy_model_id: String,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to their defaults. A key that is set to an empty
    /// string stays empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| default.to_string())
        };

        let bind_raw = get("S3RPENT_BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let max_raw = get("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string());
        let max_upload_bytes = max_raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidNumber {
                name: "MAX_UPLOAD_BYTES",
                value: max_raw,
            })?;

        let credentials = match (
            lookup("AWS_ACCESS_KEY_ID").filter(|v| !v.trim().is_empty()),
            lookup("AWS_SECRET_ACCESS_KEY").filter(|v| !v.trim().is_empty()),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id: access_key_id.trim().to_string(),
                secret_access_key: secret_access_key.trim().to_string(),
                session_token: lookup("AWS_SESSION_TOKEN")
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            }),
            _ => None,
        };

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            bind_addr,
            region: get("AWS_REGION", DEFAULT_AWS_REGION),
            credentials,
            uploads_bucket: get("S3_UPLOADS_BUCKET", DEFAULT_UPLOADS_BUCKET),
            results_bucket: get("S3_RESULTS_BUCKET", DEFAULT_RESULTS_BUCKET),
            knowledge_base_id: get("KNOWLEDGE_BASE_ID", DEFAULT_KNOWLEDGE_BASE_ID),
            model_arn: get("MODEL_ARN", DEFAULT_MODEL_ARN),
            strategy_model_id: get("STRATEGY_MODEL_ID", DEFAULT_STRATEGY_MODEL_ID),
            allowed_origins,
            max_upload_bytes,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            region: DEFAULT_AWS_REGION.into(),
            credentials: None,
            uploads_bucket: DEFAULT_UPLOADS_BUCKET.into(),
            results_bucket: DEFAULT_RESULTS_BUCKET.into(),
            knowledge_base_id: DEFAULT_KNOWLEDGE_BASE_ID.into(),
            model_arn: DEFAULT_MODEL_ARN.into(),
            strategy_model_id: DEFAULT_STRATEGY_MODEL_ID.into(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// .env file
// ═══════════════════════════════════════════════════════════

/// Outcome of looking for a `.env` file at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    Loaded(PathBuf),
    NotFound,
    Invalid(String),
}

impl EnvFile {
    fn from_result(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => EnvFile::Loaded(path),
            Err(e) if e.not_found() => EnvFile::NotFound,
            Err(e) => EnvFile::Invalid(e.to_string()),
        }
    }
}

/// Load `.env` from the working directory or one of its parents into the
/// process environment. Variables already set are not overridden.
pub fn load_env_file() -> EnvFile {
    EnvFile::from_result(dotenvy::dotenv())
}

/// Load a specific env file. Variables already set are not overridden.
pub fn load_env_file_from(path: &Path) -> EnvFile {
    EnvFile::from_result(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
