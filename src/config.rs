//! Client configuration constants and environment loading

use reqwest::Url;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Maximum number of items sent in one save request.
/// The service rejects larger batches, so bigger saves are split sequentially.
pub const SAVE_BATCH_SIZE: usize = 20;

/// Rate-limit window applied when a `429` carries no usable retry header.
pub const FALLBACK_BACKOFF: Duration = Duration::from_secs(10);

/// HTTP connect timeout (seconds) - time to establish TCP connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds) - overall time for the entire request
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum length of a file key
pub const FILE_KEY_MAX_LENGTH: usize = 255;

/// File keys start with an alphanumeric, dash or underscore; later characters may also be periods
pub const FILE_KEY_PATTERN: &str = r"^[A-Za-z0-9_-][A-Za-z0-9_.-]{0,254}$";

/// Content type sent for every file upload
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Production service host
pub const PRODUCTION_BASE_URL: &str = "https://cloud-save.services.api.unity.com";

/// Staging service host
pub const STAGING_BASE_URL: &str = "https://cloud-save-stg.services.api.unity.com";

/// Environment variable names read by [`CloudSaveConfig::from_env`]
pub mod env {
    /// `production` or `staging`
    pub const ENVIRONMENT: &str = "CLOUD_SAVE_ENVIRONMENT";
    /// Full base URL, overrides the environment host
    pub const BASE_URL: &str = "CLOUD_SAVE_BASE_URL";
    /// Cloud project id
    pub const PROJECT_ID: &str = "CLOUD_SAVE_PROJECT_ID";
    /// Signed-in player id
    pub const PLAYER_ID: &str = "CLOUD_SAVE_PLAYER_ID";
    /// Bearer access token
    pub const ACCESS_TOKEN: &str = "CLOUD_SAVE_ACCESS_TOKEN";
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unknown environment name
    #[error("invalid environment: {0}. Valid options: production, staging")]
    InvalidEnvironment(String),

    /// Base URL could not be parsed
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending value
        url: String,
        /// Parser message
        reason: String,
    },
}

/// Service deployment the client talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// Live service
    #[default]
    Production,
    /// Staging service
    Staging,
}

impl Environment {
    /// Host for this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Staging => STAGING_BASE_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "staging" | "stg" => Ok(Environment::Staging),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Staging => write!(f, "staging"),
        }
    }
}

/// Everything needed to build a [`crate::CloudSaveService`]
///
/// Identity values are optional here on purpose: a missing project id, player id
/// or access token is reported per call as a precondition failure rather than at
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct CloudSaveConfig {
    /// Target environment
    pub environment: Environment,
    /// Explicit base URL, takes precedence over `environment`
    pub base_url: Option<String>,
    /// Cloud project id
    pub project_id: Option<String>,
    /// Signed-in player id
    pub player_id: Option<String>,
    /// Bearer access token
    pub access_token: Option<String>,
}

impl CloudSaveConfig {
    /// Load configuration from `CLOUD_SAVE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match read_env(env::ENVIRONMENT) {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        Ok(Self {
            environment,
            base_url: read_env(env::BASE_URL),
            project_id: read_env(env::PROJECT_ID),
            player_id: read_env(env::PLAYER_ID),
            access_token: read_env(env::ACCESS_TOKEN),
        })
    }

    /// Resolved service base URL
    pub fn resolve_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url());

        Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
