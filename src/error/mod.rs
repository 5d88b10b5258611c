//! Error taxonomy
//!
//! Every failure a caller can observe is a [`CloudSaveError`]. Each one carries a
//! [`CloudSaveErrorReason`] from a closed set, a numeric code and a human-readable
//! message. Validation, conflict and rate-limit failures carry structured detail
//! on top of that.
//!
//! Raw failures from the transport and endpoint layers are described by
//! [`ApiFailure`] and only become a [`CloudSaveError`] at the [`ApiErrorHandler`]
//! boundary.

use reqwest::header::HeaderMap;
use std::fmt;
use std::time::Duration;

pub mod handler;

pub use handler::ApiErrorHandler;

use crate::access::AccessClassError;
use crate::api::error_body::ErrorBody;
use crate::transport::TransportError;

/// Numeric error codes produced by the client itself
pub mod codes {
    /// No more specific code is known
    pub const UNKNOWN: i32 = 0;
    /// The request never produced a response
    pub const TRANSPORT_ERROR: i32 = 1;
    /// Missing or rejected access token
    pub const INVALID_TOKEN: i32 = 51;
    /// Locally rejected call during a rate-limit window
    pub const TOO_MANY_REQUESTS: i32 = 429;
    /// Generic storage provider failure
    pub const STORAGE_UNKNOWN: i32 = 1000;
    /// Client-side key or stream validation failure
    pub const VALIDATION: i32 = 1004;
    /// Storage provider could not find the object
    pub const STORAGE_NOT_FOUND: i32 = 7007;
    /// Storage provider rejected the write lock precondition
    pub const STORAGE_PRECONDITION_FAILED: i32 = 7012;
}

/// Message used for every validation failure
pub const VALIDATION_MESSAGE: &str =
    "There was a validation error. Check 'Details' for more information.";

/// Message used when no response was received
pub const NO_CONNECTION_MESSAGE: &str = "The request to the Cloud Save service failed - make sure you're connected to an internet connection and try again.";

/// Message used when nothing more specific is known
pub const UNKNOWN_MESSAGE: &str = "An unknown error occurred in the Cloud Save SDK.";

/// Stable classification attached to every error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudSaveErrorReason {
    /// Unclassified failure
    Unknown,
    /// No response from the service
    NoInternetConnection,
    /// No cloud project id is configured
    ProjectIdMissing,
    /// No player is signed in
    PlayerIdMissing,
    /// No access token is available
    AccessTokenMissing,
    /// The request was malformed
    InvalidArgument,
    /// The access token was rejected
    Unauthorized,
    /// The player's key limit is exhausted
    KeyLimitExceeded,
    /// The addressed resource does not exist
    NotFound,
    /// The client is rate limited
    TooManyRequests,
    /// The service is unavailable
    ServiceUnavailable,
    /// A write lock did not match
    Conflict,
}

impl CloudSaveErrorReason {
    /// Reason for an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidArgument,
            401 => Self::Unauthorized,
            403 => Self::KeyLimitExceeded,
            404 => Self::NotFound,
            // storage answers 412 for a stale write lock; same meaning as a data conflict
            409 | 412 => Self::Conflict,
            429 => Self::TooManyRequests,
            500 | 503 => Self::ServiceUnavailable,
            _ => Self::Unknown,
        }
    }

    /// Short label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NoInternetConnection => "no_internet_connection",
            Self::ProjectIdMissing => "project_id_missing",
            Self::PlayerIdMissing => "player_id_missing",
            Self::AccessTokenMissing => "access_token_missing",
            Self::InvalidArgument => "invalid_argument",
            Self::Unauthorized => "unauthorized",
            Self::KeyLimitExceeded => "key_limit_exceeded",
            Self::NotFound => "not_found",
            Self::TooManyRequests => "too_many_requests",
            Self::ServiceUnavailable => "service_unavailable",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for CloudSaveErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actionable message for an HTTP status when the service sent no detail
pub fn generic_message(status: u16) -> &'static str {
    match status {
        400 => "Some of the arguments passed to the Cloud Save request were invalid. Please check the requirements and try again.",
        401 => "Permission denied when making a request to the Cloud Save service. Ensure you are signed in through the Authentication SDK and try again.",
        403 => "Key-value pair limit per user exceeded.",
        404 => "The requested action could not be completed as the specified resource is not found - please make sure it exists, then try again.",
        409 => "WriteLock in one or more data items within request does not match stored WriteLock.",
        412 => "WriteLock in file upload request does not match stored WriteLock.",
        429 => "Too many requests have been sent, so this device has been rate limited. Please try again later.",
        500 | 503 => "Cloud Save service is currently unavailable. Please try again later.",
        _ => UNKNOWN_MESSAGE,
    }
}

/// Reason, code and message shared by every error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Classification
    pub reason: CloudSaveErrorReason,
    /// Service-supplied or client code
    pub code: i32,
    /// Human-readable message
    pub message: String,
}

impl ErrorInfo {
    /// Build from parts
    pub fn new(reason: CloudSaveErrorReason, code: i32, message: impl Into<String>) -> Self {
        Self {
            reason,
            code,
            message: message.into(),
        }
    }
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    /// Field name
    pub field: String,
    /// Problems found with the field
    pub messages: Vec<String>,
    /// Item key, for batch requests
    pub key: Option<String>,
}

/// One item whose write lock did not match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDetail {
    /// Item key
    pub key: String,
    /// Lock the request expected
    pub attempted_write_lock: String,
    /// Lock currently stored
    pub existing_write_lock: String,
}

/// Errors returned by every service operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CloudSaveError {
    /// Failure without structured detail
    #[error("{}", .0.message)]
    Request(ErrorInfo),

    /// One or more fields were rejected
    #[error("{}", .info.message)]
    Validation {
        /// Reason, code and message
        info: ErrorInfo,
        /// Rejected fields
        details: Vec<ValidationDetail>,
    },

    /// One or more write locks did not match
    #[error("{}", .info.message)]
    Conflict {
        /// Reason, code and message
        info: ErrorInfo,
        /// Conflicting items
        details: Vec<ConflictDetail>,
    },

    /// The client is inside a rate-limit window
    #[error("{}", .info.message)]
    RateLimited {
        /// Reason, code and message
        info: ErrorInfo,
        /// Time left in the window
        retry_after: Duration,
    },

    /// The API was called with options it does not support
    #[error(transparent)]
    Usage(#[from] AccessClassError),
}

impl CloudSaveError {
    /// Plain error from parts
    pub fn request(reason: CloudSaveErrorReason, code: i32, message: impl Into<String>) -> Self {
        Self::Request(ErrorInfo::new(reason, code, message))
    }

    /// Client-side validation failure on a single field
    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self::Validation {
            info: ErrorInfo::new(
                CloudSaveErrorReason::InvalidArgument,
                codes::VALIDATION,
                VALIDATION_MESSAGE,
            ),
            details: vec![ValidationDetail {
                field: field.to_string(),
                messages: vec![message.to_string()],
                key: None,
            }],
        }
    }

    /// Shared reason, code and message, absent for usage errors
    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Request(info)
            | Self::Validation { info, .. }
            | Self::Conflict { info, .. }
            | Self::RateLimited { info, .. } => Some(info),
            Self::Usage(_) => None,
        }
    }

    /// Classification; usage errors report `InvalidArgument`
    pub fn reason(&self) -> CloudSaveErrorReason {
        self.info()
            .map(|info| info.reason)
            .unwrap_or(CloudSaveErrorReason::InvalidArgument)
    }

    /// Numeric code
    pub fn code(&self) -> i32 {
        self.info().map(|info| info.code).unwrap_or(codes::UNKNOWN)
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self.info() {
            Some(info) => info.message.clone(),
            None => self.to_string(),
        }
    }

    /// Remaining rate-limit window, for rate-limited errors
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether this is an API misuse rather than a service failure
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Raw failure of one unit of work, before classification
#[derive(Debug)]
pub enum ApiFailure {
    /// No response was received
    Transport(TransportError),
    /// The service answered with a non-success status
    Http {
        /// Status code
        status: u16,
        /// Response headers
        headers: HeaderMap,
        /// Decoded error body
        body: ErrorBody,
    },
    /// A success response could not be decoded
    Deserialization {
        /// Status code
        status: u16,
        /// Decoder message
        message: String,
    },
    /// Already classified; passes through unchanged
    Sdk(CloudSaveError),
    /// Anything else
    Other(String),
}

impl From<CloudSaveError> for ApiFailure {
    fn from(error: CloudSaveError) -> Self {
        ApiFailure::Sdk(error)
    }
}

impl From<TransportError> for ApiFailure {
    fn from(error: TransportError) -> Self {
        ApiFailure::Transport(error)
    }
}

impl From<AccessClassError> for ApiFailure {
    fn from(error: AccessClassError) -> Self {
        ApiFailure::Sdk(CloudSaveError::Usage(error))
    }
}
