//! Classification boundary for every service call
//!
//! [`ApiErrorHandler::run`] wraps one unit of work. While the rate limiter has a
//! window open the work is not started at all. Otherwise any [`ApiFailure`] the
//! work returns is turned into exactly one [`CloudSaveError`].

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    codes, generic_message, ApiFailure, CloudSaveError, CloudSaveErrorReason, ConflictDetail,
    ErrorInfo, ValidationDetail, NO_CONNECTION_MESSAGE, UNKNOWN_MESSAGE, VALIDATION_MESSAGE,
};
use crate::api::error_body::{BasicErrorBody, ErrorBody, ValidationErrorBody};
use crate::metrics;
use crate::rate_limit::{RateLimiter, TOO_MANY_REQUESTS};

/// Runs service calls and classifies their failures
#[derive(Debug)]
pub struct ApiErrorHandler {
    rate_limiter: Arc<RateLimiter>,
    /// Last rate-limit error handed out, reused with a refreshed `retry_after`
    cached_rate_limit: Mutex<Option<CloudSaveError>>,
}

impl ApiErrorHandler {
    /// Handler sharing `rate_limiter`
    pub fn new(rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            rate_limiter,
            cached_rate_limit: Mutex::new(None),
        }
    }

    /// The limiter this handler drives
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Run `operation` unless rate limited, classifying any failure
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, CloudSaveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        if self.rate_limiter.is_rate_limited() {
            metrics::record_preempted();
            let error = self.rate_limit_error();
            debug!(
                retry_after_ms = error.retry_after().unwrap_or_default().as_millis(),
                "Call rejected locally while rate limited"
            );
            return Err(error);
        }

        operation().await.map_err(|failure| {
            let error = self.classify(failure);
            metrics::record_failure(error.reason());
            warn!(reason = %error.reason(), code = error.code(), "{}", error);
            error
        })
    }

    /// Rate-limit error for a call rejected inside the window
    pub fn rate_limit_error(&self) -> CloudSaveError {
        let retry_after = self.rate_limiter.retry_after();
        let mut cached = self.cached_rate_limit.lock();
        let error = cached.get_or_insert_with(|| CloudSaveError::RateLimited {
            info: ErrorInfo::new(
                CloudSaveErrorReason::TooManyRequests,
                codes::TOO_MANY_REQUESTS,
                generic_message(TOO_MANY_REQUESTS),
            ),
            retry_after,
        });
        if let CloudSaveError::RateLimited {
            retry_after: stored,
            ..
        } = error
        {
            *stored = retry_after;
        }
        error.clone()
    }

    /// Turn a raw failure into exactly one typed error
    ///
    /// Already-typed errors come back unchanged.
    pub fn classify(&self, failure: ApiFailure) -> CloudSaveError {
        match failure {
            ApiFailure::Sdk(error) => error,
            ApiFailure::Transport(e) => {
                debug!("Transport failure: {}", e);
                CloudSaveError::request(
                    CloudSaveErrorReason::NoInternetConnection,
                    codes::TRANSPORT_ERROR,
                    NO_CONNECTION_MESSAGE,
                )
            }
            ApiFailure::Http {
                status,
                headers,
                body,
            } => self.classify_http(status, &headers, body),
            ApiFailure::Deserialization { status, message } => {
                debug!(status, "Response could not be decoded: {}", message);
                CloudSaveError::request(
                    CloudSaveErrorReason::from_status(status),
                    codes::UNKNOWN,
                    generic_message(status),
                )
            }
            ApiFailure::Other(message) => {
                debug!("Unclassified failure: {}", message);
                CloudSaveError::request(
                    CloudSaveErrorReason::Unknown,
                    codes::UNKNOWN,
                    UNKNOWN_MESSAGE,
                )
            }
        }
    }

    fn classify_http(&self, status: u16, headers: &HeaderMap, body: ErrorBody) -> CloudSaveError {
        let reason = CloudSaveErrorReason::from_status(status);

        match body {
            ErrorBody::Basic(basic) => self.classify_basic(status, headers, basic),
            // a throttled response must still open the window even without a readable body
            ErrorBody::Unparsed(_) if status == TOO_MANY_REQUESTS => {
                self.classify_basic(status, headers, BasicErrorBody::default())
            }
            ErrorBody::Unparsed(_) => {
                CloudSaveError::request(reason, codes::UNKNOWN, generic_message(status))
            }
            ErrorBody::Validation(body) | ErrorBody::BatchValidation(body) => {
                validation_error(reason, body)
            }
            ErrorBody::DeleteConflict(body) => CloudSaveError::Conflict {
                info: ErrorInfo::new(reason, body.code, detail_or_generic(body.detail, status)),
                details: vec![ConflictDetail {
                    key: body.data.key,
                    attempted_write_lock: body.data.attempted_write_lock,
                    existing_write_lock: body.data.existing_write_lock,
                }],
            },
            ErrorBody::BatchConflict(body) => CloudSaveError::Conflict {
                info: ErrorInfo::new(reason, body.code, detail_or_generic(body.detail, status)),
                details: body
                    .data
                    .into_iter()
                    .map(|entry| ConflictDetail {
                        key: entry.attempted.key,
                        attempted_write_lock: entry.attempted.write_lock,
                        existing_write_lock: entry.existing.write_lock,
                    })
                    .collect(),
            },
            ErrorBody::Storage(body) => {
                debug!(
                    status,
                    provider_code = %body.code,
                    "Storage provider rejected the request: {}",
                    body.message
                );
                CloudSaveError::request(reason, storage_code(status), generic_message(status))
            }
        }
    }

    fn classify_basic(
        &self,
        status: u16,
        headers: &HeaderMap,
        body: BasicErrorBody,
    ) -> CloudSaveError {
        let reason = CloudSaveErrorReason::from_status(status);
        let message = detail_or_generic(body.detail, status);

        if self.rate_limiter.is_rate_limit_condition(status) {
            self.rate_limiter.record_rate_limit(headers);
            let error = CloudSaveError::RateLimited {
                info: ErrorInfo::new(reason, body.code, message),
                retry_after: self.rate_limiter.retry_after(),
            };
            *self.cached_rate_limit.lock() = Some(error.clone());
            return error;
        }

        CloudSaveError::request(reason, body.code, message)
    }
}

fn detail_or_generic(detail: Option<String>, status: u16) -> String {
    detail
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| generic_message(status).to_string())
}

fn validation_error(reason: CloudSaveErrorReason, body: ValidationErrorBody) -> CloudSaveError {
    CloudSaveError::Validation {
        info: ErrorInfo::new(reason, body.code, VALIDATION_MESSAGE),
        details: body
            .errors
            .into_iter()
            .map(|e| ValidationDetail {
                field: e.field,
                messages: e.messages,
                key: e.key,
            })
            .collect(),
    }
}

fn storage_code(status: u16) -> i32 {
    match status {
        404 => codes::STORAGE_NOT_FOUND,
        412 => codes::STORAGE_PRECONDITION_FAILED,
        _ => codes::STORAGE_UNKNOWN,
    }
}
