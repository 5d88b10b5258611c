//! Unit tests for failure classification at the service boundary

use cloud_save_client::api::error_body::{ErrorBody, ResponseOrigin};
use cloud_save_client::error::{
    codes, generic_message, ApiErrorHandler, ApiFailure, CloudSaveError, CloudSaveErrorReason,
    ConflictDetail, ErrorInfo, NO_CONNECTION_MESSAGE,
};
use cloud_save_client::rate_limit::{ManualClock, RateLimiter};
use cloud_save_client::transport::TransportError;
use reqwest::header::HeaderMap;
use std::sync::Arc;

fn handler() -> ApiErrorHandler {
    ApiErrorHandler::new(Arc::new(RateLimiter::with_clock(Arc::new(ManualClock::new()))))
}

fn http(status: u16, origin: ResponseOrigin, body: &str) -> ApiFailure {
    ApiFailure::Http {
        status,
        headers: HeaderMap::new(),
        body: ErrorBody::decode(origin, body.as_bytes()),
    }
}

#[test]
fn test_typed_error_passes_through_unchanged() {
    let handler = handler();
    let original = CloudSaveError::Conflict {
        info: ErrorInfo::new(CloudSaveErrorReason::Conflict, 7011, "lock mismatch"),
        details: vec![ConflictDetail {
            key: "k".to_string(),
            attempted_write_lock: "a".to_string(),
            existing_write_lock: "e".to_string(),
        }],
    };

    let classified = handler.classify(ApiFailure::Sdk(original.clone()));
    assert_eq!(classified, original);

    let twice = handler.classify(ApiFailure::Sdk(classified));
    assert_eq!(twice, original);
}

#[test]
fn test_network_failure() {
    let err = handler().classify(ApiFailure::Transport(TransportError::Network(
        "dns".to_string(),
    )));
    assert_eq!(err.reason(), CloudSaveErrorReason::NoInternetConnection);
    assert_eq!(err.code(), codes::TRANSPORT_ERROR);
    assert_eq!(err.message(), NO_CONNECTION_MESSAGE);
}

#[test]
fn test_status_reason_table() {
    let handler = handler();
    let cases = [
        (400, CloudSaveErrorReason::InvalidArgument),
        (401, CloudSaveErrorReason::Unauthorized),
        (403, CloudSaveErrorReason::KeyLimitExceeded),
        (404, CloudSaveErrorReason::NotFound),
        (409, CloudSaveErrorReason::Conflict),
        (503, CloudSaveErrorReason::ServiceUnavailable),
    ];

    for (status, reason) in cases {
        let err = handler.classify(http(status, ResponseOrigin::Service, "not json"));
        assert_eq!(err.reason(), reason, "status {status}");
        assert_eq!(err.code(), codes::UNKNOWN);
        assert_eq!(err.message(), generic_message(status));
    }
}

#[test]
fn test_deserialization_failure_uses_status() {
    let err = handler().classify(ApiFailure::Deserialization {
        status: 200,
        message: "expected value".to_string(),
    });
    assert_eq!(err.reason(), CloudSaveErrorReason::Unknown);
    assert_eq!(err.code(), codes::UNKNOWN);
}

#[test]
fn test_storage_codes() {
    let handler = handler();
    let not_found = handler.classify(http(404, ResponseOrigin::Storage, "<Error><Code>NoSuchKey</Code></Error>"));
    assert_eq!(not_found.code(), codes::STORAGE_NOT_FOUND);

    let precondition = handler.classify(http(412, ResponseOrigin::Storage, ""));
    assert_eq!(precondition.code(), codes::STORAGE_PRECONDITION_FAILED);

    let other = handler.classify(http(500, ResponseOrigin::Storage, "<Error/>"));
    assert_eq!(other.code(), codes::STORAGE_UNKNOWN);
    assert_eq!(other.reason(), CloudSaveErrorReason::ServiceUnavailable);
}
