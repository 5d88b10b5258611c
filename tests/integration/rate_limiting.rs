//! Integration tests for the client-side rate-limit window

use crate::support::{self, keys_page, MockTransport};
use cloud_save_client::transport::HttpResponse;
use cloud_save_client::{CloudSaveErrorReason, DataOptions};
use serde_json::json;
use std::time::Duration;

fn throttled(header: &'static str, value: &str) -> HttpResponse {
    HttpResponse::new(
        429,
        json!({"code": 50, "title": "Too Many Requests", "status": 429}).to_string(),
    )
    .with_header(header, value)
}

#[tokio::test]
async fn test_retry_after_gates_calls_until_window_ends() {
    let transport = MockTransport::new();
    transport
        .push(throttled("retry-after", "5"))
        .push_json(200, keys_page(&["a"], None));
    let (service, clock) = support::service(transport.clone());
    let options = DataOptions::default();

    let err = service.data.player.list_all_keys(&options).await.unwrap_err();
    assert_eq!(err.reason(), CloudSaveErrorReason::TooManyRequests);
    assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
    assert_eq!(transport.calls(), 1);
    assert!(service.is_rate_limited());

    clock.advance(Duration::from_secs(2));
    let err = service.data.player.list_all_keys(&options).await.unwrap_err();
    assert_eq!(err.reason(), CloudSaveErrorReason::TooManyRequests);
    assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
    assert_eq!(transport.calls(), 1);

    clock.advance(Duration::from_secs(3));
    assert!(!service.is_rate_limited());
    let keys = service.data.player.list_all_keys(&options).await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_gate_is_shared_by_every_service() {
    let transport = MockTransport::new();
    transport.push(throttled("retry-after", "30"));
    let (service, _) = support::service(transport.clone());

    let first = service
        .data
        .player
        .load_all(&DataOptions::default())
        .await
        .unwrap_err();

    let files = service.files.player.list_all().await.unwrap_err();
    let custom = service.data.custom.load_all("guild").await.unwrap_err();

    assert_eq!(files.reason(), CloudSaveErrorReason::TooManyRequests);
    assert_eq!(custom.reason(), CloudSaveErrorReason::TooManyRequests);
    // locally rejected calls reuse the error the service sent
    assert_eq!(custom.code(), first.code());
    assert_eq!(custom.code(), 50);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_x_retry_after_fractional_seconds() {
    let transport = MockTransport::new();
    transport.push(throttled("x-retry-after", "1.5"));
    let (service, clock) = support::service(transport.clone());

    let err = service
        .data
        .player
        .list_all_keys(&DataOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.retry_after(), Some(Duration::from_millis(1500)));

    clock.advance(Duration::from_millis(1499));
    assert!(service.is_rate_limited());
    clock.advance(Duration::from_millis(1));
    assert!(!service.is_rate_limited());
}

#[tokio::test]
async fn test_missing_header_falls_back_to_ten_seconds() {
    let transport = MockTransport::new();
    transport.push(HttpResponse::new(429, "slow down"));
    let (service, clock) = support::service(transport.clone());

    let err = service
        .data
        .player
        .list_all_keys(&DataOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.reason(), CloudSaveErrorReason::TooManyRequests);
    assert_eq!(err.retry_after(), Some(Duration::from_secs(10)));

    clock.advance(Duration::from_secs(9));
    assert!(service.is_rate_limited());
    clock.advance(Duration::from_secs(1));
    assert!(!service.is_rate_limited());
}

#[tokio::test]
async fn test_other_failures_do_not_open_window() {
    let transport = MockTransport::new();
    transport.push_json(503, json!({"code": 3, "detail": "maintenance"}));
    let (service, _) = support::service(transport.clone());

    let err = service
        .data
        .player
        .list_all_keys(&DataOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.reason(), CloudSaveErrorReason::ServiceUnavailable);
    assert_eq!(err.message(), "maintenance");
    assert!(!service.is_rate_limited());
}
