//! The flat methods kept for older callers delegate to the nested services
#![allow(deprecated)]

use crate::support::{self, items_page, json_body, keys_page, MockTransport};
use cloud_save_client::transport::HttpResponse;
use indexmap::IndexMap;
use serde_json::json;

#[tokio::test]
async fn test_retrieve_all_keys() {
    let transport = MockTransport::new();
    transport.push_json(200, keys_page(&["a", "b"], None));
    let (service, _) = support::service(transport.clone());

    let keys = service.data.retrieve_all_keys().await.unwrap();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_force_save_writes_without_locks() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({"results": [{"key": "gold", "writeLock": "w"}]}));
    let (service, _) = support::service(transport.clone());

    let data = IndexMap::from([("gold".to_string(), json!(100))]);
    service.data.force_save(data).await.unwrap();

    assert_eq!(
        json_body(&transport.request(0)),
        json!({"data": [{"key": "gold", "value": 100}]})
    );
}

#[tokio::test]
async fn test_load_strings_renders_values() {
    let transport = MockTransport::new();
    transport.push_json(
        200,
        json!({"results": [
            {"key": "name", "value": "Ada"},
            {"key": "pos", "value": {"x": 1}}
        ]}),
    );
    let (service, _) = support::service(transport.clone());

    let values = service.data.load_strings(["name", "pos"]).await.unwrap();
    assert_eq!(values["name"], "Ada");
    assert_eq!(values["pos"], r#"{"x":1}"#);
}

#[tokio::test]
async fn test_load_all_strings_and_force_delete() {
    let transport = MockTransport::new();
    transport
        .push_json(200, items_page(&["k"], None))
        .push(HttpResponse::new(204, ""));
    let (service, _) = support::service(transport.clone());

    let values = service.data.load_all_strings().await.unwrap();
    assert_eq!(values["k"], r#"{"name":"k"}"#);

    service.data.force_delete("k").await.unwrap();
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_flat_file_methods() {
    let transport = MockTransport::new();
    transport
        .push_json(200, json!({"results": [], "links": {"next": null}}))
        .push(HttpResponse::new(204, ""));
    let (service, _) = support::service(transport.clone());

    assert!(service.files.list_all_files().await.unwrap().is_empty());
    service.files.delete_file("old-save").await.unwrap();

    assert!(service.files.save_file_bytes(".bad", vec![1u8]).await.is_err());
    assert_eq!(transport.calls(), 2);
}
