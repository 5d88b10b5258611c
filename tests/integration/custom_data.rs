//! Integration tests for custom data reads

use crate::support::{self, items_page, keys_page, query_pairs, MockTransport, PROJECT, TOKEN};
use cloud_save_client::identity::StaticIdentity;
use cloud_save_client::{AccessClass, FieldFilter, FilterOp, Query};
use serde_json::json;

fn server_identity() -> StaticIdentity {
    StaticIdentity {
        project_id: Some(PROJECT.to_string()),
        player_id: None,
        access_token: Some(TOKEN.to_string()),
    }
}

#[tokio::test]
async fn test_custom_reads_need_no_player() {
    let transport = MockTransport::new();
    transport
        .push_json(200, keys_page(&["banner"], None))
        .push_json(200, items_page(&["banner"], None));
    let (service, _) = support::service_with(transport.clone(), server_identity());

    let keys = service.data.custom.list_all_keys("guild-1").await.unwrap();
    assert_eq!(keys[0].key, "banner");

    let items = service
        .data
        .custom
        .load("guild-1", ["banner"])
        .await
        .unwrap();
    assert_eq!(items["banner"].value, json!({"name": "banner"}));

    assert_eq!(
        transport.request(0).url.path(),
        "/v1/data/projects/proj-1/custom/guild-1/keys"
    );
    let load = transport.request(1);
    assert_eq!(load.url.path(), "/v1/data/projects/proj-1/custom/guild-1/items");
    assert_eq!(query_pairs(&load), vec![("keys".to_string(), "banner".to_string())]);
}

#[tokio::test]
async fn test_custom_load_all_paginates() {
    let transport = MockTransport::new();
    transport
        .push_json(200, items_page(&["a"], Some("/more")))
        .push_json(200, items_page(&["b"], None));
    let (service, _) = support::service(transport.clone());

    let items = service.data.custom.load_all("guild-1").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(query_pairs(&transport.request(1)), vec![("after".to_string(), "a".to_string())]);
}

#[tokio::test]
async fn test_custom_empty_keys_short_circuit() {
    let transport = MockTransport::new();
    let (service, _) = support::service(transport.clone());

    let items = service
        .data
        .custom
        .load("guild-1", Vec::<String>::new())
        .await
        .unwrap();
    assert!(items.is_empty());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_custom_query() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({"results": [{"id": "guild-1", "data": []}]}));
    let (service, _) = support::service_with(transport.clone(), server_identity());

    let query = Query::new(vec![FieldFilter::new("members", 10, FilterOp::Gt)]);
    let results = service
        .data
        .custom
        .query(&query, AccessClass::Default)
        .await
        .unwrap();

    assert_eq!(results[0].id, "guild-1");
    assert_eq!(transport.request(0).url.path(), "/v1/data/projects/proj-1/custom/query");
}

#[tokio::test]
async fn test_custom_query_rejects_public() {
    let transport = MockTransport::new();
    let (service, _) = support::service(transport.clone());

    let err = service
        .data
        .custom
        .query(&Query::default(), AccessClass::Public)
        .await
        .unwrap_err();
    assert!(err.is_usage_error());
    assert_eq!(transport.calls(), 0);
}
