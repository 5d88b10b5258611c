//! Integration tests for player data operations

use crate::support::{self, items_page, json_body, keys_page, query_pairs, MockTransport};
use cloud_save_client::error::codes;
use cloud_save_client::identity::StaticIdentity;
use cloud_save_client::{
    AccessClass, CloudSaveError, CloudSaveErrorReason, DataOptions, FieldFilter, FilterOp, Query,
    SaveItem,
};
use reqwest::Method;
use serde_json::json;

#[tokio::test]
async fn test_list_all_keys_walks_every_page() {
    let transport = MockTransport::new();
    transport
        .push_json(200, keys_page(&["a", "b"], Some("/next")))
        .push_json(200, keys_page(&["c"], Some("/next")))
        .push_json(200, keys_page(&["d"], Some("")));
    let (service, _) = support::service(transport.clone());

    let keys = service
        .data
        .player
        .list_all_keys(&DataOptions::default())
        .await
        .unwrap();

    let names: Vec<&str> = keys.iter().map(|k| k.key.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert_eq!(keys[0].write_lock.as_deref(), Some("lock-a"));
    assert_eq!(transport.calls(), 3);

    let first = transport.request(0);
    assert_eq!(first.method, Method::GET);
    assert_eq!(first.url.path(), "/v1/data/projects/proj-1/players/player-1/keys");
    assert_eq!(first.headers["authorization"], "Bearer token-1");
    assert!(query_pairs(&first).is_empty());
    assert_eq!(query_pairs(&transport.request(1)), vec![("after".to_string(), "b".to_string())]);
    assert_eq!(query_pairs(&transport.request(2)), vec![("after".to_string(), "c".to_string())]);
}

#[tokio::test]
async fn test_load_empty_keys_makes_no_call() {
    let transport = MockTransport::new();
    let (service, _) = support::service(transport.clone());

    let items = service
        .data
        .player
        .load(Vec::<String>::new(), &DataOptions::default())
        .await
        .unwrap();

    assert!(items.is_empty());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_load_all_fetches_every_page() {
    let transport = MockTransport::new();
    transport
        .push_json(200, items_page(&["x", "y"], Some("/next")))
        .push_json(200, items_page(&["z"], None));
    let (service, _) = support::service(transport.clone());

    let items = service.data.player.load_all(&DataOptions::default()).await.unwrap();

    assert_eq!(items.keys().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    assert_eq!(items["y"].value, json!({"name": "y"}));
    assert_eq!(transport.calls(), 2);
    assert_eq!(
        transport.request(0).url.path(),
        "/v1/data/projects/proj-1/players/player-1/items"
    );
}

#[tokio::test]
async fn test_load_repeats_keys_parameter() {
    let transport = MockTransport::new();
    transport.push_json(200, items_page(&["a", "b"], None));
    let (service, _) = support::service(transport.clone());

    let items = service
        .data
        .player
        .load(["a", "b", "a"], &DataOptions::protected())
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    let request = transport.request(0);
    assert_eq!(
        request.url.path(),
        "/v1/data/projects/proj-1/players/player-1/protected/items"
    );
    assert_eq!(
        query_pairs(&request),
        vec![
            ("keys".to_string(), "a".to_string()),
            ("keys".to_string(), "b".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_public_read_of_other_player() {
    let transport = MockTransport::new();
    transport.push_json(200, items_page(&["rank"], None));
    let (service, _) = support::service(transport.clone());

    service
        .data
        .player
        .load(["rank"], &DataOptions::public_for("friend-7"))
        .await
        .unwrap();

    assert_eq!(
        transport.request(0).url.path(),
        "/v1/data/projects/proj-1/players/friend-7/public/items"
    );
}

#[tokio::test]
async fn test_save_splits_into_batches_of_twenty() {
    let transport = MockTransport::new();
    for range in [0..20, 20..40, 40..45] {
        let results: Vec<_> = range
            .map(|i| json!({"key": format!("key-{i}"), "writeLock": format!("w-{i}")}))
            .collect();
        transport.push_json(200, json!({ "results": results }));
    }
    let (service, _) = support::service(transport.clone());

    let data = (0..45).map(|i| (format!("key-{i}"), SaveItem::new(i)));
    let written = service
        .data
        .player
        .save(data, &DataOptions::default())
        .await
        .unwrap();

    assert_eq!(written.len(), 45);
    assert_eq!(written["key-44"], "w-44");

    let sizes: Vec<usize> = transport
        .requests()
        .iter()
        .map(|r| json_body(r)["data"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![20, 20, 5]);

    let first = transport.request(0);
    assert_eq!(first.method, Method::POST);
    assert_eq!(
        first.url.path(),
        "/v1/data/projects/proj-1/players/player-1/item-batch"
    );
    assert_eq!(first.headers["content-type"], "application/json");
}

#[tokio::test]
async fn test_save_sends_write_locks() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({"results": [{"key": "coins", "writeLock": "w2"}]}));
    let (service, _) = support::service(transport.clone());

    let written = service
        .data
        .player
        .save(
            [("coins", SaveItem::new(10).with_write_lock("w1"))],
            &DataOptions::public(),
        )
        .await
        .unwrap();

    assert_eq!(written["coins"], "w2");
    let request = transport.request(0);
    assert!(request.url.path().ends_with("/players/player-1/public/item-batch"));
    assert_eq!(
        json_body(&request),
        json!({"data": [{"key": "coins", "value": 10, "writeLock": "w1"}]})
    );
}

#[tokio::test]
async fn test_save_values_omits_write_lock() {
    let transport = MockTransport::new();
    transport.push_json(200, json!({"results": [{"key": "name", "writeLock": "w"}]}));
    let (service, _) = support::service(transport.clone());

    service
        .data
        .player
        .save_values([("name", json!("Ada"))], &DataOptions::default())
        .await
        .unwrap();

    assert_eq!(
        json_body(&transport.request(0)),
        json!({"data": [{"key": "name", "value": "Ada"}]})
    );
}

#[tokio::test]
async fn test_batch_conflict_keeps_both_details() {
    let transport = MockTransport::new();
    transport.push_json(
        409,
        json!({
            "type": "problems/conflict",
            "title": "Conflict",
            "status": 409,
            "code": 7011,
            "detail": "write lock mismatch",
            "data": [
                {"attempted": {"key": "a", "writeLock": "old-a"}, "existing": {"key": "a", "writeLock": "new-a"}},
                {"attempted": {"key": "b", "writeLock": "old-b"}, "existing": {"key": "b", "writeLock": "new-b"}}
            ]
        }),
    );
    let (service, _) = support::service(transport.clone());

    let err = service
        .data
        .player
        .save(
            [
                ("a", SaveItem::new(1).with_write_lock("old-a")),
                ("b", SaveItem::new(2).with_write_lock("old-b")),
            ],
            &DataOptions::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.reason(), CloudSaveErrorReason::Conflict);
    assert_eq!(err.code(), 7011);
    let CloudSaveError::Conflict { details, .. } = err else {
        panic!("expected conflict");
    };
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].key, "a");
    assert_eq!(details[0].attempted_write_lock, "old-a");
    assert_eq!(details[0].existing_write_lock, "new-a");
    assert_eq!(details[1].attempted_write_lock, "old-b");
    assert_eq!(details[1].existing_write_lock, "new-b");
}

#[tokio::test]
async fn test_save_to_protected_is_rejected_locally() {
    let transport = MockTransport::new();
    let (service, _) = support::service(transport.clone());

    let err = service
        .data
        .player
        .save([("k", SaveItem::new(1))], &DataOptions::protected())
        .await
        .unwrap_err();

    assert!(err.is_usage_error());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_save_reaches_transport_for_default_and_public() {
    for options in [DataOptions::default(), DataOptions::public()] {
        let transport = MockTransport::new();
        transport.push_json(200, json!({"results": [{"key": "k", "writeLock": "w"}]}));
        let (service, _) = support::service(transport.clone());

        service
            .data
            .player
            .save([("k", SaveItem::new(1))], &options)
            .await
            .unwrap();
        assert_eq!(transport.calls(), 1);
    }
}

#[tokio::test]
async fn test_delete_with_write_lock() {
    let transport = MockTransport::new();
    transport.push(cloud_save_client::transport::HttpResponse::new(204, ""));
    let (service, _) = support::service(transport.clone());

    service
        .data
        .player
        .delete("save slot", &DataOptions::default().with_write_lock("w1"))
        .await
        .unwrap();

    let request = transport.request(0);
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(
        request.url.path(),
        "/v1/data/projects/proj-1/players/player-1/items/save%20slot"
    );
    assert_eq!(query_pairs(&request), vec![("writeLock".to_string(), "w1".to_string())]);
}

#[tokio::test]
async fn test_delete_conflict_detail() {
    let transport = MockTransport::new();
    transport.push_json(
        409,
        json!({
            "code": 7011,
            "detail": "lock mismatch",
            "data": {"key": "k", "attemptedWriteLock": "a", "existingWriteLock": "e"}
        }),
    );
    let (service, _) = support::service(transport.clone());

    let err = service
        .data
        .player
        .delete("k", &DataOptions::default().with_write_lock("a"))
        .await
        .unwrap_err();

    let CloudSaveError::Conflict { info, details } = err else {
        panic!("expected conflict");
    };
    assert_eq!(info.message, "lock mismatch");
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].existing_write_lock, "e");
}

#[tokio::test]
async fn test_delete_all() {
    let transport = MockTransport::new();
    transport.push(cloud_save_client::transport::HttpResponse::new(204, ""));
    let (service, _) = support::service(transport.clone());

    service
        .data
        .player
        .delete_all(&DataOptions::public())
        .await
        .unwrap();

    let request = transport.request(0);
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(
        request.url.path(),
        "/v1/data/projects/proj-1/players/player-1/public/items"
    );
}

#[tokio::test]
async fn test_query_players() {
    let transport = MockTransport::new();
    transport.push_json(
        200,
        json!({"results": [{"id": "player-9", "data": [{"key": "score", "value": 120}]}]}),
    );
    let (service, _) = support::service(transport.clone());

    let query = Query {
        return_keys: vec!["score".to_string()],
        limit: Some(5),
        ..Query::new(vec![FieldFilter::new("score", 100, FilterOp::Ge)])
    };
    let results = service
        .data
        .player
        .query(&query, AccessClass::Public)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "player-9");
    assert_eq!(results[0].data[0].value, json!(120));

    let request = transport.request(0);
    assert_eq!(request.url.path(), "/v1/data/projects/proj-1/players/public/query");
    assert_eq!(
        json_body(&request),
        json!({
            "fields": [{"key": "score", "value": 100, "op": "GE", "asc": true}],
            "returnKeys": ["score"],
            "limit": 5
        })
    );
}

#[tokio::test]
async fn test_preconditions_checked_in_order() {
    let transport = MockTransport::new();
    let (service, _) = support::service_with(transport.clone(), StaticIdentity::default());

    let err = service
        .data
        .player
        .load_all(&DataOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.reason(), CloudSaveErrorReason::ProjectIdMissing);

    let (service, _) = support::service_with(
        transport.clone(),
        StaticIdentity {
            project_id: Some("p".to_string()),
            player_id: Some("pl".to_string()),
            access_token: None,
        },
    );
    let err = service
        .data
        .player
        .list_all_keys(&DataOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.reason(), CloudSaveErrorReason::AccessTokenMissing);
    assert_eq!(err.code(), codes::INVALID_TOKEN);

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_validation_errors_keep_field_details() {
    let transport = MockTransport::new();
    transport.push_json(
        400,
        json!({
            "code": 1004,
            "detail": "invalid request",
            "errors": [{"field": "data[0].key", "messages": ["key too long"], "key": "k"}]
        }),
    );
    let (service, _) = support::service(transport.clone());

    let err = service
        .data
        .player
        .save([("k", SaveItem::new(1))], &DataOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.reason(), CloudSaveErrorReason::InvalidArgument);
    let CloudSaveError::Validation { details, .. } = err else {
        panic!("expected validation error");
    };
    assert_eq!(details[0].field, "data[0].key");
    assert_eq!(details[0].messages, vec!["key too long".to_string()]);
}

#[tokio::test]
async fn test_transport_failure_surfaces_as_no_connection() {
    let transport = MockTransport::new();
    transport.push_error(cloud_save_client::transport::TransportError::Network(
        "connection refused".to_string(),
    ));
    let (service, _) = support::service(transport.clone());

    let err = service
        .data
        .player
        .list_all_keys(&DataOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.reason(), CloudSaveErrorReason::NoInternetConnection);
    assert_eq!(err.code(), codes::TRANSPORT_ERROR);
}
