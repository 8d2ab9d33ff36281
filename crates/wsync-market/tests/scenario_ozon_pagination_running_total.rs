use httpmock::prelude::*;
use serde_json::json;
use wsync_market::{fetch_all_offer_ids, MarketError, OzonSeller};

fn items(ids: &[&str]) -> serde_json::Value {
    json!(ids
        .iter()
        .map(|id| json!({ "product_id": 1, "offer_id": id }))
        .collect::<Vec<_>>())
}

fn seller(server: &MockServer) -> OzonSeller {
    OzonSeller::new_with_base_url(
        "ozon",
        "client-1".to_string(),
        "key-1".to_string(),
        server.base_url(),
    )
}

#[tokio::test]
async fn scenario_pages_until_total_reached() {
    let server = MockServer::start_async().await;

    let page1 = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/product/list")
                .header("Client-Id", "client-1")
                .header("Api-Key", "key-1")
                .json_body_partial(r#"{"last_id": "", "limit": 1000, "filter": {"visibility": "ALL"}}"#);
            then.status(200).json_body(json!({
                "result": { "items": items(&["A", "B"]), "total": 3, "last_id": "cursor-b" }
            }));
        })
        .await;

    let page2 = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/product/list")
                .json_body_partial(r#"{"last_id": "cursor-b"}"#);
            then.status(200).json_body(json!({
                "result": { "items": items(&["C"]), "total": 3, "last_id": "cursor-c" }
            }));
        })
        .await;

    let catalog = fetch_all_offer_ids(&seller(&server)).await.unwrap();

    page1.assert_async().await;
    page2.assert_async().await;
    assert_eq!(catalog.ids(), &["A", "B", "C"]);
}

#[tokio::test]
async fn scenario_empty_page_before_total_does_not_loop() {
    let server = MockServer::start_async().await;

    let page = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/product/list");
            then.status(200).json_body(json!({
                "result": { "items": [], "total": 10, "last_id": "" }
            }));
        })
        .await;

    let catalog = fetch_all_offer_ids(&seller(&server)).await.unwrap();

    page.assert_hits_async(1).await;
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn scenario_http_error_aborts_fetch() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/product/list");
            then.status(403).body(r#"{"code": 7, "message": "Invalid Api-Key"}"#);
        })
        .await;

    let err = fetch_all_offer_ids(&seller(&server)).await.unwrap_err();
    match err {
        MarketError::Rejected { status, message } => {
            assert_eq!(status, 403);
            assert!(message.contains("Invalid Api-Key"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn scenario_missing_total_is_data_shape_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/product/list");
            then.status(200)
                .json_body(json!({ "result": { "items": items(&["A"]) } }));
        })
        .await;

    let err = fetch_all_offer_ids(&seller(&server)).await.unwrap_err();
    assert!(matches!(err, MarketError::DataShape(_)));
}
