use httpmock::prelude::*;
use serde_json::json;
use wsync_market::{
    dispatch_prices, dispatch_stocks, BatchLimits, MarketError, Marketplace, OzonSeller,
    YandexMarket,
};
use wsync_reconcile::{PriceUpdate, StockShape, StockUpdate};

fn price(id: &str, value: &str, currency: &str) -> PriceUpdate {
    PriceUpdate {
        offer_id: id.into(),
        price: value.into(),
        currency: currency.into(),
    }
}

#[tokio::test]
async fn scenario_ozon_stock_import_body_and_headers() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/product/import/stocks")
                .header("Client-Id", "c")
                .header("Api-Key", "k")
                .json_body(json!({
                    "stocks": [
                        {"offer_id": "A", "stock": 100},
                        {"offer_id": "B", "stock": 0}
                    ]
                }));
            then.status(200).json_body(json!({
                "result": [
                    {"offer_id": "A", "updated": true, "errors": []},
                    {"offer_id": "B", "updated": true, "errors": []}
                ]
            }));
        })
        .await;

    let seller = OzonSeller::new_with_base_url("ozon", "c".into(), "k".into(), server.base_url());
    let shape = seller.stock_shape();
    let updates = vec![StockUpdate::new("A", 100, &shape), StockUpdate::new("B", 0, &shape)];

    let summary = dispatch_stocks(&seller, &updates).await.unwrap();

    m.assert_async().await;
    assert_eq!(summary.batches, 1);
    assert_eq!(summary.rejected_items, 0);
}

#[tokio::test]
async fn scenario_ozon_prices_split_by_configured_limit() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/product/import/prices")
                .json_body_partial(
                    r#"{"prices": [{"auto_action_enabled": "UNKNOWN", "currency_code": "RUB", "old_price": "0"}]}"#,
                );
            then.status(200).json_body(json!({ "result": [] }));
        })
        .await;

    let seller = OzonSeller::new_with_base_url("ozon", "c".into(), "k".into(), server.base_url())
        .with_limits(BatchLimits { stocks: 100, prices: 1 });
    let prices = vec![price("A", "19990", "RUB"), price("B", "5", "RUB")];

    let summary = dispatch_prices(&seller, &prices).await.unwrap();

    m.assert_hits_async(2).await;
    assert_eq!(summary.batches, 2);
}

#[tokio::test]
async fn scenario_yandex_stock_update_body() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/campaigns/42/offers/stocks")
                .header("Authorization", "Bearer tok")
                .json_body(json!({
                    "skus": [{
                        "sku": "A",
                        "warehouseId": "7",
                        "items": [{"count": 3, "type": "FIT", "updatedAt": "2024-03-01T12:00:00Z"}]
                    }]
                }));
            then.status(200).json_body(json!({ "status": "OK" }));
        })
        .await;

    let market = YandexMarket::new_with_base_url(
        "yandex",
        "tok".into(),
        "42".into(),
        "7".into(),
        server.base_url(),
    );
    let mut shape = StockShape::warehouse("7");
    shape.item_type = Some("FIT".into());
    shape.updated_at = Some("2024-03-01T12:00:00Z".parse().unwrap());
    let updates = vec![StockUpdate::new("A", 3, &shape)];

    dispatch_stocks(&market, &updates).await.unwrap();

    m.assert_async().await;
}

#[tokio::test]
async fn scenario_yandex_price_body_uses_numeric_value() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/campaigns/42/offer-prices/updates")
                .json_body(json!({
                    "offers": [{"id": "A", "price": {"value": 19990, "currencyId": "RUR"}}]
                }));
            then.status(200).json_body(json!({ "status": "OK" }));
        })
        .await;

    let market = YandexMarket::new_with_base_url(
        "yandex",
        "tok".into(),
        "42".into(),
        "7".into(),
        server.base_url(),
    );

    dispatch_prices(&market, &[price("A", "19990", "RUR")]).await.unwrap();

    m.assert_async().await;
}

#[tokio::test]
async fn scenario_yandex_error_status_surfaces_as_rejection() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/campaigns/42/offer-prices/updates");
            then.status(400).json_body(json!({
                "status": "ERROR",
                "errors": [{"code": "BAD_REQUEST", "message": "offer not found"}]
            }));
        })
        .await;

    let market = YandexMarket::new_with_base_url(
        "yandex",
        "tok".into(),
        "42".into(),
        "7".into(),
        server.base_url(),
    );

    let err = dispatch_prices(&market, &[price("A", "1", "RUR")]).await.unwrap_err();
    match err {
        MarketError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("offer not found"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}
