//! Ozon Seller API adapter.
//!
//! Auth is a `Client-Id` / `Api-Key` header pair. The product list pages by
//! `last_id` and reports a running `total`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use wsync_reconcile::{PriceUpdate, StockUpdate};

use crate::marketplace::{decode, send};
use crate::pagination::{PageTermination, RunningTotalTermination};
use crate::{Ack, BatchLimits, CatalogPage, MarketError, Marketplace};

pub const OZON_API_BASE: &str = "https://api-seller.ozon.ru";
pub const OZON_PAGE_LIMIT: u32 = 1000;
pub const OZON_CURRENCY: &str = "RUB";
pub const OZON_LIMITS: BatchLimits = BatchLimits {
    stocks: 100,
    prices: 1000,
};

const PRODUCT_LIST_PATH: &str = "/v2/product/list";
const IMPORT_STOCKS_PATH: &str = "/v1/product/import/stocks";
const IMPORT_PRICES_PATH: &str = "/v1/product/import/prices";

/// One Ozon seller account.
///
/// Credentials are resolved by the caller and passed in; never log them.
#[derive(Clone)]
pub struct OzonSeller {
    name: String,
    client_id: String,
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    limits: BatchLimits,
}

impl std::fmt::Debug for OzonSeller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OzonSeller")
            .field("name", &self.name)
            .field("client_id", &"<REDACTED>")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("limits", &self.limits)
            .finish()
    }
}

impl OzonSeller {
    pub fn new(name: impl Into<String>, client_id: String, api_key: String) -> Self {
        Self::new_with_base_url(name, client_id, api_key, OZON_API_BASE.to_string())
    }

    pub fn new_with_base_url(
        name: impl Into<String>,
        client_id: String,
        api_key: String,
        base_url: String,
    ) -> Self {
        Self {
            name: name.into(),
            client_id,
            api_key,
            http: reqwest::Client::new(),
            base_url,
            limits: OZON_LIMITS,
        }
    }

    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        self.http
            .post(url)
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
            .json(body)
    }
}

#[async_trait::async_trait]
impl Marketplace for OzonSeller {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> BatchLimits {
        self.limits
    }

    fn termination(&self) -> &dyn PageTermination {
        &RunningTotalTermination
    }

    fn currency(&self) -> &'static str {
        OZON_CURRENCY
    }

    async fn fetch_catalog_page(&self, cursor: &str) -> Result<CatalogPage, MarketError> {
        let req = ProductListRequest {
            filter: ProductListFilter { visibility: "ALL" },
            last_id: cursor,
            limit: OZON_PAGE_LIMIT,
        };
        let (_, body) = send(self.post(PRODUCT_LIST_PATH, &req), "ozon product list").await?;
        let resp: ProductListResponse = decode(body, "ozon product list")?;

        Ok(CatalogPage {
            offer_ids: resp.result.items.into_iter().map(|i| i.offer_id).collect(),
            next_cursor: resp.result.last_id,
            total: Some(resp.result.total),
        })
    }

    async fn push_stocks(&self, batch: &[StockUpdate]) -> Result<Ack, MarketError> {
        let stocks: Vec<OzonStock<'_>> = batch
            .iter()
            .map(|u| OzonStock {
                offer_id: &u.offer_id,
                stock: u.count,
            })
            .collect();
        let (status, body) = send(
            self.post(IMPORT_STOCKS_PATH, &serde_json::json!({ "stocks": stocks })),
            "ozon stock import",
        )
        .await?;
        debug!(target_name = %self.name, records = batch.len(), "ozon stocks acknowledged");
        Ok(ack(status, body))
    }

    async fn push_prices(&self, batch: &[PriceUpdate]) -> Result<Ack, MarketError> {
        let prices: Vec<OzonPrice<'_>> = batch
            .iter()
            .map(|u| OzonPrice {
                auto_action_enabled: "UNKNOWN",
                currency_code: &u.currency,
                offer_id: &u.offer_id,
                old_price: "0",
                price: &u.price,
            })
            .collect();
        let (status, body) = send(
            self.post(IMPORT_PRICES_PATH, &serde_json::json!({ "prices": prices })),
            "ozon price import",
        )
        .await?;
        debug!(target_name = %self.name, records = batch.len(), "ozon prices acknowledged");
        Ok(ack(status, body))
    }
}

/// Ozon answers bulk imports with per-item `updated` flags.
fn ack(status: u16, body: Value) -> Ack {
    let rejected_items = body
        .get("result")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|i| i.get("updated").and_then(Value::as_bool) == Some(false))
                .count()
        })
        .unwrap_or(0);
    Ack {
        status,
        body,
        rejected_items,
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ProductListRequest<'a> {
    filter: ProductListFilter,
    last_id: &'a str,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct ProductListFilter {
    visibility: &'static str,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    result: ProductListResult,
}

#[derive(Debug, Deserialize)]
struct ProductListResult {
    items: Vec<ProductListItem>,
    total: u64,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductListItem {
    offer_id: String,
}

#[derive(Debug, Serialize)]
struct OzonStock<'a> {
    offer_id: &'a str,
    stock: i64,
}

#[derive(Debug, Serialize)]
struct OzonPrice<'a> {
    auto_action_enabled: &'static str,
    currency_code: &'a str,
    offer_id: &'a str,
    old_price: &'static str,
    price: &'a str,
}
