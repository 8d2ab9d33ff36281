//! Yandex Market partner API adapter.
//!
//! Bearer-token auth, one campaign and one warehouse per target. The offer
//! listing pages by an opaque `nextPageToken`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use wsync_reconcile::{PriceUpdate, StockShape, StockUpdate};

use crate::marketplace::{decode, send};
use crate::pagination::{NextTokenTermination, PageTermination};
use crate::{Ack, BatchLimits, CatalogPage, MarketError, Marketplace};

pub const YANDEX_API_BASE: &str = "https://api.partner.market.yandex.ru";
pub const YANDEX_PAGE_LIMIT: u32 = 200;
pub const YANDEX_CURRENCY: &str = "RUR";
/// Stock type for goods available for sale.
pub const YANDEX_STOCK_TYPE: &str = "FIT";
pub const YANDEX_LIMITS: BatchLimits = BatchLimits {
    stocks: 2000,
    prices: 500,
};

/// One Yandex Market campaign (FBS, DBS, ...) and its warehouse.
#[derive(Clone)]
pub struct YandexMarket {
    name: String,
    token: String,
    campaign_id: String,
    warehouse_id: String,
    http: reqwest::Client,
    base_url: String,
    limits: BatchLimits,
}

impl std::fmt::Debug for YandexMarket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexMarket")
            .field("name", &self.name)
            .field("token", &"<REDACTED>")
            .field("campaign_id", &self.campaign_id)
            .field("warehouse_id", &self.warehouse_id)
            .field("base_url", &self.base_url)
            .field("limits", &self.limits)
            .finish()
    }
}

impl YandexMarket {
    pub fn new(
        name: impl Into<String>,
        token: String,
        campaign_id: String,
        warehouse_id: String,
    ) -> Self {
        Self::new_with_base_url(
            name,
            token,
            campaign_id,
            warehouse_id,
            YANDEX_API_BASE.to_string(),
        )
    }

    pub fn new_with_base_url(
        name: impl Into<String>,
        token: String,
        campaign_id: String,
        warehouse_id: String,
        base_url: String,
    ) -> Self {
        Self {
            name: name.into(),
            token,
            campaign_id,
            warehouse_id,
            http: reqwest::Client::new(),
            base_url,
            limits: YANDEX_LIMITS,
        }
    }

    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    fn campaign_url(&self, tail: &str) -> String {
        format!(
            "{}/campaigns/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.campaign_id,
            tail
        )
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

#[async_trait::async_trait]
impl Marketplace for YandexMarket {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> BatchLimits {
        self.limits
    }

    fn termination(&self) -> &dyn PageTermination {
        &NextTokenTermination
    }

    fn currency(&self) -> &'static str {
        YANDEX_CURRENCY
    }

    fn stock_shape(&self) -> StockShape {
        StockShape {
            warehouse: Some(self.warehouse_id.clone()),
            updated_at: Some(Utc::now()),
            item_type: Some(YANDEX_STOCK_TYPE.to_string()),
        }
    }

    async fn fetch_catalog_page(&self, cursor: &str) -> Result<CatalogPage, MarketError> {
        let limit = YANDEX_PAGE_LIMIT.to_string();
        let req = self.authed(
            self.http
                .get(self.campaign_url("offer-mapping-entries"))
                .query(&[("page_token", cursor), ("limit", limit.as_str())]),
        );
        let (_, body) = send(req, "yandex offer mapping").await?;
        let resp: OfferMappingResponse = decode(body, "yandex offer mapping")?;

        Ok(CatalogPage {
            offer_ids: resp
                .result
                .offer_mapping_entries
                .into_iter()
                .map(|e| e.offer.shop_sku)
                .collect(),
            next_cursor: resp.result.paging.and_then(|p| p.next_page_token),
            total: None,
        })
    }

    async fn push_stocks(&self, batch: &[StockUpdate]) -> Result<Ack, MarketError> {
        let fallback_at = Utc::now();
        let skus: Vec<YandexSku<'_>> = batch
            .iter()
            .map(|u| YandexSku {
                sku: &u.offer_id,
                warehouse_id: u.warehouse.as_deref().unwrap_or(&self.warehouse_id),
                items: [YandexStockItem {
                    count: u.count,
                    item_type: u.item_type.as_deref().unwrap_or(YANDEX_STOCK_TYPE),
                    updated_at: format_updated_at(u.updated_at.unwrap_or(fallback_at)),
                }],
            })
            .collect();

        let req = self.authed(
            self.http
                .put(self.campaign_url("offers/stocks"))
                .json(&serde_json::json!({ "skus": skus })),
        );
        let (status, body) = send(req, "yandex stock update").await?;
        debug!(target_name = %self.name, records = batch.len(), "yandex stocks acknowledged");
        ack(status, body)
    }

    async fn push_prices(&self, batch: &[PriceUpdate]) -> Result<Ack, MarketError> {
        let mut offers: Vec<YandexOfferPrice<'_>> = Vec::with_capacity(batch.len());
        for u in batch {
            let value = u.price.parse::<u64>().map_err(|_| {
                MarketError::DataShape(format!(
                    "offer '{}': price '{}' is not an integer",
                    u.offer_id, u.price
                ))
            })?;
            offers.push(YandexOfferPrice {
                id: &u.offer_id,
                price: YandexPrice {
                    value,
                    currency_id: &u.currency,
                },
            });
        }

        let req = self.authed(
            self.http
                .post(self.campaign_url("offer-prices/updates"))
                .json(&serde_json::json!({ "offers": offers })),
        );
        let (status, body) = send(req, "yandex price update").await?;
        debug!(target_name = %self.name, records = batch.len(), "yandex prices acknowledged");
        ack(status, body)
    }
}

/// `2024-03-01T12:00:00Z`: whole seconds, UTC designator.
fn format_updated_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Yandex wraps results in `{"status": "OK" | "ERROR", ...}` even on 200.
fn ack(status: u16, body: Value) -> Result<Ack, MarketError> {
    if let Some(s) = body.get("status").and_then(Value::as_str) {
        if s != "OK" {
            return Err(MarketError::Rejected {
                status,
                message: body
                    .get("errors")
                    .map(Value::to_string)
                    .unwrap_or_else(|| format!("status={s}")),
            });
        }
    }
    Ok(Ack {
        status,
        body,
        rejected_items: 0,
    })
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OfferMappingResponse {
    result: OfferMappingResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferMappingResult {
    offer_mapping_entries: Vec<OfferMappingEntry>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct OfferMappingEntry {
    offer: MappedOffer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappedOffer {
    shop_sku: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paging {
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YandexSku<'a> {
    sku: &'a str,
    warehouse_id: &'a str,
    items: [YandexStockItem<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YandexStockItem<'a> {
    count: i64,
    #[serde(rename = "type")]
    item_type: &'a str,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct YandexOfferPrice<'a> {
    id: &'a str,
    price: YandexPrice<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YandexPrice<'a> {
    value: u64,
    currency_id: &'a str,
}
