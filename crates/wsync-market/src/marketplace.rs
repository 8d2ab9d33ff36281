//! Marketplace boundary: the adapter trait, wire-independent page/ack types
//! and the error taxonomy every adapter reports in.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use wsync_reconcile::{PriceUpdate, ReconcileError, StockShape, StockUpdate};

use crate::pagination::PageTermination;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`Marketplace`] implementation may return.
///
/// Every variant aborts the current target; nothing here is retried.
#[derive(Debug)]
pub enum MarketError {
    /// Timeout, connection failure or other transport problem.
    Transport(String),
    /// Remote answered with a non-2xx status (includes payload rejections).
    Rejected { status: u16, message: String },
    /// A required field was missing or malformed in a response or record.
    DataShape(String),
    /// A batch larger than the endpoint ceiling was handed to the dispatcher.
    Oversized {
        endpoint: &'static str,
        len: usize,
        limit: usize,
    },
    /// Reconciliation of feed against catalog failed.
    Reconcile(ReconcileError),
}

impl MarketError {
    /// Taxonomy class used in logs and run summaries.
    pub fn class(&self) -> &'static str {
        match self {
            MarketError::Transport(_) => "transient_network",
            MarketError::Rejected { .. } => "remote_rejection",
            MarketError::DataShape(_) | MarketError::Reconcile(_) => "data_shape",
            MarketError::Oversized { .. } => "batch_ceiling",
        }
    }
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketError::Transport(msg) => write!(f, "transport error: {msg}"),
            MarketError::Rejected { status, message } => {
                write!(f, "remote rejected request status={status}: {message}")
            }
            MarketError::DataShape(msg) => write!(f, "data shape error: {msg}"),
            MarketError::Oversized {
                endpoint,
                len,
                limit,
            } => write!(
                f,
                "{endpoint} batch of {len} records exceeds ceiling of {limit}"
            ),
            MarketError::Reconcile(e) => write!(f, "reconcile error: {e}"),
        }
    }
}

impl std::error::Error for MarketError {}

impl From<ReconcileError> for MarketError {
    fn from(e: ReconcileError) -> Self {
        MarketError::Reconcile(e)
    }
}

// ---------------------------------------------------------------------------
// Page / ack / limits
// ---------------------------------------------------------------------------

/// One page of a marketplace catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub offer_ids: Vec<String>,
    /// Cursor for the following page, as the server returned it.
    pub next_cursor: Option<String>,
    /// Server-reported catalog size, for marketplaces that send one.
    pub total: Option<u64>,
}

/// Per-endpoint record ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub stocks: usize,
    pub prices: usize,
}

/// Synchronous acknowledgement of one bulk-update call.
#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub status: u16,
    pub body: Value,
    /// Records the remote accepted the call for but reported as not applied.
    pub rejected_items: usize,
}

// ---------------------------------------------------------------------------
// Marketplace trait
// ---------------------------------------------------------------------------

/// One marketplace account/campaign that offers can be reconciled against.
///
/// Object-safe so the orchestrator can hold `Box<dyn Marketplace>` per target.
#[async_trait::async_trait]
pub trait Marketplace: Send + Sync {
    /// Target name used in logs (e.g. `"ozon"`, `"yandex-fbs"`).
    fn name(&self) -> &str;

    fn limits(&self) -> BatchLimits;

    /// How this marketplace signals the last catalog page.
    fn termination(&self) -> &dyn PageTermination;

    /// Currency code this marketplace expects on price records.
    fn currency(&self) -> &'static str;

    /// Fields stamped onto stock updates for this run. Called once per run.
    fn stock_shape(&self) -> StockShape {
        StockShape::default()
    }

    /// Fetch one catalog page. `cursor` is empty for the first page.
    async fn fetch_catalog_page(&self, cursor: &str) -> Result<CatalogPage, MarketError>;

    /// Send one batch of stock records. Callers keep `batch` within `limits().stocks`.
    async fn push_stocks(&self, batch: &[StockUpdate]) -> Result<Ack, MarketError>;

    /// Send one batch of price records. Callers keep `batch` within `limits().prices`.
    async fn push_prices(&self, batch: &[PriceUpdate]) -> Result<Ack, MarketError>;
}

// ---------------------------------------------------------------------------
// HTTP helpers shared by adapters
// ---------------------------------------------------------------------------

pub(crate) async fn send(
    req: reqwest::RequestBuilder,
    source: &str,
) -> Result<(u16, Value), MarketError> {
    let resp = req
        .send()
        .await
        .map_err(|e| MarketError::Transport(format!("{source} request failed: {e}")))?;

    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| MarketError::Transport(format!("{source} response read failed: {e}")))?;

    if !status.is_success() {
        return Err(MarketError::Rejected {
            status: status.as_u16(),
            message: truncate(&text, 512),
        });
    }

    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|e| {
            MarketError::DataShape(format!("{source} response is not json: {e}"))
        })?
    };

    Ok((status.as_u16(), body))
}

pub(crate) fn decode<T: DeserializeOwned>(body: Value, what: &str) -> Result<T, MarketError> {
    serde_json::from_value(body)
        .map_err(|e| MarketError::DataShape(format!("{what} response decode failed: {e}")))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}
