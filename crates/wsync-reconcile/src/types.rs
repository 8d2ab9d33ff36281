use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Feed side
// ---------------------------------------------------------------------------

/// One row of the supplier's remnants feed.
///
/// All fields stay as the raw strings the feed carried; interpretation happens
/// in the engine so that a malformed value is reported against its offer code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemnantRecord {
    /// Supplier product code. Doubles as the marketplace offer key.
    pub code: String,
    /// Literal count, or one of the sentinels `">10"` / `"1"`.
    pub quantity: String,
    /// Localized price, e.g. `"19'990.00 руб."`.
    pub price: String,
}

impl RemnantRecord {
    pub fn new(
        code: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Marketplace side
// ---------------------------------------------------------------------------

/// Offer identifiers known to one marketplace account/campaign, in catalog order.
///
/// Duplicate identifiers returned by a catalog are collapsed (first occurrence
/// kept) so every identifier appears exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OfferCatalog {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl OfferCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an identifier unless it is already present. Returns `true` when added.
    pub fn insert(&mut self, offer_id: impl Into<String>) -> bool {
        let id = offer_id.into();
        if !self.index.insert(id.clone()) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, offer_id: &str) -> bool {
        self.index.contains(offer_id)
    }
}

impl<S: Into<String>> FromIterator<S> for OfferCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for id in iter {
            catalog.insert(id);
        }
        catalog
    }
}

/// Marketplace-specific fields stamped onto every stock update of one run.
///
/// Ozon takes none of them; Yandex wants a warehouse, a stock type and the
/// moment the count was taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StockShape {
    pub warehouse: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub item_type: Option<String>,
}

impl StockShape {
    /// Shape carrying only a warehouse id.
    pub fn warehouse(warehouse: impl Into<String>) -> Self {
        Self {
            warehouse: Some(warehouse.into()),
            ..Self::default()
        }
    }
}

/// Stock record for one offer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub offer_id: String,
    pub warehouse: Option<String>,
    pub count: i64,
    pub updated_at: Option<DateTime<Utc>>,
    pub item_type: Option<String>,
}

impl StockUpdate {
    pub fn new(offer_id: impl Into<String>, count: i64, shape: &StockShape) -> Self {
        Self {
            offer_id: offer_id.into(),
            warehouse: shape.warehouse.clone(),
            count,
            updated_at: shape.updated_at,
            item_type: shape.item_type.clone(),
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.count != 0
    }
}

/// Price record for one offer. `price` is an integer-valued string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub offer_id: String,
    pub price: String,
    pub currency: String,
}

/// Counters describing how the feed lined up with the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Catalog offers found in the feed.
    pub matched: usize,
    /// Catalog offers absent from the feed (zero-filled, no price).
    pub missing_from_feed: usize,
    /// Feed rows whose code the marketplace does not know.
    pub unknown_to_market: usize,
    /// Feed rows skipped because their code was already matched earlier.
    pub duplicate_codes: usize,
    /// Stock updates with a non-zero count.
    pub in_stock: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    /// Quantity is neither a known sentinel nor an integer.
    InvalidQuantity { code: String, raw: String },
    /// Price has no digits before the decimal point.
    InvalidPrice { code: String, raw: String },
    /// Batch size must be at least 1.
    InvalidBatchSize(usize),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::InvalidQuantity { code, raw } => {
                write!(f, "offer '{code}': quantity '{raw}' is not an integer")
            }
            ReconcileError::InvalidPrice { code, raw } => {
                write!(f, "offer '{code}': price '{raw}' has no integer part")
            }
            ReconcileError::InvalidBatchSize(n) => {
                write!(f, "batch size must be >= 1, got {n}")
            }
        }
    }
}

impl std::error::Error for ReconcileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_collapses_duplicates_keeping_first_position() {
        let c: OfferCatalog = ["B", "A", "B", "C", "A"].into_iter().collect();
        assert_eq!(c.ids(), &["B", "A", "C"]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn catalog_insert_reports_novelty() {
        let mut c = OfferCatalog::new();
        assert!(c.insert("X"));
        assert!(!c.insert("X"));
        assert!(c.contains("X"));
        assert!(!c.contains("Y"));
    }

    #[test]
    fn stock_update_takes_shape_fields() {
        let shape = StockShape::warehouse("wh-1");
        let u = StockUpdate::new("A", 5, &shape);
        assert_eq!(u.warehouse.as_deref(), Some("wh-1"));
        assert!(u.updated_at.is_none());
        assert!(u.is_in_stock());
    }
}
