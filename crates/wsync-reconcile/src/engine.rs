use std::collections::HashSet;

use crate::{
    normalize_price, OfferCatalog, PriceUpdate, ReconcileError, ReconcileReport, RemnantRecord,
    StockShape, StockUpdate,
};

/// Feed sentinel for "more than ten in stock".
pub const QTY_OVER_TEN: &str = ">10";
/// Stock pushed for [`QTY_OVER_TEN`].
pub const QTY_OVER_TEN_STOCK: i64 = 100;
/// Feed sentinel for a single unit.
pub const QTY_RESERVED: &str = "1";
/// Stock pushed for [`QTY_RESERVED`].
///
/// The supplier's last unit is held back for its own retail, so a lone unit is
/// published as unavailable. This is a business rule of the feed, not an
/// off-by-one; keep it until the feed's producer says otherwise.
pub const QTY_RESERVED_STOCK: i64 = 0;

/// Map a raw feed quantity to the stock count pushed to a marketplace.
///
/// `">10"` becomes 100, `"1"` becomes 0, anything else must parse as an integer.
pub fn resolve_quantity(code: &str, raw: &str) -> Result<i64, ReconcileError> {
    match raw {
        QTY_OVER_TEN => Ok(QTY_OVER_TEN_STOCK),
        QTY_RESERVED => Ok(QTY_RESERVED_STOCK),
        other => other
            .trim()
            .parse::<i64>()
            .map_err(|_| ReconcileError::InvalidQuantity {
                code: code.to_string(),
                raw: raw.to_string(),
            }),
    }
}

/// Output of one reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    /// Exactly one entry per catalog offer: feed order first, then the
    /// remaining catalog offers in catalog order.
    pub stocks: Vec<StockUpdate>,
    /// Only offers present in both the feed and the catalog, in feed order.
    pub prices: Vec<PriceUpdate>,
    pub report: ReconcileReport,
}

/// Reconcile the remnants feed against a marketplace catalog.
///
/// - A feed row whose code is still in the working set yields one stock and one
///   price update; the code then leaves the working set, so a repeated code in
///   the feed is ignored (first occurrence wins).
/// - Feed rows for codes the catalog does not know are skipped.
/// - Catalog offers never matched get stock 0 and no price update.
///
/// Any malformed quantity or price on a matched row aborts the whole pass: a
/// partial result would push wrong data.
pub fn reconcile(
    remnants: &[RemnantRecord],
    catalog: &OfferCatalog,
    shape: &StockShape,
    currency: &str,
) -> Result<Reconciliation, ReconcileError> {
    let mut remaining: HashSet<&str> = catalog.ids().iter().map(String::as_str).collect();
    let mut matched: HashSet<&str> = HashSet::new();

    let mut stocks: Vec<StockUpdate> = Vec::with_capacity(catalog.len());
    let mut prices: Vec<PriceUpdate> = Vec::new();
    let mut report = ReconcileReport::default();

    for row in remnants {
        let code = row.code.as_str();
        if !remaining.remove(code) {
            if matched.contains(code) {
                report.duplicate_codes += 1;
            } else {
                report.unknown_to_market += 1;
            }
            continue;
        }
        matched.insert(code);

        let count = resolve_quantity(code, &row.quantity)?;
        let price = normalize_price(&row.price);
        if price.is_empty() {
            return Err(ReconcileError::InvalidPrice {
                code: code.to_string(),
                raw: row.price.clone(),
            });
        }

        stocks.push(StockUpdate::new(code, count, shape));
        prices.push(PriceUpdate {
            offer_id: code.to_string(),
            price,
            currency: currency.to_string(),
        });
        report.matched += 1;
    }

    for id in catalog.ids() {
        if remaining.contains(id.as_str()) {
            stocks.push(StockUpdate::new(id.as_str(), 0, shape));
            report.missing_from_feed += 1;
        }
    }

    report.in_stock = stocks.iter().filter(|s| s.is_in_stock()).count();

    Ok(Reconciliation {
        stocks,
        prices,
        report,
    })
}

/// Stock half of [`reconcile`].
pub fn build_stock_updates(
    remnants: &[RemnantRecord],
    catalog: &OfferCatalog,
    shape: &StockShape,
) -> Result<Vec<StockUpdate>, ReconcileError> {
    // Currency is irrelevant for stock records.
    reconcile(remnants, catalog, shape, "").map(|r| r.stocks)
}

/// Price half of [`reconcile`].
pub fn build_price_updates(
    remnants: &[RemnantRecord],
    catalog: &OfferCatalog,
    currency: &str,
) -> Result<Vec<PriceUpdate>, ReconcileError> {
    reconcile(remnants, catalog, &StockShape::default(), currency).map(|r| r.prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_ten_sentinel_maps_to_hundred() {
        assert_eq!(resolve_quantity("A", ">10").unwrap(), 100);
    }

    /// Intentional: the feed's "1" means the last unit is reserved.
    #[test]
    fn single_unit_sentinel_maps_to_zero() {
        assert_eq!(resolve_quantity("A", "1").unwrap(), 0);
    }

    #[test]
    fn literal_counts_pass_through() {
        assert_eq!(resolve_quantity("A", "37").unwrap(), 37);
        assert_eq!(resolve_quantity("A", "0").unwrap(), 0);
        assert_eq!(resolve_quantity("A", " 7 ").unwrap(), 7);
    }

    #[test]
    fn non_integer_quantity_is_rejected_with_code() {
        let err = resolve_quantity("W-1", "many").unwrap_err();
        assert_eq!(
            err,
            ReconcileError::InvalidQuantity {
                code: "W-1".to_string(),
                raw: "many".to_string(),
            }
        );
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let remnants = vec![RemnantRecord::new("A", "5", "10.00")];
        let r = reconcile(&remnants, &OfferCatalog::new(), &StockShape::default(), "RUB").unwrap();
        assert!(r.stocks.is_empty());
        assert!(r.prices.is_empty());
        assert_eq!(r.report.unknown_to_market, 1);
    }

    #[test]
    fn bad_quantity_on_unknown_code_is_ignored() {
        let remnants = vec![RemnantRecord::new("Z", "n/a", "")];
        let catalog: OfferCatalog = ["A"].into_iter().collect();
        let r = reconcile(&remnants, &catalog, &StockShape::default(), "RUB").unwrap();
        assert_eq!(r.stocks.len(), 1);
        assert_eq!(r.stocks[0].count, 0);
    }

    #[test]
    fn price_without_digits_aborts() {
        let remnants = vec![RemnantRecord::new("A", "5", "руб.")];
        let catalog: OfferCatalog = ["A"].into_iter().collect();
        let err = reconcile(&remnants, &catalog, &StockShape::default(), "RUB").unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidPrice { .. }));
    }
}
