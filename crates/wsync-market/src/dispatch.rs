use serde::Serialize;
use tracing::{info, warn};
use wsync_reconcile::{chunk, PriceUpdate, StockUpdate};

use crate::{Ack, MarketError, Marketplace};

/// Totals for one dispatch of a record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub batches: usize,
    pub records: usize,
    pub rejected_items: usize,
}

impl DispatchSummary {
    fn record(&mut self, len: usize, ack: &Ack) {
        self.batches += 1;
        self.records += len;
        self.rejected_items += ack.rejected_items;
    }
}

/// Send one stock batch. Fails without calling the remote when the batch is
/// over the endpoint ceiling.
pub async fn push_stock(market: &dyn Marketplace, batch: &[StockUpdate]) -> Result<Ack, MarketError> {
    let limit = market.limits().stocks;
    if batch.len() > limit {
        return Err(MarketError::Oversized {
            endpoint: "stocks",
            len: batch.len(),
            limit,
        });
    }
    market.push_stocks(batch).await
}

/// Send one price batch. Fails without calling the remote when the batch is
/// over the endpoint ceiling.
pub async fn push_price(market: &dyn Marketplace, batch: &[PriceUpdate]) -> Result<Ack, MarketError> {
    let limit = market.limits().prices;
    if batch.len() > limit {
        return Err(MarketError::Oversized {
            endpoint: "prices",
            len: batch.len(),
            limit,
        });
    }
    market.push_prices(batch).await
}

/// Chunk `stocks` to the marketplace ceiling and send the batches in order.
///
/// Stops at the first failing batch; earlier batches stay applied remotely.
pub async fn dispatch_stocks(
    market: &dyn Marketplace,
    stocks: &[StockUpdate],
) -> Result<DispatchSummary, MarketError> {
    let mut summary = DispatchSummary::default();
    for batch in chunk(stocks, market.limits().stocks)? {
        let ack = push_stock(market, batch).await?;
        summary.record(batch.len(), &ack);
        if ack.rejected_items > 0 {
            warn!(
                target_name = market.name(),
                batch = summary.batches,
                rejected = ack.rejected_items,
                "stock batch accepted with per-item rejections"
            );
        }
        info!(
            target_name = market.name(),
            batch = summary.batches,
            size = batch.len(),
            "stock batch sent"
        );
    }
    Ok(summary)
}

/// Chunk `prices` to the marketplace ceiling and send the batches in order.
pub async fn dispatch_prices(
    market: &dyn Marketplace,
    prices: &[PriceUpdate],
) -> Result<DispatchSummary, MarketError> {
    let mut summary = DispatchSummary::default();
    for batch in chunk(prices, market.limits().prices)? {
        let ack = push_price(market, batch).await?;
        summary.record(batch.len(), &ack);
        if ack.rejected_items > 0 {
            warn!(
                target_name = market.name(),
                batch = summary.batches,
                rejected = ack.rejected_items,
                "price batch accepted with per-item rejections"
            );
        }
        info!(
            target_name = market.name(),
            batch = summary.batches,
            size = batch.len(),
            "price batch sent"
        );
    }
    Ok(summary)
}
