//! `wsync sync`: one run over every selected target.
//!
//! The feed is fetched once and shared read-only. Targets run one after
//! another; a failing target is logged and skipped, and the run exits
//! non-zero at the end if any target failed.

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};
use wsync_config::TargetConfig;
use wsync_feed::{ArchiveFeed, RemnantsSource, SpreadsheetFile};
use wsync_market::{
    dispatch_prices, dispatch_stocks, fetch_all_offer_ids, MarketError, Marketplace,
};
use wsync_reconcile::{reconcile, RemnantRecord, ReconcileReport};

use super::{build_market, load_config};

#[derive(Debug, Clone)]
pub struct SyncArgs {
    pub config_paths: Vec<String>,
    pub targets: Vec<String>,
    pub dry_run: bool,
    pub feed_file: Option<String>,
    pub strict_config: bool,
}

/// What one target's sync did.
#[derive(Debug, Clone, Default)]
pub struct TargetSummary {
    pub catalog_size: usize,
    pub stock_updates: usize,
    pub price_updates: usize,
    pub report: ReconcileReport,
    pub stock_batches: usize,
    pub price_batches: usize,
    pub rejected_items: usize,
}

pub async fn run_sync(args: SyncArgs) -> Result<()> {
    let (loaded, cfg) = load_config(&args.config_paths, args.strict_config)?;
    let targets = cfg.select_targets(&args.targets)?;
    println!("config_hash={}", loaded.config_hash);
    println!("targets={} dry_run={}", targets.len(), args.dry_run);

    let source: Box<dyn RemnantsSource> = match &args.feed_file {
        Some(path) => Box::new(SpreadsheetFile::new(path).with_header_row(cfg.feed.header_row)),
        None => Box::new(ArchiveFeed::new(&cfg.feed.url).with_header_row(cfg.feed.header_row)),
    };
    let remnants = source
        .fetch_remnants()
        .await
        .with_context(|| format!("FEED_UNAVAILABLE source={}", source.describe()))?;
    println!("feed_records={}", remnants.len());

    let mut failed: Vec<&str> = Vec::new();
    for target in &targets {
        match sync_one(target, &remnants, args.dry_run).await {
            Ok(s) => print_summary(target, &s),
            Err((class, err)) => {
                error!(
                    target_name = %target.name,
                    class,
                    error = %format!("{err:#}"),
                    "target sync failed"
                );
                println!(
                    "target={} marketplace={} status=failed class={}",
                    target.name,
                    target.marketplace.as_str(),
                    class
                );
                failed.push(&target.name);
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "SYNC_FAILED: {} of {} target(s) failed: {}",
            failed.len(),
            targets.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

/// Setup problems (credentials) are classed `config`; everything after is
/// classed by the marketplace error.
async fn sync_one(
    target: &TargetConfig,
    remnants: &[RemnantRecord],
    dry_run: bool,
) -> std::result::Result<TargetSummary, (&'static str, anyhow::Error)> {
    let market = build_market(target).map_err(|e| ("config", e))?;
    sync_target(market.as_ref(), remnants, dry_run)
        .await
        .map_err(|e| (e.class(), anyhow::Error::new(e)))
}

/// Fetch catalog, reconcile, then push stocks and prices.
///
/// Stocks go out before prices. With `dry_run` nothing is sent.
pub async fn sync_target(
    market: &dyn Marketplace,
    remnants: &[RemnantRecord],
    dry_run: bool,
) -> std::result::Result<TargetSummary, MarketError> {
    let catalog = fetch_all_offer_ids(market).await?;
    let rec = reconcile(remnants, &catalog, &market.stock_shape(), market.currency())?;
    info!(
        target_name = market.name(),
        matched = rec.report.matched,
        missing_from_feed = rec.report.missing_from_feed,
        unknown_to_market = rec.report.unknown_to_market,
        "reconciled"
    );
    if rec.report.unknown_to_market > 0 || rec.report.duplicate_codes > 0 {
        warn!(
            target_name = market.name(),
            unknown_to_market = rec.report.unknown_to_market,
            duplicate_codes = rec.report.duplicate_codes,
            "feed rows dropped: code not in catalog or repeated"
        );
    }

    let mut summary = TargetSummary {
        catalog_size: catalog.len(),
        stock_updates: rec.stocks.len(),
        price_updates: rec.prices.len(),
        report: rec.report,
        ..TargetSummary::default()
    };
    if dry_run {
        return Ok(summary);
    }

    let stocks = dispatch_stocks(market, &rec.stocks).await?;
    let prices = dispatch_prices(market, &rec.prices).await?;
    summary.stock_batches = stocks.batches;
    summary.price_batches = prices.batches;
    summary.rejected_items = stocks.rejected_items + prices.rejected_items;
    Ok(summary)
}

fn print_summary(target: &TargetConfig, s: &TargetSummary) {
    println!(
        "target={} marketplace={} status=ok catalog_size={} stock_updates={} in_stock={} \
         price_updates={} unknown_to_market={} duplicate_codes={} stock_batches={} \
         price_batches={} rejected_items={}",
        target.name,
        target.marketplace.as_str(),
        s.catalog_size,
        s.stock_updates,
        s.report.in_stock,
        s.price_updates,
        s.report.unknown_to_market,
        s.report.duplicate_codes,
        s.stock_batches,
        s.price_batches,
        s.rejected_items
    );
}
