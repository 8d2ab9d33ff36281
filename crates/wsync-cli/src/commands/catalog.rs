use anyhow::{Context, Result};
use wsync_market::fetch_all_offer_ids;

use super::{build_market, load_config};

/// `wsync catalog`: read-only, sends nothing.
pub async fn run_catalog(config_paths: &[String], target: &str) -> Result<()> {
    let (_, cfg) = load_config(config_paths, false)?;
    let selected = cfg.select_targets(&[target.to_string()])?;
    let t = selected
        .first()
        .with_context(|| format!("unknown target '{target}'"))?;

    let market = build_market(t)?;
    let catalog = fetch_all_offer_ids(market.as_ref())
        .await
        .with_context(|| format!("catalog fetch failed for target '{target}'"))?;

    println!(
        "target={} marketplace={} catalog_size={}",
        t.name,
        t.marketplace.as_str(),
        catalog.len()
    );
    Ok(())
}
