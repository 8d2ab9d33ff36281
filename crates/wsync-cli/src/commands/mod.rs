//! Command handler modules for wsync.
//!
//! Shared config and adapter wiring lives here.

pub mod catalog;
pub mod sync;

use anyhow::Result;
use wsync_config::{
    report_unused_keys, resolve_target_secrets, BatchOverride, LoadedConfig, SyncConfig,
    TargetConfig, TargetCredentials, UnusedKeyPolicy,
};
use wsync_market::ozon::OZON_API_BASE;
use wsync_market::yandex::YANDEX_API_BASE;
use wsync_market::{BatchLimits, Marketplace, OzonSeller, YandexMarket};

/// Load, lint and type-check the layered config.
pub fn load_config(paths: &[String], strict: bool) -> Result<(LoadedConfig, SyncConfig)> {
    let loaded = wsync_config::load_layered_yaml(paths)?;

    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;
    if !report.is_clean() {
        eprintln!(
            "WARN: CONFIG_UNUSED_KEYS unused_leaf_keys={}",
            report.unused_leaf_pointers.len()
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            eprintln!("  unused={}", p);
        }
        let extra = report.unused_leaf_pointers.len().saturating_sub(50);
        if extra > 0 {
            eprintln!("  ... and {} more", extra);
        }
    }

    let cfg = loaded.sync_config()?;
    Ok((loaded, cfg))
}

/// Resolve a target's credentials and build its adapter.
pub fn build_market(target: &TargetConfig) -> Result<Box<dyn Marketplace>> {
    let creds = resolve_target_secrets(target)?;
    let market: Box<dyn Marketplace> = match creds {
        TargetCredentials::Ozon { client_id, api_key } => {
            let base = target
                .base_url
                .clone()
                .unwrap_or_else(|| OZON_API_BASE.to_string());
            let seller = OzonSeller::new_with_base_url(&target.name, client_id, api_key, base);
            let limits = override_limits(seller.limits(), target.batch);
            Box::new(seller.with_limits(limits))
        }
        TargetCredentials::Yandex {
            token,
            campaign_id,
            warehouse_id,
        } => {
            let base = target
                .base_url
                .clone()
                .unwrap_or_else(|| YANDEX_API_BASE.to_string());
            let market =
                YandexMarket::new_with_base_url(&target.name, token, campaign_id, warehouse_id, base);
            let limits = override_limits(market.limits(), target.batch);
            Box::new(market.with_limits(limits))
        }
    };
    Ok(market)
}

fn override_limits(defaults: BatchLimits, batch: BatchOverride) -> BatchLimits {
    BatchLimits {
        stocks: batch.stocks.unwrap_or(defaults.stocks),
        prices: batch.prices.unwrap_or(defaults.prices),
    }
}
