use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_FEED_URL: &str = "https://timeworld.ru/upload/files/ostatki.zip";
const DEFAULT_HEADER_ROW: usize = 17;

/// Typed view of a merged config tree.
///
/// Extra top-level sections are ignored here; the unused-key lint decides
/// whether they warn or fail. Nested sections reject unknown fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// 0-based sheet row holding the column titles.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            header_row: DEFAULT_HEADER_ROW,
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_header_row() -> usize {
    DEFAULT_HEADER_ROW
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketplaceKind {
    Ozon,
    Yandex,
}

impl MarketplaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketplaceKind::Ozon => "ozon",
            MarketplaceKind::Yandex => "yandex",
        }
    }

    /// Keys every `env:` mapping of this kind must name.
    pub fn required_env_keys(&self) -> &'static [&'static str] {
        match self {
            MarketplaceKind::Ozon => &["client_id", "api_key"],
            MarketplaceKind::Yandex => &["token", "campaign_id", "warehouse_id"],
        }
    }
}

/// Per-endpoint batch ceiling overrides. Absent fields keep the adapter default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchOverride {
    pub stocks: Option<usize>,
    pub prices: Option<usize>,
}

/// One marketplace account/campaign to keep in sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub name: String,
    pub marketplace: MarketplaceKind,
    /// Logical key -> environment variable NAME.
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub batch: BatchOverride,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl SyncConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: SyncConfig = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: config does not match the sync schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.feed.url.trim().is_empty() {
            bail!("CONFIG_INVALID: /feed/url is empty");
        }

        let mut seen = BTreeSet::new();
        for (i, t) in self.targets.iter().enumerate() {
            if t.name.trim().is_empty() {
                bail!("CONFIG_INVALID: /targets/{i}/name is empty");
            }
            if !seen.insert(t.name.as_str()) {
                bail!("CONFIG_INVALID: duplicate target name '{}'", t.name);
            }
            for key in t.marketplace.required_env_keys() {
                let named = t.env.get(*key).map(|v| !v.trim().is_empty()).unwrap_or(false);
                if !named {
                    bail!(
                        "CONFIG_INVALID: target '{}' ({}) must name an env var for '{}' under /targets/{i}/env",
                        t.name,
                        t.marketplace.as_str(),
                        key
                    );
                }
            }
            for (endpoint, size) in [("stocks", t.batch.stocks), ("prices", t.batch.prices)] {
                if size == Some(0) {
                    bail!("CONFIG_INVALID: target '{}' batch.{endpoint} must be > 0", t.name);
                }
            }
        }
        Ok(())
    }

    /// Targets matching `names`, in config order; all targets when `names`
    /// is empty. Unknown names are an error.
    pub fn select_targets(&self, names: &[String]) -> Result<Vec<&TargetConfig>> {
        if names.is_empty() {
            return Ok(self.targets.iter().collect());
        }
        for n in names {
            if !self.targets.iter().any(|t| &t.name == n) {
                bail!("unknown target '{n}'");
            }
        }
        Ok(self
            .targets
            .iter()
            .filter(|t| names.contains(&t.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feed_defaults_apply_when_section_absent() {
        let cfg = SyncConfig::from_json(&json!({})).unwrap();
        assert_eq!(cfg.feed.url, DEFAULT_FEED_URL);
        assert_eq!(cfg.feed.header_row, 17);
        assert!(cfg.targets.is_empty());
    }

    #[test]
    fn extra_top_level_section_is_left_to_the_lint() {
        let cfg = SyncConfig::from_json(&json!({"targets": [], "notes": "hello"})).unwrap();
        assert!(cfg.targets.is_empty());
    }

    #[test]
    fn typo_inside_target_is_rejected() {
        let err = SyncConfig::from_json(&json!({
            "targets": [{
                "name": "ozon",
                "marketplace": "ozon",
                "env": {"client_id": "CLIENT_ID", "api_key": "SELLER_TOKEN"},
                "bacth": {"stocks": 10}
            }]
        }))
        .unwrap_err();
        assert!(format!("{err:#}").contains("bacth"));
    }

    #[test]
    fn yandex_target_needs_warehouse_env_name() {
        let err = SyncConfig::from_json(&json!({
            "targets": [{
                "name": "yandex-fbs",
                "marketplace": "yandex",
                "env": {"token": "MARKET_TOKEN", "campaign_id": "FBS_ID"}
            }]
        }))
        .unwrap_err();
        assert!(format!("{err:#}").contains("'warehouse_id'"));
    }

    #[test]
    fn zero_batch_override_is_rejected() {
        let err = SyncConfig::from_json(&json!({
            "targets": [{
                "name": "ozon",
                "marketplace": "ozon",
                "env": {"client_id": "CLIENT_ID", "api_key": "SELLER_TOKEN"},
                "batch": {"stocks": 0}
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("batch.stocks"));
    }

    #[test]
    fn unknown_marketplace_is_rejected() {
        let err = SyncConfig::from_json(&json!({
            "targets": [{"name": "wb", "marketplace": "wildberries", "env": {}}]
        }))
        .unwrap_err();
        assert!(err.to_string().starts_with("CONFIG_INVALID"));
    }

    #[test]
    fn select_keeps_config_order() {
        let cfg = SyncConfig::from_json(&json!({
            "targets": [
                {"name": "a", "marketplace": "ozon", "env": {"client_id": "C", "api_key": "K"}},
                {"name": "b", "marketplace": "ozon", "env": {"client_id": "C", "api_key": "K"}}
            ]
        }))
        .unwrap();
        let picked = cfg.select_targets(&["b".into(), "a".into()]).unwrap();
        assert_eq!(picked.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        assert!(cfg.select_targets(&["c".into()]).is_err());
    }
}
