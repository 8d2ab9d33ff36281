//! Env-name secret resolution.
//!
//! Config YAML stores only environment variable NAMES. Callers resolve a
//! target's credentials once, right before building its adapter, and pass the
//! values into the constructor. Error messages carry the NAME, never the value.

use anyhow::{bail, Result};

use crate::{MarketplaceKind, TargetConfig};

/// Credentials and identifiers for one target, read from the environment.
/// **Secret values are redacted in `Debug` output.**
#[derive(Clone)]
pub enum TargetCredentials {
    Ozon {
        client_id: String,
        api_key: String,
    },
    Yandex {
        token: String,
        campaign_id: String,
        warehouse_id: String,
    },
}

impl std::fmt::Debug for TargetCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetCredentials::Ozon { .. } => f
                .debug_struct("Ozon")
                .field("client_id", &"<REDACTED>")
                .field("api_key", &"<REDACTED>")
                .finish(),
            TargetCredentials::Yandex {
                campaign_id,
                warehouse_id,
                ..
            } => f
                .debug_struct("Yandex")
                .field("token", &"<REDACTED>")
                .field("campaign_id", campaign_id)
                .field("warehouse_id", warehouse_id)
                .finish(),
        }
    }
}

/// Unset or blank counts as missing.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn required(target: &TargetConfig, key: &str) -> Result<String> {
    let Some(var) = target.env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        bail!(
            "SECRETS_MISSING target={}: no env var named for '{}'",
            target.name,
            key
        );
    };
    match resolve_env(var) {
        Some(v) => Ok(v),
        None => bail!(
            "SECRETS_MISSING target={}: required env var '{}' ({}) is not set or empty",
            target.name,
            var,
            key
        ),
    }
}

/// Resolve every credential `target` needs from the process environment.
///
/// # Errors
/// Names the first missing environment variable.
pub fn resolve_target_secrets(target: &TargetConfig) -> Result<TargetCredentials> {
    match target.marketplace {
        MarketplaceKind::Ozon => Ok(TargetCredentials::Ozon {
            client_id: required(target, "client_id")?,
            api_key: required(target, "api_key")?,
        }),
        MarketplaceKind::Yandex => Ok(TargetCredentials::Yandex {
            token: required(target, "token")?,
            campaign_id: required(target, "campaign_id")?,
            warehouse_id: required(target, "warehouse_id")?,
        }),
    }
}
