//! wsync-config
//!
//! Layered YAML configuration for sync runs. Documents merge in order (later
//! wins), the merged tree is hashed so a run can report exactly what it ran
//! with, and credentials appear only as environment variable NAMES.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;

mod schema;
mod secrets;

pub use schema::{
    BatchOverride, FeedConfig, MarketplaceKind, SyncConfig, TargetConfig, DEFAULT_FEED_URL,
};
pub use secrets::{resolve_target_secrets, TargetCredentials};

/// Leaf string values starting with one of these abort the load with
/// CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",
    "sk_live",
    "sk_test",
    "AKIA",
    "-----BEGIN",
    "ghp_",
    "gho_",
    "glpat-",
    "xoxb-",
    "xoxp-",
    "y0_", // Yandex OAuth token
];

/// JSON-pointer prefixes the sync run reads. A leaf under any of them is
/// consumed; everything else is reported by [`report_unused_keys`].
pub const CONSUMED_PREFIXES: &[&str] = &["/feed", "/targets"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub consumed_prefixes: Vec<String>,
    /// Sorted.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Report config leaves nothing reads.
/// With `UnusedKeyPolicy::Fail` a non-empty report is an error.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let unused: Vec<String> = scalar_leaves(config_json)
        .into_iter()
        .map(|(pointer, _)| pointer)
        .filter(|pointer| !CONSUMED_PREFIXES.iter().any(|c| covers(c, pointer)))
        .collect();

    let report = UnusedKeyReport {
        consumed_prefixes: CONSUMED_PREFIXES.iter().map(|c| c.to_string()).collect(),
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let first: Vec<&String> = report.unused_leaf_pointers.iter().take(12).collect();
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or check for typos. First few: {:?}",
            report.unused_leaf_pointers.len(),
            first
        );
    }

    Ok(report)
}

/// `/targets` covers `/targets` and `/targets/0/name`, not `/targetsx`.
fn covers(section: &str, pointer: &str) -> bool {
    match pointer.strip_prefix(section) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Every scalar in the tree with its RFC 6901 pointer, sorted by pointer.
/// Empty objects and arrays contribute nothing; a scalar root is `/`.
fn scalar_leaves(root: &Value) -> Vec<(String, &Value)> {
    let mut found = Vec::new();
    let mut pending: Vec<(String, &Value)> = vec![(String::new(), root)];
    while let Some((pointer, node)) = pending.pop() {
        match node {
            Value::Object(map) => pending.extend(map.iter().map(|(key, child)| {
                let token = key.replace('~', "~0").replace('/', "~1");
                (format!("{pointer}/{token}"), child)
            })),
            Value::Array(items) => pending.extend(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, child)| (format!("{pointer}/{i}"), child)),
            ),
            scalar if pointer.is_empty() => found.push(("/".to_string(), scalar)),
            scalar => found.push((pointer, scalar)),
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed view of the merged tree.
    pub fn sync_config(&self) -> Result<SyncConfig> {
        SyncConfig::from_json(&self.config_json)
    }
}

pub fn load_layered_yaml<P: AsRef<std::path::Path>>(paths: &[P]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let p = p.as_ref();
        let raw = fs::read_to_string(p)
            .with_context(|| format!("failed to read yaml path: {}", p.display()))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        overlay(&mut merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json =
        serde_json::to_string(&sorted_keys(&merged)).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Lay `upper` over `base`: mappings merge key by key, any other value
/// (lists included) replaces what was there.
fn overlay(base: &mut Value, upper: Value) {
    match (base, upper) {
        (Value::Object(lower), Value::Object(upper)) => {
            for (key, value) in upper {
                match lower.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        lower.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Rebuild objects with keys in sorted order so the serialized form does not
/// depend on YAML key order or on serde_json's map backing.
fn sorted_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sorted_keys(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    for (pointer, leaf) in scalar_leaves(v) {
        if leaf.as_str().is_some_and(looks_like_secret) {
            bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", pointer);
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}
