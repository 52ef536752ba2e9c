//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SeedscoutSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply `SEEDSCOUT_*` environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{EmbeddingBackend, SeedscoutSettings};

/// `$HOME`, or `/tmp` when unset.
pub fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

/// Expand a leading `~` to [`home_dir`].
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

/// Resolve the path to the settings file (`~/.seedscout/settings.json`).
pub fn settings_path() -> PathBuf {
    home_dir().join(".seedscout").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<SeedscoutSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults; invalid JSON or out-of-range values are
/// errors.
pub fn load_settings_from_path(path: &Path) -> Result<SeedscoutSettings> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Defaults deep-merged with the file at `path`, without env overrides.
pub fn read_settings_file(path: &Path) -> Result<SeedscoutSettings> {
    let defaults = serde_json::to_value(SeedscoutSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `SEEDSCOUT_*` overrides from the process environment.
pub fn apply_env_overrides(settings: &mut SeedscoutSettings) {
    apply_overrides_with(settings, |name| std::env::var(name).ok());
}

/// Apply `SEEDSCOUT_*` overrides read through `lookup`.
///
/// Invalid values are ignored with a warning and the file/default value is
/// kept.
pub fn apply_overrides_with<F>(settings: &mut SeedscoutSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Catalog ─────────────────────────────────────────────────────
    if let Some(v) = env.string("SEEDSCOUT_CATALOG_URL") {
        settings.catalog.base_url = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = env.u64("SEEDSCOUT_COUNTRY", 0, u64::from(u32::MAX)) {
        settings.catalog.country_id = v;
    }
    if let Some(v) = env.u64("SEEDSCOUT_DAYS_BACK", 1, 365) {
        settings.catalog.days_back = v as u32;
    }
    if let Some(v) = env.usize("SEEDSCOUT_CONCURRENCY", 1, 64) {
        settings.catalog.concurrency = v;
    }

    // ── Audio / embedding ───────────────────────────────────────────
    if let Some(v) = env.u64("SEEDSCOUT_SAMPLE_RATE", 8_000, 192_000) {
        settings.audio.sample_rate = v as u32;
    }
    if let Some(v) = env.string("SEEDSCOUT_MODEL_PATH") {
        settings.embedding.model_path = Some(v);
    }
    if let Some(v) = env.string("SEEDSCOUT_EMBEDDER") {
        match serde_json::from_value::<EmbeddingBackend>(Value::String(v.clone())) {
            Ok(backend) => settings.embedding.backend = backend,
            Err(_) => warn!(key = "SEEDSCOUT_EMBEDDER", value = %v, "unknown embedder, ignoring"),
        }
    }

    // ── Selection ───────────────────────────────────────────────────
    if let Some(v) = env.usize("SEEDSCOUT_TOP_K", 1, 1_000) {
        settings.selection.top_k = v;
    }
    if let Some(v) = env.usize("SEEDSCOUT_REDUCED_DIMS", 1, 4_096) {
        settings.selection.reduced_dims = v;
    }
    if let Some(v) = env.f64("SEEDSCOUT_ARTIST_CAP_RATIO", 0.0, 1.0) {
        settings.selection.artist_cap_ratio = v;
    }

    // ── Workspace / logging ─────────────────────────────────────────
    if let Some(v) = env.string("SEEDSCOUT_DATA_DIR") {
        settings.workspace.data_dir = v;
    }
    if let Some(v) = env.string("SEEDSCOUT_SEEDS_DIR") {
        settings.workspace.seeds_dir = v;
    }
    if let Some(v) = env.bool("SEEDSCOUT_KEEP_ARTIFACTS") {
        settings.workspace.keep_artifacts = v;
    }
    if let Some(v) = env.string("SEEDSCOUT_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within an inclusive range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as an `f64` in `(min, max]`.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.parse().ok()?;
    (n > min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, name: &str, kind: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let val = (self.lookup)(name)?;
        let result = parse(&val);
        if result.is_none() {
            warn!(key = name, value = %val, kind, "invalid env var, ignoring");
        }
        result
    }

    fn bool(&self, name: &str) -> Option<bool> {
        self.parsed(name, "bool", parse_bool)
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        self.parsed(name, "u64", |v| parse_u64_range(v, min, max))
    }

    fn usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        self.parsed(name, "usize", |v| parse_usize_range(v, min, max))
    }

    fn f64(&self, name: &str, min: f64, max: f64) -> Option<f64> {
        self.parsed(name, "f64", |v| parse_f64_range(v, min, max))
    }
}
