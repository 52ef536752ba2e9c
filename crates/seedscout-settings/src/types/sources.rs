//! Catalog and audio settings: where candidates come from and how they are decoded.

use serde::{Deserialize, Serialize};

/// Music catalog (Deezer-compatible API) settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Editorial country/genre id (`0` is the global editorial).
    pub country_id: u64,
    /// Only albums released within this many days are considered.
    pub days_back: u32,
    /// Maximum number of editorial releases to inspect.
    pub album_limit: usize,
    /// HTTP request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Number of previews downloaded and embedded concurrently.
    pub concurrency: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.deezer.com".to_string(),
            country_id: 0,
            days_back: 7,
            album_limit: 20,
            timeout_ms: 30_000,
            concurrency: 4,
        }
    }
}

/// Audio decode settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioSettings {
    /// Target sample rate of every decoded waveform, in Hz.
    pub sample_rate: u32,
    /// Largest preview download accepted, in bytes.
    pub max_download_bytes: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            max_download_bytes: 16 * 1024 * 1024,
        }
    }
}
