//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so partial
//! JSON is accepted and missing fields get their compiled default.

mod analysis;
mod sources;

pub use analysis::*;
pub use sources::*;

use std::path::PathBuf;

use seedscout_core::logging::LogFormat;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};
use crate::loader::expand_home;

/// Root settings type.
///
/// Loaded from `~/.seedscout/settings.json` with defaults applied for
/// missing fields. Environment variables can override specific values.
///
/// ```json
/// {
///   "catalog": { "countryId": 116 },
///   "selection": { "topK": 20 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedscoutSettings {
    /// Catalog API settings.
    pub catalog: CatalogSettings,
    /// Audio decode settings.
    pub audio: AudioSettings,
    /// Embedding model settings.
    pub embedding: EmbeddingSettings,
    /// Selection engine settings.
    pub selection: SelectionSettings,
    /// On-disk locations.
    pub workspace: WorkspaceSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Widest release window accepted by [`SeedscoutSettings::validate`].
pub const MAX_DAYS_BACK: u32 = 365;

impl SeedscoutSettings {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(SettingsError::InvalidValue(msg.to_string()));

        if self.selection.top_k == 0 {
            return invalid("selection.topK must be at least 1");
        }
        if self.selection.reduced_dims == 0 {
            return invalid("selection.reducedDims must be at least 1");
        }
        let ratio = self.selection.artist_cap_ratio;
        if ratio.is_nan() || ratio <= 0.0 || ratio > 1.0 {
            return invalid("selection.artistCapRatio must be in (0, 1]");
        }
        if self.audio.sample_rate == 0 {
            return invalid("audio.sampleRate must be positive");
        }
        if self.embedding.dimensions == 0 {
            return invalid("embedding.dimensions must be positive");
        }
        if self.embedding.window_seconds.is_nan()
            || self.embedding.window_seconds <= 0.0
            || self.embedding.hop_seconds.is_nan()
            || self.embedding.hop_seconds <= 0.0
        {
            return invalid("embedding.windowSeconds and embedding.hopSeconds must be positive");
        }
        if self.embedding.batch_size == 0 {
            return invalid("embedding.batchSize must be at least 1");
        }
        if self.catalog.concurrency == 0 {
            return invalid("catalog.concurrency must be at least 1");
        }
        if !(1..=MAX_DAYS_BACK).contains(&self.catalog.days_back) {
            return invalid("catalog.daysBack must be in 1..=365");
        }
        Ok(())
    }
}

/// On-disk locations used by the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceSettings {
    /// Root data directory; `~` expands to `$HOME`.
    pub data_dir: String,
    /// Directory of seed audio files (relative to `data_dir` unless absolute).
    pub seeds_dir: String,
    /// Keep downloaded candidate embeddings after a run.
    pub keep_artifacts: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.seedscout".to_string(),
            seeds_dir: "seeds".to_string(),
            keep_artifacts: false,
        }
    }
}

    impl WorkspaceSettings {
    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    /// Seeds directory, resolved against [`data_path`](Self::data_path) when relative.
    pub fn seeds_path(&self) -> PathBuf {
        let seeds = expand_home(&self.seeds_dir);
        if seeds.is_absolute() {
            seeds
        } else {
            self.data_path().join(seeds)
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
