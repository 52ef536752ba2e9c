//! Audio embedder configuration.

use std::path::PathBuf;

use seedscout_settings::{EmbeddingSettings, expand_home};
use serde::{Deserialize, Serialize};

/// Configuration for the ONNX audio embedder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedderConfig {
    /// Hugging Face repository to download the model from.
    pub model_repo: Option<String>,
    /// Model file name inside the repository.
    pub model_file: String,
    /// Local model file; skips the download when set.
    pub model_path: Option<PathBuf>,
    /// Download cache directory.
    pub cache_dir: PathBuf,
    /// Output embedding dimension.
    pub dimensions: usize,
    /// Input sample rate the model expects.
    pub sample_rate: u32,
    /// Analysis window length in seconds.
    pub window_seconds: f32,
    /// Hop between windows in seconds.
    pub hop_seconds: f32,
    /// Windows per inference call.
    pub batch_size: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self::from_settings(&EmbeddingSettings::default(), 48_000, PathBuf::from("models"))
    }
}

impl EmbedderConfig {
    /// Build from settings. `cache_dir` receives hub downloads.
    pub fn from_settings(s: &EmbeddingSettings, sample_rate: u32, cache_dir: PathBuf) -> Self {
        Self {
            model_repo: s.model_repo.clone(),
            model_file: s.model_file.clone(),
            model_path: s.model_path.as_deref().map(expand_home),
            cache_dir,
            dimensions: s.dimensions,
            sample_rate,
            window_seconds: s.window_seconds,
            hop_seconds: s.hop_seconds,
            batch_size: s.batch_size,
        }
    }

    /// Window length in samples (at least 1).
    pub fn window_samples(&self) -> usize {
        seconds_to_samples(self.window_seconds, self.sample_rate)
    }

    /// Hop length in samples (at least 1).
    pub fn hop_samples(&self) -> usize {
        seconds_to_samples(self.hop_seconds, self.sample_rate)
    }
}

fn seconds_to_samples(seconds: f32, rate: u32) -> usize {
    let n = (f64::from(seconds) * f64::from(rate)).round();
    if n.is_finite() && n >= 1.0 { n as usize } else { 1 }
}
