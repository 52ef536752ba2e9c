//! Embedding and selection settings.

use serde::{Deserialize, Serialize};

/// Which audio embedder produces vectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// ONNX Runtime model (requires the `onnx` build feature).
    #[default]
    Onnx,
    /// Deterministic hash-based vectors, for dry runs.
    Mock,
}

/// Audio embedding model settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Embedder implementation.
    pub backend: EmbeddingBackend,
    /// Hugging Face repository holding the model, when not using `model_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_repo: Option<String>,
    /// ONNX file name inside the repository or cache directory.
    pub model_file: String,
    /// Local model path; takes precedence over `model_repo`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    /// Output dimension of the model.
    pub dimensions: usize,
    /// Analysis window length in seconds.
    pub window_seconds: f32,
    /// Hop between analysis windows in seconds.
    pub hop_seconds: f32,
    /// Windows per inference call.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Onnx,
            model_repo: None,
            model_file: "openl3_music_mel128_512.onnx".to_string(),
            model_path: None,
            dimensions: 512,
            window_seconds: 1.0,
            hop_seconds: 0.1,
            batch_size: 32,
        }
    }
}

/// Selection engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionSettings {
    /// Number of tracks to recommend.
    pub top_k: usize,
    /// Rank of the PCA projection.
    pub reduced_dims: usize,
    /// Share of `top_k` a single artist may occupy.
    pub artist_cap_ratio: f64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            top_k: 10,
            reduced_dims: 50,
            artist_cap_ratio: 0.2,
        }
    }
}
