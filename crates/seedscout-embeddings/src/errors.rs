//! Embedding error types.

use seedscout_select::SelectionError;
use thiserror::Error;

/// Errors from embedding and embedding-cache operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model download or session creation failed.
    #[error("model initialization failed: {0}")]
    ModelInit(String),

    /// Inference failed or produced an unexpected shape.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Embedder not ready (model not loaded).
    #[error("embedder not ready")]
    NotReady,

    /// Cache file read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file is not valid JSON.
    #[error("invalid embedding file: {0}")]
    Json(#[from] serde_json::Error),

    /// Two vectors that must agree in length do not.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
}

impl From<SelectionError> for EmbeddingError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::DimensionMismatch { expected, got } => {
                Self::DimensionMismatch { expected, got }
            }
            other => Self::Inference(other.to_string()),
        }
    }
}

/// Result alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;
