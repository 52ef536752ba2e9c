//! Selection error types.
//!
//! Every variant is a validation failure raised before any projection or
//! scoring work starts. A failed run produces no partial result.

use thiserror::Error;

/// Errors from the selection engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Too few candidates (or too few dimensions) to fit the projection.
    #[error(
        "insufficient data: cannot fit a rank-{rank} projection from {samples} samples of dimension {features}"
    )]
    InsufficientData {
        /// Requested projection rank.
        rank: usize,
        /// Number of candidate vectors available.
        samples: usize,
        /// Embedding dimension.
        features: usize,
    },

    /// Two embedding vectors disagree in length.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Length of the reference vector.
        expected: usize,
        /// Length of the offending vector.
        got: usize,
    },

    /// An embedding holds a NaN or infinite component.
    #[error("non-finite value in {set} embedding {index}")]
    NonFiniteValue {
        /// `"candidate"` or `"seed"`.
        set: &'static str,
        /// Position of the offending vector in its set.
        index: usize,
    },

    /// No candidates were supplied.
    #[error("candidate set is empty")]
    EmptyCandidateSet,

    /// `k` must be at least 1.
    #[error("k must be positive, got {0}")]
    InvalidK(usize),

    /// No seeds were supplied.
    #[error("seed set is empty")]
    NoSeeds,
}

/// Result alias for selection operations.
pub type Result<T> = std::result::Result<T, SelectionError>;
