//! Selection engine configuration.

use serde::{Deserialize, Serialize};

/// Default rank of the reduced space.
pub const DEFAULT_REDUCED_DIMS: usize = 50;
/// Default share of `k` one artist may occupy.
pub const DEFAULT_ARTIST_CAP_RATIO: f64 = 0.2;

/// Tunables for [`crate::select_top_k_with`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    /// Rank `R` of the PCA projection. Requires at least `R` candidates.
    pub reduced_dims: usize,
    /// Artist cap as a fraction of `k`: `cap = floor(ratio · k)`.
    pub artist_cap_ratio: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            reduced_dims: DEFAULT_REDUCED_DIMS,
            artist_cap_ratio: DEFAULT_ARTIST_CAP_RATIO,
        }
    }
}

impl SelectionConfig {
    /// Set the projection rank.
    #[must_use]
    pub const fn with_reduced_dims(mut self, reduced_dims: usize) -> Self {
        self.reduced_dims = reduced_dims;
        self
    }

    /// Set the artist cap ratio.
    #[must_use]
    pub const fn with_artist_cap_ratio(mut self, ratio: f64) -> Self {
        self.artist_cap_ratio = ratio;
        self
    }
}
