//! Candidate, record and result types.

use serde::{Deserialize, Serialize};

/// A newly released track with its embedding.
///
/// Candidates are identified by their position in the input slice; two
/// candidates may share artist and title.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateTrack {
    /// Primary artist name.
    pub artist: String,
    /// Track title.
    pub title: String,
    /// Embedding vector (dimension `D`).
    pub embedding: Vec<f32>,
}

impl CandidateTrack {
    /// Create a candidate.
    pub fn new(artist: impl Into<String>, title: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            embedding,
        }
    }
}

/// Per-candidate summary of how well it matches the seed set.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateRecord {
    /// Position of the candidate in the input.
    pub index: usize,
    /// Primary artist name.
    pub artist: String,
    /// Track title.
    pub title: String,
    /// Highest similarity to any seed.
    pub best_similarity: f64,
    /// Position of the most similar seed (lowest index on ties).
    pub closest_seed: usize,
    /// Name of the most similar seed.
    pub closest_seed_name: String,
}

/// One selected track, as returned by [`crate::select_top_k`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Primary artist name.
    pub artist: String,
    /// Track title.
    pub title: String,
    /// Cosine similarity to the closest seed, in `[-1, 1]`.
    pub similarity: f32,
    /// Name of the closest seed.
    pub closest_seed: String,
}

impl From<CandidateRecord> for Match {
    fn from(r: CandidateRecord) -> Self {
        Self {
            artist: r.artist,
            title: r.title,
            similarity: r.best_similarity as f32,
            closest_seed: r.closest_seed_name,
        }
    }
}
