//! # seedscout-select
//!
//! Similarity scoring and diversified top-k selection.
//!
//! Given a set of seed embeddings (the taste target) and a set of candidate
//! tracks, [`select_top_k`] returns at most `k` candidates that are close to
//! the seeds while spreading the picks across seeds and artists.
//!
//! ## Pipeline
//!
//! 1. [`reduce`]: fit a rank-`R` PCA projection on the candidates, apply it
//!    to candidates and seeds, normalize every row to unit length.
//! 2. [`score`]: cosine similarity for every candidate/seed pair.
//! 3. [`records`]: best similarity and closest seed per candidate.
//! 4. [`select`]: per-seed fairness round, global fallback fill, artist cap.
//!
//! Everything here is synchronous and free of shared state; independent
//! runs may execute concurrently.

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod errors;
pub mod matrix;
pub mod records;
pub mod reduce;
pub mod score;
pub mod select;
pub mod store;
pub mod types;

pub use config::SelectionConfig;
pub use engine::{select_top_k, select_top_k_with};
pub use errors::{Result, SelectionError};
pub use reduce::Projection;
pub use store::{EmbeddingStore, SeedSet};
pub use types::{CandidateRecord, CandidateTrack, Match};
