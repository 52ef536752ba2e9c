//! `select_top_k`: the engine entry point.

use tracing::{debug, info_span};

use crate::config::SelectionConfig;
use crate::errors::{Result, SelectionError};
use crate::matrix::stack_rows;
use crate::records::build_records;
use crate::reduce::fit_transform;
use crate::score::cosine_matrix;
use crate::select::select;
use crate::store::SeedSet;
use crate::types::{CandidateTrack, Match};

/// Select at most `k` candidates with the default [`SelectionConfig`].
pub fn select_top_k(seeds: &SeedSet, candidates: &[CandidateTrack], k: usize) -> Result<Vec<Match>> {
    select_top_k_with(SelectionConfig::default(), seeds, candidates, k)
}

/// Select at most `k` candidates closest to `seeds`.
///
/// Seeds are visited in the store's iteration order during the fairness
/// round. The result is sorted by similarity, descending; equal scores keep
/// candidate order.
///
/// # Errors
///
/// Checked in order, before any computation: [`SelectionError::NoSeeds`],
/// [`SelectionError::InvalidK`], [`SelectionError::EmptyCandidateSet`],
/// [`SelectionError::DimensionMismatch`], [`SelectionError::NonFiniteValue`] and
/// [`SelectionError::InsufficientData`].
pub fn select_top_k_with(
    config: SelectionConfig,
    seeds: &SeedSet,
    candidates: &[CandidateTrack],
    k: usize,
) -> Result<Vec<Match>> {
    let span = info_span!(
        "select_top_k",
        k,
        seeds = seeds.len(),
        candidates = candidates.len(),
        reduced_dims = config.reduced_dims,
    );
    let _guard = span.enter();

    validate(&config, seeds, candidates, k)?;

    let candidate_matrix = stack_rows(candidates.iter().map(|c| c.embedding.as_slice()), None)?;
    let dims = candidate_matrix.ncols();
    let seed_matrix = stack_rows(seeds.iter().map(|(_, v)| v), Some(dims))?;

    let (reduced_candidates, projection) = fit_transform(&candidate_matrix, config.reduced_dims)?;
    let reduced_seeds = projection.transform(&seed_matrix)?;
    debug!(
        rank = projection.rank(),
        input_dims = projection.input_dims(),
        "projection fitted on candidates"
    );

    let sim = cosine_matrix(&reduced_candidates, &reduced_seeds)?;
    let seed_names = seeds.names();
    let records = build_records(&sim, &seed_names, candidates)?;
    let picked = select(&sim, &seed_names, &records, k, config.artist_cap_ratio)?;

    debug!(selected = picked.len(), "selection complete");
    Ok(picked.into_iter().map(Match::from).collect())
}

fn validate(
    config: &SelectionConfig,
    seeds: &SeedSet,
    candidates: &[CandidateTrack],
    k: usize,
) -> Result<()> {
    if seeds.is_empty() {
        return Err(SelectionError::NoSeeds);
    }
    if k == 0 {
        return Err(SelectionError::InvalidK(k));
    }
    let Some(first) = candidates.first() else {
        return Err(SelectionError::EmptyCandidateSet);
    };

    let dims = first.embedding.len();
    let lengths = candidates
        .iter()
        .map(|c| c.embedding.len())
        .chain(seeds.iter().map(|(_, v)| v.len()));
    for got in lengths {
        if got != dims {
            return Err(SelectionError::DimensionMismatch {
                expected: dims,
                got,
            });
        }
    }

    let candidate_vectors = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| ("candidate", i, c.embedding.as_slice()));
    let seed_vectors = seeds.iter().enumerate().map(|(i, (_, v))| ("seed", i, v));
    for (set, index, v) in candidate_vectors.chain(seed_vectors) {
        if v.iter().any(|x| !x.is_finite()) {
            return Err(SelectionError::NonFiniteValue { set, index });
        }
    }

    let rank = config.reduced_dims;
    if rank == 0 || candidates.len() < rank || dims < rank {
        return Err(SelectionError::InsufficientData {
            rank,
            samples: candidates.len(),
            features: dims,
        });
    }
    Ok(())
}
