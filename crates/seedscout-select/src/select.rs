//! Diversified top-k selection.
//!
//! Picks at most `k` candidates that are close to the seed set while
//! spreading picks across seeds and artists.
//!
//! # Algorithm
//!
//! | Parameter | Value |
//! |-----------|-------|
//! | `artist_cap` | `floor(ratio · k)`; `0` whenever `k < 5` at the default ratio |
//! | `per_seed_quota` | `ceil(k / S)` |
//!
//! 1. **Fairness round**: for each seed in seed order, walk all candidates
//!    by similarity *to that seed* and take unused ones whose artist is
//!    under the cap, until the seed has contributed `per_seed_quota`.
//! 2. **Fallback fill**: while fewer than `k` are taken, walk the global
//!    ranking (best similarity to any seed) with the same eligibility rule.
//! 3. Sort the union by best similarity (ties: candidate order) and keep
//!    the first `k`.
//!
//! A cap of zero admits no candidate at all, so the result is empty.

use std::collections::HashMap;

use ndarray::Array2;
use tracing::debug;

use crate::errors::{Result, SelectionError};
use crate::records::{descending, global_ranking};
use crate::types::CandidateRecord;

/// Limits derived from `k` and the seed count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionLimits {
    /// Maximum picks sharing one artist string.
    pub artist_cap: usize,
    /// Maximum picks one seed may contribute during the fairness round.
    pub per_seed_quota: usize,
}

impl SelectionLimits {
    /// Derive limits, rejecting `k == 0` and an empty seed set.
    pub fn new(k: usize, seed_count: usize, artist_cap_ratio: f64) -> Result<Self> {
        if k == 0 {
            return Err(SelectionError::InvalidK(k));
        }
        if seed_count == 0 {
            return Err(SelectionError::NoSeeds);
        }
        Ok(Self {
            artist_cap: artist_cap(k, artist_cap_ratio),
            per_seed_quota: k.div_ceil(seed_count),
        })
    }
}

/// `floor(ratio · k)`, never negative.
pub fn artist_cap(k: usize, ratio: f64) -> usize {
    (ratio * k as f64).floor().max(0.0) as usize
}

/// Accumulator threaded through both phases of one selection run.
struct SelectionState<'a> {
    records: &'a [CandidateRecord],
    artist_cap: usize,
    used: Vec<bool>,
    artist_counts: HashMap<&'a str, usize>,
    picked: Vec<usize>,
}

impl<'a> SelectionState<'a> {
    fn new(records: &'a [CandidateRecord], artist_cap: usize) -> Self {
        Self {
            records,
            artist_cap,
            used: vec![false; records.len()],
            artist_counts: HashMap::new(),
            picked: Vec::new(),
        }
    }

    fn is_eligible(&self, i: usize) -> bool {
        if self.used[i] {
            return false;
        }
        let artist = self.records[i].artist.as_str();
        self.artist_counts.get(artist).copied().unwrap_or(0) < self.artist_cap
    }

    fn take(&mut self, i: usize) {
        self.used[i] = true;
        *self
            .artist_counts
            .entry(self.records[i].artist.as_str())
            .or_insert(0) += 1;
        self.picked.push(i);
    }

    fn into_ranked(self, k: usize) -> Vec<CandidateRecord> {
        let records = self.records;
        let mut picked = self.picked;
        picked.sort_by(|&a, &b| {
            descending(records[a].best_similarity, records[b].best_similarity).then(a.cmp(&b))
        });
        picked.truncate(k);
        picked.into_iter().map(|i| records[i].clone()).collect()
    }
}

/// Select at most `k` records from `sim` (`N × S`) and `records` (candidate order).
///
/// `seed_names` fixes the seed priority order of the fairness round and
/// must match the columns of `sim`.
pub fn select(
    sim: &Array2<f64>,
    seed_names: &[String],
    records: &[CandidateRecord],
    k: usize,
    artist_cap_ratio: f64,
) -> Result<Vec<CandidateRecord>> {
    if records.is_empty() {
        return Err(SelectionError::EmptyCandidateSet);
    }
    let limits = SelectionLimits::new(k, seed_names.len(), artist_cap_ratio)?;
    if sim.dim() != (records.len(), seed_names.len()) {
        return Err(SelectionError::DimensionMismatch {
            expected: records.len() * seed_names.len(),
            got: sim.len(),
        });
    }

    debug!(
        k,
        seeds = seed_names.len(),
        candidates = records.len(),
        artist_cap = limits.artist_cap,
        per_seed_quota = limits.per_seed_quota,
        "selecting candidates"
    );

    let mut state = SelectionState::new(records, limits.artist_cap);
    if limits.artist_cap == 0 {
        debug!("artist cap is zero, nothing is eligible");
        return Ok(Vec::new());
    }

    // Phase A: fairness round, seeds in the given order.
    for (j, seed) in seed_names.iter().enumerate() {
        let mut by_seed: Vec<usize> = (0..records.len()).collect();
        by_seed.sort_by(|&a, &b| descending(sim[[a, j]], sim[[b, j]]));

        let mut contributed = 0;
        for i in by_seed {
            if contributed >= limits.per_seed_quota {
                break;
            }
            if state.is_eligible(i) {
                state.take(i);
                contributed += 1;
            }
        }
        debug!(seed = %seed, contributed, "fairness round");
    }

    // Phase B: fallback fill from the global ranking.
    if state.picked.len() < k {
        let before = state.picked.len();
        for i in global_ranking(records) {
            if state.picked.len() >= k {
                break;
            }
            if state.is_eligible(i) {
                state.take(i);
            }
        }
        debug!(added = state.picked.len() - before, "fallback fill");
    }

    Ok(state.into_ranked(k))
}
