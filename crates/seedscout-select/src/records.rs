//! Candidate records: best similarity and closest seed per candidate.

use std::cmp::Ordering;

use ndarray::Array2;

use crate::errors::{Result, SelectionError};
use crate::types::{CandidateRecord, CandidateTrack};

/// Build one record per candidate, in candidate order.
///
/// `best_similarity` is the row maximum of `sim`; `closest_seed` is its
/// argmax, keeping the lowest seed index on ties.
pub fn build_records(
    sim: &Array2<f64>,
    seed_names: &[String],
    candidates: &[CandidateTrack],
) -> Result<Vec<CandidateRecord>> {
    if seed_names.is_empty() {
        return Err(SelectionError::NoSeeds);
    }
    if sim.nrows() != candidates.len() {
        return Err(SelectionError::DimensionMismatch {
            expected: candidates.len(),
            got: sim.nrows(),
        });
    }
    if sim.ncols() != seed_names.len() {
        return Err(SelectionError::DimensionMismatch {
            expected: seed_names.len(),
            got: sim.ncols(),
        });
    }

    let records = sim
        .rows()
        .into_iter()
        .zip(candidates)
        .enumerate()
        .map(|(index, (row, candidate))| {
            let mut best = 0;
            for (j, &s) in row.iter().enumerate() {
                if s > row[best] {
                    best = j;
                }
            }
            CandidateRecord {
                index,
                artist: candidate.artist.clone(),
                title: candidate.title.clone(),
                best_similarity: row[best],
                closest_seed: best,
                closest_seed_name: seed_names[best].clone(),
            }
        })
        .collect();
    Ok(records)
}

/// Record positions ordered by `best_similarity` descending.
///
/// The sort is stable: equal scores keep candidate order.
pub fn global_ranking(records: &[CandidateRecord]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| descending(records[a].best_similarity, records[b].best_similarity));
    order
}

/// Comparator for descending scores (IEEE total order).
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
