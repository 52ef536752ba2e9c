//! Pairwise cosine similarity between reduced candidates and reduced seeds.

use ndarray::Array2;

use crate::errors::{Result, SelectionError};

/// Cosine similarity for every candidate/seed pair.
///
/// Both inputs are expected to hold unit-length rows (as produced by
/// [`crate::reduce::Projection::transform`]), so similarity is a plain dot
/// product. Results are clamped to `[-1, 1]` to absorb rounding drift.
///
/// Returns an `N × S` matrix: `sim[[i, j]]` compares candidate `i` with seed `j`.
pub fn cosine_matrix(candidates: &Array2<f64>, seeds: &Array2<f64>) -> Result<Array2<f64>> {
    if candidates.ncols() != seeds.ncols() {
        return Err(SelectionError::DimensionMismatch {
            expected: candidates.ncols(),
            got: seeds.ncols(),
        });
    }
    let mut sim = candidates.dot(&seeds.t());
    sim.mapv_inplace(|s| s.clamp(-1.0, 1.0));
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ndarray::array;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn shape_is_candidates_by_seeds() {
        let c = array![[1.0, 0.0], [0.0, 1.0], [0.6, 0.8]];
        let s = array![[1.0, 0.0], [0.0, 1.0]];
        let sim = cosine_matrix(&c, &s).unwrap();
        assert_eq!(sim.dim(), (3, 2));
    }

    #[test]
    fn known_values() {
        let c = array![[0.6, 0.8]];
        let s = array![[1.0, 0.0], [0.0, 1.0], [-0.6, -0.8]];
        let sim = cosine_matrix(&c, &s).unwrap();
        assert!((sim[[0, 0]] - 0.6).abs() < EPSILON);
        assert!((sim[[0, 1]] - 0.8).abs() < EPSILON);
        assert!((sim[[0, 2]] + 1.0).abs() < EPSILON);
    }

    #[test]
    fn clamps_rounding_drift() {
        let c = array![[1.000_000_1, 0.0]];
        let s = array![[1.000_000_1, 0.0]];
        let sim = cosine_matrix(&c, &s).unwrap();
        assert!(sim[[0, 0]] <= 1.0);
    }

    #[test]
    fn width_mismatch_fails() {
        let c = array![[1.0, 0.0]];
        let s = array![[1.0, 0.0, 0.0]];
        assert_matches!(
            cosine_matrix(&c, &s),
            Err(SelectionError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn no_filtering_of_negative_scores() {
        let c = array![[-1.0, 0.0], [0.0, -1.0]];
        let s = array![[1.0, 0.0]];
        let sim = cosine_matrix(&c, &s).unwrap();
        assert_eq!(sim.len(), 2);
        assert!((sim[[0, 0]] + 1.0).abs() < EPSILON);
    }
}
