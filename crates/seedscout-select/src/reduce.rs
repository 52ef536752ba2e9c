//! Dimensionality reduction: rank-`R` PCA fitted on one set, applied to another.
//!
//! The projection is fitted on the candidate embeddings only and reused as-is
//! for the seeds, so seeds never influence the reduced axes.
//!
//! ```text
//! candidates (N×D) ──fit──► Projection { mean, components (R×D) }
//!        │                        │
//!        └──apply──► N×R          └──apply──► seeds S×R
//!                 normalize rows to unit length
//! ```
//!
//! Components are found by subspace iteration on the covariance matrix,
//! started from the centered data rows, then rotated with a Jacobi
//! eigen-solve of the small `R×R` Rayleigh quotient so they come out sorted
//! by explained variance. Each component's sign is fixed so its
//! largest-magnitude entry is positive, which makes the fit reproducible.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

use crate::errors::{Result, SelectionError};
use crate::matrix::{l2_norm, l2_normalize_rows};

/// Upper bound on subspace-iteration rounds.
const MAX_ITERATIONS: usize = 300;
/// Residual below which the subspace is considered converged.
const CONVERGENCE_TOLERANCE: f64 = 1e-10;
/// Relative residual below which a basis candidate is treated as dependent.
const DEPENDENCE_TOLERANCE: f64 = 1e-10;
/// Upper bound on Jacobi sweeps for the small eigenproblem.
const JACOBI_SWEEPS: usize = 100;

/// A fitted linear projection onto the top principal components.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    mean: Array1<f64>,
    /// `R × D`, orthonormal rows sorted by explained variance.
    components: Array2<f64>,
    explained_variance: Vec<f64>,
}

impl Projection {
    /// Number of output dimensions.
    pub fn rank(&self) -> usize {
        self.components.nrows()
    }

    /// Expected input dimension.
    pub fn input_dims(&self) -> usize {
        self.components.ncols()
    }

    /// Per-feature mean of the fitting set.
    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    /// Principal axes, one per row.
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Variance captured by each component, descending.
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Center and project rows without normalizing.
    pub fn project(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.input_dims() {
            return Err(SelectionError::DimensionMismatch {
                expected: self.input_dims(),
                got: x.ncols(),
            });
        }
        let centered = x - &self.mean;
        Ok(centered.dot(&self.components.t()))
    }

    /// Project rows and L2-normalize each result to unit length.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let mut reduced = self.project(x)?;
        l2_normalize_rows(&mut reduced);
        Ok(reduced)
    }

    #[cfg(test)]
    pub(crate) fn flip_axis(&mut self, axis: usize) {
        self.components.row_mut(axis).mapv_inplace(|v| -v);
    }
}

/// Fit a rank-`rank` projection on `x` and return `x` reduced and normalized.
///
/// Fails with [`SelectionError::InsufficientData`] when `x` is empty, has
/// fewer rows than `rank`, or fewer columns than `rank`.
pub fn fit_transform(x: &Array2<f64>, rank: usize) -> Result<(Array2<f64>, Projection)> {
    let projection = fit(x, rank)?;
    let reduced = projection.transform(x)?;
    Ok((reduced, projection))
}

/// Fit a rank-`rank` projection on the rows of `x`.
pub fn fit(x: &Array2<f64>, rank: usize) -> Result<Projection> {
    let (samples, features) = x.dim();
    if rank == 0 || samples == 0 || samples < rank || features < rank {
        return Err(SelectionError::InsufficientData {
            rank,
            samples,
            features,
        });
    }

    let mean = x
        .mean_axis(Axis(0))
        .ok_or(SelectionError::InsufficientData {
            rank,
            samples,
            features,
        })?;
    let centered = x - &mean;
    let covariance = centered.t().dot(&centered);

    let mut basis = orthonormal_columns(centered.rows().into_iter(), features, rank);
    let mut iterations = 0;
    for _ in 0..MAX_ITERATIONS {
        iterations += 1;
        let expanded = covariance.dot(&basis);
        let next = orthonormal_columns(expanded.columns().into_iter(), features, rank);
        let residual = subspace_residual(&basis, &next);
        basis = next;
        if residual < CONVERGENCE_TOLERANCE {
            break;
        }
    }

    // Rayleigh–Ritz: rotate the converged basis onto the eigenvectors of
    // the projected covariance so components are ordered by variance.
    let rayleigh = basis.t().dot(&covariance).dot(&basis);
    let (eigenvalues, eigenvectors) = symmetric_eigen(rayleigh);

    let mut order: Vec<usize> = (0..rank).collect();
    order.sort_by(|&a, &b| {
        eigenvalues[b]
            .partial_cmp(&eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let rotated = basis.dot(&eigenvectors);
    let mut components = Array2::<f64>::zeros((rank, features));
    let denom = (samples.max(2) - 1) as f64;
    let mut explained_variance = Vec::with_capacity(rank);
    for (row, &col) in order.iter().enumerate() {
        components.row_mut(row).assign(&rotated.column(col));
        explained_variance.push(eigenvalues[col].max(0.0) / denom);
    }
    fix_signs(&mut components);

    debug!(
        samples,
        features, rank, iterations, "fitted principal-component projection"
    );

    Ok(Projection {
        mean,
        components,
        explained_variance,
    })
}

/// Orthonormalize `candidates` in order (modified Gram–Schmidt), dropping
/// dependent vectors, then complete to `rank` columns with unit axes.
fn orthonormal_columns<'a, I>(candidates: I, dims: usize, rank: usize) -> Array2<f64>
where
    I: Iterator<Item = ArrayView1<'a, f64>>,
{
    let mut basis: Vec<Array1<f64>> = Vec::with_capacity(rank);

    for candidate in candidates {
        if basis.len() == rank {
            break;
        }
        push_if_independent(&mut basis, candidate.to_owned());
    }

    let mut axis = 0;
    while basis.len() < rank && axis < dims {
        let mut unit = Array1::<f64>::zeros(dims);
        unit[axis] = 1.0;
        push_if_independent(&mut basis, unit);
        axis += 1;
    }

    let mut out = Array2::<f64>::zeros((dims, rank));
    for (j, v) in basis.iter().enumerate() {
        out.column_mut(j).assign(v);
    }
    out
}

fn push_if_independent(basis: &mut Vec<Array1<f64>>, mut v: Array1<f64>) {
    let original = l2_norm(v.view());
    if original <= f64::MIN_POSITIVE {
        return;
    }
    // Two passes keep the result orthogonal to working precision.
    for _ in 0..2 {
        for b in basis.iter() {
            let proj = b.dot(&v);
            v.scaled_add(-proj, b);
        }
    }
    let norm = l2_norm(v.view());
    if norm <= original * DEPENDENCE_TOLERANCE {
        return;
    }
    v.mapv_inplace(|x| x / norm);
    basis.push(v);
}

/// Frobenius norm of the part of `next` lying outside span(`current`).
fn subspace_residual(current: &Array2<f64>, next: &Array2<f64>) -> f64 {
    let overlap = current.t().dot(next);
    let outside = next - &current.dot(&overlap);
    outside.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cyclic Jacobi eigen-decomposition of a small symmetric matrix.
///
/// Returns eigenvalues (unsorted) and eigenvectors as columns.
fn symmetric_eigen(mut a: Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let m = a.nrows();
    let mut v = Array2::<f64>::eye(m);
    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);

    for _ in 0..JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..m {
            for q in (p + 1)..m {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= scale * 1e-30 {
            break;
        }

        for p in 0..m {
            for q in (p + 1)..m {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..m {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..m {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..m {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..m).map(|i| a[[i, i]]).collect();
    (eigenvalues, v)
}

/// Flip each row so its largest-magnitude entry is positive.
fn fix_signs(components: &mut Array2<f64>) {
    for mut row in components.rows_mut() {
        let pivot = row
            .iter()
            .copied()
            .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
        if pivot < 0.0 {
            row.mapv_inplace(|x| -x);
        }
    }
}
