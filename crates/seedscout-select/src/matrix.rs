//! Dense-matrix helpers shared by the reducer and the scorer.

use ndarray::{Array2, ArrayView1};

use crate::errors::{Result, SelectionError};

/// Stack equal-length `f32` rows into an `f64` matrix.
///
/// `expected_dims` pins the row length; `None` takes it from the first row.
/// An empty input yields a `0 × expected_dims` matrix.
pub fn stack_rows<'a, I>(rows: I, expected_dims: Option<usize>) -> Result<Array2<f64>>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut dims = expected_dims;
    let mut flat: Vec<f64> = Vec::new();
    let mut count = 0;

    for row in rows {
        let expected = *dims.get_or_insert(row.len());
        if row.len() != expected {
            return Err(SelectionError::DimensionMismatch {
                expected,
                got: row.len(),
            });
        }
        flat.extend(row.iter().map(|&x| f64::from(x)));
        count += 1;
    }

    let cols = dims.unwrap_or(0);
    let got = flat.len();
    Array2::from_shape_vec((count, cols), flat).map_err(|_| SelectionError::DimensionMismatch {
        expected: count * cols,
        got,
    })
}

/// Euclidean norm of a row.
pub fn l2_norm(v: ArrayView1<'_, f64>) -> f64 {
    v.dot(&v).sqrt()
}

/// L2-normalize every row in place. Zero rows remain zero.
pub fn l2_normalize_rows(m: &mut Array2<f64>) {
    for mut row in m.rows_mut() {
        let norm = l2_norm(row.view());
        if norm > 0.0 {
            row.mapv_inplace(|x| x / norm);
        }
    }
}
