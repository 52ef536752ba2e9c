//! Framing audio into analysis windows and pooling frame embeddings.
//!
//! The model sees fixed-length windows; a clip's embedding is the mean of
//! its window embeddings.

use crate::errors::{EmbeddingError, Result};

/// Audio split into overlapping fixed-length windows.
///
/// The signal is zero-padded by `window / 2` on both sides so the first
/// window is centered on sample 0, then padded at the end to at least one
/// full window. Windows start every `hop` samples.
#[derive(Clone, Debug)]
pub struct Framed {
    padded: Vec<f32>,
    window: usize,
    hop: usize,
    count: usize,
}

/// Frame `samples` into windows of `window` samples every `hop` samples.
///
/// `window` and `hop` are clamped to at least 1. An empty input still
/// yields one all-zero window.
pub fn frame_windows(samples: &[f32], window: usize, hop: usize) -> Framed {
    let window = window.max(1);
    let hop = hop.max(1);
    let pad = window / 2;

    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.resize(pad, 0.0);
    padded.extend_from_slice(samples);
    padded.resize(padded.len() + pad, 0.0);
    if padded.len() < window {
        padded.resize(window, 0.0);
    }

    let count = 1 + (padded.len() - window) / hop;
    Framed {
        padded,
        window,
        hop,
        count,
    }
}

impl Framed {
    /// Number of windows.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false; framing produces at least one window.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Window length in samples.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Window `i`, or `None` past the end.
    pub fn frame(&self, i: usize) -> Option<&[f32]> {
        if i >= self.count {
            return None;
        }
        let start = i * self.hop;
        Some(&self.padded[start..start + self.window])
    }

    /// Windows in order.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.count).filter_map(|i| self.frame(i))
    }
}

/// Running mean over equal-length rows.
#[derive(Clone, Debug)]
pub struct MeanPool {
    sum: Vec<f64>,
    rows: usize,
}

impl MeanPool {
    /// Accumulator for rows of `dims` values.
    pub fn new(dims: usize) -> Self {
        Self {
            sum: vec![0.0; dims],
            rows: 0,
        }
    }

    /// Add one row.
    pub fn push(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.sum.len() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.sum.len(),
                got: row.len(),
            });
        }
        for (acc, &x) in self.sum.iter_mut().zip(row) {
            *acc += f64::from(x);
        }
        self.rows += 1;
        Ok(())
    }

    /// Rows added so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Mean of the added rows.
    pub fn finish(self) -> Result<Vec<f32>> {
        if self.rows == 0 {
            return Err(EmbeddingError::Inference("no frames to pool".into()));
        }
        let n = self.rows as f64;
        Ok(self.sum.into_iter().map(|s| (s / n) as f32).collect())
    }
}

/// Mean of the row-major `rows` matrix with `dims` columns.
pub fn mean_pool(rows: &[f32], dims: usize) -> Result<Vec<f32>> {
    if dims == 0 || rows.len() % dims != 0 {
        return Err(EmbeddingError::Inference(format!(
            "{} values do not form rows of {dims}",
            rows.len()
        )));
    }
    let mut pool = MeanPool::new(dims);
    for row in rows.chunks_exact(dims) {
        pool.push(row)?;
    }
    pool.finish()
}
