//! Audio embedder trait and mock implementation.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use seedscout_core::Waveform;
use sha2::{Digest, Sha256};

use crate::errors::{EmbeddingError, Result};

/// Turns a waveform into one fixed-length embedding vector.
#[async_trait]
pub trait AudioEmbedder: Send + Sync {
    /// Embed one waveform.
    async fn embed(&self, waveform: &Waveform) -> Result<Vec<f32>>;

    /// Output embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Whether the embedder is ready for inference.
    fn is_ready(&self) -> bool;
}

/// Mock embedder for tests and dry runs.
///
/// The audio (samples and sample rate) is hashed once with SHA-256; the
/// vector components are then drawn from `SHA-256(digest || block)` for
/// successive block counters, so every component is covered by fresh hash
/// output. Vectors are unit length.
pub struct MockAudioEmbedder {
    dims: usize,
    ready: AtomicBool,
}

impl MockAudioEmbedder {
    /// Create a mock embedder with the given dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            ready: AtomicBool::new(true),
        }
    }

    /// Set whether this mock is ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    fn hash_to_vector(&self, waveform: &Waveform) -> Vec<f32> {
        let mut hasher = Sha256::new();
        hasher.update(waveform.sample_rate.to_le_bytes());
        for s in &waveform.samples {
            hasher.update(s.to_le_bytes());
        }
        let digest = hasher.finalize();

        let mut v = Vec::with_capacity(self.dims);
        let mut block = 0u64;
        while v.len() < self.dims {
            let mut h = Sha256::new();
            h.update(digest);
            h.update(block.to_le_bytes());
            let bytes = h.finalize();
            v.extend(
                bytes
                    .iter()
                    .take(self.dims - v.len())
                    .map(|&b| (f32::from(b) / 127.5) - 1.0),
            );
            block += 1;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl AudioEmbedder for MockAudioEmbedder {
    async fn embed(&self, waveform: &Waveform) -> Result<Vec<f32>> {
        if !self.is_ready() {
            return Err(EmbeddingError::NotReady);
        }
        Ok(self.hash_to_vector(waveform))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
