//! # seedscout-embeddings
//!
//! Audio embeddings for seed and candidate tracks.
//!
//! - [`AudioEmbedder`]: waveform in, one fixed-length vector out
//! - [`MockAudioEmbedder`]: deterministic hash-based vectors for tests and dry runs
//! - `OnnxAudioEmbedder` (feature `ort`): OpenL3-style model via ONNX Runtime,
//!   windowed inference and mean pooling over time
//! - [`cache`]: one JSON file per embedding, loaded back as an [`EmbeddingStore`]

#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod errors;
#[cfg(feature = "ort")]
pub mod onnx;
pub mod service;
pub mod window;

pub use cache::{
    EMBEDDING_SUFFIX, clear_directory_contents, load_embedding, load_embeddings_from_dir,
    save_embedding,
};
pub use config::EmbedderConfig;
pub use errors::{EmbeddingError, Result};
#[cfg(feature = "ort")]
pub use onnx::OnnxAudioEmbedder;
pub use seedscout_select::{EmbeddingStore, SeedSet};
pub use service::{AudioEmbedder, MockAudioEmbedder};
pub use window::{Framed, MeanPool, frame_windows, mean_pool};
