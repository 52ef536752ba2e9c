//! Embedder construction from settings.

use std::sync::Arc;

use anyhow::Result;
use seedscout_embeddings::{AudioEmbedder, MockAudioEmbedder};
use seedscout_settings::{EmbeddingBackend, SeedscoutSettings};

/// Build and initialize the configured embedder.
///
/// `force_mock` overrides the configured backend.
pub async fn build_embedder(
    settings: &SeedscoutSettings,
    force_mock: bool,
) -> Result<Arc<dyn AudioEmbedder>> {
    let backend = if force_mock {
        EmbeddingBackend::Mock
    } else {
        settings.embedding.backend
    };

    match backend {
        EmbeddingBackend::Mock => {
            tracing::info!(dims = settings.embedding.dimensions, "using mock embedder");
            Ok(Arc::new(MockAudioEmbedder::new(settings.embedding.dimensions)))
        }
        EmbeddingBackend::Onnx => build_onnx(settings).await,
    }
}

#[cfg(feature = "onnx")]
async fn build_onnx(settings: &SeedscoutSettings) -> Result<Arc<dyn AudioEmbedder>> {
    use anyhow::Context;
    use seedscout_embeddings::{EmbedderConfig, OnnxAudioEmbedder};

    let config = EmbedderConfig::from_settings(
        &settings.embedding,
        settings.audio.sample_rate,
        settings.workspace.data_path().join("models"),
    );
    let embedder = OnnxAudioEmbedder::new(config);
    embedder.initialize().await.context("Failed to load embedding model")?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "onnx"))]
#[allow(clippy::unused_async)]
async fn build_onnx(_settings: &SeedscoutSettings) -> Result<Arc<dyn AudioEmbedder>> {
    anyhow::bail!(
        "the onnx embedder is not compiled in; rebuild with `--features onnx` or pass --mock-embedder"
    )
}
