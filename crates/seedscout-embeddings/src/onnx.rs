//! ONNX Runtime audio embedder (feature-gated behind `ort`).
//!
//! Runs an OpenL3-style model over 1 s windows (0.1 s hop) and mean-pools
//! the window embeddings into one vector per clip. The model takes
//! `[batch, 1, window_samples]` float input and returns `[batch, D]`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use seedscout_core::Waveform;
use tracing::{debug, info};

use crate::config::EmbedderConfig;
use crate::errors::{EmbeddingError, Result};
use crate::service::AudioEmbedder;
use crate::window::{MeanPool, frame_windows};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// ONNX-based audio embedder.
pub struct OnnxAudioEmbedder {
    config: EmbedderConfig,
    session: parking_lot::Mutex<Option<ort::session::Session>>,
    ready: AtomicBool,
}

impl OnnxAudioEmbedder {
    /// Create an embedder (not yet initialized).
    pub fn new(config: EmbedderConfig) -> Self {
        Self {
            config,
            session: parking_lot::Mutex::new(None),
            ready: AtomicBool::new(false),
        }
    }

    /// Locate or download the model and create the ONNX session.
    ///
    /// Blocking work (download, file reads) runs on a blocking thread.
    pub async fn initialize(&self) -> Result<()> {
        let session = tokio::task::spawn_blocking({
            let config = self.config.clone();
            move || initialize_inner(&config).map_err(|e| EmbeddingError::ModelInit(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::ModelInit(format!("join error: {e}")))??;

        *self.session.lock() = Some(session);
        self.ready.store(true, Ordering::SeqCst);
        info!(dims = self.config.dimensions, "audio embedder ready");
        Ok(())
    }
}

fn resolve_model_path(config: &EmbedderConfig) -> std::result::Result<PathBuf, BoxError> {
    if let Some(path) = &config.model_path {
        if !path.is_file() {
            return Err(format!("model file not found: {}", path.display()).into());
        }
        return Ok(path.clone());
    }

    let Some(repo_id) = &config.model_repo else {
        return Err("no modelPath or modelRepo configured".into());
    };
    debug!(repo = %repo_id, cache_dir = %config.cache_dir.display(), "downloading model via hf-hub");
    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(config.cache_dir.clone())
        .build()?;
    Ok(api.model(repo_id.clone()).get(&config.model_file)?)
}

fn initialize_inner(config: &EmbedderConfig) -> std::result::Result<ort::session::Session, BoxError> {
    let model_path = resolve_model_path(config)?;
    let session = ort::session::Session::builder()?
        .with_intra_threads(2)?
        .with_log_level(ort::logging::LogLevel::Warning)?
        .commit_from_file(&model_path)?;
    info!(model = %model_path.display(), "ONNX model loaded");
    Ok(session)
}

fn run_inference(
    session: &mut ort::session::Session,
    samples: &[f32],
    config: &EmbedderConfig,
) -> Result<Vec<f32>> {
    run_inference_inner(session, samples, config).map_err(|e| match e.downcast::<EmbeddingError>() {
        Ok(inner) => *inner,
        Err(other) => EmbeddingError::Inference(other.to_string()),
    })
}

fn run_inference_inner(
    session: &mut ort::session::Session,
    samples: &[f32],
    config: &EmbedderConfig,
) -> std::result::Result<Vec<f32>, BoxError> {
    let window = config.window_samples();
    let framed = frame_windows(samples, window, config.hop_samples());
    let frames: Vec<&[f32]> = framed.iter().collect();
    let mut pool = MeanPool::new(config.dimensions);

    for batch in frames.chunks(config.batch_size.max(1)) {
        let mut input = Vec::with_capacity(batch.len() * window);
        for frame in batch {
            input.extend_from_slice(frame);
        }
        let shape = vec![batch.len() as i64, 1, window as i64];
        let tensor = ort::value::Tensor::from_array((shape, input))?;
        let outputs = session.run(ort::inputs![tensor])?;

        let (output_shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims = output_shape.last().copied().unwrap_or(0) as usize;
        if dims == 0 || dims != config.dimensions {
            return Err(Box::new(EmbeddingError::DimensionMismatch {
                expected: config.dimensions,
                got: dims,
            }));
        }
        for row in data.chunks_exact(dims) {
            pool.push(row)?;
        }
    }

    debug!(frames = pool.rows(), "pooled frame embeddings");
    Ok(pool.finish()?)
}

#[async_trait]
impl AudioEmbedder for OnnxAudioEmbedder {
    async fn embed(&self, waveform: &Waveform) -> Result<Vec<f32>> {
        if !self.is_ready() {
            return Err(EmbeddingError::NotReady);
        }
        if waveform.sample_rate != self.config.sample_rate {
            return Err(EmbeddingError::Inference(format!(
                "expected {} Hz audio, got {} Hz",
                self.config.sample_rate, waveform.sample_rate
            )));
        }

        // Session leaves the mutex for the blocking call and is restored afterwards.
        let mut session = self.session.lock().take().ok_or(EmbeddingError::NotReady)?;
        let config = self.config.clone();
        let samples = waveform.samples.clone();

        let (result, session) = tokio::task::spawn_blocking(move || {
            let r = run_inference(&mut session, &samples, &config);
            (r, session)
        })
        .await
        .map_err(|e| EmbeddingError::Inference(format!("join: {e}")))?;

        *self.session.lock() = Some(session);
        result
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onnx_embedder_implements_trait() {
        fn assert_embedder<T: AudioEmbedder>() {}
        assert_embedder::<OnnxAudioEmbedder>();
    }

    #[tokio::test]
    async fn not_ready_without_init() {
        let embedder = OnnxAudioEmbedder::new(EmbedderConfig::default());
        assert!(!embedder.is_ready());
        let result = embedder.embed(&Waveform::new(vec![0.0; 10], 48_000)).await;
        assert!(matches!(result, Err(EmbeddingError::NotReady)));
    }

    #[tokio::test]
    async fn missing_model_source_fails_init() {
        let embedder = OnnxAudioEmbedder::new(EmbedderConfig {
            model_repo: None,
            model_path: None,
            ..EmbedderConfig::default()
        });
        assert!(matches!(embedder.initialize().await, Err(EmbeddingError::ModelInit(_))));
        assert!(!embedder.is_ready());
    }

    #[tokio::test]
    async fn missing_model_file_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = OnnxAudioEmbedder::new(EmbedderConfig {
            model_path: Some(dir.path().join("absent.onnx")),
            ..EmbedderConfig::default()
        });
        let err = embedder.initialize().await.unwrap_err();
        assert!(err.to_string().contains("model file not found"));
    }
}
