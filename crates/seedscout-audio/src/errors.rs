//! Audio error types.

use thiserror::Error;

/// Errors from downloading, decoding or resampling audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Unsupported format, corrupt data or empty stream.
    #[error("audio decode error: {0}")]
    Decode(String),

    /// Resampler construction or processing failure.
    #[error("resample error: {0}")]
    Resample(String),

    /// Transport failure while downloading a preview.
    #[error("preview download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The preview host answered with a non-success status.
    #[error("preview host returned {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The preview exceeded the configured download limit.
    #[error("preview is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Local file read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Background decode task failed to complete.
    #[error("decode task failed: {0}")]
    Task(String),
}

/// Result alias for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;

/// Extension trait to reduce `.map_err()` boilerplate when wrapping errors into [`AudioError`].
pub trait ResultExt<T> {
    /// Wrap the error as [`AudioError::Decode`] with `context` prefix.
    fn decode(self, context: &str) -> Result<T>;
    /// Wrap the error as [`AudioError::Resample`] with `context` prefix.
    fn resample(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn decode(self, context: &str) -> Result<T> {
        self.map_err(|e| AudioError::Decode(format!("{context}: {e}")))
    }
    fn resample(self, context: &str) -> Result<T> {
        self.map_err(|e| AudioError::Resample(format!("{context}: {e}")))
    }
}
