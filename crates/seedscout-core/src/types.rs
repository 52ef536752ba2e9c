//! Track and audio types passed between pipeline stages.

use serde::{Deserialize, Serialize};

/// Decoded mono audio at a fixed sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    /// Mono samples in `[-1, 1]`.
    pub samples: Vec<f32>,
    /// Samples per second.
    pub sample_rate: u32,
}

impl Waveform {
    /// Create a waveform from mono samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds (0 for a zero sample rate).
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Whether the waveform has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A catalog track with a downloadable preview clip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTrack {
    /// Catalog track identifier.
    pub id: u64,
    /// Track title (filesystem-safe).
    pub title: String,
    /// Primary artist name.
    pub artist: String,
    /// URL of the preview clip.
    pub preview_url: String,
}

impl PreviewTrack {
    /// `"artist - title"` label used for logs and artifact file names.
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// Replace every run of `\ / : " * ? < > |` with a single `_`.
pub fn safe_filename(name: &str) -> String {
    const RESERVED: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|'];

    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if RESERVED.contains(&c) {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}
