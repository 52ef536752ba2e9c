//! Preview download and decode.

use std::time::Duration;

use seedscout_core::Waveform;
use tracing::debug;

use crate::decode::{DEFAULT_SAMPLE_RATE, decode_audio};
use crate::errors::{AudioError, Result};

/// Downloader configuration.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Sample rate of returned waveforms.
    pub sample_rate: u32,
    /// Largest accepted download, in bytes.
    pub max_bytes: u64,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_bytes: 16 * 1024 * 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Downloads preview clips and decodes them to mono waveforms.
#[derive(Clone)]
pub struct AudioFetcher {
    config: FetchConfig,
    /// HTTP client (reused across requests).
    client: reqwest::Client,
}

impl AudioFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Target sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Download the raw preview bytes.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AudioError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let limit = self.config.max_bytes;
        if let Some(size) = response.content_length().filter(|&n| n > limit) {
            return Err(AudioError::TooLarge { size, limit });
        }

        let body = response.bytes().await?;
        if body.len() as u64 > limit {
            return Err(AudioError::TooLarge {
                size: body.len() as u64,
                limit,
            });
        }
        debug!(url, bytes = body.len(), "downloaded preview");
        Ok(body.to_vec())
    }

    /// Download a preview and decode it on a blocking thread.
    pub async fn fetch_and_decode(&self, url: &str) -> Result<Waveform> {
        let data = self.fetch(url).await?;
        let hint = url_extension(url).map(str::to_string);
        let rate = self.config.sample_rate;
        tokio::task::spawn_blocking(move || decode_audio(&data, hint.as_deref(), rate))
            .await
            .map_err(|e| AudioError::Task(e.to_string()))?
    }
}

/// Extension of the last path segment of `url`, ignoring query and fragment.
fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::encode_wav;
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(max_bytes: u64) -> AudioFetcher {
        AudioFetcher::new(FetchConfig {
            max_bytes,
            ..FetchConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_and_decode_wav_preview() {
        let server = MockServer::start().await;
        let wav = encode_wav(&vec![0.1; 24_000], 48_000, 1);
        Mock::given(method("GET"))
            .and(path("/previews/1.wav"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(wav))
            .mount(&server)
            .await;

        let url = format!("{}/previews/1.wav?hdnea=token", server.uri());
        let waveform = fetcher(1 << 20).fetch_and_decode(&url).await.unwrap();
        assert_eq!(waveform.sample_rate, 48_000);
        assert_eq!(waveform.samples.len(), 24_000);
    }

    #[tokio::test]
    async fn error_status_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.mp3"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let url = format!("{}/gone.mp3", server.uri());
        assert_matches!(
            fetcher(1 << 20).fetch(&url).await,
            Err(AudioError::Status { status: 403, .. })
        );
    }

    #[tokio::test]
    async fn oversized_preview_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2_048]))
            .mount(&server)
            .await;

        let url = format!("{}/big.mp3", server.uri());
        assert_matches!(
            fetcher(1_024).fetch(&url).await,
            Err(AudioError::TooLarge { size: 2_048, limit: 1_024 })
        );
    }

    #[tokio::test]
    async fn garbage_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/noise.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"definitely not audio".to_vec()))
            .mount(&server)
            .await;

        let url = format!("{}/noise.mp3", server.uri());
        assert_matches!(
            fetcher(1 << 20).fetch_and_decode(&url).await,
            Err(AudioError::Decode(_))
        );
    }

    #[test]
    fn extension_from_url() {
        assert_eq!(url_extension("https://cdn/x/preview.mp3?hdnea=exp"), Some("mp3"));
        assert_eq!(url_extension("https://cdn/a.b/clip"), None);
        assert_eq!(url_extension("https://cdn/clip.wav#t=1"), Some("wav"));
    }
}
