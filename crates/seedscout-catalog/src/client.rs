//! HTTP client for the editorial releases and album endpoints.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use seedscout_core::{PreviewTrack, safe_filename};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::errors::{CatalogError, Result};
use crate::types::{Album, AlbumDetail, ErrorEnvelope, Page, ReleaseEntry};

/// Default public API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.deezer.com";

/// Catalog client configuration.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Editorial id whose releases are listed (`0` = global).
    pub country_id: u64,
    /// Maximum number of editorial releases inspected.
    pub album_limit: usize,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country_id: 0,
            album_limit: 20,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CatalogConfig {
    /// Override the base URL (trailing slashes are dropped).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Client for a Deezer-compatible catalog API.
pub struct CatalogClient {
    config: CatalogConfig,
    /// HTTP client (reused across requests).
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a client.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Client configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Albums from the editorial release list published within `window_days`.
    ///
    /// At most `album_limit` entries are inspected, in catalog order. Entries
    /// with an unparseable release date are skipped with a warning. A window
    /// too large for the calendar yields [`CatalogError::InvalidWindow`].
    pub async fn list_new_releases(&self, window_days: u32) -> Result<Vec<Album>> {
        let cutoff = release_cutoff(Local::now().naive_local(), window_days)?;
        self.list_releases_since(cutoff).await
    }

    /// Albums from the editorial release list released strictly after `cutoff`.
    pub async fn list_releases_since(&self, cutoff: NaiveDateTime) -> Result<Vec<Album>> {
        let url = format!(
            "{}/editorial/{}/releases",
            self.config.base_url, self.config.country_id
        );
        let page: Page<ReleaseEntry> = self.get_json(&url).await?;

        let mut albums = Vec::new();
        for entry in page.data.into_iter().take(self.config.album_limit) {
            match entry.into_album() {
                Ok(album) if album.released_after(cutoff) => albums.push(album),
                Ok(album) => debug!(album_id = album.id, date = %album.release_date, "outside release window"),
                Err(e) => warn!(error = %e, "skipping release"),
            }
        }

        info!(
            albums = albums.len(),
            country_id = self.config.country_id,
            %cutoff,
            "loaded new releases"
        );
        Ok(albums)
    }

    /// Tracks of one album that have a preview URL.
    ///
    /// Titles are passed through [`safe_filename`].
    pub async fn list_tracks(&self, album_id: u64) -> Result<Vec<PreviewTrack>> {
        let url = format!("{}/album/{album_id}", self.config.base_url);
        let detail: AlbumDetail = self.get_json(&url).await?;

        let tracks: Vec<PreviewTrack> = detail
            .tracks
            .map(|page| page.data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| {
                let preview = t.preview.filter(|p| !p.is_empty())?;
                Some(PreviewTrack {
                    id: t.id,
                    title: safe_filename(&t.title),
                    artist: t.artist.name,
                    preview_url: preview,
                })
            })
            .collect();

        debug!(album_id, tracks = tracks.len(), "listed previewable tracks");
        Ok(tracks)
    }

    /// Previewable tracks of every album, in album order.
    ///
    /// An album whose track listing fails is logged and skipped.
    pub async fn compile_previewable_tracks(&self, albums: &[Album]) -> Vec<PreviewTrack> {
        let mut all = Vec::new();
        for album in albums {
            match self.list_tracks(album.id).await {
                Ok(tracks) => all.extend(tracks),
                Err(e) => warn!(album_id = album.id, error = %e, "skipping album"),
            }
        }
        info!(
            tracks = all.len(),
            albums = albums.len(),
            "compiled previewable tracks"
        );
        all
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        // Deezer reports quota and lookup failures as 200 with an error object.
        if let Ok(ErrorEnvelope { error: Some(e) }) = serde_json::from_slice(&body) {
            warn!(url, code = e.code, message = %e.message, "catalog returned an error object");
            return Err(e.into());
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// `now` minus `window_days` whole days.
fn release_cutoff(now: NaiveDateTime, window_days: u32) -> Result<NaiveDateTime> {
    chrono::Duration::try_days(i64::from(window_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or(CatalogError::InvalidWindow(window_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use seedscout_core::logging::capture_logs;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CatalogClient {
        CatalogClient::new(CatalogConfig::default().with_base_url(server.uri())).unwrap()
    }

    fn cutoff() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn release(id: u64, date: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": format!("Album {id}"),
            "release_date": date,
            "artist": {"id": id * 10, "name": format!("Artist {id}")}
        })
    }

    #[tokio::test]
    async fn releases_filtered_by_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editorial/0/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    release(1, "2024-05-03"),
                    release(2, "2024-05-01"),
                    release(3, "2024-04-20"),
                    release(4, "2024-05-02"),
                ]
            })))
            .mount(&server)
            .await;

        let albums = client(&server).list_releases_since(cutoff()).await.unwrap();
        let ids: Vec<u64> = albums.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(albums[0].artist, "Artist 1");
    }

    #[tokio::test]
    async fn releases_respect_album_limit_and_country() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editorial/116/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [release(1, "2024-05-03"), release(2, "2024-05-03"), release(3, "2024-05-03")]
            })))
            .mount(&server)
            .await;

        let config = CatalogConfig {
            country_id: 116,
            album_limit: 2,
            ..CatalogConfig::default()
        }
        .with_base_url(server.uri());
        let albums = CatalogClient::new(config)
            .unwrap()
            .list_releases_since(cutoff())
            .await
            .unwrap();
        assert_eq!(albums.len(), 2);
    }

    #[tokio::test]
    async fn bad_release_date_is_skipped() {
        let (logs, _guard) = capture_logs();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editorial/0/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [release(1, "someday"), release(2, "2024-05-03")]
            })))
            .mount(&server)
            .await;

        let albums = client(&server).list_releases_since(cutoff()).await.unwrap();
        assert_eq!(albums.len(), 1);
        assert!(logs.has_event(tracing::Level::WARN, "skipping release"));
    }

    #[tokio::test]
    async fn releases_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editorial/0/releases"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = client(&server).list_releases_since(cutoff()).await;
        assert_matches!(result, Err(CatalogError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn tracks_without_preview_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/album/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "tracks": {"data": [
                    {"id": 1, "title": "Intro/Outro", "artist": {"name": "A"}, "preview": "https://cdn/1.mp3"},
                    {"id": 2, "title": "Hidden", "artist": {"name": "A"}, "preview": ""},
                    {"id": 3, "title": "Bonus", "artist": {"name": "B"}},
                    {"id": 4, "title": "Closer", "artist": {"name": "B"}, "preview": "https://cdn/4.mp3"}
                ]}
            })))
            .mount(&server)
            .await;

        let tracks = client(&server).list_tracks(42).await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "Intro_Outro");
        assert_eq!(tracks[0].preview_url, "https://cdn/1.mp3");
        assert_eq!(tracks[1].id, 4);
    }

    #[tokio::test]
    async fn malformed_album_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/album/9"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert_matches!(client(&server).list_tracks(9).await, Err(CatalogError::Json(_)));
    }

    #[tokio::test]
    async fn compile_skips_failing_albums() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/album/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tracks": {"data": [
                    {"id": 11, "title": "One", "artist": {"name": "A"}, "preview": "https://cdn/11.mp3"}
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/album/2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/album/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tracks": {"data": [
                    {"id": 31, "title": "Three", "artist": {"name": "C"}, "preview": "https://cdn/31.mp3"}
                ]}
            })))
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let albums: Vec<Album> = [1, 2, 3]
            .into_iter()
            .map(|id| Album {
                id,
                title: format!("Album {id}"),
                artist: "x".into(),
                release_date: date,
            })
            .collect();

        let tracks = client(&server).compile_previewable_tracks(&albums).await;
        let ids: Vec<u64> = tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![11, 31]);
    }

    #[tokio::test]
    async fn quota_error_object_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editorial/0/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"type": "Exception", "message": "Quota limit exceeded", "code": 4}
            })))
            .mount(&server)
            .await;

        let result = client(&server).list_releases_since(cutoff()).await;
        assert_matches!(result, Err(CatalogError::Api { code: 4, ref message }) if message == "Quota limit exceeded");
    }

    #[tokio::test]
    async fn album_error_object_skipped_when_compiling() {
        let (logs, _guard) = capture_logs();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/album/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"type": "DataException", "message": "no data", "code": 800}
            })))
            .mount(&server)
            .await;

        let c = client(&server);
        assert_matches!(c.list_tracks(5).await, Err(CatalogError::Api { code: 800, .. }));

        let album = Album {
            id: 5,
            title: "Album 5".into(),
            artist: "x".into(),
            release_date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
        };
        assert!(c.compile_previewable_tracks(&[album]).await.is_empty());
        assert!(logs.has_event(tracing::Level::WARN, "skipping album"));
    }

    #[tokio::test]
    async fn oversized_window_is_an_error() {
        let client = CatalogClient::new(CatalogConfig::default().with_base_url("http://127.0.0.1:9")).unwrap();
        assert_matches!(
            client.list_new_releases(u32::MAX).await,
            Err(CatalogError::InvalidWindow(u32::MAX))
        );
    }

    #[test]
    fn release_cutoff_subtracts_days() {
        let got = release_cutoff(cutoff(), 7).unwrap();
        assert_eq!(got, cutoff() - chrono::Duration::days(7));
        assert_matches!(release_cutoff(cutoff(), u32::MAX), Err(CatalogError::InvalidWindow(_)));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let config = CatalogConfig::default().with_base_url("http://localhost:1234/");
        assert_eq!(config.base_url, "http://localhost:1234");
    }
}
