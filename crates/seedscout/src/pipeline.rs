//! End-to-end discovery run: seeds, candidates, selection, cleanup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use seedscout_audio::{AudioFetcher, decode_file, is_audio_file, write_wav};
use seedscout_catalog::CatalogClient;
use seedscout_core::{PreviewTrack, Waveform, safe_filename};
use seedscout_embeddings::{
    AudioEmbedder, EMBEDDING_SUFFIX, EmbeddingStore, clear_directory_contents, load_embedding,
    save_embedding,
};
use seedscout_select::{CandidateTrack, Match, SelectionConfig, select_top_k_with};
use seedscout_settings::SeedscoutSettings;
use tracing::{Instrument, debug, info, info_span, warn};

/// Run parameters resolved from settings and CLI flags.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Root of the seed cache and candidate artifacts.
    pub data_dir: PathBuf,
    /// Release window in days.
    pub window_days: u32,
    /// Previews processed concurrently.
    pub concurrency: usize,
    /// Keep candidate artifacts after the run.
    pub keep_artifacts: bool,
    /// Selection engine tunables.
    pub selection: SelectionConfig,
}

impl PipelineOptions {
    /// Options from loaded settings.
    pub fn from_settings(settings: &SeedscoutSettings) -> Self {
        Self {
            data_dir: settings.workspace.data_path(),
            window_days: settings.catalog.days_back,
            concurrency: settings.catalog.concurrency,
            keep_artifacts: settings.workspace.keep_artifacts,
            selection: SelectionConfig::default()
                .with_reduced_dims(settings.selection.reduced_dims)
                .with_artist_cap_ratio(settings.selection.artist_cap_ratio),
        }
    }

    /// Cached seed embeddings.
    pub fn seed_cache_dir(&self) -> PathBuf {
        self.data_dir.join("seed_embeddings")
    }

    /// Candidate embeddings written during a run.
    pub fn track_embedding_dir(&self) -> PathBuf {
        self.data_dir.join("track_embeddings")
    }

    /// Decoded candidate audio written during a run.
    pub fn track_audio_dir(&self) -> PathBuf {
        self.data_dir.join("wav_tracks")
    }
}

/// Wires the catalog, audio fetcher, embedder and selection engine together.
pub struct Pipeline<E: AudioEmbedder + ?Sized> {
    catalog: CatalogClient,
    fetcher: AudioFetcher,
    embedder: Arc<E>,
    options: PipelineOptions,
}

impl<E: AudioEmbedder + ?Sized> Pipeline<E> {
    /// Create a pipeline.
    pub fn new(
        catalog: CatalogClient,
        fetcher: AudioFetcher,
        embedder: Arc<E>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            embedder,
            options,
        }
    }

    /// Run options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Full run: embed seeds, embed new releases, select `k` of them.
    ///
    /// Once candidate collection has started, artifacts are removed
    /// afterwards unless `keep_artifacts` is set, whether collection or
    /// selection succeeded or not. A cleanup failure is logged and never
    /// replaces the run's own result.
    pub async fn run(&self, seeds_dir: &Path, k: usize) -> Result<Vec<Match>> {
        let span = info_span!("run", k, window_days = self.options.window_days);
        async {
            let seeds = self.embed_seeds(seeds_dir, false).await?;
            let result = self
                .collect_candidates()
                .await
                .and_then(|candidates| self.select(&seeds, &candidates, k));

            if !self.options.keep_artifacts {
                if let Err(e) = self.clear_artifacts() {
                    warn!(error = %format!("{e:#}"), "failed to clear artifacts");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Embed every audio file in `seeds_dir`, reusing cached vectors.
    ///
    /// The seed name is the file stem. With `refresh`, cached vectors are
    /// ignored and rewritten. Files that fail to decode or embed are
    /// skipped with a warning. The returned store is sorted by name, which
    /// fixes the seed priority order.
    pub async fn embed_seeds(&self, seeds_dir: &Path, refresh: bool) -> Result<EmbeddingStore> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory: {}", seeds_dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_audio_file(p))
            .collect();
        paths.sort();

        let cache_dir = self.options.seed_cache_dir();
        let dims = self.embedder.dimensions();
        let mut store = EmbeddingStore::new();

        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            if !refresh {
                match load_embedding(&cache_dir, &name) {
                    Ok(Some(vector)) if vector.len() == dims => {
                        debug!(seed = %name, "using cached seed embedding");
                        let _ = store.insert(name, vector)?;
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => warn!(seed = %name, error = %e, "ignoring unreadable cached embedding"),
                }
            }

            match self.embed_seed_file(&path).await {
                Ok(vector) => {
                    let _ = save_embedding(&cache_dir, &name, &vector)?;
                    let _ = store.insert(name, vector)?;
                }
                Err(e) => warn!(path = %path.display(), error = %format!("{e:#}"), "skipping seed"),
            }
        }

        store.sort_by_name();
        info!(seeds = store.len(), dir = %seeds_dir.display(), "seed embeddings ready");
        Ok(store)
    }

    async fn embed_seed_file(&self, path: &Path) -> Result<Vec<f32>> {
        let rate = self.fetcher.sample_rate();
        let owned = path.to_path_buf();
        let waveform = tokio::task::spawn_blocking(move || decode_file(&owned, rate)).await??;
        Ok(self.embedder.embed(&waveform).await?)
    }

    /// Embed every previewable track released within the window.
    ///
    /// Previews are processed with bounded concurrency; output keeps
    /// catalog order. A track whose download, decode or embedding fails is
    /// dropped with a warning.
    pub async fn collect_candidates(&self) -> Result<Vec<CandidateTrack>> {
        let albums = self
            .catalog
            .list_new_releases(self.options.window_days)
            .await
            .context("Failed to list new releases")?;
        let tracks = self.catalog.compile_previewable_tracks(&albums).await;

        std::fs::create_dir_all(self.options.track_audio_dir())?;
        std::fs::create_dir_all(self.options.track_embedding_dir())?;

        let results: Vec<(PreviewTrack, Result<Vec<f32>>)> = futures::stream::iter(tracks)
            .map(|track| async move {
                let result = self.embed_candidate(&track).await;
                (track, result)
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let total = results.len();
        let mut candidates = Vec::with_capacity(total);
        for (track, result) in results {
            match result {
                Ok(embedding) => {
                    candidates.push(CandidateTrack::new(track.artist, track.title, embedding));
                }
                Err(e) => warn!(
                    track_id = track.id,
                    track = %track.label(),
                    error = %format!("{e:#}"),
                    "dropping candidate"
                ),
            }
        }

        info!(
            embedded = candidates.len(),
            dropped = total - candidates.len(),
            "candidates ready"
        );
        Ok(candidates)
    }

    async fn embed_candidate(&self, track: &PreviewTrack) -> Result<Vec<f32>> {
        let waveform = self.fetcher.fetch_and_decode(&track.preview_url).await?;
        let embedding = self.embedder.embed(&waveform).await?;
        if let Err(e) = self.write_artifacts(track, waveform, embedding.clone()).await {
            warn!(
                track_id = track.id,
                error = %format!("{e:#}"),
                "failed to write candidate artifacts"
            );
        }
        debug!(track_id = track.id, "embedded candidate");
        Ok(embedding)
    }

    async fn write_artifacts(
        &self,
        track: &PreviewTrack,
        waveform: Waveform,
        embedding: Vec<f32>,
    ) -> Result<()> {
        let name = artifact_name(track);
        let wav_path = self
            .options
            .track_audio_dir()
            .join(format!("{}.wav", safe_filename(&name)));
        let embedding_dir = self.options.track_embedding_dir();

        tokio::task::spawn_blocking(move || -> Result<()> {
            write_wav(&wav_path, &waveform)?;
            let _ = save_embedding(&embedding_dir, &name, &embedding)?;
            Ok(())
        })
        .await?
    }

    /// Run the selection engine.
    pub fn select(
        &self,
        seeds: &EmbeddingStore,
        candidates: &[CandidateTrack],
        k: usize,
    ) -> Result<Vec<Match>> {
        select_top_k_with(self.options.selection, seeds, candidates, k)
            .context("Track selection failed")
    }

    /// Delete candidate audio and embeddings. Returns the number of files removed.
    pub fn clear_artifacts(&self) -> Result<usize> {
        let dirs = [
            self.options.track_audio_dir(),
            self.options.track_embedding_dir(),
        ];
        Ok(clear_directory_contents(&dirs, &[".wav", EMBEDDING_SUFFIX])?)
    }
}

/// File stem shared by a candidate's audio and embedding artifacts.
fn artifact_name(track: &PreviewTrack) -> String {
    format!("{} {}", track.id, track.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedscout_audio::{FetchConfig, encode_wav};
    use seedscout_catalog::CatalogConfig;
    use seedscout_core::logging::capture_logs;
    use seedscout_embeddings::MockAudioEmbedder;
    use tracing::Level;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RATE: u32 = 8_000;

    fn tone(freq: f32, seconds: f32) -> Vec<f32> {
        let n = (RATE as f32 * seconds) as usize;
        (0..n)
            .map(|i| 0.5 * (i as f32 * freq * std::f32::consts::TAU / RATE as f32).sin())
            .collect()
    }

    fn options(data_dir: &Path) -> PipelineOptions {
        PipelineOptions {
            data_dir: data_dir.to_path_buf(),
            window_days: 7,
            concurrency: 3,
            keep_artifacts: false,
            selection: SelectionConfig::default().with_reduced_dims(3),
        }
    }

    fn pipeline(server_uri: &str, data_dir: &Path) -> Pipeline<MockAudioEmbedder> {
        let catalog =
            CatalogClient::new(CatalogConfig::default().with_base_url(server_uri)).unwrap();
        let fetcher = AudioFetcher::new(FetchConfig {
            sample_rate: RATE,
            ..FetchConfig::default()
        })
        .unwrap();
        Pipeline::new(
            catalog,
            fetcher,
            Arc::new(MockAudioEmbedder::new(16)),
            options(data_dir),
        )
    }

    fn write_seed(dir: &Path, name: &str, freq: f32) {
        std::fs::write(dir.join(name), encode_wav(&tone(freq, 0.25), RATE, 1)).unwrap();
    }

    /// One album released today with `previews` tracks, one per artist
    /// except the last two which share an artist, plus one broken preview.
    async fn mount_catalog(server: &MockServer, previews: usize) {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        Mock::given(method("GET"))
            .and(path("/editorial/0/releases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": 1, "title": "Fresh", "artist": {"name": "Various"}, "release_date": today},
                    {"id": 2, "title": "Old", "artist": {"name": "Various"}, "release_date": "2001-01-01"}
                ]
            })))
            .mount(server)
            .await;

        let mut tracks: Vec<serde_json::Value> = (0..previews)
            .map(|i| {
                let artist = if i + 1 == previews { previews - 2 } else { i };
                serde_json::json!({
                    "id": 100 + i,
                    "title": format!("Song {i}"),
                    "artist": {"name": format!("Artist {artist}")},
                    "preview": format!("{}/preview/{i}.wav", server.uri())
                })
            })
            .collect();
        tracks.push(serde_json::json!({
            "id": 999,
            "title": "Broken",
            "artist": {"name": "Nobody"},
            "preview": format!("{}/preview/missing.wav", server.uri())
        }));
        Mock::given(method("GET"))
            .and(path("/album/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"tracks": {"data": tracks}})),
            )
            .mount(server)
            .await;

        for i in 0..previews {
            let wav = encode_wav(&tone(200.0 + 37.0 * i as f32, 0.25), RATE, 1);
            Mock::given(method("GET"))
                .and(path(format!("/preview/{i}.wav")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(wav))
                .mount(server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/preview/missing.wav"))
            .respond_with(ResponseTemplate::new(404))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn seeds_are_embedded_sorted_and_cached() {
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "zeta.wav", 440.0);
        write_seed(seeds.path(), "alpha.wav", 330.0);
        std::fs::write(seeds.path().join("cover.jpg"), b"not audio").unwrap();

        let p = pipeline("http://127.0.0.1:1", data.path());
        let store = p.embed_seeds(seeds.path(), false).await.unwrap();
        assert_eq!(store.names(), vec!["alpha", "zeta"]);
        assert_eq!(store.dims(), Some(16));
        assert!(p.options().seed_cache_dir().join("alpha_embedding.json").exists());

        let (logs, _guard) = capture_logs();
        let again = p.embed_seeds(seeds.path(), false).await.unwrap();
        assert_eq!(again, store);
        assert!(logs.has_event(Level::DEBUG, "using cached seed embedding"));
    }

    #[tokio::test]
    async fn refresh_ignores_cache() {
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "a.wav", 440.0);
        let p = pipeline("http://127.0.0.1:1", data.path());
        let cache = p.options().seed_cache_dir();
        let _ = save_embedding(&cache, "a", &[0.0; 16]).unwrap();

        let cached = p.embed_seeds(seeds.path(), false).await.unwrap();
        assert_eq!(cached.get("a"), Some(&[0.0_f32; 16][..]));

        let fresh = p.embed_seeds(seeds.path(), true).await.unwrap();
        assert_ne!(fresh.get("a"), Some(&[0.0_f32; 16][..]));
    }

    #[tokio::test]
    async fn undecodable_seed_is_skipped() {
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "good.wav", 440.0);
        std::fs::write(seeds.path().join("bad.mp3"), b"garbage").unwrap();

        let (logs, _guard) = capture_logs();
        let store = pipeline("http://127.0.0.1:1", data.path())
            .embed_seeds(seeds.path(), false)
            .await
            .unwrap();
        assert_eq!(store.names(), vec!["good"]);
        assert!(logs.has_event(Level::WARN, "skipping seed"));
    }

    #[tokio::test]
    async fn missing_seeds_dir_is_an_error() {
        let data = tempfile::tempdir().unwrap();
        let err = pipeline("http://127.0.0.1:1", data.path())
            .embed_seeds(&data.path().join("nope"), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("seeds directory"));
    }

    #[tokio::test]
    async fn candidates_keep_order_and_drop_failures() {
        let server = MockServer::start().await;
        mount_catalog(&server, 5).await;
        let data = tempfile::tempdir().unwrap();

        let (logs, _guard) = capture_logs();
        let p = pipeline(&server.uri(), data.path());
        let candidates = p.collect_candidates().await.unwrap();

        let titles: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Song 0", "Song 1", "Song 2", "Song 3", "Song 4"]);
        assert!(candidates.iter().all(|c| c.embedding.len() == 16));
        assert!(logs.has_event(Level::WARN, "dropping candidate"));

        let wavs = std::fs::read_dir(p.options().track_audio_dir()).unwrap().count();
        assert_eq!(wavs, 5);
    }

    #[tokio::test]
    async fn full_run_selects_and_cleans_up() {
        let server = MockServer::start().await;
        mount_catalog(&server, 12).await;
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "one.wav", 200.0);
        write_seed(seeds.path(), "two.wav", 311.0);

        let p = pipeline(&server.uri(), data.path());
        let matches = p.run(seeds.path(), 10).await.unwrap();

        assert!(!matches.is_empty());
        assert!(matches.len() <= 10);
        assert!(matches.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        assert!(matches.iter().all(|m| m.closest_seed == "one" || m.closest_seed == "two"));
        let shared = matches.iter().filter(|m| m.artist == "Artist 10").count();
        assert!(shared <= 2);

        assert_eq!(std::fs::read_dir(p.options().track_audio_dir()).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(p.options().track_embedding_dir()).unwrap().count(), 0);
        assert!(p.options().seed_cache_dir().join("one_embedding.json").exists());
    }

    #[tokio::test]
    async fn keep_artifacts_leaves_files() {
        let server = MockServer::start().await;
        mount_catalog(&server, 6).await;
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "one.wav", 200.0);

        let mut p = pipeline(&server.uri(), data.path());
        p.options.keep_artifacts = true;
        let _ = p.run(seeds.path(), 5).await.unwrap();
        assert_eq!(std::fs::read_dir(p.options().track_embedding_dir()).unwrap().count(), 6);
    }

    #[tokio::test]
    async fn too_few_candidates_fail_selection() {
        let server = MockServer::start().await;
        mount_catalog(&server, 2).await;
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "one.wav", 200.0);

        let p = pipeline(&server.uri(), data.path());
        let err = p.run(seeds.path(), 10).await.unwrap_err();
        assert!(format!("{err:#}").contains("Track selection failed"));
        assert_eq!(std::fs::read_dir(p.options().track_audio_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn catalog_failure_still_clears_artifacts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/editorial/0/releases"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "one.wav", 200.0);

        let p = pipeline(&server.uri(), data.path());
        let stale_dir = p.options().track_audio_dir();
        std::fs::create_dir_all(&stale_dir).unwrap();
        std::fs::write(stale_dir.join("100 stale.wav"), b"RIFF").unwrap();

        let err = p.run(seeds.path(), 5).await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to list new releases"));
        assert_eq!(std::fs::read_dir(&stale_dir).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cleanup_failure_keeps_selection_error() {
        use std::os::unix::fs::PermissionsExt;

        let server = MockServer::start().await;
        mount_catalog(&server, 2).await;
        let data = tempfile::tempdir().unwrap();
        let seeds = tempfile::tempdir().unwrap();
        write_seed(seeds.path(), "one.wav", 200.0);

        let p = pipeline(&server.uri(), data.path());
        let candidates = p.collect_candidates().await.unwrap();
        assert_eq!(candidates.len(), 2);

        // Read-only directory: listing works, removing entries does not.
        let wav_dir = p.options().track_audio_dir();
        std::fs::set_permissions(&wav_dir, std::fs::Permissions::from_mode(0o555)).unwrap();
        let sample = std::fs::read_dir(&wav_dir).unwrap().next().unwrap().unwrap().path();
        let blocked = std::fs::remove_file(&sample).is_err();

        let (logs, _guard) = capture_logs();
        let err = p.run(seeds.path(), 10).await.unwrap_err();
        std::fs::set_permissions(&wav_dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(format!("{err:#}").contains("Track selection failed"));
        if blocked {
            assert!(logs.has_event(Level::WARN, "failed to clear artifacts"));
        }
    }

    #[tokio::test]
    async fn artifact_write_failure_keeps_candidate() {
        let server = MockServer::start().await;
        mount_catalog(&server, 3).await;
        let data = tempfile::tempdir().unwrap();
        let p = pipeline(&server.uri(), data.path());

        // A directory squatting on the first track's wav path makes the write fail.
        let first = PreviewTrack {
            id: 100,
            title: "Song 0".into(),
            artist: "Artist 0".into(),
            preview_url: String::new(),
        };
        let squatter = p
            .options()
            .track_audio_dir()
            .join(format!("{}.wav", safe_filename(&artifact_name(&first))));
        std::fs::create_dir_all(&squatter).unwrap();

        let (logs, _guard) = capture_logs();
        let candidates = p.collect_candidates().await.unwrap();

        let titles: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Song 0", "Song 1", "Song 2"]);
        assert!(logs.has_event(Level::WARN, "failed to write candidate artifacts"));
        assert!(squatter.is_dir());
    }
}
