//! # seedscout
//!
//! Command-line entry point: loads settings, installs logging and runs the
//! discovery pipeline.

#![deny(unsafe_code)]

mod embedder;
mod output;
mod pipeline;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use seedscout_audio::{AudioFetcher, FetchConfig};
use seedscout_catalog::{CatalogClient, CatalogConfig};
use seedscout_core::logging::{LogFormat, init_subscriber};
use seedscout_settings::SeedscoutSettings;

use crate::pipeline::{Pipeline, PipelineOptions};

/// Find new releases that sound like your seed tracks.
#[derive(Parser, Debug)]
#[command(name = "seedscout", version, about)]
struct Cli {
    /// Settings file (defaults to `~/.seedscout/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level when `RUST_LOG` is unset (overrides settings).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Embed seeds and new releases, then print the closest matches.
    Run(RunArgs),
    /// Embed the seed tracks and refresh the seed cache.
    Seeds(SeedsArgs),
    /// List albums released within the window.
    Releases(ReleasesArgs),
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Number of tracks to recommend.
    #[arg(long)]
    top_k: Option<usize>,

    /// Release window in days.
    #[arg(long)]
    days_back: Option<u32>,

    /// Editorial country id.
    #[arg(long)]
    country: Option<u64>,

    /// Directory of seed audio files.
    #[arg(long)]
    seeds_dir: Option<PathBuf>,

    /// Use deterministic hash embeddings instead of the model.
    #[arg(long)]
    mock_embedder: bool,

    /// Keep downloaded audio and candidate embeddings.
    #[arg(long)]
    keep_artifacts: bool,
}

#[derive(Args, Debug)]
struct SeedsArgs {
    /// Directory of seed audio files.
    #[arg(long)]
    seeds_dir: Option<PathBuf>,

    /// Re-embed every seed, ignoring the cache.
    #[arg(long)]
    refresh: bool,

    /// Use deterministic hash embeddings instead of the model.
    #[arg(long)]
    mock_embedder: bool,
}

#[derive(Args, Debug)]
struct ReleasesArgs {
    /// Release window in days.
    #[arg(long)]
    days_back: Option<u32>,

    /// Editorial country id.
    #[arg(long)]
    country: Option<u64>,
}

fn load_settings(cli: &Cli) -> Result<SeedscoutSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(seedscout_settings::settings_path);
    let mut settings = seedscout_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    if let Some(level) = &cli.log_level {
        settings.logging.level.clone_from(level);
    }
    Ok(settings)
}

/// Fold `run` flags into the loaded settings.
fn apply_run_args(settings: &mut SeedscoutSettings, args: &RunArgs) {
    if let Some(k) = args.top_k {
        settings.selection.top_k = k;
    }
    if let Some(days) = args.days_back {
        settings.catalog.days_back = days;
    }
    if let Some(country) = args.country {
        settings.catalog.country_id = country;
    }
    if let Some(dir) = &args.seeds_dir {
        settings.workspace.seeds_dir = dir.to_string_lossy().into_owned();
    }
    if args.keep_artifacts {
        settings.workspace.keep_artifacts = true;
    }
}

fn catalog_client(settings: &SeedscoutSettings) -> Result<CatalogClient> {
    let config = CatalogConfig {
        country_id: settings.catalog.country_id,
        album_limit: settings.catalog.album_limit,
        timeout: Duration::from_millis(settings.catalog.timeout_ms),
        ..CatalogConfig::default()
    }
    .with_base_url(settings.catalog.base_url.clone());
    CatalogClient::new(config).context("Failed to build catalog client")
}

fn audio_fetcher(settings: &SeedscoutSettings) -> Result<AudioFetcher> {
    AudioFetcher::new(FetchConfig {
        sample_rate: settings.audio.sample_rate,
        max_bytes: settings.audio.max_download_bytes,
        timeout: Duration::from_millis(settings.catalog.timeout_ms),
    })
    .context("Failed to build audio fetcher")
}

async fn build_pipeline(
    settings: &SeedscoutSettings,
    mock_embedder: bool,
) -> Result<Pipeline<dyn seedscout_embeddings::AudioEmbedder>> {
    let embedder = embedder::build_embedder(settings, mock_embedder).await?;
    Ok(Pipeline::new(
        catalog_client(settings)?,
        audio_fetcher(settings)?,
        embedder,
        PipelineOptions::from_settings(settings),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli)?;
    let format = if cli.json {
        LogFormat::Json
    } else {
        settings.logging.format
    };
    init_subscriber(&settings.logging.level, format);

    match &cli.command {
        Command::Run(args) => {
            apply_run_args(&mut settings, args);
            settings.validate().context("Invalid run options")?;
            let pipeline = build_pipeline(&settings, args.mock_embedder).await?;
            let matches = pipeline
                .run(&settings.workspace.seeds_path(), settings.selection.top_k)
                .await?;
            if cli.json {
                println!("{}", output::render_json(&matches)?);
            } else {
                print!("{}", output::render_matches(&matches));
            }
        }
        Command::Seeds(args) => {
            if let Some(dir) = &args.seeds_dir {
                settings.workspace.seeds_dir = dir.to_string_lossy().into_owned();
            }
            let pipeline = build_pipeline(&settings, args.mock_embedder).await?;
            let store = pipeline
                .embed_seeds(&settings.workspace.seeds_path(), args.refresh)
                .await?;
            tracing::info!(
                cache = %pipeline.options().seed_cache_dir().display(),
                seeds = store.len(),
                "seed cache updated"
            );
            let names = store.names();
            if cli.json {
                println!("{}", output::render_json(&names)?);
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
        Command::Releases(args) => {
            if let Some(days) = args.days_back {
                settings.catalog.days_back = days;
            }
            if let Some(country) = args.country {
                settings.catalog.country_id = country;
            }
            settings.validate().context("Invalid releases options")?;
            let albums = catalog_client(&settings)?
                .list_new_releases(settings.catalog.days_back)
                .await
                .context("Failed to list new releases")?;
            if cli.json {
                println!("{}", output::render_json(&albums)?);
            } else {
                print!("{}", output::render_albums(&albums));
            }
        }
    }
    Ok(())
}
