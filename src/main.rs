use anyhow::{Context, Result};
use creator_growth::api::hf::HfClient;
use creator_growth::api::youtube::YoutubeClient;
use creator_growth::config::Config;
use creator_growth::media::{self, PlaceholderTranscriber};
use creator_growth::routes::{AppState, router};
use creator_growth::storage::MemoryStorage;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = Config::from_env()?;
    if cfg.youtube_api_key.is_none() {
        tracing::warn!("YOUTUBE_API_KEY not set; video lookups and competitor data are disabled");
    }
    if !media::check_ffmpeg().await {
        tracing::warn!("ffmpeg not found in PATH; video uploads will fail");
    }

    let client = reqwest::Client::builder()
        .timeout(cfg.request_timeout)
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let state = AppState {
        generator: Arc::new(HfClient::new(client.clone(), &cfg)),
        youtube: Arc::new(YoutubeClient::new(client, cfg.youtube_api_key.clone())),
        storage: Arc::new(MemoryStorage::new()),
        transcriber: Arc::new(PlaceholderTranscriber),
    };

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    tracing::info!("listening on {}", cfg.bind_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
