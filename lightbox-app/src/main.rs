//! CLI front-end for the mapping pipeline: resolve a tweet's media list and
//! the gallery index for a clicked URL, either from a saved payload file or
//! live against the GraphQL endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;

use lightbox_common::observability::{init_logging, LogConfig};
use lightbox_config::GalleryConfigLoader;
use lightbox_gallery::{
    ClickCandidate, ClickedElement, MediaMappingService, PageType, TweetSource,
};
use lightbox_social::twitter::TweetDetailApi;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Page {
    Timeline,
    Photo,
    Video,
}

impl From<Page> for PageType {
    fn from(page: Page) -> Self {
        match page {
            Page::Timeline => PageType::Timeline,
            Page::Photo => PageType::PhotoDetail,
            Page::Video => PageType::VideoDetail,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "lightbox",
    about = "Resolve a tweet's media attachments and the clicked gallery index"
)]
struct Cli {
    /// Saved tweet-detail JSON payload; skips the network when given.
    #[arg(long)]
    payload: Option<PathBuf>,
    /// Tweet id, as the DOM collaborator would recover it on a timeline.
    #[arg(long)]
    tweet_id: Option<String>,
    /// URL of the page the click happened on.
    #[arg(long, default_value = "https://x.com/home")]
    page_url: String,
    /// URL extracted from the clicked element.
    #[arg(long)]
    clicked_url: Option<String>,
    #[arg(long, value_enum, default_value = "timeline")]
    page: Page,
    #[arg(long, default_value = "lightbox.yaml")]
    config: PathBuf,
}

/// Offline stand-in for the network collaborator.
struct FileSource(Value);

#[async_trait::async_trait]
impl TweetSource for FileSource {
    async fn tweet_detail(&self, _tweet_id: &str) -> Result<Value> {
        Ok(self.0.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = GalleryConfigLoader::new().with_file(&cli.config).load()?;
    init_logging(LogConfig::default())?;

    let source: Arc<dyn TweetSource> = match &cli.payload {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read payload {}", path.display()))?;
            Arc::new(FileSource(
                serde_json::from_str(&raw).context("payload is not valid JSON")?,
            ))
        }
        None => Arc::new(TweetDetailApi::new(
            &cfg.fetch.base_url,
            cfg.fetch.auth_token.clone(),
            cfg.fetch.timeout_secs,
        )?),
    };

    let service = MediaMappingService::new(source, cfg.trusted_hosts.clone());
    let clicked = ClickedElement {
        tweet_id: cli.tweet_id.clone(),
        page_url: cli.page_url.clone(),
        extracted_url: cli.clicked_url.clone(),
    };

    let Some(mapping) = service.map_media(&clicked, cli.page.into()).await else {
        anyhow::bail!("no media mapping produced; see logs for the failing step");
    };

    let candidate = ClickCandidate {
        extracted_url: cli.clicked_url,
    };
    let initial_index = mapping.initial_index(&candidate);

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "mapping": mapping,
            "initial_index": initial_index,
        }))?
    );
    Ok(())
}
