//! plain-news-digest — binary entrypoint.
//! One-shot batch run: fetch feeds, cluster topics, classify and simplify,
//! fill category quotas, write the digest artifact.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plain_news_digest::classify::openai::OpenAiClassifier;
use plain_news_digest::classify::{DisabledClassifier, MockClassifier, TopicClassifier};
use plain_news_digest::config::PipelineConfig;
use plain_news_digest::images::{ImageProvider, NoImages, StockImageProvider};
use plain_news_digest::ingest::providers::rss::RssProvider;
use plain_news_digest::ingest::types::FeedProvider;
use plain_news_digest::{output, pipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// `DIGEST_TEST_MODE=mock` → deterministic offline classifier;
/// `OPENAI_API_KEY` set → real provider; otherwise disabled (the run still
/// produces a valid, possibly empty, artifact).
fn build_classifier(cfg: &PipelineConfig) -> Arc<dyn TopicClassifier> {
    if std::env::var("DIGEST_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockClassifier);
    }
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            Arc::new(OpenAiClassifier::new(key, &cfg.classifier.model))
        }
        _ => {
            tracing::warn!("OPENAI_API_KEY not set, classification disabled");
            Arc::new(DisabledClassifier)
        }
    }
}

fn build_image_provider() -> Box<dyn ImageProvider> {
    match std::env::var("PEXELS_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Box::new(StockImageProvider::new(key)),
        _ => Box::new(NoImages),
    }
}

async fn run() -> Result<()> {
    let cfg = PipelineConfig::load()?;

    let providers: Vec<Box<dyn FeedProvider>> = cfg
        .feeds
        .iter()
        .map(|feed| {
            Box::new(RssProvider::from_url(
                &feed.source_name,
                &feed.url,
                feed.category_hints.clone(),
                cfg.pipeline.max_items_per_feed,
            )) as Box<dyn FeedProvider>
        })
        .collect();

    let classifier = build_classifier(&cfg);
    let images = build_image_provider();

    // A single hung external call must not stall the process indefinitely.
    let digest = tokio::time::timeout(
        Duration::from_secs(cfg.pipeline.run_timeout_secs),
        pipeline::run(&cfg, &providers, classifier, images.as_ref()),
    )
    .await
    .context("pipeline run timed out")?;

    let out_path = std::env::var("DIGEST_OUTPUT_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(&cfg.pipeline.output_path));
    output::persist(&digest, &out_path)?;
    info!(path = %out_path.display(), articles = digest.articles.len(), "digest written");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env in local/dev; no-op in CI environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = ?e, "digest run failed");
        std::process::exit(1);
    }
}
