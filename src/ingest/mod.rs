// src/ingest/mod.rs
pub mod providers;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::ingest::types::FeedProvider;
use crate::model::RawItem;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Feed entries parsed into raw items.");
        describe_counter!("ingest_feed_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when ingest last ran.");
    });
}

/// Fetch every configured feed once. A failing feed is logged and skipped;
/// the remaining feeds still contribute their items, in provider order.
pub async fn run_once(providers: &[Box<dyn FeedProvider>]) -> Vec<RawItem> {
    ensure_metrics_described();

    let mut items = Vec::new();
    for provider in providers {
        match provider.fetch_items().await {
            Ok(mut fetched) => {
                tracing::info!(feed = provider.name(), items = fetched.len(), "feed fetched");
                items.append(&mut fetched);
            }
            Err(e) => {
                tracing::warn!(error = ?e, feed = provider.name(), "feed error, skipping");
                counter!("ingest_feed_errors_total").increment(1);
            }
        }
    }

    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    items
}
