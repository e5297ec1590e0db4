// src/ingest/types.rs
use anyhow::Result;

use crate::model::RawItem;

/// One syndicated feed. Each provider may fail independently; a failure
/// skips that feed and never aborts the run.
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_items(&self) -> Result<Vec<RawItem>>;
    fn name(&self) -> &str;
}
