// src/output.rs
//! Final digest artifact: assembly and persistence.
//!
//! `articles_by_category` always contains every category key, each bucket
//! capped at the per-category maximum and sorted most-recent-first with
//! stories from the last 24 hours ahead of older ones. A persist failure is
//! fatal for the run; there is no partial-write recovery.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

use crate::allocate::QuotaConfig;
use crate::model::{Category, FinishedArticle};
use crate::score::sort_articles;

pub const RECENT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Digest {
    pub generated_at: String,
    pub articles: Vec<FinishedArticle>,
    pub articles_by_category: BTreeMap<String, Vec<FinishedArticle>>,
}

pub fn assemble(
    mut articles: Vec<FinishedArticle>,
    generated_at: DateTime<Utc>,
    quotas: QuotaConfig,
) -> Digest {
    sort_articles(&mut articles);

    let cutoff = generated_at - Duration::hours(RECENT_WINDOW_HOURS);
    let mut articles_by_category = BTreeMap::new();
    for category in Category::ALL {
        let mut members: Vec<FinishedArticle> = articles
            .iter()
            .filter(|a| a.category == category)
            .cloned()
            .collect();
        // Last-24h stories first, then older ones; newest first within each
        // group.
        members.sort_by(|a, b| {
            let a_recent = a.published_at >= cutoff;
            let b_recent = b.published_at >= cutoff;
            b_recent
                .cmp(&a_recent)
                .then(b.published_at.cmp(&a.published_at))
        });
        members.truncate(quotas.max_per_category);
        articles_by_category.insert(category.key().to_string(), members);
    }

    Digest {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        articles,
        articles_by_category,
    }
}

/// Write the artifact atomically: temp file in the same directory, then
/// rename over the target.
pub fn persist(digest: &Digest, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(digest).context("serializing digest")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json.as_bytes()).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
