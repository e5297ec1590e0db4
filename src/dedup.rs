// src/dedup.rs
//! Duplicate-article suppression: one article per distinct story.
//!
//! First occurrence wins; order is preserved. Running the filter on its own
//! output is a no-op, so it can be applied at several pipeline points.

use std::collections::HashSet;

use tracing::debug;

use crate::model::FinishedArticle;
use crate::normalize::{title_key, url_key};

/// Drop articles whose canonical URL or normalized title was already seen.
pub fn dedupe_articles(articles: Vec<FinishedArticle>) -> Vec<FinishedArticle> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(articles.len());

    for article in articles {
        let url = article.canonical_url().map(url_key).unwrap_or_default();
        let title = {
            let simple = title_key(&article.simple_title);
            if simple.is_empty() {
                title_key(&article.title)
            } else {
                simple
            }
        };

        let dup_url = !url.is_empty() && seen_urls.contains(&url);
        let dup_title = !title.is_empty() && seen_titles.contains(&title);
        if dup_url || dup_title {
            debug!(id = %article.id, dup_url, dup_title, "dropping duplicate article");
            continue;
        }

        if !url.is_empty() {
            seen_urls.insert(url);
        }
        if !title.is_empty() {
            seen_titles.insert(title);
        }
        kept.push(article);
    }

    kept
}
