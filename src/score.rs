// src/score.rs
//! Breadth-over-recency ordering for topics and articles.
//!
//! The rank is a lexicographic pair: distinct-source breadth first, publish
//! time second. No amount of recency can outrank one additional independent
//! source.

use crate::cluster::TopicCluster;
use crate::model::FinishedArticle;

/// Composite rank key: (breadth, recency). Compared as a tuple, higher wins.
pub type RankKey = (usize, i64);

pub fn cluster_rank(cluster: &TopicCluster) -> RankKey {
    (cluster.sources_count, cluster.published_at.timestamp_millis())
}

pub fn article_rank(article: &FinishedArticle) -> RankKey {
    (article.sources.len(), article.published_at.timestamp_millis())
}

/// Sort clusters best-first for classification: important topics ahead of the
/// rest, then by rank.
pub fn sort_clusters_for_processing(clusters: &mut [TopicCluster]) {
    clusters.sort_by(|a, b| {
        (b.is_important, cluster_rank(b)).cmp(&(a.is_important, cluster_rank(a)))
    });
}

/// Sort finished articles best-first.
pub fn sort_articles(articles: &mut [FinishedArticle]) {
    articles.sort_by(|a, b| article_rank(b).cmp(&article_rank(a)));
}
