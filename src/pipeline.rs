// src/pipeline.rs
//! End-to-end digest pipeline.
//!
//! raw items → topic clusters → importance ranking → initial classification
//! (bounded worker pool) → dedup → sequential category backfill → dedup →
//! best-effort imagery → artifact assembly.
//!
//! The algorithmic stages are pure and synchronous; the only suspension
//! points are the collaborator calls. Backfill runs strictly sequentially
//! because every round reads counts and the consumed set written by the
//! previous ones.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::allocate::{backfill_categories, AllocatorContext};
use crate::classify::{compose_article, ClassifierResponse, TopicClassifier};
use crate::cluster::{cluster_items, TopicCluster};
use crate::config::PipelineConfig;
use crate::dedup::dedupe_articles;
use crate::images::ImageProvider;
use crate::ingest::{run_once, types::FeedProvider};
use crate::model::{Category, FinishedArticle};
use crate::output::{assemble, Digest};
use crate::score::sort_clusters_for_processing;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("topics_total", "Topic clusters formed per run.");
        describe_counter!("articles_total", "Finished articles in the artifact.");
        describe_counter!("classify_errors_total", "Failed or unparseable classifications.");
        describe_counter!("backfill_candidates_total", "Clusters consumed by backfill.");
        describe_counter!("sensitive_dropped_total", "Topics dropped as sensitive.");
    });
}

/// Run the whole pipeline once and return the assembled digest. Collaborator
/// failures degrade the output but never abort it; the caller decides what a
/// persist failure means.
pub async fn run(
    cfg: &PipelineConfig,
    providers: &[Box<dyn FeedProvider>],
    classifier: Arc<dyn TopicClassifier>,
    images: &dyn ImageProvider,
) -> Digest {
    ensure_metrics_described();

    let items = run_once(providers).await;
    info!(items = items.len(), "ingest complete");

    let mut clusters = cluster_items(items, cfg.pipeline.similarity_threshold);
    counter!("topics_total").increment(clusters.len() as u64);
    sort_clusters_for_processing(&mut clusters);
    info!(topics = clusters.len(), "clustering complete");

    let (important, fallback): (Vec<TopicCluster>, Vec<TopicCluster>) =
        clusters.into_iter().partition(|c| c.is_important);
    info!(
        important = important.len(),
        fallback = fallback.len(),
        classifier = classifier.name(),
        "classifying important topics first"
    );

    // Initial pass: important topics through a bounded worker pool. Results
    // are re-ordered by spawn index afterwards; completion order is never
    // trusted for the final ordering.
    let semaphore = Arc::new(Semaphore::new(cfg.pipeline.classify_concurrency.max(1)));
    let mut tasks: JoinSet<(usize, TopicCluster, ClassifierResponse)> = JoinSet::new();
    for (idx, cluster) in important.into_iter().enumerate() {
        let classifier = Arc::clone(&classifier);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let response = classifier.classify_and_summarize(&cluster).await;
            (idx, cluster, response)
        });
    }

    let mut classified = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(entry) => classified.push(entry),
            Err(e) => warn!(error = ?e, "classification task failed"),
        }
    }
    classified.sort_by_key(|(idx, _, _)| *idx);

    let mut ctx = AllocatorContext::default();
    for (_, cluster, response) in classified {
        // One classifier call per cluster across the whole run; a failed
        // call still consumes the topic.
        ctx.consumed.insert(cluster.id.clone());
        match response {
            ClassifierResponse::Classified(c) if c.is_sensitive => {
                info!(topic = %cluster.id, "sensitive topic dropped");
                counter!("sensitive_dropped_total").increment(1);
            }
            ClassifierResponse::Classified(c) => {
                ctx.articles.push(compose_article(&cluster, c));
            }
            ClassifierResponse::ParseError(e) => {
                warn!(topic = %cluster.id, error = %e, "unparseable classification, topic skipped");
                counter!("classify_errors_total").increment(1);
            }
            ClassifierResponse::CallError(e) => {
                warn!(topic = %cluster.id, error = %e, "classifier call failed, topic skipped");
                counter!("classify_errors_total").increment(1);
            }
        }
    }
    ctx.articles = dedupe_articles(std::mem::take(&mut ctx.articles));
    info!(articles = ctx.articles.len(), "initial classification complete");

    backfill_categories(&mut ctx, &fallback, classifier.as_ref(), cfg.quota.to_quotas()).await;

    // Idempotent final pass.
    let mut articles = dedupe_articles(std::mem::take(&mut ctx.articles));
    attach_category_images(&mut articles, images).await;

    counter!("articles_total").increment(articles.len() as u64);
    info!(articles = articles.len(), "pipeline complete");
    assemble(articles, Utc::now(), cfg.quota.to_quotas())
}

/// Fill in missing article imagery with one stock lookup per category.
async fn attach_category_images(articles: &mut [FinishedArticle], images: &dyn ImageProvider) {
    let mut cache: HashMap<Category, Option<String>> = HashMap::new();
    for article in articles.iter_mut() {
        if article.image_url.is_some() {
            continue;
        }
        let url = match cache.get(&article.category) {
            Some(cached) => cached.clone(),
            None => {
                let fetched = images.fetch_category_image(article.category).await;
                cache.insert(article.category, fetched.clone());
                fetched
            }
        };
        article.image_url = url;
    }
}
