// src/allocate.rs
//! Category quota allocation.
//!
//! Each quota category must end up with between `min_per_category` and
//! `max_per_category` articles when enough material exists. Categories that
//! fall short after the main classification pass are backfilled from the pool
//! of not-yet-consumed topic clusters in three ordered passes:
//!
//!   1. clusters carrying an explicit hint for the target category,
//!   2. clusters whose title the keyword heuristic assigns to the target,
//!   3. any remaining cluster.
//!
//! A candidate is classified exactly once and marked consumed even when the
//! call fails or the result lands in a different category; off-target
//! articles are stored globally under their true category and never counted
//! toward the target's quota. Backfill is strictly sequential across
//! categories and passes: later passes read counts and the consumed set
//! written by earlier ones.

use std::collections::HashSet;

use metrics::counter;
use tracing::{info, warn};

use crate::classify::{compose_article, heuristic, ClassifierResponse, TopicClassifier};
use crate::cluster::TopicCluster;
use crate::dedup::dedupe_articles;
use crate::model::{Category, FinishedArticle};

/// Per-category article bounds.
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    pub min_per_category: usize,
    pub max_per_category: usize,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            min_per_category: 2,
            max_per_category: 6,
        }
    }
}

/// Allocator state threaded through the backfill rounds: the global article
/// list and the set of cluster ids already sent through classification.
#[derive(Debug, Default)]
pub struct AllocatorContext {
    pub articles: Vec<FinishedArticle>,
    pub consumed: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackfillPass {
    Hint,
    Heuristic,
    Unrestricted,
}

const PASSES: [BackfillPass; 3] = [
    BackfillPass::Hint,
    BackfillPass::Heuristic,
    BackfillPass::Unrestricted,
];

impl BackfillPass {
    fn admits(self, cluster: &TopicCluster, target: Category) -> bool {
        match self {
            BackfillPass::Hint => cluster.category_hints.contains(&target),
            BackfillPass::Heuristic => {
                heuristic::predict_category(cluster.lead_title()) == Some(target)
            }
            BackfillPass::Unrestricted => true,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BackfillPass::Hint => "hint",
            BackfillPass::Heuristic => "heuristic",
            BackfillPass::Unrestricted => "unrestricted",
        }
    }
}

/// Run backfill for every quota category, in the fixed category order.
/// Deduplication is re-applied after each category round since a backfilled
/// article may duplicate one already accepted.
pub async fn backfill_categories(
    ctx: &mut AllocatorContext,
    fallback: &[TopicCluster],
    classifier: &dyn TopicClassifier,
    quotas: QuotaConfig,
) {
    for target in Category::QUOTA_TARGETS {
        backfill_category(ctx, fallback, classifier, quotas, target).await;
        let drained = std::mem::take(&mut ctx.articles);
        ctx.articles = dedupe_articles(drained);
    }
}

async fn backfill_category(
    ctx: &mut AllocatorContext,
    fallback: &[TopicCluster],
    classifier: &dyn TopicClassifier,
    quotas: QuotaConfig,
    target: Category,
) {
    let current = ctx
        .articles
        .iter()
        .filter(|a| a.category == target)
        .count();
    let missing = quotas.min_per_category.saturating_sub(current);
    let available = quotas.max_per_category.saturating_sub(current);
    let to_generate = missing.min(available);
    if to_generate == 0 {
        return;
    }

    info!(
        category = target.key(),
        current, to_generate, "backfilling category"
    );

    let mut produced = 0usize;
    for pass in PASSES {
        if produced >= to_generate {
            break;
        }

        let mut candidates: Vec<&TopicCluster> = fallback
            .iter()
            .filter(|c| !ctx.consumed.contains(&c.id))
            .filter(|c| pass.admits(c, target))
            .collect();
        candidates.sort_by_key(|c| std::cmp::Reverse(c.published_at));

        for cluster in candidates {
            if produced >= to_generate {
                break;
            }

            // Consumed up front: one external call per cluster across the
            // whole run, whatever the outcome.
            ctx.consumed.insert(cluster.id.clone());
            counter!("backfill_candidates_total").increment(1);

            match classifier.classify_and_summarize(cluster).await {
                ClassifierResponse::Classified(classified) => {
                    if classified.is_sensitive {
                        info!(topic = %cluster.id, "sensitive topic dropped during backfill");
                        continue;
                    }
                    let article = compose_article(cluster, classified);
                    if article.category == target {
                        produced += 1;
                    } else {
                        info!(
                            topic = %cluster.id,
                            got = article.category.key(),
                            want = target.key(),
                            pass = pass.label(),
                            "backfilled article landed off target"
                        );
                    }
                    ctx.articles.push(article);
                }
                ClassifierResponse::ParseError(e) => {
                    warn!(topic = %cluster.id, error = %e, "unparseable backfill classification");
                    counter!("classify_errors_total").increment(1);
                }
                ClassifierResponse::CallError(e) => {
                    warn!(topic = %cluster.id, error = %e, "backfill classification call failed");
                    counter!("classify_errors_total").increment(1);
                }
            }
        }
    }

    if produced < to_generate {
        info!(
            category = target.key(),
            produced,
            wanted = to_generate,
            "quota still unmet after all passes"
        );
    }
}
