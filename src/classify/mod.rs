// src/classify/mod.rs
//! Classifier/summarizer gateway.
//!
//! The external collaborator takes one topic cluster and returns a category
//! plus a simplified rendition of the story. Responses are modeled as a
//! tagged result so callers can tell a failed call from an unparseable one;
//! neither aborts a run.

pub mod heuristic;
pub mod openai;

use async_trait::async_trait;

use crate::cluster::TopicCluster;
use crate::model::{ArticleSource, Category, FinishedArticle};
use crate::normalize::domain_of;

/// Successful classification output for one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTopic {
    pub category: Category,
    pub category_reason: String,
    pub simple_title: String,
    pub simple_text: String,
    pub is_sensitive: bool,
}

/// Tagged collaborator response. `ParseError` means the call succeeded but
/// the payload was not usable; `CallError` means the call itself failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierResponse {
    Classified(ClassifiedTopic),
    ParseError(String),
    CallError(String),
}

/// One call per topic; may fail. Implementations must not retry internally.
#[async_trait]
pub trait TopicClassifier: Send + Sync {
    async fn classify_and_summarize(&self, topic: &TopicCluster) -> ClassifierResponse;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Always fails; used when no API key is configured.
pub struct DisabledClassifier;

#[async_trait]
impl TopicClassifier for DisabledClassifier {
    async fn classify_and_summarize(&self, _topic: &TopicCluster) -> ClassifierResponse {
        ClassifierResponse::CallError("classifier disabled".to_string())
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic offline classifier for tests and local runs: category from
/// hints or the keyword heuristic, text passed through unchanged.
pub struct MockClassifier;

#[async_trait]
impl TopicClassifier for MockClassifier {
    async fn classify_and_summarize(&self, topic: &TopicCluster) -> ClassifierResponse {
        let Some(lead) = topic.members.first() else {
            return ClassifierResponse::ParseError("empty topic".to_string());
        };
        let category = topic
            .category_hints
            .first()
            .copied()
            .or_else(|| heuristic::predict_category(&lead.title))
            .unwrap_or(Category::Other);
        ClassifierResponse::Classified(ClassifiedTopic {
            category,
            category_reason: "mock".to_string(),
            simple_title: lead.title.clone(),
            simple_text: lead.raw_text.chars().take(300).collect(),
            is_sensitive: false,
        })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Combine a topic cluster with its classification into a finished article.
pub fn compose_article(topic: &TopicCluster, classified: ClassifiedTopic) -> FinishedArticle {
    let sources: Vec<ArticleSource> = topic
        .members
        .iter()
        .map(|m| ArticleSource {
            title: m.title.clone(),
            url: m.source_url.clone(),
        })
        .collect();

    let mut source_domains: Vec<String> = Vec::new();
    for s in &sources {
        if let Some(domain) = domain_of(&s.url) {
            if !source_domains.contains(&domain) {
                source_domains.push(domain);
            }
        }
    }

    FinishedArticle {
        id: topic.id.clone(),
        title: topic.lead_title().to_string(),
        simple_title: classified.simple_title,
        simple_text: classified.simple_text,
        category: classified.category,
        category_reason: classified.category_reason,
        sources,
        source_domains,
        image_url: topic.image_url.clone(),
        video_url: topic.video_url.clone(),
        published_at: topic.published_at,
        is_sensitive: classified.is_sensitive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::cluster_items;
    use crate::model::RawItem;
    use chrono::{TimeZone, Utc};

    fn raw(id: &str, source: &str, title: &str) -> RawItem {
        RawItem {
            id: id.to_string(),
            source_name: source.to_string(),
            source_url: format!("https://www.{}.gr/a/{}", source.to_lowercase(), id),
            title: title.to_string(),
            raw_text: "Κείμενο.".to_string(),
            image_url: None,
            video_url: None,
            published_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            category_hints: Vec::new(),
        }
    }

    #[test]
    fn compose_article_carries_cluster_fields() {
        let clusters = cluster_items(
            vec![
                raw("a", "Alpha", "Σεισμός Κρήτη Ρίχτερ"),
                raw("b", "Beta", "Σεισμός Κρήτη Ρίχτερ ισχυρός"),
            ],
            0.35,
        );
        assert_eq!(clusters.len(), 1);
        let article = compose_article(
            &clusters[0],
            ClassifiedTopic {
                category: Category::Social,
                category_reason: "σεισμός".to_string(),
                simple_title: "Σεισμός στην Κρήτη".to_string(),
                simple_text: "Έγινε σεισμός.".to_string(),
                is_sensitive: false,
            },
        );
        assert_eq!(article.id, clusters[0].id);
        assert_eq!(article.category, Category::Social);
        assert_eq!(article.sources.len(), 2);
        assert_eq!(article.source_domains, vec!["alpha.gr", "beta.gr"]);
        assert_eq!(article.canonical_url(), Some("https://www.alpha.gr/a/a"));
    }

    #[tokio::test]
    async fn mock_classifier_uses_hint_before_heuristic() {
        let mut a = raw("a", "Alpha", "Κάτι γενικό συνέβη κάπου");
        a.category_hints = vec![Category::Culture];
        let clusters = cluster_items(vec![a], 0.35);
        let resp = MockClassifier.classify_and_summarize(&clusters[0]).await;
        match resp {
            ClassifierResponse::Classified(c) => assert_eq!(c.category, Category::Culture),
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
