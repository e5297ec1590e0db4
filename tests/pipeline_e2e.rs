// tests/pipeline_e2e.rs
//
// Whole-pipeline scenario: two wire stories about the same earthquake plus
// one basketball story, through clustering, important-first classification,
// backfill and artifact assembly.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use plain_news_digest::classify::{ClassifiedTopic, ClassifierResponse, TopicClassifier};
use plain_news_digest::cluster::TopicCluster;
use plain_news_digest::config::PipelineConfig;
use plain_news_digest::images::NoImages;
use plain_news_digest::ingest::types::FeedProvider;
use plain_news_digest::model::{Category, RawItem};
use plain_news_digest::pipeline;

fn item(id: &str, source: &str, url: &str, title: &str, hour: u32) -> RawItem {
    RawItem {
        id: id.to_string(),
        source_name: source.to_string(),
        source_url: url.to_string(),
        title: title.to_string(),
        raw_text: "Κείμενο είδησης.".to_string(),
        image_url: None,
        video_url: None,
        published_at: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
        category_hints: Vec::new(),
    }
}

fn scenario_items() -> Vec<RawItem> {
    vec![
        item(
            "a",
            "Alpha News",
            "https://alpha.gr/seismos-1",
            "Σεισμός 5.1 Ρίχτερ στην Κρήτη",
            10,
        ),
        item(
            "b",
            "Beta Press",
            "https://beta.gr/seismos-2",
            "Ισχυρός σεισμός στην Κρήτη, 5.1 Ρίχτερ",
            11,
        ),
        item(
            "c",
            "Gamma Sport",
            "https://gamma.gr/eurobasket",
            "Ελλάδα–Ισπανία 2-1 στο Eurobasket",
            12,
        ),
    ]
}

struct FixedFeed(Vec<RawItem>);

#[async_trait]
impl FeedProvider for FixedFeed {
    async fn fetch_items(&self) -> anyhow::Result<Vec<RawItem>> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &str {
        "fixed"
    }
}

/// Classifies earthquakes as social and everything else as sports, recording
/// the lead title of every call.
struct Scripted {
    calls: Mutex<Vec<String>>,
}

impl Scripted {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TopicClassifier for Scripted {
    async fn classify_and_summarize(&self, topic: &TopicCluster) -> ClassifierResponse {
        let lead = topic.lead_title().to_string();
        self.calls.lock().unwrap().push(lead.clone());
        let category = if lead.contains("εισμός") {
            Category::Social
        } else {
            Category::Sports
        };
        ClassifierResponse::Classified(ClassifiedTopic {
            category,
            category_reason: "σενάριο".to_string(),
            simple_title: format!("Απλά: {}", lead),
            simple_text: "Πολύ απλό κείμενο.".to_string(),
            is_sensitive: false,
        })
    }
    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[tokio::test]
async fn earthquake_pair_merges_and_is_classified_first() {
    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(FixedFeed(scenario_items()))];
    let classifier = Arc::new(Scripted::new());
    let cfg = PipelineConfig::default();

    let digest = pipeline::run(&cfg, &providers, classifier.clone(), &NoImages).await;

    // Two topics, one article each.
    assert_eq!(digest.articles.len(), 2);

    // The two-source earthquake topic is important and goes through the
    // classifier before the single-source basketball topic, which is only
    // reached by backfill.
    let calls = classifier.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2, "exactly one call per topic");
    assert_eq!(calls[0], "Σεισμός 5.1 Ρίχτερ στην Κρήτη");
    assert_eq!(calls[1], "Ελλάδα–Ισπανία 2-1 στο Eurobasket");

    // Every category key is present in the map.
    for category in Category::ALL {
        assert!(digest.articles_by_category.contains_key(category.key()));
    }

    let social = &digest.articles_by_category["social"];
    assert_eq!(social.len(), 1);
    assert_eq!(social[0].sources.len(), 2, "both wire stories merged");
    assert_eq!(social[0].source_domains, vec!["alpha.gr", "beta.gr"]);
    // Cluster timestamp is the latest member timestamp.
    assert_eq!(
        social[0].published_at,
        Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap()
    );

    let sports = &digest.articles_by_category["sports"];
    assert_eq!(sports.len(), 1);
    assert_eq!(sports[0].title, "Ελλάδα–Ισπανία 2-1 στο Eurobasket");
}

#[tokio::test]
async fn merged_topic_id_is_input_order_independent() {
    let forward: Vec<Box<dyn FeedProvider>> = vec![Box::new(FixedFeed(scenario_items()))];
    let mut reversed_items = scenario_items();
    reversed_items.reverse();
    let backward: Vec<Box<dyn FeedProvider>> = vec![Box::new(FixedFeed(reversed_items))];

    let cfg = PipelineConfig::default();
    let digest_fwd =
        pipeline::run(&cfg, &forward, Arc::new(Scripted::new()), &NoImages).await;
    let digest_bwd =
        pipeline::run(&cfg, &backward, Arc::new(Scripted::new()), &NoImages).await;

    let id_of = |digest: &plain_news_digest::Digest| {
        digest.articles_by_category["social"]
            .first()
            .map(|a| a.id.clone())
            .expect("social article present")
    };
    assert_eq!(id_of(&digest_fwd), id_of(&digest_bwd));
}

#[tokio::test]
async fn failing_classifier_still_produces_a_valid_empty_artifact() {
    struct Down;

    #[async_trait]
    impl TopicClassifier for Down {
        async fn classify_and_summarize(&self, _topic: &TopicCluster) -> ClassifierResponse {
            ClassifierResponse::CallError("boom".to_string())
        }
        fn name(&self) -> &'static str {
            "down"
        }
    }

    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(FixedFeed(scenario_items()))];
    let cfg = PipelineConfig::default();
    let digest = pipeline::run(&cfg, &providers, Arc::new(Down), &NoImages).await;

    assert!(digest.articles.is_empty());
    for category in Category::ALL {
        assert!(digest.articles_by_category[category.key()].is_empty());
    }
}

#[tokio::test]
async fn sensitive_topics_are_dropped() {
    struct Sensitive;

    #[async_trait]
    impl TopicClassifier for Sensitive {
        async fn classify_and_summarize(&self, topic: &TopicCluster) -> ClassifierResponse {
            ClassifierResponse::Classified(ClassifiedTopic {
                category: Category::Social,
                category_reason: String::new(),
                simple_title: topic.lead_title().to_string(),
                simple_text: String::new(),
                is_sensitive: true,
            })
        }
        fn name(&self) -> &'static str {
            "sensitive"
        }
    }

    let providers: Vec<Box<dyn FeedProvider>> = vec![Box::new(FixedFeed(scenario_items()))];
    let cfg = PipelineConfig::default();
    let digest = pipeline::run(&cfg, &providers, Arc::new(Sensitive), &NoImages).await;
    assert!(digest.articles.is_empty());
}
