// src/cluster.rs
//! Greedy topic clustering.
//!
//! Items are scanned once, in input order, against the running union word set
//! of every open cluster. The best Jaccard score wins when it clears the
//! threshold; otherwise the item opens a new cluster. The running union means
//! a cluster can drift away from its earliest members — that is the intended
//! tradeoff of a cheap single pass, not something to correct here.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::model::{stable_id, Category, RawItem};
use crate::normalize::title_word_set;

/// A group of raw items believed to describe the same real-world event.
/// Frozen once clustering completes.
#[derive(Debug, Clone)]
pub struct TopicCluster {
    /// Hash of the sorted member ids; stable for a fixed member set
    /// regardless of insertion order.
    pub id: String,
    pub title_words: BTreeSet<String>,
    pub members: Vec<RawItem>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    /// Latest publish timestamp among members.
    pub published_at: DateTime<Utc>,
    /// Distinct lowercased source identities (name, or URL when unnamed).
    pub sources_count: usize,
    pub is_important: bool,
    pub category_hints: Vec<Category>,
}

impl TopicCluster {
    /// The lead member's title; used as the topic's display title and by the
    /// heuristic classifier.
    pub fn lead_title(&self) -> &str {
        self.members.first().map(|m| m.title.as_str()).unwrap_or("")
    }
}

/// Jaccard similarity of two word sets: |intersection| / |union|.
/// Zero when either set is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    inter as f32 / union as f32
}

struct OpenCluster {
    words: BTreeSet<String>,
    members: Vec<RawItem>,
}

/// Partition items into topic clusters. Single pass, order dependent.
/// Ties on the similarity score go to the first cluster encountered.
pub fn cluster_items(items: Vec<RawItem>, threshold: f32) -> Vec<TopicCluster> {
    let mut open: Vec<OpenCluster> = Vec::new();

    for item in items {
        let words = title_word_set(&item.title);

        let mut best: Option<(usize, f32)> = None;
        for (idx, cluster) in open.iter().enumerate() {
            let score = jaccard(&words, &cluster.words);
            match best {
                Some((_, s)) if score > s => best = Some((idx, score)),
                None => best = Some((idx, score)),
                _ => {}
            }
        }

        match best {
            Some((idx, score)) if score >= threshold => {
                let cluster = &mut open[idx];
                cluster.words.extend(words);
                cluster.members.push(item);
            }
            _ => open.push(OpenCluster {
                words,
                members: vec![item],
            }),
        }
    }

    open.into_iter().map(seal).collect()
}

fn seal(open: OpenCluster) -> TopicCluster {
    let members = open.members;

    let published_at = members
        .iter()
        .map(|m| m.published_at)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let image_url = members.iter().find_map(|m| m.image_url.clone());
    let video_url = members.iter().find_map(|m| m.video_url.clone());

    let mut identities: BTreeSet<String> = BTreeSet::new();
    for m in &members {
        let ident = if !m.source_name.trim().is_empty() {
            m.source_name.trim().to_lowercase()
        } else {
            m.source_url.trim().to_lowercase()
        };
        if !ident.is_empty() {
            identities.insert(ident);
        }
    }
    let sources_count = identities.len();

    let mut category_hints: Vec<Category> = Vec::new();
    for m in &members {
        for hint in &m.category_hints {
            if !category_hints.contains(hint) {
                category_hints.push(*hint);
            }
        }
    }

    let is_important = sources_count >= 2 || !category_hints.is_empty();

    let mut ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
    ids.sort_unstable();
    let id = stable_id(ids);

    TopicCluster {
        id,
        title_words: open.words,
        members,
        image_url,
        video_url,
        published_at,
        sources_count,
        is_important,
        category_hints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, source: &str, title: &str) -> RawItem {
        RawItem {
            id: id.to_string(),
            source_name: source.to_string(),
            source_url: format!("https://{}.gr/{}", source.to_lowercase(), id),
            title: title.to_string(),
            raw_text: String::new(),
            image_url: None,
            video_url: None,
            published_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            category_hints: Vec::new(),
        }
    }

    #[test]
    fn jaccard_of_disjoint_or_empty_sets_is_zero() {
        let a: BTreeSet<String> = ["alpha".to_string()].into_iter().collect();
        let b: BTreeSet<String> = ["bravo".to_string()].into_iter().collect();
        let empty = BTreeSet::new();
        assert_eq!(jaccard(&a, &b), 0.0);
        assert_eq!(jaccard(&a, &empty), 0.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn similar_greek_titles_merge() {
        // {σεισμός, κρήτη, ρίχτερ, ισχυρός} vs {σεισμός, κρήτη, ρίχτερ}:
        // intersection 3, union 4 → 0.75, well over the threshold.
        let items = vec![
            item("a", "Alpha", "Ισχυρός σεισμός Κρήτη Ρίχτερ"),
            item("b", "Beta", "Σεισμός Κρήτη Ρίχτερ"),
        ];
        let clusters = cluster_items(items, 0.35);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[0].sources_count, 2);
        assert!(clusters[0].is_important);
    }

    #[test]
    fn similarity_exactly_at_threshold_merges() {
        // 7 shared + 7 unique vs 7 shared + 6 unique:
        // intersection 7, union 20 → exactly 0.35.
        let shared: Vec<String> = (1..=7).map(|i| format!("alpha{:02}", i)).collect();
        let only_a: Vec<String> = (1..=7).map(|i| format!("bravo{:02}", i)).collect();
        let only_b: Vec<String> = (1..=6).map(|i| format!("circa{:02}", i)).collect();

        let title_a = format!("{} {}", shared.join(" "), only_a.join(" "));
        let title_b = format!("{} {}", shared.join(" "), only_b.join(" "));

        let clusters = cluster_items(
            vec![item("a", "Alpha", &title_a), item("b", "Beta", &title_b)],
            0.35,
        );
        assert_eq!(clusters.len(), 1, "score exactly at threshold must merge");
    }

    #[test]
    fn similarity_below_threshold_stays_apart() {
        // 6 shared, 7 + 7 unique: intersection 6, union 20 → 0.30 < 0.35.
        let shared: Vec<String> = (1..=6).map(|i| format!("alpha{:02}", i)).collect();
        let only_a: Vec<String> = (1..=7).map(|i| format!("bravo{:02}", i)).collect();
        let only_b: Vec<String> = (1..=7).map(|i| format!("circa{:02}", i)).collect();

        let title_a = format!("{} {}", shared.join(" "), only_a.join(" "));
        let title_b = format!("{} {}", shared.join(" "), only_b.join(" "));

        let clusters = cluster_items(
            vec![item("a", "Alpha", &title_a), item("b", "Beta", &title_b)],
            0.35,
        );
        assert_eq!(clusters.len(), 2, "score below threshold must not merge");
    }

    #[test]
    fn empty_title_always_opens_its_own_cluster() {
        let items = vec![
            item("a", "Alpha", "Σεισμός Κρήτη Ρίχτερ"),
            item("b", "Beta", ""),
            item("c", "Gamma", ""),
        ];
        let clusters = cluster_items(items, 0.35);
        assert_eq!(clusters.len(), 3);
    }

    #[test]
    fn cluster_id_is_order_independent() {
        let titles = "Σεισμός Κρήτη Ρίχτερ ισχυρός";
        let forward = cluster_items(
            vec![
                item("a", "Alpha", titles),
                item("b", "Beta", titles),
                item("c", "Gamma", titles),
            ],
            0.35,
        );
        let backward = cluster_items(
            vec![
                item("c", "Gamma", titles),
                item("b", "Beta", titles),
                item("a", "Alpha", titles),
            ],
            0.35,
        );
        assert_eq!(forward.len(), 1);
        assert_eq!(backward.len(), 1);
        assert_eq!(forward[0].id, backward[0].id);
    }

    #[test]
    fn post_processing_aggregates_member_fields() {
        let mut a = item("a", "Alpha", "Σεισμός Κρήτη Ρίχτερ");
        a.published_at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let mut b = item("b", "ALPHA", "Σεισμός Κρήτη Ρίχτερ");
        b.published_at = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        b.image_url = Some("https://img.gr/1.jpg".to_string());
        b.category_hints = vec![Category::Social];

        let clusters = cluster_items(vec![a, b], 0.35);
        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        // "Alpha" and "ALPHA" are one identity after lowercasing.
        assert_eq!(c.sources_count, 1);
        // A single source, but a category hint still marks it important.
        assert!(c.is_important);
        assert_eq!(c.image_url.as_deref(), Some("https://img.gr/1.jpg"));
        assert_eq!(
            c.published_at,
            Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap()
        );
        assert_eq!(c.category_hints, vec![Category::Social]);
    }
}
