// src/normalize.rs
//! Text normalization primitives: body cleanup, title word sets for topic
//! clustering, and the keys used by the deduplicator.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Body text cap, in chars. Keeps classifier payloads bounded.
pub const BODY_CHAR_CAP: usize = 2000;

/// Tokens dropped from title word sets regardless of length: prepositions,
/// articles and generic newsroom filler in Greek and English. Short tokens
/// (≤ 3 chars) are dropped before this list is consulted.
const STOPWORDS: &[&str] = &[
    // Greek function words longer than three chars
    "στην", "στον", "στης", "στου", "στις", "στους", "μετά", "κατά", "μέσα", "χωρίς", "μεταξύ",
    "εναντίον", "προς", "όπως", "όταν", "αφού", "πριν", "αλλά", "όμως", "ακόμα", "ακόμη", "είναι",
    "ήταν", "έχει", "έχουν", "αυτός", "αυτή", "αυτό", "αυτοί", "αυτές", "αυτά", "ένας", "κάθε",
    "πολύ", "όλοι", "όλες", "όλα",
    // Generic newsroom terms
    "ειδήσεις", "είδηση", "σήμερα", "τώρα", "βίντεο", "δείτε", "δειτε", "φωτογραφίες",
    "φωτογραφία", "ρεπορτάζ", "έκτακτο", "εκτακτο", "ανανέωση",
    // English equivalents that show up in mixed-language titles
    "news", "today", "video", "breaking", "watch", "update", "live", "with", "from", "this",
    "that", "after", "over",
];

fn stopword_set() -> &'static HashSet<&'static str> {
    static SET: OnceCell<HashSet<&'static str>> = OnceCell::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Normalize feed body text: decode HTML entities, strip tags, normalize
/// curly quotes, collapse whitespace and cap the length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap
    if out.chars().count() > BODY_CHAR_CAP {
        out = out.chars().take(BODY_CHAR_CAP).collect();
    }

    out
}

/// Turn a raw title into the set of significant words used for topic
/// similarity. Pure and deterministic; an empty title yields an empty set.
pub fn title_word_set(title: &str) -> BTreeSet<String> {
    let stop = stopword_set();
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .filter(|t| t != "live")
        .filter(|t| t.chars().count() > 3)
        .filter(|t| !stop.contains(t.as_str()))
        .collect()
}

/// Normalized string form of a title, used as a dedup key. Lowercased
/// alphanumeric tokens joined by single spaces.
pub fn title_key(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dedup key for URLs: trimmed and lowercased.
pub fn url_key(url: &str) -> String {
    url.trim().to_ascii_lowercase()
}

/// Best-effort hostname extraction with the `www.` prefix stripped.
pub fn domain_of(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() || !host.contains('.') {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}
