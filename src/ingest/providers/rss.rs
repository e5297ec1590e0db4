// src/ingest/providers/rss.rs
//! Generic RSS 2.0 feed provider.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::ingest::types::FeedProvider;
use crate::model::{stable_id, Category, RawItem};
use crate::normalize::normalize_text;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "category", default)]
    categories: Vec<CategoryTag>,
    enclosure: Option<Enclosure>,
}

// guid and category carry attributes (isPermaLink, domain); only the text
// content matters here.
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryTag {
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@type")]
    mime: Option<String>,
}

fn parse_pub_date(ts: &str) -> Option<DateTime<Utc>> {
    let odt = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()?;
    DateTime::from_timestamp(odt.to_offset(UtcOffset::UTC).unix_timestamp(), 0)
}

pub struct RssProvider {
    source_name: String,
    feed_url: String,
    feed_hints: Vec<Category>,
    max_items: usize,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl RssProvider {
    pub fn from_url(
        source_name: &str,
        feed_url: &str,
        feed_hints: Vec<Category>,
        max_items: usize,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("plain-news-digest/0.1")
            .connect_timeout(std::time::Duration::from_secs(4))
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            source_name: source_name.to_string(),
            feed_url: feed_url.to_string(),
            feed_hints,
            max_items,
            mode: Mode::Http { client },
        }
    }

    /// Parse from an in-memory XML document; used by tests and local runs.
    pub fn from_fixture_str(
        source_name: &str,
        feed_url: &str,
        feed_hints: Vec<Category>,
        max_items: usize,
        xml: &str,
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            feed_url: feed_url.to_string(),
            feed_hints,
            max_items,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<RawItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml from {}", self.feed_url))?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(self.max_items));
        for it in rss.channel.item.into_iter().take(self.max_items) {
            let title = it.title.as_deref().unwrap_or_default().trim().to_string();
            if title.is_empty() {
                continue;
            }

            let raw_text = normalize_text(it.description.as_deref().unwrap_or_default());
            let link = it.link.clone().unwrap_or_default();
            let pub_raw = it.pub_date.as_deref().unwrap_or_default();
            let published_at = it
                .pub_date
                .as_deref()
                .and_then(parse_pub_date)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

            // Feed-provided unique id when present, composite fallback
            // otherwise; stable across runs either way.
            let guid = it
                .guid
                .as_ref()
                .and_then(|g| g.value.as_deref())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            let id = match guid {
                Some(g) => stable_id([g]),
                None => stable_id([self.feed_url.as_str(), title.as_str(), pub_raw]),
            };

            let (image_url, video_url) = match &it.enclosure {
                Some(enc) => {
                    let mime = enc.mime.as_deref().unwrap_or_default();
                    if mime.starts_with("image/") {
                        (enc.url.clone(), None)
                    } else if mime.starts_with("video/") {
                        (None, enc.url.clone())
                    } else {
                        (None, None)
                    }
                }
                None => (None, None),
            };

            let mut category_hints = self.feed_hints.clone();
            for tag in &it.categories {
                if let Some(cat) = tag.value.as_deref().and_then(Category::from_hint) {
                    if !category_hints.contains(&cat) {
                        category_hints.push(cat);
                    }
                }
            }

            out.push(RawItem {
                id,
                source_name: self.source_name.clone(),
                source_url: link,
                title,
                raw_text,
                image_url,
                video_url,
                published_at,
                category_hints,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_items_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for RssProvider {
    async fn fetch_items(&self) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(xml) => self.parse_items_from_str(xml),
            Mode::Http { client } => {
                let body = client
                    .get(&self.feed_url)
                    .send()
                    .await
                    .with_context(|| format!("fetching feed {}", self.feed_url))?
                    .error_for_status()
                    .with_context(|| format!("feed http status from {}", self.feed_url))?
                    .text()
                    .await
                    .with_context(|| format!("reading feed body from {}", self.feed_url))?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.source_name
    }
}

// Feeds routinely embed HTML entities that are not valid XML; scrub the
// common ones before handing the document to the parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&laquo;", "\"")
        .replace("&raquo;", "\"")
}
