// src/images.rs
//! Best-effort stock imagery for articles that arrive without one.
//! Purely cosmetic: every failure path yields `None`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::model::Category;

#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn fetch_category_image(&self, category: Category) -> Option<String>;
    fn name(&self) -> &'static str;
}

/// Returns `None` always; used when no image API key is configured.
pub struct NoImages;

#[async_trait]
impl ImageProvider for NoImages {
    async fn fetch_category_image(&self, _category: Category) -> Option<String> {
        None
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Stock photo search (Pexels API). Requires `PEXELS_API_KEY`.
pub struct StockImageProvider {
    http: reqwest::Client,
    api_key: String,
}

impl StockImageProvider {
    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("plain-news-digest/0.1")
            .connect_timeout(std::time::Duration::from_secs(4))
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http, api_key }
    }
}

#[async_trait]
impl ImageProvider for StockImageProvider {
    async fn fetch_category_image(&self, category: Category) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }

        #[derive(Deserialize)]
        struct SearchResp {
            #[serde(default)]
            photos: Vec<Photo>,
        }
        #[derive(Deserialize)]
        struct Photo {
            src: PhotoSrc,
        }
        #[derive(Deserialize)]
        struct PhotoSrc {
            medium: Option<String>,
        }

        let resp = self
            .http
            .get("https://api.pexels.com/v1/search")
            .header("Authorization", &self.api_key)
            .query(&[("query", category.image_query()), ("per_page", "1")])
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: SearchResp = resp.json().await.ok()?;
        body.photos.into_iter().next().and_then(|p| p.src.medium)
    }

    fn name(&self) -> &'static str {
        "pexels"
    }
}
