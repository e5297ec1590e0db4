// src/config.rs
//! Pipeline configuration: TOML file plus environment overrides.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::allocate::QuotaConfig;
use crate::model::Category;

pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.35;

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const ENV_SIMILARITY_THRESHOLD: &str = "DIGEST_SIMILARITY_THRESHOLD";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub pipeline: PipelineSection,
    pub quota: QuotaSection,
    pub classifier: ClassifierSection,
    pub feeds: Vec<FeedConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineSection::default(),
            quota: QuotaSection::default(),
            classifier: ClassifierSection::default(),
            feeds: vec![FeedConfig {
                url: "https://www.ertnews.gr/feed".to_string(),
                source_name: "ERT News".to_string(),
                category_hints: Vec::new(),
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// Jaccard similarity required for an item to join an open topic.
    pub similarity_threshold: f32,
    /// Whole-run ceiling so one hung external call cannot stall the process.
    pub run_timeout_secs: u64,
    /// Worker-pool bound for the initial classification pass.
    pub classify_concurrency: usize,
    pub max_items_per_feed: usize,
    pub output_path: String,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            run_timeout_secs: 600,
            classify_concurrency: 4,
            max_items_per_feed: 30,
            output_path: "news.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotaSection {
    pub min_per_category: usize,
    pub max_per_category: usize,
}

impl Default for QuotaSection {
    fn default() -> Self {
        Self {
            min_per_category: 2,
            max_per_category: 6,
        }
    }
}

impl QuotaSection {
    pub fn to_quotas(&self) -> QuotaConfig {
        QuotaConfig {
            min_per_category: self.min_per_category,
            max_per_category: self.max_per_category,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub model: String,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    pub source_name: String,
    #[serde(default)]
    pub category_hints: Vec<Category>,
}

impl PipelineConfig {
    /// Load from `$DIGEST_CONFIG_PATH` or the default path; a missing file
    /// falls back to built-in defaults. `$DIGEST_SIMILARITY_THRESHOLD`
    /// overrides the clustering threshold, clamped to 0..=1.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading config at {}", path.display()))?;
            Self::from_toml_str(&content)?
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using built-in defaults");
            Self::default()
        };

        if let Some(t) = parse_threshold_env(std::env::var(ENV_SIMILARITY_THRESHOLD).ok()) {
            cfg.pipeline.similarity_threshold = t;
        } else if !cfg.pipeline.similarity_threshold.is_finite() {
            cfg.pipeline.similarity_threshold = DEFAULT_SIMILARITY_THRESHOLD;
        }

        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s).context("parsing pipeline config")?;
        Ok(cfg)
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .map(|v| v.clamp(0.0, 1.0))
}
