//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Request timeout used when none is configured
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    /// Static assets copied verbatim into the output (logo, favicon, ...)
    pub source_dir: String,
    pub public_dir: String,

    // Listing
    /// Posts per listing page (first page and each "load more")
    pub per_page: usize,
    /// Publication date format, date-fns style tokens
    pub date_format: String,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,

    /// Interface label overrides for the current language
    #[serde(default)]
    pub labels: HashMap<String, String>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            per_page: 5,
            date_format: "dd MMM yyyy".to_string(),

            cms: CmsConfig::default(),
            labels: HashMap::new(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `CMS_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Empty values count as unset
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(endpoint) = lookup("CMS_ENDPOINT") {
            tracing::debug!("CMS endpoint overridden from environment");
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = lookup("CMS_ACCESS_TOKEN") {
            self.cms.access_token = Some(token);
        }
        if let Some(preview) = lookup("CMS_PREVIEW_REF") {
            self.cms.preview_ref = Some(preview);
        }
    }
}

/// Headless CMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API entry point, e.g. `https://my-blog.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding the blog posts
    pub document_type: String,
    /// Per-request timeout, 0 for the default
    pub timeout_secs: u64,
    /// Read drafts from this preview release instead of published content
    pub preview_ref: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            preview_ref: None,
        }
    }
}

impl CmsConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// The preview ref, if one is set and not empty
    pub fn preview_ref(&self) -> Option<&str> {
        self.preview_ref.as_deref().filter(|r| !r.is_empty())
    }
}
