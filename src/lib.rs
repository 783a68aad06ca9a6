//! cms-blog: a static blog generator backed by a headless CMS
//!
//! Posts are read from a Prismic-style content API, normalized into
//! listing summaries and full post details, and rendered with Tera
//! templates embedded in the binary.

pub mod adjacency;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod listing;
pub mod richtext;
pub mod server;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{ContentSource, MemorySource, Ordering, PostQuery, PrismicClient};

/// Fields requested for listing queries
const LISTING_FIELDS: &[&str] = &["title", "subtitle", "author"];

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Static assets directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a blog from a directory, reading `_config.yml` when present
    ///
    /// `CMS_*` environment variables override the file.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)
                .with_context(|| format!("Failed to load {:?}", config_path))?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::from_config(base_dir, config))
    }

    /// Create a blog from an already loaded configuration
    pub fn from_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        }
    }

    /// Whether pages are built from a preview release
    pub fn is_preview(&self) -> bool {
        self.config.cms.preview_ref().is_some()
    }

    /// Drop the preview ref; fixture files only hold published content
    pub fn clear_preview(&mut self) {
        if self.config.cms.preview_ref.take().is_some() {
            tracing::warn!("Ignoring preview ref, posts come from fixtures");
        }
    }

    /// Query for the post listing, newest first
    pub fn listing_query(&self) -> PostQuery {
        PostQuery::new(&self.config.cms.document_type)
            .ordering(Ordering::newest_first())
            .page_size(self.config.per_page)
            .fetch_fields(LISTING_FIELDS)
    }

    /// Open the content source: a fixture file when given, else the CMS API
    pub fn content_source(&self, fixtures: Option<&Path>) -> Result<Arc<dyn ContentSource>> {
        if let Some(path) = fixtures {
            tracing::info!("Reading posts from fixtures {:?}", path);
            return Ok(Arc::new(MemorySource::from_file(path)?));
        }

        if self.config.cms.endpoint.is_empty() {
            anyhow::bail!(
                "No CMS endpoint configured. Set cms.endpoint in _config.yml, \
                 export CMS_ENDPOINT, or pass --fixtures <file>"
            );
        }

        let client = PrismicClient::from_config(&self.config.cms)?;
        if client.is_preview() {
            tracing::info!("Preview mode: reading unpublished content");
        }
        Ok(Arc::new(client))
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.public_dir, dir.path().join("public"));
        assert_eq!(blog.source_dir, dir.path().join("source"));
        assert_eq!(blog.config.per_page, 5);
    }

    #[test]
    fn test_new_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Space\npublic_dir: out\nper_page: 3\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Space");
        assert_eq!(blog.public_dir, dir.path().join("out"));
    }

    #[test]
    fn test_listing_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::SiteConfig::default();
        config.per_page = 2;
        let blog = Blog::from_config(dir.path(), config);

        let params = blog.listing_query().params();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("pageSize").as_deref(), Some("2"));
        assert_eq!(
            get("orderings").as_deref(),
            Some("[document.first_publication_date desc]")
        );
        assert_eq!(
            get("fetch").as_deref(),
            Some("posts.title,posts.subtitle,posts.author")
        );
    }

    #[test]
    fn test_content_source_requires_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::from_config(dir.path(), config::SiteConfig::default());
        assert!(blog.content_source(None).is_err());
    }

    #[test]
    fn test_is_preview() {
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::from_config(dir.path(), config::SiteConfig::default());
        assert!(!blog.is_preview());

        blog.config.cms.preview_ref = Some(String::new());
        assert!(!blog.is_preview());

        blog.config.cms.preview_ref = Some("WW1x-preview".to_string());
        assert!(blog.is_preview());

        blog.clear_preview();
        assert!(!blog.is_preview());
    }
}
