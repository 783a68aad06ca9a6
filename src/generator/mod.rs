//! Generator module - generates static HTML files using built-in Tera templates

use anyhow::{Context as _, Result};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::adjacency::{self, Adjacent};
use crate::content::{FooterLink, PostDetail, PostSummary};
use crate::helpers::{
    date_xml, format_date, format_publication_date, post_dir, post_path, post_permalink, url_for,
};
use crate::i18n::I18n;
use crate::richtext::{self, Link};
use crate::templates::{
    ConfigData, ListingChunk, NavPost, PostCard, PostPageData, SectionData, TemplateRenderer,
    STYLESHEET,
};
use crate::Blog;

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    i18n: I18n,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let i18n = I18n::new(&blog.config.language).with_overrides(&blog.config.labels);

        Ok(Self {
            blog: blog.clone(),
            renderer,
            i18n,
        })
    }

    /// Generate the entire site
    ///
    /// `posts` is the complete listing, newest first. `details` holds the
    /// full content of every post that gets its own page. Post pages and
    /// listing chunks left over from an earlier run are removed, so a post
    /// unpublished in the CMS falls through to the 404 page.
    pub fn generate(&self, posts: &[PostSummary], details: &[PostDetail]) -> Result<()> {
        fs::create_dir_all(&self.blog.public_dir)?;

        self.copy_source_assets()?;
        write_file(&self.blog.public_dir.join("styles.css"), STYLESHEET)?;

        let config_data = self.build_config_data();

        let total_pages = self.generate_index_pages(posts, &config_data)?;
        self.generate_post_pages(posts, details, &config_data)?;
        self.generate_not_found_page(&config_data)?;
        self.prune_stale_output(details, total_pages)?;

        Ok(())
    }

    /// Remove `post/<slug>/` and `page/<n>.json` entries this run did not write
    fn prune_stale_output(&self, details: &[PostDetail], total_pages: usize) -> Result<()> {
        let public_dir = &self.blog.public_dir;

        let posts: HashSet<OsString> = details
            .iter()
            .filter_map(|d| Path::new(&post_dir(&d.uid)).file_name().map(OsString::from))
            .collect();
        let pruned_posts = remove_entries_except(&public_dir.join("post"), &posts)?;

        let chunks: HashSet<OsString> = (2..=total_pages)
            .map(|n| OsString::from(format!("{}.json", n)))
            .collect();
        let pruned_chunks = remove_entries_except(&public_dir.join("page"), &chunks)?;

        if pruned_posts + pruned_chunks > 0 {
            tracing::info!(
                "Removed {} stale post pages and {} stale listing chunks",
                pruned_posts,
                pruned_chunks
            );
        }
        Ok(())
    }

    fn build_config_data(&self) -> ConfigData {
        let config = &self.blog.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: self.i18n.language().to_string(),
            url: config.url.clone(),
            root: config.root.clone(),
        }
    }

    /// Create a base context with common variables
    fn create_base_context(&self, config_data: &ConfigData) -> Context {
        let mut context = Context::new();
        context.insert("config", config_data);
        context.insert("root", &url_for(&self.blog.config, ""));
        context.insert("preview", &self.blog.is_preview());
        context.insert("t", &self.i18n.get_all_translations());
        context
    }

    fn post_card(&self, post: &PostSummary) -> PostCard {
        let config = &self.blog.config;
        PostCard {
            uid: post.uid.clone(),
            path: post_path(config, &post.uid),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: format_publication_date(
                post.first_publication_date.as_ref(),
                &config.date_format,
            ),
            datetime: post
                .first_publication_date
                .as_ref()
                .map(date_xml)
                .unwrap_or_default(),
        }
    }

    /// Generate the home page and the follow-up listing chunks
    ///
    /// The home page carries the first `per_page` posts. Every further chunk
    /// is written to `page/<n>.json` and linked from the previous one, so the
    /// "load more" button walks them in order.
    ///
    /// Returns the number of listing pages, the home page included.
    fn generate_index_pages(&self, posts: &[PostSummary], config_data: &ConfigData) -> Result<usize> {
        let per_page = self.blog.config.per_page.max(1);
        let cards: Vec<PostCard> = posts.iter().map(|p| self.post_card(p)).collect();
        let total_pages = cards.len().div_ceil(per_page).max(1);

        let chunk_url = |page_num: usize| -> Option<String> {
            (page_num <= total_pages)
                .then(|| url_for(&self.blog.config, &format!("page/{}.json", page_num)))
        };

        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(cards.len());
            let page_cards = cards[start..end].to_vec();
            let next_page = chunk_url(page_num + 1);

            if page_num == 1 {
                let mut context = self.create_base_context(config_data);
                context.insert("posts", &page_cards);
                context.insert("next_page", &next_page);

                let html = self.renderer.render("index.html", &context)?;
                let output_path = self.blog.public_dir.join("index.html");
                write_file(&output_path, &html)?;
                tracing::debug!("Generated: {:?}", output_path);
            } else {
                let chunk = ListingChunk {
                    results: page_cards,
                    next_page,
                };
                let output_path = self
                    .blog
                    .public_dir
                    .join(format!("page/{}.json", page_num));
                write_file(&output_path, &serde_json::to_string(&chunk)?)?;
                tracing::debug!("Generated: {:?}", output_path);
            }
        }

        Ok(total_pages)
    }

    /// Generate individual post pages
    fn generate_post_pages(
        &self,
        posts: &[PostSummary],
        details: &[PostDetail],
        config_data: &ConfigData,
    ) -> Result<()> {
        for detail in details {
            let adjacent = adjacency::from_listing(posts, &detail.uid);
            let subtitle = posts
                .iter()
                .find(|p| p.uid == detail.uid)
                .map(|p| p.subtitle.as_str())
                .unwrap_or_default();

            let page = self.build_post_page(detail, subtitle, &adjacent);

            let mut context = self.create_base_context(config_data);
            context.insert("post", &page);

            let html = self.renderer.render("post.html", &context)?;
            let output_path = self
                .blog
                .public_dir
                .join(post_dir(&detail.uid))
                .join("index.html");
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        tracing::info!("Generated {} post pages", details.len());
        Ok(())
    }

    fn build_post_page(&self, detail: &PostDetail, subtitle: &str, adjacent: &Adjacent) -> PostPageData {
        let config = &self.blog.config;
        let document_type = config.cms.document_type.as_str();

        // Links to other posts stay on this site, everything else keeps its URL.
        let resolve = |link: &Link| -> Option<String> {
            match (link.document_type.as_deref(), link.uid.as_deref()) {
                (Some(t), Some(uid)) if t == document_type => Some(post_path(config, uid)),
                _ => link.url.clone(),
            }
        };

        let sections = detail
            .content
            .iter()
            .map(|block| SectionData {
                heading: block.heading.clone(),
                html: richtext::as_html_with(&block.body, &resolve),
            })
            .collect();

        let description = if subtitle.is_empty() {
            detail
                .content
                .first()
                .map(|block| richtext::as_text(&block.body))
                .unwrap_or_default()
        } else {
            subtitle.to_string()
        };

        let edited = match detail.last_publication_date {
            Some(last) if detail.was_edited() => {
                let format = format!("{}', 'HH:mm", config.date_format);
                Some(self.i18n.get_with("edited_on", &format_date(&last, &format)))
            }
            _ => None,
        };

        PostPageData {
            uid: detail.uid.clone(),
            permalink: post_permalink(config, &detail.uid),
            title: detail.title.clone(),
            description,
            banner_url: Some(detail.banner_url.clone()).filter(|url| !url.is_empty()),
            author: detail.author.clone(),
            date: format_publication_date(
                detail.first_publication_date.as_ref(),
                &config.date_format,
            ),
            datetime: detail
                .first_publication_date
                .as_ref()
                .map(date_xml)
                .unwrap_or_default(),
            edited,
            reading_time: self.i18n.get_count("reading_time", detail.reading_time()),
            sections,
            previous: self.nav_post(&adjacent.previous),
            next: self.nav_post(&adjacent.next),
        }
    }

    fn nav_post(&self, link: &FooterLink) -> Option<NavPost> {
        let slug = link.slug.as_deref()?;
        Some(NavPost {
            title: link.title.clone().unwrap_or_default(),
            path: post_path(&self.blog.config, slug),
        })
    }

    /// Generate the page served for unknown paths
    fn generate_not_found_page(&self, config_data: &ConfigData) -> Result<()> {
        let context = self.create_base_context(config_data);
        let html = self.renderer.render("404.html", &context)?;
        let output_path = self.blog.public_dir.join("404.html");
        write_file(&output_path, &html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy static assets (images, favicon, etc.) to public directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
        }

        Ok(())
    }
}

/// Delete every entry of `dir` whose name is not in `keep`
///
/// A missing `dir` is fine. Returns how many entries were removed.
fn remove_entries_except(dir: &Path, keep: &HashSet<OsString>) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read dir {:?}", dir))? {
        let entry = entry?;
        if keep.contains(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        }
        .with_context(|| format!("Failed to remove {:?}", path))?;
        tracing::debug!("Removed stale output: {:?}", path);
        removed += 1;
    }
    Ok(removed)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{parse_timestamp, Timestamp};
    use crate::content::ContentBlock;
    use crate::richtext::RichText;

    fn date(s: &str) -> Option<Timestamp> {
        Some(parse_timestamp(s).unwrap())
    }

    fn summary(uid: &str, title: &str, published: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: date(published),
            title: title.to_string(),
            subtitle: format!("About {}", title),
            author: "Joseph Oliveira".to_string(),
        }
    }

    fn detail(uid: &str, title: &str, published: &str, edited: &str) -> PostDetail {
        PostDetail {
            id: format!("id-{}", uid),
            uid: uid.to_string(),
            first_publication_date: date(published),
            last_publication_date: date(edited),
            title: title.to_string(),
            banner_url: String::new(),
            author: "Joseph Oliveira".to_string(),
            content: vec![ContentBlock {
                heading: "Intro".to_string(),
                body: RichText::paragraphs(["word ".repeat(250)]),
            }],
        }
    }

    fn test_blog(dir: &Path, per_page: usize) -> Blog {
        let mut config = crate::config::SiteConfig::default();
        config.per_page = per_page;
        Blog::from_config(dir, config)
    }

    #[test]
    fn test_generate_listing_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let blog = test_blog(dir.path(), 2);
        let posts = vec![
            summary("c", "Third", "2021-03-17T10:00:00+0000"),
            summary("b", "Second", "2021-03-16T10:00:00+0000"),
            summary("a", "First", "2021-03-15T10:00:00+0000"),
        ];

        Generator::new(&blog).unwrap().generate(&posts, &[]).unwrap();

        let index = fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(index.contains("Third"));
        assert!(index.contains("Second"));
        assert!(!index.contains("First"));
        assert!(index.contains("data-next=\"/page/2.json\""));

        let chunk: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(blog.public_dir.join("page/2.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(chunk["results"].as_array().unwrap().len(), 1);
        assert_eq!(chunk["results"][0]["uid"], "a");
        assert_eq!(chunk["results"][0]["date"], "15 Mar 2021");
        assert!(chunk["next_page"].is_null());

        assert!(blog.public_dir.join("404.html").exists());
        assert!(blog.public_dir.join("styles.css").exists());
    }

    #[test]
    fn test_generate_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let blog = test_blog(dir.path(), 5);

        Generator::new(&blog).unwrap().generate(&[], &[]).unwrap();

        let index = fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(!index.contains("id=\"load-more\""));
        assert!(!blog.public_dir.join("page").exists());
    }

    #[test]
    fn test_generate_post_page() {
        let dir = tempfile::tempdir().unwrap();
        let blog = test_blog(dir.path(), 5);
        let posts = vec![
            summary("c", "Third", "2021-03-17T10:00:00+0000"),
            summary("b", "Second", "2021-03-16T10:00:00+0000"),
            summary("a", "First", "2021-03-15T10:00:00+0000"),
        ];
        let details = vec![
            detail("b", "Second", "2021-03-16T10:00:00+0000", "2021-03-19T15:49:00+0000"),
            detail("a", "First", "2021-03-15T10:00:00+0000", "2021-03-15T10:00:00+0000"),
        ];

        Generator::new(&blog)
            .unwrap()
            .generate(&posts, &details)
            .unwrap();

        let second = fs::read_to_string(blog.public_dir.join("post/b/index.html")).unwrap();
        assert!(second.contains("<h1>Second</h1>"));
        assert!(second.contains("16 Mar 2021"));
        assert!(second.contains("2 min"));
        assert!(second.contains("* edited on 19 Mar 2021, 15:49"));
        assert!(second.contains("href=\"/post/a/\""));
        assert!(second.contains("href=\"/post/c/\""));

        let first = fs::read_to_string(blog.public_dir.join("post/a/index.html")).unwrap();
        assert!(!first.contains("edited on"));
        assert!(!first.contains("class=\"previous\""));
        assert!(first.contains("class=\"next\""));
    }

    #[test]
    fn test_generate_under_sub_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = crate::config::SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        let blog = Blog::from_config(dir.path(), config);
        let posts = vec![summary("hello", "Hello", "2021-03-15T10:00:00+0000")];
        let details = vec![detail(
            "hello",
            "Hello",
            "2021-03-15T10:00:00+0000",
            "2021-03-15T10:00:00+0000",
        )];

        Generator::new(&blog)
            .unwrap()
            .generate(&posts, &details)
            .unwrap();

        let page = fs::read_to_string(blog.public_dir.join("post/hello/index.html")).unwrap();
        assert!(page.contains("<link rel=\"canonical\" href=\"https://example.com/blog/post/hello/\">"));
        assert!(!page.contains("/blog/blog/"));

        let index = fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(index.contains("href=\"/blog/post/hello/\""));
    }

    #[test]
    fn test_regenerate_removes_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        let blog = test_blog(dir.path(), 1);
        let generator = Generator::new(&blog).unwrap();

        let kept = summary("kept", "Kept", "2021-03-16T10:00:00+0000");
        let gone = summary("gone", "Gone", "2021-03-15T10:00:00+0000");
        let kept_detail = detail(
            "kept",
            "Kept",
            "2021-03-16T10:00:00+0000",
            "2021-03-16T10:00:00+0000",
        );
        let gone_detail = detail(
            "gone",
            "Gone",
            "2021-03-15T10:00:00+0000",
            "2021-03-15T10:00:00+0000",
        );

        generator
            .generate(&[kept.clone(), gone], &[kept_detail.clone(), gone_detail])
            .unwrap();
        assert!(blog.public_dir.join("post/gone/index.html").exists());
        assert!(blog.public_dir.join("page/2.json").exists());

        generator.generate(&[kept], &[kept_detail]).unwrap();
        assert!(!blog.public_dir.join("post/gone").exists());
        assert!(!blog.public_dir.join("page/2.json").exists());
        assert!(blog.public_dir.join("post/kept/index.html").exists());
        assert!(blog.public_dir.join("index.html").exists());
    }

    #[test]
    fn test_copy_source_assets() {
        let dir = tempfile::tempdir().unwrap();
        let blog = test_blog(dir.path(), 5);
        fs::create_dir_all(blog.source_dir.join("images")).unwrap();
        fs::write(blog.source_dir.join("images/logo.svg"), "<svg/>").unwrap();

        Generator::new(&blog).unwrap().generate(&[], &[]).unwrap();

        assert_eq!(
            fs::read_to_string(blog.public_dir.join("images/logo.svg")).unwrap(),
            "<svg/>"
        );
    }
}
