//! Generate static files

use anyhow::{Context, Result};
use std::time::Instant;

use crate::cms::ContentSource;
use crate::content::{normalize, PostDetail, PostSummary};
use crate::generator::Generator;
use crate::listing::{self, LoadMore, Outcome};
use crate::Blog;

/// Page size used when walking the whole listing
const FETCH_PAGE_SIZE: usize = 100;

/// Fetch every post and generate the static site
pub async fn run(blog: &Blog, source: &dyn ContentSource) -> Result<()> {
    let start = Instant::now();

    let posts = fetch_listing(blog, source).await?;
    let details = fetch_details(blog, source, &posts).await?;
    tracing::info!("Loaded {} posts", posts.len());

    let generator = Generator::new(blog)?;
    generator.generate(&posts, &details)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Walk the listing from the first page until no cursor is left
pub async fn fetch_listing(blog: &Blog, source: &dyn ContentSource) -> Result<Vec<PostSummary>> {
    let query = blog.listing_query().page_size(FETCH_PAGE_SIZE);
    let first = listing::first_page(source, &query)
        .await
        .context("Failed to fetch the post listing")?;

    let mut session = LoadMore::new(first);
    loop {
        match session.load_next(source).await {
            Outcome::Appended(_) => continue,
            Outcome::Exhausted => break,
            Outcome::Failed(e) => {
                return Err(e).context(format!(
                    "Listing stopped after {} posts",
                    session.state().items.len()
                ))
            }
            Outcome::Busy | Outcome::Discarded => {
                anyhow::bail!("Listing session interrupted")
            }
        }
    }

    Ok(session.into_state().items)
}

/// Fetch the full content of every listed post
///
/// Posts removed between the listing and this call are skipped.
pub async fn fetch_details(
    blog: &Blog,
    source: &dyn ContentSource,
    posts: &[PostSummary],
) -> Result<Vec<PostDetail>> {
    let document_type = &blog.config.cms.document_type;
    let mut details = Vec::with_capacity(posts.len());

    for post in posts {
        let document = source
            .get_by_uid(document_type, &post.uid)
            .await
            .with_context(|| format!("Failed to fetch post {}", post.uid))?;

        match document {
            Some(document) => {
                let detail = normalize::detail(&document)
                    .with_context(|| format!("Malformed post {}", post.uid))?;
                details.push(detail);
            }
            None => tracing::warn!("Post {} disappeared while generating, skipping", post.uid),
        }
    }

    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::post;
    use crate::cms::MemorySource;
    use crate::config::SiteConfig;

    fn blog(dir: &std::path::Path) -> Blog {
        let mut config = SiteConfig::default();
        config.per_page = 2;
        Blog::from_config(dir, config)
    }

    fn source() -> MemorySource {
        MemorySource::new(vec![
            post("1", "first", "2021-03-15T10:00:00+0000", "First"),
            post("2", "second", "2021-03-16T10:00:00+0000", "Second"),
            post("3", "third", "2021-03-17T10:00:00+0000", "Third"),
        ])
    }

    #[tokio::test]
    async fn test_fetch_listing_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let posts = fetch_listing(&blog(dir.path()), &source()).await.unwrap();
        let uids: Vec<_> = posts.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_run_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path());

        run(&blog, &source()).await.unwrap();

        assert!(blog.public_dir.join("index.html").exists());
        assert!(blog.public_dir.join("page/2.json").exists());
        assert!(blog.public_dir.join("post/first/index.html").exists());
        assert!(blog.public_dir.join("post/third/index.html").exists());
    }

    #[tokio::test]
    async fn test_run_fails_when_source_is_down() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path());
        let source = source();
        source.set_fail_queries(true);

        assert!(run(&blog, &source).await.is_err());
        assert!(!blog.public_dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_run_leaves_out_documents_without_uid() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path());
        let mut orphan = post("X1", "unused", "2021-03-18T10:00:00+0000", "Orphan");
        orphan.uid = None;
        let source = MemorySource::new(vec![
            post("1", "first", "2021-03-15T10:00:00+0000", "First"),
            orphan,
        ]);

        run(&blog, &source).await.unwrap();

        let index = std::fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(!index.contains("/post/X1/"));
        assert!(!index.contains("Orphan"));
        assert!(!blog.public_dir.join("post/X1").exists());
        assert!(blog.public_dir.join("post/first/index.html").exists());

        let first =
            std::fs::read_to_string(blog.public_dir.join("post/first/index.html")).unwrap();
        assert!(!first.contains("/post/X1/"));
    }
}
