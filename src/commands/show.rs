//! Show a single post

use anyhow::{Context, Result};
use std::fmt::Write as _;

use crate::adjacency::{self, Adjacent};
use crate::cms::ContentSource;
use crate::content::{normalize, FooterLink, PostDetail};
use crate::helpers::{format_publication_date, post_path};
use crate::richtext;
use crate::Blog;

/// Print one post with its reading time and neighbours
///
/// Fails when no post has the given uid.
pub async fn run(blog: &Blog, source: &dyn ContentSource, uid: &str) -> Result<()> {
    let document_type = &blog.config.cms.document_type;
    let document = source
        .get_by_uid(document_type, uid)
        .await
        .with_context(|| format!("Failed to fetch post {}", uid))?
        .with_context(|| format!("Post not found: {}", uid))?;

    let post = normalize::detail(&document).with_context(|| format!("Malformed post {}", uid))?;
    let adjacent = adjacency::resolve(source, document_type, &post.id).await;

    print!("{}", render(blog, &post, &adjacent));
    Ok(())
}

/// Plain text view of a post
pub fn render(blog: &Blog, post: &PostDetail, adjacent: &Adjacent) -> String {
    let format = &blog.config.date_format;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", post.title);
    let _ = writeln!(
        out,
        "  {} | {} | {} min",
        format_publication_date(post.first_publication_date.as_ref(), format),
        post.author,
        post.reading_time()
    );
    if post.was_edited() {
        let _ = writeln!(
            out,
            "  edited on {}",
            format_publication_date(post.last_publication_date.as_ref(), format)
        );
    }
    let _ = writeln!(out, "  {}", post_path(&blog.config, &post.uid));

    for block in &post.content {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", block.heading);
        let _ = writeln!(out, "{}", richtext::as_text(&block.body));
    }

    let _ = writeln!(out);
    write_link(&mut out, "Previous", &adjacent.previous);
    write_link(&mut out, "Next", &adjacent.next);
    out
}

fn write_link(out: &mut String, label: &str, link: &FooterLink) {
    if let (Some(slug), Some(title)) = (&link.slug, &link.title) {
        let _ = writeln!(out, "{}: {} [{}]", label, title, slug);
    }
}
