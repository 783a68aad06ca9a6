//! List posts from the content source

use anyhow::{Context, Result};

use crate::cms::ContentSource;
use crate::content::PostSummary;
use crate::helpers::format_publication_date;
use crate::listing::{self, LoadMore, Outcome};
use crate::Blog;

/// Print the listing one page at a time
///
/// Fetches the first page and then loads more until `pages` pages were
/// shown or the listing is exhausted. `None` walks the whole listing.
pub async fn run(blog: &Blog, source: &dyn ContentSource, pages: Option<usize>) -> Result<()> {
    let first = listing::first_page(source, &blog.listing_query())
        .await
        .context("Failed to fetch the post listing")?;

    let mut session = LoadMore::new(first);
    let mut shown = print_posts(blog, &session.state().items);
    let mut loaded_pages = 1;

    while session.has_more() && pages.map_or(true, |max| loaded_pages < max) {
        match session.load_next(source).await {
            Outcome::Appended(_) => {
                shown += print_posts(blog, &session.state().items[shown..]);
                loaded_pages += 1;
            }
            Outcome::Exhausted => break,
            Outcome::Failed(e) => {
                return Err(e).context(format!("Listing stopped after {} posts", shown));
            }
            Outcome::Busy | Outcome::Discarded => break,
        }
    }

    if session.has_more() {
        println!("... more posts available");
    }
    println!("Posts ({}):", shown);

    Ok(())
}

fn print_posts(blog: &Blog, posts: &[PostSummary]) -> usize {
    for post in posts {
        let date = format_publication_date(
            post.first_publication_date.as_ref(),
            &blog.config.date_format,
        );
        println!("  {} - {} [{}] by {}", date, post.title, post.uid, post.author);
    }
    posts.len()
}
