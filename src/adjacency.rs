//! Previous/next post navigation
//!
//! Neighbours are taken from one canonical ordering: first publication
//! date, oldest first. The previous post is the immediate predecessor of
//! the current one in that ordering, the next post its immediate successor.

use crate::cms::{ContentSource, Document, Ordering, PostQuery};
use crate::content::{normalize, FooterLink, PostSummary};

/// Links to the neighbours of a post
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacent {
    /// Older post
    pub previous: FooterLink,
    /// Newer post
    pub next: FooterLink,
}

/// Resolve neighbours by querying the content source
///
/// Navigation links are best effort: if either query fails both links are
/// left absent and the error is only logged.
pub async fn resolve<S>(source: &S, document_type: &str, document_id: &str) -> Adjacent
where
    S: ContentSource + ?Sized,
{
    // Walking the canonical ordering backwards from the current post yields
    // its predecessor; walking it forwards yields its successor.
    let predecessor = PostQuery::new(document_type)
        .ordering(Ordering::newest_first())
        .after(document_id)
        .page_size(1);
    let successor = PostQuery::new(document_type)
        .ordering(Ordering::oldest_first())
        .after(document_id)
        .page_size(1);

    let (previous, next) = tokio::join!(source.query(&predecessor), source.query(&successor));

    match (previous, next) {
        (Ok(previous), Ok(next)) => Adjacent {
            previous: link(previous.results.first()),
            next: link(next.results.first()),
        },
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(
                "Could not resolve neighbours of {}, omitting navigation: {}",
                document_id,
                e
            );
            Adjacent::default()
        }
    }
}

/// Resolve neighbours from a complete listing ordered newest first
pub fn from_listing(items: &[PostSummary], uid: &str) -> Adjacent {
    let Some(pos) = items.iter().position(|p| p.uid == uid) else {
        return Adjacent::default();
    };

    let as_link = |p: &PostSummary| FooterLink::new(&p.uid, &p.title);
    Adjacent {
        previous: items.get(pos + 1).map(as_link).unwrap_or_default(),
        next: pos
            .checked_sub(1)
            .and_then(|i| items.get(i))
            .map(as_link)
            .unwrap_or_default(),
    }
}

fn link(doc: Option<&Document>) -> FooterLink {
    let Some(doc) = doc else {
        return FooterLink::default();
    };
    // A neighbour without a uid has no page to link to
    let Some(uid) = doc.uid.as_deref().filter(|uid| !uid.is_empty()) else {
        return FooterLink::default();
    };
    let title = normalize::summary(doc)
        .map(|s| s.title)
        .unwrap_or_default();
    FooterLink::new(uid, &title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::post;
    use crate::cms::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new(vec![
            post("a", "oldest", "2021-03-15T10:00:00+0000", "Oldest"),
            post("b", "middle", "2021-03-20T10:00:00+0000", "Middle"),
            post("c", "newest", "2021-03-25T10:00:00+0000", "Newest"),
        ])
    }

    #[tokio::test]
    async fn test_middle_post_has_both_links() {
        let adjacent = resolve(&source(), "posts", "b").await;
        assert_eq!(adjacent.previous, FooterLink::new("oldest", "Oldest"));
        assert_eq!(adjacent.next, FooterLink::new("newest", "Newest"));
    }

    #[tokio::test]
    async fn test_edges() {
        let source = source();
        let first = resolve(&source, "posts", "a").await;
        assert!(!first.previous.is_present());
        assert_eq!(first.next.slug.as_deref(), Some("middle"));

        let last = resolve(&source, "posts", "c").await;
        assert_eq!(last.previous.slug.as_deref(), Some("middle"));
        assert!(!last.next.is_present());
    }

    #[tokio::test]
    async fn test_failure_degrades_to_absent_links() {
        let source = source();
        source.set_fail_queries(true);
        let adjacent = resolve(&source, "posts", "b").await;
        assert_eq!(adjacent, Adjacent::default());
    }

    #[tokio::test]
    async fn test_neighbour_without_uid_is_not_linked() {
        let mut orphan = post("b", "middle", "2021-03-20T10:00:00+0000", "Middle");
        orphan.uid = None;
        let source = MemorySource::new(vec![
            post("a", "oldest", "2021-03-15T10:00:00+0000", "Oldest"),
            orphan,
        ]);

        let adjacent = resolve(&source, "posts", "a").await;
        assert!(!adjacent.next.is_present());
    }

    #[test]
    fn test_from_listing_matches_canonical_order() {
        let docs = [
            post("c", "newest", "2021-03-25T10:00:00+0000", "Newest"),
            post("b", "middle", "2021-03-20T10:00:00+0000", "Middle"),
            post("a", "oldest", "2021-03-15T10:00:00+0000", "Oldest"),
        ];
        let items: Vec<PostSummary> = docs
            .iter()
            .map(|d| normalize::summary(d).unwrap())
            .collect();

        let middle = from_listing(&items, "middle");
        assert_eq!(middle.previous, FooterLink::new("oldest", "Oldest"));
        assert_eq!(middle.next, FooterLink::new("newest", "Newest"));

        let newest = from_listing(&items, "newest");
        assert!(!newest.next.is_present());
        let oldest = from_listing(&items, "oldest");
        assert!(!oldest.previous.is_present());

        assert_eq!(from_listing(&items, "missing"), Adjacent::default());
    }
}
