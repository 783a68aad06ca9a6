//! Paginated post listing
//!
//! The listing is an append-only, order-preserving list of post summaries
//! plus the cursor of the next page. [`append_page`] merges one fetched
//! page into it; [`LoadMore`] drives the fetches one at a time.

mod session;

use serde::{Deserialize, Serialize};

use crate::cms::{ApiPage, CmsError, ContentSource, PostQuery};
use crate::content::{normalize, PostSummary};

pub use session::{LoadMore, Outcome, Ticket};

/// Accumulated listing state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Summaries in fetch order
    pub items: Vec<PostSummary>,
    /// Cursor of the next page, `None` once the listing is exhausted
    pub next_cursor: Option<String>,
}

impl PaginationState {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// One fetched page, already normalized into summaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    pub results: Vec<PostSummary>,
    pub next_cursor: Option<String>,
}

impl FetchedPage {
    /// Normalize a raw search page
    ///
    /// Documents without a uid have no post URL and are left out.
    pub fn from_api(page: ApiPage) -> Result<Self, CmsError> {
        let results = page
            .results
            .iter()
            .filter(|doc| {
                let addressable = doc.uid.as_deref().is_some_and(|uid| !uid.is_empty());
                if !addressable {
                    tracing::warn!("Skipping document {} without a uid", doc.id);
                }
                addressable
            })
            .map(normalize::summary)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            results,
            next_cursor: page.next_page,
        })
    }
}

/// Merge a fetched page into the listing
///
/// The new items are the current items followed by the fetched ones, in
/// that order, with nothing sorted or removed. The cursor is replaced by
/// the fetched page's cursor.
pub fn append_page(current: PaginationState, fetched: FetchedPage) -> PaginationState {
    let mut items = current.items;
    items.extend(fetched.results);
    PaginationState {
        items,
        next_cursor: fetched.next_cursor,
    }
}

/// Fetch the first listing page
pub async fn first_page<S>(source: &S, query: &PostQuery) -> Result<PaginationState, CmsError>
where
    S: ContentSource + ?Sized,
{
    let page = FetchedPage::from_api(source.query(query).await?)?;
    tracing::debug!(
        "First listing page: {} posts, more={}",
        page.results.len(),
        page.next_cursor.is_some()
    );
    Ok(append_page(PaginationState::default(), page))
}
