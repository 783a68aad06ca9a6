//! "Load more" session over a listing

use super::{append_page, FetchedPage, PaginationState};
use crate::cms::{CmsError, ContentSource};

/// Permission to run one fetch, handed out by [`LoadMore::begin`]
#[derive(Debug)]
pub struct Ticket {
    id: u64,
    generation: u64,
    cursor: String,
}

impl Ticket {
    /// Cursor of the page to fetch
    pub fn cursor(&self) -> &str {
        &self.cursor
    }
}

/// Result of a load-more action
#[derive(Debug)]
pub enum Outcome {
    /// The page was appended; carries the number of new items
    Appended(usize),
    /// No cursor left, nothing was fetched
    Exhausted,
    /// Another fetch is still in flight, the trigger was ignored
    Busy,
    /// The session was cancelled while fetching; the result was dropped
    Discarded,
    /// The fetch failed; the listing is unchanged and may be retried
    Failed(CmsError),
}

/// Event handler threading an immutable [`PaginationState`]
///
/// At most one fetch is in flight at a time. Results are only applied when
/// their ticket is still current, so a result arriving after [`cancel`]
/// (navigation away) never touches the state.
///
/// [`cancel`]: LoadMore::cancel
#[derive(Debug, Default)]
pub struct LoadMore {
    state: PaginationState,
    in_flight: Option<u64>,
    generation: u64,
    issued: u64,
}

impl LoadMore {
    pub fn new(state: PaginationState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn into_state(self) -> PaginationState {
        self.state
    }

    /// Whether the "load more" action should be offered
    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a fetch, unless one is in flight or the listing is exhausted
    pub fn begin(&mut self) -> Option<Ticket> {
        if self.in_flight.is_some() {
            tracing::debug!("Load more ignored: a fetch is already in flight");
            return None;
        }
        let cursor = self.state.next_cursor.clone()?;

        self.issued += 1;
        self.in_flight = Some(self.issued);
        Some(Ticket {
            id: self.issued,
            generation: self.generation,
            cursor,
        })
    }

    /// Apply the result of the fetch started with `ticket`
    pub fn complete(&mut self, ticket: Ticket, result: Result<FetchedPage, CmsError>) -> Outcome {
        if ticket.generation != self.generation || self.in_flight != Some(ticket.id) {
            tracing::debug!("Discarding stale listing page");
            return Outcome::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let added = page.results.len();
                let state = std::mem::take(&mut self.state);
                self.state = append_page(state, page);
                tracing::debug!(
                    "Appended {} posts ({} total, more={})",
                    added,
                    self.state.items.len(),
                    self.state.has_more()
                );
                Outcome::Appended(added)
            }
            Err(e) => {
                if e.is_transient() {
                    tracing::error!("Failed to load more posts, retry possible: {}", e);
                } else {
                    tracing::error!("Failed to load more posts: {}", e);
                }
                Outcome::Failed(e)
            }
        }
    }

    /// Drop any outstanding fetch; its result will be discarded
    pub fn cancel(&mut self) {
        if self.in_flight.take().is_some() {
            tracing::debug!("Cancelled in-flight listing fetch");
        }
        self.generation += 1;
    }

    /// Fetch and append the next page
    pub async fn load_next<S>(&mut self, source: &S) -> Outcome
    where
        S: ContentSource + ?Sized,
    {
        let Some(ticket) = self.begin() else {
            return if self.is_loading() {
                Outcome::Busy
            } else {
                Outcome::Exhausted
            };
        };

        let result = match source.fetch_cursor(ticket.cursor()).await {
            Ok(page) => FetchedPage::from_api(page),
            Err(e) => Err(e),
        };
        self.complete(ticket, result)
    }
}
