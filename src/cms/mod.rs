//! Headless CMS access
//!
//! Everything the blog knows about posts comes through a [`ContentSource`]:
//! paged searches by document type, opaque "next page" cursors and lookups
//! by uid. [`PrismicClient`] talks to a Prismic-compatible REST API;
//! [`MemorySource`] serves documents held in memory (fixtures and tests).

mod client;
mod document;
mod error;
#[cfg(test)]
pub(crate) mod fixtures;
mod memory;
mod query;

use async_trait::async_trait;

pub use client::PrismicClient;
pub use document::{parse_timestamp, ApiInfo, ApiPage, ApiRef, Document, Timestamp};
pub use error::CmsError;
pub use memory::MemorySource;
pub use query::{Direction, Ordering, PostQuery, Predicate, FIRST_PUBLICATION_DATE};

/// Query capability of the external content store
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a search query and return its first page
    async fn query(&self, query: &PostQuery) -> Result<ApiPage, CmsError>;

    /// Follow an opaque `next_page` cursor
    async fn fetch_cursor(&self, cursor: &str) -> Result<ApiPage, CmsError>;

    /// Fetch a single document by type and uid
    async fn get_by_uid(&self, document_type: &str, uid: &str)
        -> Result<Option<Document>, CmsError>;
}
