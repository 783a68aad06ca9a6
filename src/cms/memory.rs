//! In-memory content source

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use super::{
    ApiPage, CmsError, ContentSource, Direction, Document, PostQuery, Predicate,
    FIRST_PUBLICATION_DATE,
};

/// Content source serving a fixed set of documents
///
/// Supports the same query surface as the REST client: type and field
/// predicates, orderings, `after` and cursor pagination. Failures can be
/// switched on to exercise error paths.
#[derive(Default)]
pub struct MemorySource {
    documents: Vec<Document>,
    /// Issued cursors: cursor -> (query, page number)
    cursors: Mutex<HashMap<String, (PostQuery, usize)>>,
    cursor_seq: AtomicUsize,
    fail_queries: AtomicBool,
    fail_cursors: AtomicBool,
    requests: AtomicUsize,
}

/// Accepted fixture layouts: a bare document list or a search response
#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Documents(Vec<Document>),
    Page(ApiPage),
}

impl MemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    /// Load documents from a JSON fixture file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures {:?}", path))?;
        let fixture: Fixture = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixtures {:?}", path))?;

        let documents = match fixture {
            Fixture::Documents(documents) => documents,
            Fixture::Page(page) => page.results,
        };
        tracing::info!("Loaded {} documents from {:?}", documents.len(), path);
        Ok(Self::new(documents))
    }

    /// Make every search fail
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, AtomicOrdering::SeqCst);
    }

    /// Make every cursor fetch fail
    pub fn set_fail_cursors(&self, fail: bool) {
        self.fail_cursors.store(fail, AtomicOrdering::SeqCst);
    }

    /// Number of requests served so far, failed ones included
    pub fn request_count(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    fn matches(doc: &Document, query: &PostQuery) -> bool {
        if doc.document_type != query.document_type {
            return false;
        }
        query.predicates.iter().all(|predicate| match predicate {
            Predicate::At { path, value } => match path.as_str() {
                "document.type" => doc.document_type == *value,
                "document.id" => doc.id == *value,
                "document.tags" => doc.tags.contains(value),
                _ => field_value(doc, path).as_deref() == Some(value.as_str()),
            },
        })
    }

    /// Documents matching the query, ordered, after the `after` cursor
    fn search(&self, query: &PostQuery) -> Vec<&Document> {
        let mut found: Vec<&Document> = self
            .documents
            .iter()
            .filter(|doc| Self::matches(doc, query))
            .collect();

        found.sort_by(|a, b| {
            let ord = sort_key(a, &query.ordering.field)
                .cmp(&sort_key(b, &query.ordering.field))
                .then_with(|| a.id.cmp(&b.id));
            match query.ordering.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });

        match &query.after {
            Some(after) => match found.iter().position(|doc| doc.id == *after) {
                Some(pos) => found.split_off(pos + 1),
                None => Vec::new(),
            },
            None => found,
        }
    }

    fn page(&self, query: &PostQuery, page: usize) -> ApiPage {
        let found = self.search(query);
        let size = query.page_size.max(1);
        let total = found.len();
        let start = (page - 1) * size;
        let results: Vec<Document> = found
            .into_iter()
            .skip(start)
            .take(size)
            .cloned()
            .collect();

        let next_page = if start + size < total {
            let seq = self.cursor_seq.fetch_add(1, AtomicOrdering::SeqCst);
            let cursor = format!("memory://search/{}?page={}", seq, page + 1);
            if let Ok(mut cursors) = self.cursors.lock() {
                cursors.insert(cursor.clone(), (query.clone(), page + 1));
            }
            Some(cursor)
        } else {
            None
        };

        ApiPage {
            page: page as u32,
            results_per_page: size as u32,
            results_size: results.len() as u32,
            total_results_size: total as u32,
            total_pages: total.div_ceil(size) as u32,
            next_page,
            prev_page: None,
            results,
        }
    }

    fn record_request(&self, failing: &AtomicBool, what: &str) -> Result<(), CmsError> {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);
        if failing.load(AtomicOrdering::SeqCst) {
            return Err(CmsError::Unavailable(format!("{} failed", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query(&self, query: &PostQuery) -> Result<ApiPage, CmsError> {
        self.record_request(&self.fail_queries, "query")?;
        Ok(self.page(query, 1))
    }

    async fn fetch_cursor(&self, cursor: &str) -> Result<ApiPage, CmsError> {
        self.record_request(&self.fail_cursors, "cursor fetch")?;
        let entry = self
            .cursors
            .lock()
            .map_err(|_| CmsError::Unavailable("cursor table poisoned".to_string()))?
            .get(cursor)
            .cloned();

        match entry {
            Some((query, page)) => Ok(self.page(&query, page)),
            None => Err(CmsError::InvalidCursor(cursor.to_string())),
        }
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<Document>, CmsError> {
        self.record_request(&self.fail_queries, "lookup")?;
        Ok(self
            .documents
            .iter()
            .find(|doc| doc.document_type == document_type && doc.uid.as_deref() == Some(uid))
            .cloned())
    }
}

/// Value of `my.<type>.<field>` (or `document.*` dates) as a comparable string
fn field_value(doc: &Document, path: &str) -> Option<String> {
    match path {
        FIRST_PUBLICATION_DATE => doc.first_publication_date.map(|d| {
            d.with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string()
        }),
        "document.last_publication_date" => doc.last_publication_date.map(|d| {
            d.with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string()
        }),
        _ => {
            let field = path.rsplit('.').next()?;
            if field == "uid" {
                return doc.uid.clone();
            }
            match doc.field(field)? {
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        }
    }
}

fn sort_key(doc: &Document, field: &str) -> Option<String> {
    field_value(doc, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::post;
    use crate::cms::Ordering;

    fn source() -> MemorySource {
        MemorySource::new(vec![
            post("b", "second", "2021-03-20T10:00:00+0000", "Second"),
            post("a", "first", "2021-03-15T10:00:00+0000", "First"),
            post("c", "third", "2021-03-25T10:00:00+0000", "Third"),
        ])
    }

    fn uids(page: &ApiPage) -> Vec<&str> {
        page.results.iter().map(|d| d.slug()).collect()
    }

    #[tokio::test]
    async fn test_query_orders_newest_first() {
        let source = source();
        let page = source.query(&PostQuery::new("posts")).await.unwrap();
        assert_eq!(uids(&page), vec!["third", "second", "first"]);
        assert!(page.next_page.is_none());
    }

    #[tokio::test]
    async fn test_cursor_pagination() {
        let source = source();
        let first = source
            .query(&PostQuery::new("posts").page_size(2))
            .await
            .unwrap();
        assert_eq!(uids(&first), vec!["third", "second"]);
        assert_eq!(first.total_pages, 2);

        let cursor = first.next_page.unwrap();
        let second = source.fetch_cursor(&cursor).await.unwrap();
        assert_eq!(uids(&second), vec!["first"]);
        assert!(second.next_page.is_none());
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_after_and_ordering() {
        let source = source();
        let query = PostQuery::new("posts")
            .ordering(Ordering::oldest_first())
            .after("a")
            .page_size(1);
        let page = source.query(&query).await.unwrap();
        assert_eq!(uids(&page), vec!["second"]);

        let unknown = PostQuery::new("posts").after("zzz");
        assert!(source.query(&unknown).await.unwrap().results.is_empty());
    }

    #[tokio::test]
    async fn test_uid_lookup_and_predicates() {
        let source = source();
        let doc = source.get_by_uid("posts", "second").await.unwrap();
        assert_eq!(doc.unwrap().id, "b");
        assert!(source.get_by_uid("posts", "missing").await.unwrap().is_none());

        let query = PostQuery::new("posts").filter(Predicate::at("my.posts.title", "Third"));
        let page = source.query(&query).await.unwrap();
        assert_eq!(uids(&page), vec!["third"]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let source = source();
        source.set_fail_queries(true);
        assert!(matches!(
            source.query(&PostQuery::new("posts")).await,
            Err(CmsError::Unavailable(_))
        ));
        assert!(matches!(
            source.fetch_cursor("memory://search/99?page=2").await,
            Err(CmsError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_fixture_file_layouts() {
        let dir = tempfile::tempdir().unwrap();

        let list = dir.path().join("list.json");
        let docs = vec![post("a", "first", "2021-03-15T10:00:00+0000", "First")];
        fs::write(&list, serde_json::to_string(&docs).unwrap()).unwrap();
        assert_eq!(MemorySource::from_file(&list).unwrap().documents.len(), 1);

        let page = dir.path().join("page.json");
        fs::write(
            &page,
            r#"{"page": 1, "next_page": null, "results": [
                {"id": "x", "uid": "x", "type": "posts", "data": {"title": "X"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(MemorySource::from_file(&page).unwrap().documents.len(), 1);
    }
}
