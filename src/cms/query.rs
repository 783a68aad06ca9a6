//! Search queries against the CMS

use serde::{Deserialize, Serialize};

/// Field holding the first publication date of every document
pub const FIRST_PUBLICATION_DATE: &str = "document.first_publication_date";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

/// Ordering of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn new(field: &str, direction: Direction) -> Self {
        Self {
            field: field.to_string(),
            direction,
        }
    }

    /// Newest first, the canonical listing order
    pub fn newest_first() -> Self {
        Self::new(FIRST_PUBLICATION_DATE, Direction::Desc)
    }

    /// Oldest first
    pub fn oldest_first() -> Self {
        Self::new(FIRST_PUBLICATION_DATE, Direction::Asc)
    }

    /// Render as the `orderings` query parameter
    pub fn to_param(&self) -> String {
        match self.direction {
            Direction::Asc => format!("[{}]", self.field),
            Direction::Desc => format!("[{} desc]", self.field),
        }
    }
}

/// Predicate filtering documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// `path` equals `value`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    /// Render in the CMS predicate syntax
    pub fn to_param(&self) -> String {
        match self {
            Predicate::At { path, value } => {
                format!("[at({}, \"{}\")]", path, value.replace('"', "\\\""))
            }
        }
    }
}

/// A search query over one document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostQuery {
    pub document_type: String,
    pub predicates: Vec<Predicate>,
    pub page_size: usize,
    pub ordering: Ordering,
    /// Only return documents that come after this document id in `ordering`
    pub after: Option<String>,
    /// Restrict returned data to these fields (`type.field`)
    pub fetch: Vec<String>,
}

impl PostQuery {
    pub fn new(document_type: &str) -> Self {
        Self {
            document_type: document_type.to_string(),
            predicates: Vec::new(),
            page_size: 20,
            ordering: Ordering::newest_first(),
            after: None,
            fetch: Vec::new(),
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn after(mut self, document_id: &str) -> Self {
        self.after = Some(document_id.to_string());
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn fetch_fields(mut self, fields: &[&str]) -> Self {
        self.fetch = fields
            .iter()
            .map(|f| format!("{}.{}", self.document_type, f))
            .collect();
        self
    }

    /// The `q` parameter: the document type predicate plus any extra ones
    pub fn q_param(&self) -> String {
        let mut q = Predicate::at("document.type", &self.document_type).to_param();
        for predicate in &self.predicates {
            q.push_str(&predicate.to_param());
        }
        format!("[{}]", q)
    }

    /// All query parameters except `ref` and `access_token`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.q_param()),
            ("pageSize", self.page_size.to_string()),
            ("orderings", self.ordering.to_param()),
        ];
        if let Some(after) = &self.after {
            params.push(("after", after.clone()));
        }
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_param() {
        assert_eq!(
            Ordering::newest_first().to_param(),
            "[document.first_publication_date desc]"
        );
        assert_eq!(
            Ordering::oldest_first().to_param(),
            "[document.first_publication_date]"
        );
    }

    #[test]
    fn test_query_params() {
        let query = PostQuery::new("posts")
            .page_size(5)
            .fetch_fields(&["title", "author"]);
        let params = query.params();
        assert_eq!(params[0], ("q", r#"[[at(document.type, "posts")]]"#.to_string()));
        assert_eq!(params[1], ("pageSize", "5".to_string()));
        assert_eq!(params[3], ("fetch", "posts.title,posts.author".to_string()));
        assert!(!params.iter().any(|(k, _)| *k == "after"));
    }

    #[test]
    fn test_uid_predicate() {
        let query = PostQuery::new("posts").filter(Predicate::at("my.posts.uid", "hello"));
        assert_eq!(
            query.q_param(),
            r#"[[at(document.type, "posts")][at(my.posts.uid, "hello")]]"#
        );
    }

    #[test]
    fn test_page_size_is_at_least_one() {
        assert_eq!(PostQuery::new("posts").page_size(0).page_size, 1);
    }
}
