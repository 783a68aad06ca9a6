//! Post models

use serde::{Deserialize, Serialize};

use super::reading_time;
use crate::cms::Timestamp;
use crate::richtext::{self, RichText};

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Unique identifier within the listing, used in the post URL
    pub uid: String,

    pub first_publication_date: Option<Timestamp>,

    pub title: String,

    pub subtitle: String,

    pub author: String,
}

/// A full post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    /// CMS document id, used as the cursor for neighbour queries
    pub id: String,

    pub uid: String,

    pub first_publication_date: Option<Timestamp>,

    pub last_publication_date: Option<Timestamp>,

    pub title: String,

    /// Banner image URL, empty when the post has none
    pub banner_url: String,

    pub author: String,

    /// Ordered content sections
    pub content: Vec<ContentBlock>,
}

/// One section of a post: a heading followed by rich-text body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: RichText,
}

impl PostDetail {
    /// Estimated reading time in minutes
    pub fn reading_time(&self) -> u32 {
        reading_time::estimate_minutes(&self.content, richtext::as_text)
    }

    /// Whether the post was republished after its first publication
    pub fn was_edited(&self) -> bool {
        match (self.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) => last > first,
            _ => false,
        }
    }
}

/// Reference to the previous or next post
///
/// Both fields are absent when there is no neighbour or it could not be
/// resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterLink {
    pub slug: Option<String>,
    pub title: Option<String>,
}

impl FooterLink {
    pub fn new(slug: &str, title: &str) -> Self {
        Self {
            slug: Some(slug.to_string()),
            title: Some(title.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        self.slug.is_some()
    }
}
