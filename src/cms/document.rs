//! Wire format of the CMS REST API

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Publication timestamp as reported by the CMS
pub type Timestamp = DateTime<FixedOffset>;

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiPage {
    pub page: u32,
    pub results_per_page: u32,
    pub results_size: u32,
    pub total_results_size: u32,
    pub total_pages: u32,
    /// Opaque URL of the following page, `None` on the last page
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

/// A CMS document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(rename = "type")]
    pub document_type: String,

    #[serde(default, with = "publication_date")]
    pub first_publication_date: Option<Timestamp>,

    #[serde(default, with = "publication_date")]
    pub last_publication_date: Option<Timestamp>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Custom fields defined by the document type
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Document {
    /// Identifier used in URLs: the uid when present, the id otherwise
    pub fn slug(&self) -> &str {
        self.uid.as_deref().unwrap_or(&self.id)
    }

    /// Look up a custom field
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.data.get(name)
    }
}

/// Repository metadata returned by the API entry point
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiInfo {
    pub refs: Vec<ApiRef>,
}

/// A content release reference
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub label: String,
    #[serde(rename = "isMasterRef")]
    pub is_master: bool,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master)
            .map(|r| r.reference.as_str())
    }
}

/// Parse a CMS timestamp
///
/// The API emits offsets without a colon (`+0000`); RFC 3339 is accepted too.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
}

mod publication_date {
    use super::{parse_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&date.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
