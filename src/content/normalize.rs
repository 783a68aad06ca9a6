//! Normalization of CMS documents into post models
//!
//! Missing optional fields (banner, subtitle, content sections) become
//! empty values so templates only need to check for emptiness.

use serde::Deserialize;

use super::{ContentBlock, PostDetail, PostSummary};
use crate::cms::Document;
use crate::richtext::{self, RichText};

/// A text field stored either as a plain string or as rich text
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Plain(String),
    Rich(RichText),
}

impl TextField {
    fn into_string(self) -> String {
        match self {
            TextField::Plain(s) => s,
            TextField::Rich(text) => richtext::as_text(&text),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostFields {
    title: Option<TextField>,
    subtitle: Option<TextField>,
    author: Option<TextField>,
    banner: Option<Banner>,
    content: Option<Vec<Section>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Banner {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Section {
    heading: Option<TextField>,
    body: Option<RichText>,
}

fn text(field: Option<TextField>) -> String {
    field.map(TextField::into_string).unwrap_or_default()
}

fn fields(doc: &Document) -> Result<PostFields, serde_json::Error> {
    if doc.data.is_null() {
        return Ok(PostFields::default());
    }
    serde_json::from_value(doc.data.clone())
}

/// Listing view of a document
pub fn summary(doc: &Document) -> Result<PostSummary, serde_json::Error> {
    let fields = fields(doc)?;
    Ok(PostSummary {
        uid: doc.slug().to_string(),
        first_publication_date: doc.first_publication_date,
        title: text(fields.title),
        subtitle: text(fields.subtitle),
        author: text(fields.author),
    })
}

/// Full view of a document
pub fn detail(doc: &Document) -> Result<PostDetail, serde_json::Error> {
    let fields = fields(doc)?;
    let content = fields
        .content
        .unwrap_or_default()
        .into_iter()
        .map(|section| ContentBlock {
            heading: text(section.heading),
            body: section.body.unwrap_or_default(),
        })
        .collect();

    Ok(PostDetail {
        id: doc.id.clone(),
        uid: doc.slug().to_string(),
        first_publication_date: doc.first_publication_date,
        last_publication_date: doc.last_publication_date,
        title: text(fields.title),
        banner_url: fields.banner.and_then(|b| b.url).unwrap_or_default(),
        author: text(fields.author),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::post;

    #[test]
    fn test_summary() {
        let doc = post("a", "first", "2021-03-15T10:00:00+0000", "First");
        let summary = summary(&doc).unwrap();
        assert_eq!(summary.uid, "first");
        assert_eq!(summary.title, "First");
        assert_eq!(summary.subtitle, "About First");
        assert_eq!(summary.author, "Joseph Oliveira");
        assert_eq!(summary.first_publication_date, doc.first_publication_date);
    }

    #[test]
    fn test_detail() {
        let doc = post("a", "first", "2021-03-15T10:00:00+0000", "First");
        let detail = detail(&doc).unwrap();
        assert_eq!(detail.id, "a");
        assert_eq!(detail.banner_url, "https://images.example.com/first.png");
        assert_eq!(detail.content.len(), 1);
        assert_eq!(detail.content[0].heading, "Intro");
        assert_eq!(richtext::as_text(&detail.content[0].body), "Some words here");
        assert_eq!(detail.reading_time(), 1);
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let mut doc = post("a", "first", "2021-03-15T10:00:00+0000", "First");
        doc.data = serde_json::json!({
            "title": "Bare",
            "banner": null,
            "content": [{ "heading": null, "body": null }]
        });
        let detail = detail(&doc).unwrap();
        assert_eq!(detail.banner_url, "");
        assert_eq!(detail.author, "");
        assert_eq!(detail.content[0], ContentBlock::default());
        assert_eq!(detail.reading_time(), 0);

        doc.data = serde_json::Value::Null;
        assert_eq!(summary(&doc).unwrap().title, "");
    }

    #[test]
    fn test_rich_text_title() {
        let mut doc = post("a", "first", "2021-03-15T10:00:00+0000", "First");
        doc.data["title"] = serde_json::json!([
            { "type": "heading1", "text": "Rich title", "spans": [] }
        ]);
        assert_eq!(summary(&doc).unwrap().title, "Rich title");
    }

    #[test]
    fn test_malformed_content_is_an_error() {
        let mut doc = post("a", "first", "2021-03-15T10:00:00+0000", "First");
        doc.data["content"] = serde_json::json!("not a list");
        assert!(detail(&doc).is_err());
    }
}
