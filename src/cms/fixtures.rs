//! Sample documents shared by unit tests

use super::{parse_timestamp, Document};

/// A `posts` document with one content section of three words
pub(crate) fn post(id: &str, uid: &str, date: &str, title: &str) -> Document {
    Document {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        document_type: "posts".to_string(),
        first_publication_date: Some(parse_timestamp(date).unwrap()),
        last_publication_date: Some(parse_timestamp(date).unwrap()),
        tags: Vec::new(),
        data: serde_json::json!({
            "title": title,
            "subtitle": format!("About {}", title),
            "author": "Joseph Oliveira",
            "banner": { "url": format!("https://images.example.com/{}.png", uid) },
            "content": [
                {
                    "heading": "Intro",
                    "body": [{ "type": "paragraph", "text": "Some words here", "spans": [] }]
                }
            ]
        }),
    }
}
