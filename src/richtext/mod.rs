//! Structured rich text as delivered by the CMS
//!
//! A rich-text field is an ordered list of blocks (headings, paragraphs,
//! list items, images, embeds). Text blocks carry inline spans that mark
//! character ranges as strong, emphasized or hyperlinked. This module
//! converts such a field to plain text (for word counting) and to an HTML
//! fragment (for display).

mod html;

use serde::{Deserialize, Serialize};

pub use html::{as_html, as_html_with, Link};

/// A rich-text field: an ordered sequence of blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Block>);

impl RichText {
    /// Build a field made of plain paragraphs, one per item
    pub fn paragraphs<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RichText(items.into_iter().map(Block::paragraph).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }
}

/// A single block of a rich-text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Raw block type (`paragraph`, `heading2`, `list-item`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image source for `image` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Image alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// oEmbed payload for `embed` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<serde_json::Value>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::text_block("paragraph", text)
    }

    pub fn text_block(kind: &str, text: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    /// Interpret the raw block type
    pub fn kind(&self) -> BlockKind {
        match self.kind.as_str() {
            "heading1" => BlockKind::Heading(1),
            "heading2" => BlockKind::Heading(2),
            "heading3" => BlockKind::Heading(3),
            "heading4" => BlockKind::Heading(4),
            "heading5" => BlockKind::Heading(5),
            "heading6" => BlockKind::Heading(6),
            "paragraph" => BlockKind::Paragraph,
            "preformatted" => BlockKind::Preformatted,
            "list-item" => BlockKind::ListItem,
            "o-list-item" => BlockKind::OrderedListItem,
            "image" => BlockKind::Image,
            "embed" => BlockKind::Embed,
            _ => BlockKind::Unknown,
        }
    }
}

/// Known block types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    Preformatted,
    ListItem,
    OrderedListItem,
    Image,
    Embed,
    Unknown,
}

impl BlockKind {
    /// Whether the block carries readable text
    pub fn has_text(self) -> bool {
        !matches!(self, BlockKind::Image | BlockKind::Embed | BlockKind::Unknown)
    }
}

/// Inline formatting over a character range `[start, end)` of a block's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    /// `strong`, `em` or `hyperlink`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Span {
    pub fn new(kind: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind: kind.to_string(),
            data: None,
        }
    }

    pub fn hyperlink(start: usize, end: usize, url: &str) -> Self {
        Self {
            start,
            end,
            kind: "hyperlink".to_string(),
            data: Some(serde_json::json!({ "link_type": "Web", "url": url })),
        }
    }
}

/// Plain-text rendering of a rich-text field
///
/// Text-bearing blocks are joined with a single space; images and embeds
/// contribute nothing.
pub fn as_text(text: &RichText) -> String {
    text.blocks()
        .iter()
        .filter(|b| b.kind().has_text())
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prismic_blocks() {
        let json = r#"[
            {"type": "heading2", "text": "Intro", "spans": []},
            {"type": "paragraph", "text": "Hello world", "spans": [{"start": 0, "end": 5, "type": "strong"}]},
            {"type": "image", "url": "https://images.example.com/a.png", "alt": "A", "dimensions": {"width": 10, "height": 10}}
        ]"#;
        let text: RichText = serde_json::from_str(json).unwrap();
        assert_eq!(text.blocks().len(), 3);
        assert_eq!(text.blocks()[0].kind(), BlockKind::Heading(2));
        assert_eq!(text.blocks()[1].spans[0].kind, "strong");
        assert_eq!(text.blocks()[2].kind(), BlockKind::Image);
        assert_eq!(text.blocks()[2].text, "");
    }

    #[test]
    fn test_as_text_skips_media() {
        let mut text = RichText::paragraphs(["first line", "second line"]);
        text.0.push(Block {
            url: Some("https://images.example.com/a.png".to_string()),
            ..Block::text_block("image", "")
        });
        assert_eq!(as_text(&text), "first line second line");
    }

    #[test]
    fn test_as_text_empty() {
        assert_eq!(as_text(&RichText::default()), "");
    }

    #[test]
    fn test_unknown_block_kind() {
        let block = Block::text_block("table", "x");
        assert_eq!(block.kind(), BlockKind::Unknown);
        assert!(!block.kind().has_text());
    }
}
