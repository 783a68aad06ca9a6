//! HTML serialization of rich text

use serde::Deserialize;

use super::{Block, BlockKind, RichText, Span};

/// Link target carried by a `hyperlink` span
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    /// `Web`, `Document` or `Media`
    #[serde(default)]
    pub link_type: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Target document uid for `Document` links
    #[serde(default)]
    pub uid: Option<String>,
    /// Target document type for `Document` links
    #[serde(default, rename = "type")]
    pub document_type: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// Render rich text to HTML, resolving only links that carry a URL
pub fn as_html(text: &RichText) -> String {
    as_html_with(text, &|link: &Link| link.url.clone())
}

/// Render rich text to HTML with a custom link resolver
///
/// Consecutive list items are grouped into a single `<ul>` or `<ol>`.
pub fn as_html_with(text: &RichText, resolve: &dyn Fn(&Link) -> Option<String>) -> String {
    let mut html = String::new();
    let mut open_list: Option<&str> = None;

    for block in text.blocks() {
        let kind = block.kind();
        let list_tag = match kind {
            BlockKind::ListItem => Some("ul"),
            BlockKind::OrderedListItem => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        match kind {
            BlockKind::Heading(level) => {
                html.push_str(&format!(
                    "<h{0}>{1}</h{0}>",
                    level,
                    render_spans(block, resolve)
                ));
            }
            BlockKind::Paragraph => {
                html.push_str(&format!("<p>{}</p>", render_spans(block, resolve)));
            }
            BlockKind::Preformatted => {
                html.push_str(&format!("<pre>{}</pre>", render_spans(block, resolve)));
            }
            BlockKind::ListItem | BlockKind::OrderedListItem => {
                html.push_str(&format!("<li>{}</li>", render_spans(block, resolve)));
            }
            BlockKind::Image => {
                if let Some(url) = &block.url {
                    html.push_str(&format!(
                        r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                        escape_html(url),
                        escape_html(block.alt.as_deref().unwrap_or(""))
                    ));
                }
            }
            BlockKind::Embed => html.push_str(&render_embed(block)),
            BlockKind::Unknown => {
                tracing::debug!("Skipping rich-text block of type {:?}", block.kind);
            }
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_embed(block: &Block) -> String {
    let Some(oembed) = &block.oembed else {
        return String::new();
    };
    let field = |name: &str| oembed.get(name).and_then(|v| v.as_str()).unwrap_or("");

    // The embed markup comes from the provider and is trusted as-is
    format!(
        r#"<div data-oembed="{}" data-oembed-type="{}">{}</div>"#,
        escape_html(field("embed_url")),
        escape_html(field("type")),
        field("html")
    )
}

/// Render a block's text with its inline spans
///
/// Span offsets are character positions. Overlapping spans that are not
/// properly nested are closed and reopened so the output stays well formed.
fn render_spans(block: &Block, resolve: &dyn Fn(&Link) -> Option<String>) -> String {
    let chars: Vec<char> = block.text.chars().collect();
    let len = chars.len();

    let mut spans: Vec<&Span> = block
        .spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len)
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(block.text.len());
    let mut stack: Vec<&Span> = Vec::new();
    let mut next = 0;

    for i in 0..=len {
        let ends_here = |s: &&Span| s.end.min(len) <= i;
        if stack.iter().any(ends_here) {
            let mut reopen = Vec::new();
            while let Some(span) = stack.pop() {
                out.push_str(&close_tag(span));
                if span.end.min(len) > i {
                    reopen.push(span);
                }
                if !stack.iter().any(ends_here) {
                    break;
                }
            }
            for span in reopen.into_iter().rev() {
                out.push_str(&open_tag(span, resolve));
                stack.push(span);
            }
        }

        if i == len {
            break;
        }

        while next < spans.len() && spans[next].start == i {
            out.push_str(&open_tag(spans[next], resolve));
            stack.push(spans[next]);
            next += 1;
        }

        match chars[i] {
            '\n' => out.push_str("<br />"),
            c => push_escaped(&mut out, c),
        }
    }

    out
}

fn open_tag(span: &Span, resolve: &dyn Fn(&Link) -> Option<String>) -> String {
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let link: Link = span
                .data
                .clone()
                .and_then(|d| serde_json::from_value(d).ok())
                .unwrap_or_default();
            let target = link
                .target
                .as_deref()
                .map(|t| format!(r#" target="{}" rel="noopener""#, escape_html(t)))
                .unwrap_or_default();
            match resolve(&link) {
                Some(href) => format!(r#"<a href="{}"{}>"#, escape_html(&href), target),
                None => "<a>".to_string(),
            }
        }
        other => format!(r#"<span class="{}">"#, escape_html(other)),
    }
}

fn close_tag(span: &Span) -> String {
    match span.kind.as_str() {
        "strong" => "</strong>".to_string(),
        "em" => "</em>".to_string(),
        "hyperlink" => "</a>".to_string(),
        _ => "</span>".to_string(),
    }
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        c => out.push(c),
    }
}

/// Escape HTML special characters
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        push_escaped(&mut out, c);
    }
    out
}
