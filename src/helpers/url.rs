//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped in a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/post/hello/") // -> "/blog/post/hello/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Site path of a post page
pub fn post_path(config: &SiteConfig, uid: &str) -> String {
    url_for(config, &format!("post/{}/", encode_segment(&post_slug(uid))))
}

/// Absolute URL of a post page
///
/// # Examples
/// ```ignore
/// post_permalink(&config, "hello") // -> "https://example.com/blog/post/hello/"
/// ```
pub fn post_permalink(config: &SiteConfig, uid: &str) -> String {
    // post_path already carries the root
    format!("{}{}", config.url.trim_end_matches('/'), post_path(config, uid))
}

/// Output directory of a post page, relative to the public directory
pub fn post_dir(uid: &str) -> String {
    format!("post/{}", post_slug(uid))
}

/// A uid usable as a single directory name
fn post_slug(uid: &str) -> String {
    match uid {
        "" | "." | ".." => "-".to_string(),
        _ => uid.replace(['/', '\\'], "-"),
    }
}

/// Encode one URL path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
