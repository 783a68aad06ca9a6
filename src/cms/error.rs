//! Content source errors

use thiserror::Error;

/// Errors raised while talking to the content source
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("The CMS repository does not expose a master ref")]
    NoMasterRef,

    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),

    #[error("Content source unavailable: {0}")]
    Unavailable(String),
}

impl CmsError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            CmsError::Http(e) => e.is_timeout() || e.is_connect(),
            CmsError::Status { status, .. } => *status >= 500 || *status == 429,
            CmsError::Unavailable(_) => true,
            _ => false,
        }
    }
}
