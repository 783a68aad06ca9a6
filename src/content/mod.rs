//! Content module - post models, normalization and reading time

pub mod normalize;
mod post;
pub mod reading_time;

pub use post::{ContentBlock, FooterLink, PostDetail, PostSummary};
pub use reading_time::estimate_minutes;
