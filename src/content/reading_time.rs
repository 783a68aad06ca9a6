//! Reading-time estimate

use super::ContentBlock;
use crate::richtext::RichText;

/// Assumed reading speed
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimated minutes to read a post's content
///
/// Counts the whitespace-separated words of every heading and of the
/// plain-text rendering of every body, then divides by
/// [`WORDS_PER_MINUTE`] rounding up. Empty content reads in 0 minutes.
pub fn estimate_minutes<F>(content: &[ContentBlock], to_plain_text: F) -> u32
where
    F: Fn(&RichText) -> String,
{
    let words: usize = content
        .iter()
        .map(|block| count_words(&block.heading) + count_words(&to_plain_text(&block.body)))
        .sum();

    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// Number of whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
