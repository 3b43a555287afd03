//! Content matching module
//!
//! Rendered page text is split into tokens and scanned for dictionary terms
//! and multi-word phrases with a rolling window.

mod finder;

pub use finder::{find_matches, ContentFinder, DEFAULT_MAX_PHRASE_LENGTH};

/// Splits rendered text into lowercase tokens
///
/// Tokens are separated by whitespace; tokens with fewer than
/// `min_length` characters are dropped.
///
/// # Examples
///
/// ```
/// use seekr::content::tokenize;
///
/// let tokens = tokenize("Hello  World\n of ICP", 3);
/// assert_eq!(tokens, vec!["hello", "world", "icp"]);
/// ```
pub fn tokenize(text: &str, min_length: usize) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= min_length)
        .collect()
}
