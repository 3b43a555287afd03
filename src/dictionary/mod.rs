//! Dictionary module for Seekr
//!
//! This module builds the effective dictionary that the content matcher
//! searches for: the base terms, optionally their edit-distance-1 variants,
//! minus the excluded words.

mod expansion;

pub use expansion::{expand, ALPHABET, DEFAULT_MIN_WORD_LENGTH};

use std::collections::HashSet;

/// The effective, immutable dictionary of terms and phrases
///
/// Every entry is trimmed and lowercased. Once built the dictionary cannot
/// be modified; share it with `Arc` across crawl tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    terms: HashSet<String>,
}

impl Dictionary {
    /// Builds a dictionary from terms as-is, without expansion or exclusions
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms.into_iter().filter_map(|t| normalize(t.as_ref())).collect(),
        }
    }

    /// Builds the effective dictionary
    ///
    /// # Arguments
    ///
    /// * `base` - The base words and phrases
    /// * `excluded` - Words removed after expansion
    /// * `expansion` - `Some(min_length)` to add every edit-distance-1 variant
    ///   of at least `min_length` characters, `None` to disable expansion
    ///
    /// # Examples
    ///
    /// ```
    /// use seekr::Dictionary;
    ///
    /// let dictionary = Dictionary::build(&["dfinity"], &["dfinitx"], Some(3));
    /// assert!(dictionary.contains("dfinity"));
    /// assert!(dictionary.contains("dfinit"));
    /// assert!(!dictionary.contains("dfinitx"));
    /// ```
    pub fn build<B, E>(base: &[B], excluded: &[E], expansion: Option<usize>) -> Self
    where
        B: AsRef<str>,
        E: AsRef<str>,
    {
        let mut terms = HashSet::new();

        for word in base.iter().filter_map(|w| normalize(w.as_ref())) {
            if let Some(min_length) = expansion {
                terms.extend(expand(&word, min_length));
            }
            terms.insert(word);
        }

        let before = terms.len();
        for word in excluded.iter().filter_map(|w| normalize(w.as_ref())) {
            terms.remove(&word);
        }

        tracing::debug!(
            "Dictionary built from {} base terms: {} entries, {} excluded",
            base.len(),
            terms.len(),
            before - terms.len()
        );

        Self { terms }
    }

    /// Returns true if the term or phrase is in the dictionary
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns whether the dictionary has no entries
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates over all entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Returns the number of words in the longest phrase
    pub fn longest_phrase(&self) -> usize {
        self.terms
            .iter()
            .map(|t| t.split(' ').count())
            .max()
            .unwrap_or(0)
    }
}

fn normalize(term: &str) -> Option<String> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        None
    } else {
        Some(term)
    }
}
