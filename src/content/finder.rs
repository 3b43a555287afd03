use crate::dictionary::Dictionary;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Default number of words in the longest phrase the matcher looks for
pub const DEFAULT_MAX_PHRASE_LENGTH: usize = 5;

/// Punctuation stripped from every token before lookup
const STRIPPED: &[char] = &['.', ',', ';', ':', '!', '?', '"', '\''];

/// Searches token streams for dictionary terms and multi-word phrases
#[derive(Debug, Clone)]
pub struct ContentFinder {
    dictionary: Arc<Dictionary>,
    max_phrase_length: usize,
}

impl ContentFinder {
    /// Creates a finder over a shared dictionary
    ///
    /// A `max_phrase_length` of zero is treated as one.
    pub fn new(dictionary: Arc<Dictionary>, max_phrase_length: usize) -> Self {
        Self {
            dictionary,
            max_phrase_length: max_phrase_length.max(1),
        }
    }

    /// Returns the dictionary this finder searches
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Finds every dictionary term or phrase in the token stream
    ///
    /// A rolling window keeps the most recent `max_phrase_length` tokens;
    /// after each token is pushed, every run of tokens ending at it is
    /// looked up. Results are deduplicated and kept in first-hit order.
    pub fn find<I, S>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut window: VecDeque<String> = VecDeque::with_capacity(self.max_phrase_length);

        for token in tokens {
            let Some(word) = normalize_token(token.as_ref()) else {
                continue;
            };

            if window.len() == self.max_phrase_length {
                window.pop_front();
            }
            window.push_back(word);

            for start in 0..window.len() {
                let phrase = window.range(start..).map(String::as_str).collect::<Vec<_>>().join(" ");

                if self.dictionary.contains(&phrase) && seen.insert(phrase.clone()) {
                    found.push(phrase);
                }
            }
        }

        found
    }
}

/// Finds dictionary hits in a token stream
///
/// Convenience wrapper around [`ContentFinder::find`] for one-off searches.
///
/// # Examples
///
/// ```
/// use seekr::{find_matches, Dictionary};
///
/// let dictionary = Dictionary::from_terms(["hello world", "i see you"]);
/// let tokens = ["hello", "world", ".", "i", "see", "you"];
///
/// let found = find_matches(tokens, &dictionary, 5);
/// assert_eq!(found, vec!["hello world", "i see you"]);
/// ```
pub fn find_matches<I, S>(tokens: I, dictionary: &Dictionary, max_phrase_length: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ContentFinder::new(Arc::new(dictionary.clone()), max_phrase_length).find(tokens)
}

/// Lowercases a token and strips punctuation
///
/// Returns None for tokens made only of punctuation, which are skipped
/// rather than buffered.
fn normalize_token(token: &str) -> Option<String> {
    let word: String = token
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .flat_map(char::to_lowercase)
        .collect();

    if word.is_empty() {
        None
    } else {
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder(terms: &[&str], max_phrase_length: usize) -> ContentFinder {
        ContentFinder::new(Arc::new(Dictionary::from_terms(terms)), max_phrase_length)
    }

    #[test]
    fn test_finds_multi_word_phrases() {
        let finder = finder(&["hello world", "i see you"], DEFAULT_MAX_PHRASE_LENGTH);
        let content = ["hello", "world", ".", "i", "see", "you"];

        assert_eq!(finder.find(content), vec!["hello world", "i see you"]);
    }

    #[test]
    fn test_finds_single_words() {
        let finder = finder(&["dfinity", "canister"], DEFAULT_MAX_PHRASE_LENGTH);
        let content = ["Welcome", "to", "DFINITY!", "Deploy", "a", "canister."];

        assert_eq!(finder.find(content), vec!["dfinity", "canister"]);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let finder = finder(&["icp"], DEFAULT_MAX_PHRASE_LENGTH);
        let content = ["icp", "and", "ICP", "and", "\"icp\""];

        assert_eq!(finder.find(content), vec!["icp"]);
    }

    #[test]
    fn test_punctuation_is_stripped_inside_phrases() {
        let finder = finder(&["don't stop"], DEFAULT_MAX_PHRASE_LENGTH);

        // apostrophes are stripped, so the dictionary entry itself can never match
        assert!(finder.find(["don't", "stop"]).is_empty());

        let finder = ContentFinder::new(
            Arc::new(Dictionary::from_terms(["dont stop"])),
            DEFAULT_MAX_PHRASE_LENGTH,
        );
        assert_eq!(finder.find(["Don't", "stop!"]), vec!["dont stop"]);
    }

    #[test]
    fn test_standalone_punctuation_does_not_break_phrases() {
        let finder = finder(&["hello world"], DEFAULT_MAX_PHRASE_LENGTH);

        assert_eq!(finder.find(["hello", ",", "world"]), vec!["hello world"]);
        assert_eq!(finder.find(["hello", "!?", "world"]), vec!["hello world"]);
    }

    #[test]
    fn test_phrase_longer_than_window_is_not_found() {
        let terms = ["one two three"];

        assert!(finder(&terms, 2).find(["one", "two", "three"]).is_empty());
        assert_eq!(
            finder(&terms, 3).find(["one", "two", "three"]),
            vec!["one two three"]
        );
    }

    #[test]
    fn test_results_are_contiguous_and_bounded() {
        let terms = ["a b", "b c d", "a c", "d e f g h i", "e"];
        let tokens = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
        let max = 4;

        let found = finder(&terms, max).find(tokens);
        let joined = tokens.join(" ");

        assert_eq!(found, vec!["a b", "b c d", "e"]);
        for phrase in found {
            assert!(phrase.split(' ').count() <= max);
            assert!(joined.contains(&phrase));
        }
    }

    #[test]
    fn test_zero_window_is_treated_as_one() {
        let finder = finder(&["seek"], 0);
        assert_eq!(finder.find(["seek"]), vec!["seek"]);
    }

    #[test]
    fn test_find_matches_helper() {
        let dictionary = Dictionary::from_terms(["hello world", "i see you"]);
        let found = find_matches(["hello", "world", ".", "i", "see", "you"], &dictionary, 5);

        assert_eq!(found, vec!["hello world", "i see you"]);
    }

    #[test]
    fn test_empty_stream() {
        let finder = finder(&["anything"], DEFAULT_MAX_PHRASE_LENGTH);
        assert!(finder.find(Vec::<String>::new()).is_empty());
    }
}
