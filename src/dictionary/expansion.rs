use std::collections::HashSet;

/// Symbols used for substitutions and insertions
pub const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Default minimum length of an expanded variant
pub const DEFAULT_MIN_WORD_LENGTH: usize = 3;

/// Generates the edit-distance-1 neighbourhood of a word
///
/// For every split point the word yields its deletions, adjacent
/// transpositions, substitutions and insertions over [`ALPHABET`]. The
/// union is deduplicated and variants shorter than `min_length` characters
/// are dropped. The word itself is included whenever a substitution
/// reproduces it.
///
/// # Examples
///
/// ```
/// use seekr::dictionary::expand;
///
/// let variants = expand("at", 0);
/// assert!(variants.contains("a"));
/// assert!(variants.contains("1t"));
/// assert!(variants.contains("ate"));
/// assert_eq!(variants.len(), 180);
/// ```
pub fn expand(word: &str, min_length: usize) -> HashSet<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut variants = HashSet::new();

    for i in 0..=chars.len() {
        let (left, right) = chars.split_at(i);

        // deletion of the character after the split
        if !right.is_empty() {
            variants.insert(join(left, &[], &right[1..]));
        }

        // swap of the two characters after the split
        if right.len() > 1 {
            variants.insert(join(left, &[right[1], right[0]], &right[2..]));
        }

        for &symbol in ALPHABET {
            let tail = if right.is_empty() { right } else { &right[1..] };
            variants.insert(join(left, &[symbol], tail));
            variants.insert(join(left, &[symbol], right));
        }
    }

    variants.retain(|variant| variant.chars().count() >= min_length);
    variants
}

fn join(left: &[char], middle: &[char], right: &[char]) -> String {
    left.iter().chain(middle).chain(right).collect()
}
