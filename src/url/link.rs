use crate::url::domain::extract_domain;
use std::collections::HashSet;
use url::Url;

/// File extensions that never lead to a renderable page
const SKIPPED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".pdf"];

/// Outcome of classifying a single link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    /// Whether the link should be crawled
    pub crawlable: bool,

    /// The normalized URL, or the raw input when it could not be parsed
    pub url: String,

    /// Lowercase hostname, empty when the URL has none
    pub hostname: String,
}

/// Classifies a raw link string
///
/// A link is crawlable only when it parses, uses the `http` or `https`
/// scheme, and its path does not end in an image or PDF extension. Parse
/// failures are never reported as errors; they simply yield a
/// non-crawlable link.
///
/// # Examples
///
/// ```
/// use seekr::url::classify_link;
///
/// assert!(classify_link("http://www.hotmail.com").crawlable);
/// assert!(!classify_link("tel:0100200340").crawlable);
/// assert!(!classify_link("https://example.com/img/cat.JPG?s=1").crawlable);
/// ```
pub fn classify_link(raw: &str) -> ClassifiedLink {
    let url = match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(_) => {
            return ClassifiedLink {
                crawlable: false,
                url: raw.to_string(),
                hostname: String::new(),
            }
        }
    };

    let hostname = extract_domain(&url).unwrap_or_default();
    let crawlable = !is_special_scheme(&url)
        && !has_skipped_extension(&url)
        && is_http(&url)
        && !hostname.is_empty();

    ClassifiedLink {
        crawlable,
        url: url.to_string(),
        hostname,
    }
}

/// Classifies a batch of links, keeping only the crawlable ones
///
/// Links are deduplicated by their normalized URL; the first occurrence
/// wins and input order is preserved.
pub fn crawlable_links<I, S>(links: I) -> Vec<ClassifiedLink>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();

    links
        .into_iter()
        .map(|link| classify_link(link.as_ref()))
        .filter(|link| link.crawlable)
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

fn is_special_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "mailto" | "tel")
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Checks the path component only, so query strings and fragments are ignored
fn has_skipped_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
