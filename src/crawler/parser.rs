//! HTML parser for extracting visible text and links
//!
//! This module handles parsing HTML content to extract:
//! - Visible text (skipping scripts, styles and the document head)
//! - Outbound links from `<a href>` tags

use scraper::{Html, Node, Selector};
use url::Url;

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Visible text, one space between text nodes
    pub text: String,

    /// Link targets in document order, resolved against the base URL
    pub links: Vec<String>,
}

/// Parses HTML content and extracts visible text and links
///
/// Links are not filtered here: `mailto:`, `tel:` and image links are kept
/// so the link classifier can decide on them. Hrefs that cannot be resolved
/// are kept verbatim; fragment-only hrefs are dropped and fragments are
/// stripped from resolved links.
///
/// # Example
///
/// ```
/// use seekr::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><p>Hello</p><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.text, "Hello Link");
/// assert_eq!(parsed.links, vec!["https://example.com/page"]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        text: extract_text(&document),
        links: extract_links(&document, base_url),
    }
}

/// Collects visible text nodes
fn extract_text(document: &Html) -> String {
    let mut chunks = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let chunk = text.trim();
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
    }

    chunks.join(" ")
}

/// Extracts all link targets from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(link) = resolve_link(href, base_url) {
                    links.push(link);
                }
            }
        }
    }

    links
}

/// Resolves an href against the base URL
///
/// Returns None for empty and fragment-only hrefs.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            absolute_url.set_fragment(None);
            Some(absolute_url.to_string())
        }
        Err(_) => Some(href.to_string()),
    }
}
