use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `mailto:` links), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use seekr::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the chain of domain suffixes of a hostname, most specific first
///
/// The chain is produced by repeatedly stripping the leftmost label. A
/// suffix that would begin with an empty label (a leading or doubled dot)
/// is never an entry.
///
/// # Examples
///
/// ```
/// use seekr::url::decompose;
///
/// assert_eq!(
///     decompose("www.example.com"),
///     vec!["www.example.com", "example.com", "com"]
/// );
/// ```
pub fn decompose(hostname: &str) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    let mut rest = hostname;

    loop {
        if !rest.is_empty() && !rest.starts_with('.') && !domains.iter().any(|d| d == rest) {
            domains.push(rest.to_string());
        }

        match rest.find('.') {
            Some(index) => rest = &rest[index + 1..],
            None => break,
        }
    }

    domains
}
