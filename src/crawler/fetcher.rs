//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made on behalf of the page
//! renderer, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests to fetch page content
//! - Error classification into render failures

use crate::crawler::renderer::RenderError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header sent with every request
/// * `timeout` - Overall per-request timeout
///
/// # Example
///
/// ```no_run
/// use seekr::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("seekr/0.1.0", Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML (or missing) Content-Type | `Ok(FetchedPage)` |
/// | Non-2xx status | `RenderError::Status` |
/// | Non-HTML Content-Type | `RenderError::ContentMismatch` |
/// | Timeout | `RenderError::Timeout` |
/// | Connection refused, DNS, TLS, redirect errors | `RenderError::Navigation` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, RenderError> {
    let response = client.get(url.clone()).send().await.map_err(classify_error)?;

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(RenderError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return Err(RenderError::ContentMismatch(content_type));
    }

    let body = response.text().await.map_err(classify_error)?;

    Ok(FetchedPage { final_url, body })
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

fn classify_error(e: reqwest::Error) -> RenderError {
    if e.is_timeout() {
        RenderError::Timeout
    } else if e.is_connect() {
        RenderError::Navigation(format!("Connection refused: {}", e))
    } else if e.is_redirect() {
        RenderError::Navigation(format!("Redirect error: {}", e))
    } else {
        RenderError::Navigation(e.to_string())
    }
}
