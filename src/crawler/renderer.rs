//! Page rendering capability
//!
//! The crawl frontier only needs a page's visible text and its outbound
//! links. `PageRenderer` is the seam for that; `HttpRenderer` implements it
//! with a plain HTTP fetch and static HTML parsing.

use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::parse_html;
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors produced while rendering a single page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Request timeout")]
    Timeout,

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Unexpected content type: {0}")]
    ContentMismatch(String),

    #[error("Renderer is closed")]
    Closed,

    #[error("Operation not supported by this renderer")]
    Unsupported,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Visible text and outbound links of a rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub text: String,
    pub links: Vec<String>,
}

/// Turns a URL into visible text and outbound links
///
/// Implementations must support concurrent `render` calls.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renders `url`, giving up after `timeout`
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, RenderError>;

    /// Saves a snapshot of `url` into `dir` and returns the file written
    async fn capture(&self, url: &str, dir: &Path) -> Result<PathBuf, RenderError> {
        let _ = (url, dir);
        Err(RenderError::Unsupported)
    }

    /// Releases the renderer's resources
    fn close(&self) {}
}

/// Renderer backed by an HTTP client and static HTML parsing
pub struct HttpRenderer {
    client: Client,
    timeout: Duration,
    closed: AtomicBool,
}

impl HttpRenderer {
    /// Builds a renderer with its own HTTP client
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(user_agent, timeout)?, timeout))
    }

    /// Builds a renderer over an existing HTTP client
    ///
    /// `timeout` bounds snapshot captures; renders take theirs per call.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<(Url, String), RenderError> {
        if self.is_closed() {
            return Err(RenderError::Closed);
        }

        let url = Url::parse(url).map_err(|e| RenderError::Navigation(format!("{}: {}", url, e)))?;

        let page = tokio::time::timeout(timeout, fetch_page(&self.client, &url))
            .await
            .map_err(|_| RenderError::Timeout)??;

        Ok((page.final_url, page.body))
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, RenderError> {
        let (final_url, body) = self.fetch(url, timeout).await?;
        let parsed = parse_html(&body, &final_url);

        tracing::debug!(
            "Rendered {} ({} chars of text, {} links)",
            final_url,
            parsed.text.len(),
            parsed.links.len()
        );

        Ok(RenderedPage {
            text: parsed.text,
            links: parsed.links,
        })
    }

    async fn capture(&self, url: &str, dir: &Path) -> Result<PathBuf, RenderError> {
        let (_, body) = self.fetch(url, self.timeout).await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.html", snapshot_name(url)));
        tokio::fs::write(&path, body).await?;

        Ok(path)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("HTTP renderer closed");
        }
    }
}

/// File-system safe name for a URL snapshot
fn snapshot_name(url: &str) -> String {
    let trimmed = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');

    trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
