//! Crawler module for page rendering and frontier processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and HTML parsing behind the `PageRenderer` seam
//! - The bounded-concurrency crawl frontier
//! - Overall seek coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod renderer;

pub use coordinator::{run_seek, Coordinator, SeekLists};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use frontier::{
    Admission, CrawlFrontier, FrontierConfig, FrontierHold, DEFAULT_MAX_CONCURRENT_PAGES,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use parser::{parse_html, ParsedPage};
pub use renderer::{HttpRenderer, PageRenderer, RenderError, RenderedPage};
