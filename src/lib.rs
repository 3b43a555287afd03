//! Seekr: a focused crawler for canister front-ends
//!
//! This crate pages through an upstream canister index, renders every
//! discovered front-end, searches the rendered text for terms from a
//! fuzzy-expanded dictionary and follows links into interesting domains.

pub mod config;
pub mod content;
pub mod crawler;
pub mod dictionary;
pub mod output;
pub mod source;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Seekr operations
#[derive(Debug, Error)]
pub enum SeekrError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Malformed upstream payload from {url}: {source}")]
    UpstreamPayload {
        url: String,
        source: serde_json::Error,
    },

    #[error("Failed to initialize page renderer: {0}")]
    RendererInit(String),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::IngestionState,
        to: state::IngestionState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Failed to read word list {path}: {source}")]
    WordList {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for Seekr operations
pub type Result<T> = std::result::Result<T, SeekrError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use content::{find_matches, ContentFinder};
pub use crawler::{Admission, CrawlFrontier, HttpRenderer, PageRenderer};
pub use dictionary::{expand, Dictionary};
pub use output::{CrawlOutcome, CrawlResult, ResultSink};
pub use source::SourceIngester;
pub use state::IngestionState;
pub use crate::url::{classify_link, decompose, InterestingDomains};
