//! Output sink trait and record types
//!
//! This module defines the interface every output sink implements and the
//! structured records the crawler emits through it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to lock output: {0}")]
    Lock(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// What happened to a single crawled URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// The page rendered and at least one dictionary phrase matched
    Matched {
        /// Matched phrases, deduplicated
        phrases: Vec<String>,
        /// Crawlable outbound links considered
        links: Vec<String>,
    },

    /// The page rendered but nothing matched
    NoMatch {
        /// Crawlable outbound links considered
        links: Vec<String>,
    },

    /// The URL had already been visited; nothing was rendered
    AlreadyVisited,

    /// Rendering failed
    Failed {
        /// Human-readable failure reason
        reason: String,
    },
}

impl CrawlOutcome {
    /// Returns the snake_case status name
    pub fn status(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::NoMatch { .. } => "no_match",
            Self::AlreadyVisited => "already_visited",
            Self::Failed { .. } => "failed",
        }
    }
}

/// One record per processed URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    /// The crawled URL
    pub url: String,

    /// The outcome of processing it
    #[serde(flatten)]
    pub outcome: CrawlOutcome,

    /// When processing finished
    pub crawled_at: DateTime<Utc>,
}

impl CrawlResult {
    /// Creates a result stamped with the current time
    pub fn new(url: impl Into<String>, outcome: CrawlOutcome) -> Self {
        Self {
            url: url.into(),
            outcome,
            crawled_at: Utc::now(),
        }
    }

    /// Returns true if any phrase matched
    pub fn is_match(&self) -> bool {
        matches!(self.outcome, CrawlOutcome::Matched { .. })
    }

    /// Returns the matched phrases (empty unless matched)
    pub fn phrases(&self) -> &[String] {
        match &self.outcome {
            CrawlOutcome::Matched { phrases, .. } => phrases,
            _ => &[],
        }
    }

    /// Returns the outbound links considered (empty unless rendered)
    pub fn links(&self) -> &[String] {
        match &self.outcome {
            CrawlOutcome::Matched { links, .. } | CrawlOutcome::NoMatch { links } => links,
            _ => &[],
        }
    }
}

/// Progress event emitted by the source ingester
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestProgress {
    /// Items processed so far
    pub processed: u64,

    /// Total items in the upstream index
    pub total: u64,

    /// Completion percentage
    pub percent: f64,

    /// Seconds since ingestion started
    pub elapsed_secs: f64,
}

impl IngestProgress {
    /// Builds a progress event, computing the percentage
    pub fn new(processed: u64, total: u64, elapsed_secs: f64) -> Self {
        let percent = if total > 0 {
            (processed as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            processed,
            total,
            percent,
            elapsed_secs,
        }
    }
}

/// Consumer of crawl results and ingestion progress
///
/// Sinks are shared between concurrent crawl tasks, so implementations
/// synchronize internally.
pub trait ResultSink: Send + Sync {
    /// Records one crawl result
    fn record_result(&self, result: &CrawlResult) -> OutputResult<()>;

    /// Records one ingestion progress event
    fn record_progress(&self, progress: &IngestProgress) -> OutputResult<()> {
        let _ = progress;
        Ok(())
    }

    /// Flushes buffered output
    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}
