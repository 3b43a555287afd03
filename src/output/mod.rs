//! Output module for crawl results and run reports
//!
//! This module handles:
//! - The `ResultSink` interface the crawler reports through
//! - JSON-lines, SQLite and in-memory sinks
//! - Run statistics and the end-of-run summary

mod json_lines;
mod memory;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json_lines::{JsonLinesSink, ReportLevel};
pub use memory::{FanoutSink, MemorySink};
pub use sqlite_output::SqliteSink;
pub use stats::{print_summary, FrontierStatistics, SeekSummary};
pub use traits::{
    CrawlOutcome, CrawlResult, IngestProgress, OutputError, OutputResult, ResultSink,
};
