//! Run statistics
//!
//! Counters collected by the crawl frontier and the source ingester, and a
//! formatted summary printed at the end of a seek run.

use crate::source::IngestSummary;
use serde::Serialize;
use std::time::Duration;

/// Snapshot of the crawl frontier's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrontierStatistics {
    /// URLs accepted into the queue, revisits of visited URLs included
    pub enqueued: u64,

    /// Enqueue calls ignored because the URL had been seen before
    pub duplicates: u64,

    /// Enqueue calls ignored because the URL was invalid or the frontier closed
    pub rejected: u64,

    /// Results with at least one matched phrase
    pub matched: u64,

    /// Results that rendered without a match
    pub no_match: u64,

    /// Results skipped because the URL was already visited
    pub already_visited: u64,

    /// Results whose render failed
    pub failed: u64,
}

impl FrontierStatistics {
    /// Number of results produced
    pub fn processed(&self) -> u64 {
        self.matched + self.no_match + self.already_visited + self.failed
    }

    /// Percentage of rendered pages that matched
    pub fn match_rate(&self) -> f64 {
        let rendered = self.matched + self.no_match;
        if rendered > 0 {
            (self.matched as f64 / rendered as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Combined summary of one seek run
#[derive(Debug, Clone)]
pub struct SeekSummary {
    /// What the source ingester did
    pub ingest: IngestSummary,

    /// What the crawl frontier did
    pub crawl: FrontierStatistics,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Prints a seek summary to stderr
///
/// Standard output carries the result stream, so the summary goes to stderr.
pub fn print_summary(summary: &SeekSummary) {
    let ingest = &summary.ingest;
    let crawl = &summary.crawl;

    eprintln!("=== Seek Statistics ===\n");

    eprintln!("Source:");
    eprintln!("  Final state: {}", ingest.state);
    eprintln!("  Index total: {}", ingest.total);
    eprintln!("  Pages fetched: {}", ingest.pages_fetched);
    eprintln!("  Identifiers processed: {}", ingest.processed);
    eprintln!("  Candidates discovered: {}", ingest.discovered);
    eprintln!("  Skipped by resume cutoff: {}", ingest.skipped);
    if ingest.probe_failures > 0 {
        eprintln!("  Probe failures: {}", ingest.probe_failures);
    }
    eprintln!();

    eprintln!("Crawl:");
    eprintln!("  Enqueued: {}", crawl.enqueued);
    eprintln!("  Duplicates ignored: {}", crawl.duplicates);
    eprintln!("  Rejected: {}", crawl.rejected);
    eprintln!("  Matched: {}", crawl.matched);
    eprintln!("  No match: {}", crawl.no_match);
    eprintln!("  Already visited: {}", crawl.already_visited);
    eprintln!("  Failed: {}", crawl.failed);
    eprintln!();

    eprintln!(
        "Match Rate: {:.1}% ({} / {} rendered pages)",
        crawl.match_rate(),
        crawl.matched,
        crawl.matched + crawl.no_match
    );
    eprintln!("Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
}
