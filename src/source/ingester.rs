//! Paginated, resumable ingestion of the canister index
//!
//! The ingester walks the index page by page, turns every item into a
//! candidate URL and hands it to a discovery callback. It honors a resume
//! cutoff, an optional liveness probe and an early-stop count.

use crate::output::{IngestProgress, ResultSink};
use crate::source::index::{IndexClient, IndexItem};
use crate::state::IngestionState;
use crate::{Result, SeekrError};
use std::sync::Arc;
use std::time::Instant;

/// Default candidate URL template; `{id}` is replaced by the identifier
pub const DEFAULT_URL_TEMPLATE: &str = "https://{id}.raw.ic0.app";

/// Default number of processed items between progress reports
pub const DEFAULT_PROGRESS_EVERY: u64 = 1000;

/// Paging position of the ingester
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionCursor {
    /// Items requested per page
    pub page_size: u64,

    /// Next page to fetch (zero-based)
    pub current_page: u64,

    /// Total items in the index, once fetched
    pub total_count: Option<u64>,

    /// Items processed (excluding those skipped by the cutoff)
    pub processed: u64,

    /// Identifiers at or before this value are skipped
    pub resume_cutoff: Option<String>,
}

/// What one `fetch_all` call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub total: u64,
    pub pages_fetched: u64,
    pub processed: u64,
    pub discovered: u64,
    pub skipped: u64,
    pub probe_failures: u64,
    pub state: IngestionState,
}

/// Streams candidate URLs from the upstream index
pub struct SourceIngester {
    index: IndexClient,
    url_template: String,
    probe: bool,
    progress_every: u64,
    sink: Option<Arc<dyn ResultSink>>,
    state: IngestionState,
    cursor: IngestionCursor,
    pages_fetched: u64,
    discovered: u64,
    skipped: u64,
    probe_failures: u64,
}

impl SourceIngester {
    /// Creates an ingester over an index client
    pub fn new(index: IndexClient) -> Self {
        let cursor = IngestionCursor {
            page_size: index.page_size(),
            ..Default::default()
        };

        Self {
            index,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            probe: false,
            progress_every: DEFAULT_PROGRESS_EVERY,
            sink: None,
            state: IngestionState::Uninitialized,
            cursor,
            pages_fetched: 0,
            discovered: 0,
            skipped: 0,
            probe_failures: 0,
        }
    }

    /// Sets the candidate URL template
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Skips identifiers that sort at or before `cutoff`
    pub fn with_resume_after(mut self, cutoff: Option<String>) -> Self {
        self.cursor.resume_cutoff = cutoff.filter(|c| !c.is_empty());
        self
    }

    /// Enables the HEAD liveness probe before discovery
    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Reports progress to `sink` every `every` processed items (0 disables)
    pub fn with_progress(mut self, every: u64, sink: Arc<dyn ResultSink>) -> Self {
        self.progress_every = every;
        self.sink = Some(sink);
        self
    }

    pub fn state(&self) -> IngestionState {
        self.state
    }

    pub fn cursor(&self) -> &IngestionCursor {
        &self.cursor
    }

    /// Builds the candidate URL for an identifier
    pub fn candidate_url(&self, identifier: &str) -> String {
        self.url_template.replace("{id}", identifier)
    }

    /// Returns the number of index pages, fetching the total once
    pub async fn total_pages(&mut self) -> Result<u64> {
        let total = match self.cursor.total_count {
            Some(total) => total,
            None => {
                let total = self.index.fetch_total().await?;
                tracing::info!("Upstream index holds {} items", total);
                self.cursor.total_count = Some(total);
                total
            }
        };

        Ok(total.div_ceil(self.cursor.page_size.max(1)))
    }

    /// Fetches one page of index items (zero-based)
    pub async fn fetch_page(&self, page: u64) -> Result<Vec<IndexItem>> {
        self.index.fetch_page(page).await
    }

    /// Pages through the index and calls `on_discovered` per candidate URL
    ///
    /// Stops once `stop_after` items have been processed. Calling again
    /// after a terminal state returns the summary without further requests;
    /// calling again after an error resumes from the page that failed.
    ///
    /// # Errors
    ///
    /// Returns an error when the total count or a page cannot be fetched.
    /// Probe failures are not errors.
    pub async fn fetch_all<F>(&mut self, mut on_discovered: F, stop_after: Option<u64>) -> Result<IngestSummary>
    where
        F: FnMut(String),
    {
        if self.state.is_terminal() {
            return Ok(self.summary());
        }

        if self.state == IngestionState::Uninitialized {
            self.transition(IngestionState::FetchingTotal)?;
        }

        let total_pages = self.total_pages().await?;

        if self.state == IngestionState::FetchingTotal {
            self.transition(IngestionState::PagingActive)?;
        }

        if stop_after == Some(0) {
            self.transition(IngestionState::Stopped)?;
            return Ok(self.summary());
        }

        let started = Instant::now();

        while self.cursor.current_page < total_pages {
            let page = self.cursor.current_page;
            let items = self.fetch_page(page).await?;
            self.cursor.current_page += 1;
            self.pages_fetched += 1;

            tracing::debug!("Fetched page {} of {} ({} items)", page + 1, total_pages, items.len());

            for item in items {
                let Some(identifier) = item.identifier() else {
                    tracing::debug!("Skipping index item without identifier");
                    continue;
                };

                if let Some(cutoff) = &self.cursor.resume_cutoff {
                    if identifier <= cutoff.as_str() {
                        tracing::debug!("Skipping {} (at or before {})", identifier, cutoff);
                        self.skipped += 1;
                        continue;
                    }
                }

                let url = self.candidate_url(identifier);
                self.cursor.processed += 1;

                if !self.probe || self.index.probe(&url).await {
                    self.discovered += 1;
                    on_discovered(url);
                } else {
                    self.probe_failures += 1;
                }

                self.report_progress(started);

                if stop_after.is_some_and(|limit| self.cursor.processed >= limit) {
                    tracing::info!("Stopping after {} items", self.cursor.processed);
                    self.transition(IngestionState::Stopped)?;
                    return Ok(self.summary());
                }
            }
        }

        self.transition(IngestionState::Exhausted)?;
        tracing::info!(
            "Upstream index exhausted after {} pages ({} items processed)",
            self.pages_fetched,
            self.cursor.processed
        );

        Ok(self.summary())
    }

    /// Returns a snapshot of what has been done so far
    pub fn summary(&self) -> IngestSummary {
        IngestSummary {
            total: self.cursor.total_count.unwrap_or(0),
            pages_fetched: self.pages_fetched,
            processed: self.cursor.processed,
            discovered: self.discovered,
            skipped: self.skipped,
            probe_failures: self.probe_failures,
            state: self.state,
        }
    }

    fn transition(&mut self, next: IngestionState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(SeekrError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("Ingestion state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn report_progress(&self, started: Instant) {
        if self.progress_every == 0 || self.cursor.processed % self.progress_every != 0 {
            return;
        }

        let progress = IngestProgress::new(
            self.cursor.processed,
            self.cursor.total_count.unwrap_or(0),
            started.elapsed().as_secs_f64(),
        );

        tracing::info!(
            "Ingested {} of {} items ({:.1}%) in {:.1}s",
            progress.processed,
            progress.total,
            progress.percent,
            progress.elapsed_secs
        );

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.record_progress(&progress) {
                tracing::warn!("Failed to record ingestion progress: {}", e);
            }
        }
    }
}
