//! In-process sinks: collect results in memory or fan them out

use crate::output::traits::{CrawlResult, IngestProgress, OutputError, OutputResult, ResultSink};
use std::sync::{Arc, Mutex};

/// Sink that keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Mutex<Vec<CrawlResult>>,
    progress: Mutex<Vec<IngestProgress>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded results, in arrival order
    pub fn results(&self) -> Vec<CrawlResult> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }

    /// Returns a copy of the recorded progress events
    pub fn progress(&self) -> Vec<IngestProgress> {
        self.progress
            .lock()
            .map(|progress| progress.clone())
            .unwrap_or_default()
    }
}

impl ResultSink for MemorySink {
    fn record_result(&self, result: &CrawlResult) -> OutputResult<()> {
        self.results
            .lock()
            .map_err(|e| OutputError::Lock(e.to_string()))?
            .push(result.clone());
        Ok(())
    }

    fn record_progress(&self, progress: &IngestProgress) -> OutputResult<()> {
        self.progress
            .lock()
            .map_err(|e| OutputError::Lock(e.to_string()))?
            .push(progress.clone());
        Ok(())
    }
}

/// Sink that forwards every record to several sinks
///
/// All sinks receive each record even if an earlier one fails; the first
/// error is returned.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn ResultSink>>) -> Self {
        Self { sinks }
    }

    /// Adds another sink
    pub fn push(&mut self, sink: Arc<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each<F>(&self, mut f: F) -> OutputResult<()>
    where
        F: FnMut(&dyn ResultSink) -> OutputResult<()>,
    {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = f(sink.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl ResultSink for FanoutSink {
    fn record_result(&self, result: &CrawlResult) -> OutputResult<()> {
        self.each(|sink| sink.record_result(result))
    }

    fn record_progress(&self, progress: &IngestProgress) -> OutputResult<()> {
        self.each(|sink| sink.record_progress(progress))
    }

    fn flush(&self) -> OutputResult<()> {
        self.each(|sink| sink.flush())
    }
}
