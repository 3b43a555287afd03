//! JSON-lines output sink
//!
//! Writes one JSON object per line, tagged with an `event` field. By
//! default it writes to standard output.

use crate::output::traits::{CrawlResult, IngestProgress, OutputError, OutputResult, ResultSink};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::Mutex;

/// Which records a line-oriented sink writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportLevel {
    /// Only results with at least one matched phrase
    #[default]
    Matches,

    /// Every result and every progress event
    All,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Line<'a> {
    Result(&'a CrawlResult),
    Progress(&'a IngestProgress),
}

/// Sink writing JSON lines to any writer
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
    level: ReportLevel,
}

impl JsonLinesSink<io::Stdout> {
    /// Creates a sink writing to standard output
    pub fn stdout(level: ReportLevel) -> Self {
        Self::new(io::stdout(), level)
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Creates a sink over the given writer
    pub fn new(writer: W, level: ReportLevel) -> Self {
        Self {
            writer: Mutex::new(writer),
            level,
        }
    }

    /// Consumes the sink and returns the writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Lock(e.to_string()))
    }

    fn write_line(&self, line: &Line<'_>) -> OutputResult<()> {
        let encoded = serde_json::to_string(line)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| OutputError::Lock(e.to_string()))?;
        writeln!(writer, "{}", encoded)?;
        Ok(())
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    fn record_result(&self, result: &CrawlResult) -> OutputResult<()> {
        if self.level == ReportLevel::Matches && !result.is_match() {
            return Ok(());
        }
        self.write_line(&Line::Result(result))
    }

    fn record_progress(&self, progress: &IngestProgress) -> OutputResult<()> {
        if self.level == ReportLevel::Matches {
            return Ok(());
        }
        self.write_line(&Line::Progress(progress))
    }

    fn flush(&self) -> OutputResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| OutputError::Lock(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }
}
