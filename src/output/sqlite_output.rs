//! SQLite-based output sink
//!
//! Every seek run gets a row in `runs`; crawl results and ingestion progress
//! events are stored against it so several runs can share one database file.

use crate::output::traits::{CrawlOutcome, CrawlResult, IngestProgress, OutputError, OutputResult, ResultSink};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQL schema for the results database
const SCHEMA_SQL: &str = r#"
-- Track seek runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per processed URL
CREATE TABLE IF NOT EXISTS crawl_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    phrases TEXT NOT NULL,
    links TEXT NOT NULL,
    reason TEXT,
    crawled_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_results_status ON crawl_results(status);
CREATE INDEX IF NOT EXISTS idx_crawl_results_url ON crawl_results(url);

-- Ingestion progress events
CREATE TABLE IF NOT EXISTS ingest_progress (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    processed INTEGER NOT NULL,
    total INTEGER NOT NULL,
    percent REAL NOT NULL,
    elapsed_secs REAL NOT NULL,
    recorded_at TEXT NOT NULL
);
"#;

/// SQLite-backed result sink
pub struct SqliteSink {
    conn: Mutex<Connection>,
    run_id: i64,
}

impl SqliteSink {
    /// Opens (or creates) a database at `path` and starts a new run
    pub fn open(path: &Path, config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            "#,
        )?;

        Self::initialize(conn, config_hash)
    }

    /// Creates an in-memory database and starts a new run
    pub fn new_in_memory(config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::initialize(conn, config_hash)
    }

    fn initialize(conn: Connection, config_hash: &str) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, 'running')",
            params![Utc::now().to_rfc3339(), config_hash],
        )?;
        let run_id = conn.last_insert_rowid();

        tracing::debug!("Started run {} in results database", run_id);

        Ok(Self {
            conn: Mutex::new(conn),
            run_id,
        })
    }

    fn lock(&self) -> OutputResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| OutputError::Lock(format!("Failed to lock database: {}", e)))
    }

    /// Returns the ID of the run this sink records into
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Marks the run finished with the given status
    pub fn finish_run(&self, status: &str) -> OutputResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2 WHERE id = ?3",
            params![Utc::now().to_rfc3339(), status, self.run_id],
        )?;
        Ok(())
    }

    /// Returns the status recorded for the current run
    pub fn run_status(&self) -> OutputResult<Option<String>> {
        let conn = self.lock()?;
        let status = conn
            .query_row(
                "SELECT status FROM runs WHERE id = ?1",
                params![self.run_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status)
    }

    /// Counts results of the current run with the given status
    pub fn count_by_status(&self, status: &str) -> OutputResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM crawl_results WHERE run_id = ?1 AND status = ?2",
            params![self.run_id, status],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Returns matched URLs and their phrases for the current run
    pub fn matched(&self) -> OutputResult<Vec<(String, Vec<String>)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT url, phrases FROM crawl_results
             WHERE run_id = ?1 AND status = 'matched'
             ORDER BY id",
        )?;

        let rows = stmt.query_map(params![self.run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut matched = Vec::new();
        for row in rows {
            let (url, phrases) = row?;
            matched.push((url, serde_json::from_str(&phrases)?));
        }
        Ok(matched)
    }

    /// Counts progress events recorded for the current run
    pub fn count_progress(&self) -> OutputResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ingest_progress WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl ResultSink for SqliteSink {
    fn record_result(&self, result: &CrawlResult) -> OutputResult<()> {
        let phrases = serde_json::to_string(result.phrases())?;
        let links = serde_json::to_string(result.links())?;
        let reason = match &result.outcome {
            CrawlOutcome::Failed { reason } => Some(reason.as_str()),
            _ => None,
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO crawl_results (run_id, url, status, phrases, links, reason, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.run_id,
                result.url,
                result.outcome.status(),
                phrases,
                links,
                reason,
                result.crawled_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn record_progress(&self, progress: &IngestProgress) -> OutputResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO ingest_progress (run_id, processed, total, percent, elapsed_secs, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.run_id,
                progress.processed as i64,
                progress.total as i64,
                progress.percent,
                progress.elapsed_secs,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}
