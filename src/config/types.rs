use crate::output::ReportLevel;
use crate::source::{
    DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_PROGRESS_EVERY, DEFAULT_REQUESTS_PER_SECOND,
    DEFAULT_URL_TEMPLATE,
};
use crate::url::LinkPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("seekr/", env!("CARGO_PKG_VERSION"));

/// Main configuration structure for Seekr
///
/// Every section and every key is optional; missing values take their
/// documented defaults and unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dictionary: DictionaryConfig,
    pub crawler: CrawlerConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

/// Dictionary construction
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct DictionaryConfig {
    /// Base words and phrases, one per line
    pub word_file: PathBuf,

    /// Words removed after expansion; a missing file means no exclusions
    pub excluded_words_file: PathBuf,

    /// Add every edit-distance-1 variant of the base words
    pub expand: bool,

    /// Variants shorter than this are dropped
    pub min_word_length: usize,

    /// Longest phrase, in words, the matcher looks for
    pub max_phrase_length: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            word_file: PathBuf::from("dictionary.txt"),
            excluded_words_file: PathBuf::from("excluded_words.txt"),
            expand: true,
            min_word_length: crate::dictionary::DEFAULT_MIN_WORD_LENGTH,
            max_phrase_length: crate::content::DEFAULT_MAX_PHRASE_LENGTH,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Domains whose links are followed; a missing file means none
    pub interesting_domains_file: PathBuf,

    /// Maximum number of concurrent page renders
    pub max_concurrent_pages: usize,

    /// Per-page render timeout (milliseconds)
    pub request_timeout_ms: u64,

    /// Tokens shorter than this are ignored when matching
    pub min_token_length: usize,

    /// How link hostnames are matched against interesting domains
    pub link_policy: LinkPolicy,

    /// Save a snapshot of every matched page
    pub capture_matches: bool,

    /// Where snapshots are written
    pub capture_dir: PathBuf,

    /// Log crawl progress every this many pages (0 disables)
    pub progress_every: u64,

    /// User-Agent header for page and index requests
    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            interesting_domains_file: PathBuf::from("interesting_domains.txt"),
            max_concurrent_pages: crate::crawler::DEFAULT_MAX_CONCURRENT_PAGES,
            request_timeout_ms: 10_000,
            min_token_length: 1,
            link_policy: LinkPolicy::default(),
            capture_matches: false,
            capture_dir: PathBuf::from("captures"),
            progress_every: 1000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Upstream canister index configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Index endpoint
    pub base_url: String,

    /// Items requested per page
    pub page_size: u64,

    /// Outbound request rate for index and probe requests
    pub requests_per_second: u32,

    /// Skip identifiers at or before this one
    pub resume_after: Option<String>,

    /// Stop after this many items
    pub stop_after: Option<u64>,

    /// Check candidates with a HEAD request before crawling them
    pub probe: bool,

    /// Candidate URL template; `{id}` is replaced by the identifier
    pub url_template: String,

    /// Report ingestion progress every this many items (0 disables)
    pub progress_every: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            resume_after: None,
            stop_after: None,
            probe: false,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Which records are written to standard output
    pub report: ReportLevel,

    /// Also record results in this SQLite database
    pub database_path: Option<PathBuf>,
}
