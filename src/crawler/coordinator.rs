//! Seek coordinator - wires the source ingester to the crawl frontier
//!
//! This module contains the top-level seek operation, including:
//! - Loading the word, exclusion and domain lists
//! - Building the effective dictionary and the page renderer
//! - Running the ingester and the frontier concurrently
//! - Producing the final run summary

use crate::config::{read_list, read_optional_list, validate_domains, Config};
use crate::content::ContentFinder;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::{CrawlFrontier, FrontierConfig};
use crate::crawler::renderer::{HttpRenderer, PageRenderer};
use crate::dictionary::Dictionary;
use crate::output::{ResultSink, SeekSummary};
use crate::source::{IndexClient, SourceIngester};
use crate::url::InterestingDomains;
use crate::{Result, SeekrError};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Word and domain lists a seek run is built from
#[derive(Debug, Clone, Default)]
pub struct SeekLists {
    pub words: Vec<String>,
    pub excluded: Vec<String>,
    pub domains: Vec<String>,
}

impl SeekLists {
    /// Reads the lists named in the configuration
    ///
    /// The word file must exist; missing exclusion and domain files are
    /// treated as empty lists.
    pub fn load(config: &Config) -> Result<Self> {
        let words = read_list(&config.dictionary.word_file)?;
        let excluded = read_optional_list(&config.dictionary.excluded_words_file)?;
        let domains = read_optional_list(&config.crawler.interesting_domains_file)?;
        validate_domains(&domains)?;

        Ok(Self {
            words,
            excluded,
            domains,
        })
    }
}

/// Main seek coordinator structure
pub struct Coordinator {
    config: Config,
    dictionary_size: usize,
    frontier: CrawlFrontier,
    ingester: SourceIngester,
}

impl Coordinator {
    /// Creates a coordinator, reading lists from disk and rendering over HTTP
    ///
    /// # Errors
    ///
    /// Fails when the word file cannot be read, a domain entry is invalid,
    /// or the renderer cannot be initialized.
    pub fn new(config: Config, sink: Arc<dyn ResultSink>) -> Result<Self> {
        let lists = SeekLists::load(&config)?;

        let renderer = HttpRenderer::new(&config.crawler.user_agent, config.crawler.request_timeout())
            .map_err(|e| SeekrError::RendererInit(e.to_string()))?;

        Self::with_renderer(config, lists, Arc::new(renderer), sink)
    }

    /// Creates a coordinator from lists already in memory and any renderer
    pub fn with_renderer(
        config: Config,
        lists: SeekLists,
        renderer: Arc<dyn PageRenderer>,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self> {
        let expansion = config
            .dictionary
            .expand
            .then_some(config.dictionary.min_word_length);
        let dictionary = Dictionary::build(&lists.words, &lists.excluded, expansion);
        let dictionary_size = dictionary.len();

        if dictionary.is_empty() {
            tracing::warn!("Dictionary is empty, no page will match");
        }

        let finder = ContentFinder::new(Arc::new(dictionary), config.dictionary.max_phrase_length);
        let domains = InterestingDomains::with_policy(&lists.domains, config.crawler.link_policy);

        let frontier_config = FrontierConfig {
            max_concurrent: config.crawler.max_concurrent_pages,
            request_timeout: config.crawler.request_timeout(),
            min_token_length: config.crawler.min_token_length,
            capture_dir: config
                .crawler
                .capture_matches
                .then(|| config.crawler.capture_dir.clone()),
            progress_every: config.crawler.progress_every,
        };

        let frontier = CrawlFrontier::new(frontier_config, finder, domains, renderer, sink.clone());

        let base_url = Url::parse(&config.source.base_url)?;
        let client = build_http_client(&config.crawler.user_agent, config.crawler.request_timeout())
            .map_err(|source| SeekrError::Http {
                url: base_url.to_string(),
                source,
            })?;

        let index = IndexClient::new(
            client,
            base_url,
            config.source.page_size,
            config.source.requests_per_second,
        );

        let ingester = SourceIngester::new(index)
            .with_url_template(config.source.url_template.clone())
            .with_resume_after(config.source.resume_after.clone())
            .with_probe(config.source.probe)
            .with_progress(config.source.progress_every, sink);

        Ok(Self {
            config,
            dictionary_size,
            frontier,
            ingester,
        })
    }

    /// Number of terms in the effective dictionary
    pub fn dictionary_size(&self) -> usize {
        self.dictionary_size
    }

    /// The frontier this coordinator feeds
    pub fn frontier(&self) -> &CrawlFrontier {
        &self.frontier
    }

    /// Runs the seek operation to completion
    ///
    /// The frontier is held open while the ingester pages through the index
    /// and released once ingestion ends; the run finishes when the frontier
    /// has drained. An ingestion failure closes the frontier, letting
    /// in-flight pages finish, and is returned.
    pub async fn run(mut self) -> Result<SeekSummary> {
        let started = Instant::now();

        tracing::info!(
            "Seeking {} dictionary terms across {}",
            self.dictionary_size,
            self.config.source.base_url
        );

        let hold = self.frontier.hold();
        self.frontier.start();

        let frontier = self.frontier.clone();
        let ingested = self
            .ingester
            .fetch_all(
                |url| {
                    frontier.enqueue(&url);
                },
                self.config.source.stop_after,
            )
            .await;
        drop(hold);

        let ingest = match ingested {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Ingestion failed: {}", e);
                self.frontier.close().await;
                return Err(e);
            }
        };

        tracing::info!(
            "Ingestion {} after {} candidates, waiting for the frontier to drain",
            ingest.state,
            ingest.discovered
        );
        self.frontier.wait().await;

        Ok(SeekSummary {
            ingest,
            crawl: self.frontier.statistics(),
            elapsed: started.elapsed(),
        })
    }
}

/// Runs a complete seek operation
///
/// This is the main entry point for a seek. It will:
/// 1. Load the word, exclusion and domain lists
/// 2. Build the effective dictionary and the HTTP renderer
/// 3. Page through the canister index, enqueueing every candidate
/// 4. Render, match and follow links until the frontier drains
pub async fn run_seek(config: Config, sink: Arc<dyn ResultSink>) -> Result<SeekSummary> {
    Coordinator::new(config, sink)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_lists_load_with_optional_files_missing() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.dictionary.word_file = write(&dir, "dictionary.txt", &["dfinity", "", "canister"]);
        config.dictionary.excluded_words_file = dir.path().join("missing.txt");
        config.crawler.interesting_domains_file = dir.path().join("missing-domains.txt");

        let lists = SeekLists::load(&config).unwrap();
        assert_eq!(lists.words, vec!["dfinity", "canister"]);
        assert!(lists.excluded.is_empty());
        assert!(lists.domains.is_empty());
    }

    #[test]
    fn test_missing_word_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.dictionary.word_file = dir.path().join("nope.txt");

        let err = SeekLists::load(&config).unwrap_err();
        assert!(matches!(err, SeekrError::Config(_)));
    }

    #[test]
    fn test_invalid_domain_entry_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.dictionary.word_file = write(&dir, "dictionary.txt", &["dfinity"]);
        config.crawler.interesting_domains_file =
            write(&dir, "domains.txt", &["ic0.app", "https://bad/"]);

        assert!(SeekLists::load(&config).is_err());
    }

    #[tokio::test]
    async fn test_dictionary_respects_expansion_flag() {
        let lists = SeekLists {
            words: vec!["at".to_string()],
            excluded: vec!["ate".to_string()],
            domains: vec![],
        };
        let sink = Arc::new(MemorySink::new());
        let renderer = Arc::new(HttpRenderer::new("seekr-test", std::time::Duration::from_secs(1)).unwrap());

        let mut config = Config::default();
        config.dictionary.expand = false;
        let plain =
            Coordinator::with_renderer(config.clone(), lists.clone(), renderer.clone(), sink.clone())
                .unwrap();
        assert_eq!(plain.dictionary_size(), 1);

        config.dictionary.expand = true;
        let expanded = Coordinator::with_renderer(config, lists, renderer, sink).unwrap();
        assert_eq!(expanded.dictionary_size(), 106);
    }
}
