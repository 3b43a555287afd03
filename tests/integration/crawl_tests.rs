//! Integration tests for the crawler

use seekr::config::Config;
use seekr::crawler::{Coordinator, CrawlFrontier, FrontierConfig, HttpRenderer};
use seekr::output::{FanoutSink, MemorySink, ResultSink, SqliteSink};
use seekr::url::LinkPolicy;
use seekr::{
    Admission, ContentFinder, CrawlOutcome, Dictionary, IngestionState, InterestingDomains,
    SeekrError,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PATH: &str = "/api/v3/canisters";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>t</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

fn write_list(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

/// Creates a test configuration pointing the index and candidates at `server`
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();

    config.dictionary.word_file = write_list(dir, "dictionary.txt", &["dfinity", "internet computer"]);
    config.dictionary.excluded_words_file = dir.path().join("excluded.txt");
    config.dictionary.expand = false;

    config.crawler.interesting_domains_file = write_list(dir, "domains.txt", &["127.0.0.1"]);
    config.crawler.max_concurrent_pages = 4;
    config.crawler.request_timeout_ms = 5_000;

    config.source.base_url = format!("{}{}", server.uri(), INDEX_PATH);
    config.source.url_template = format!("{}/canister/{{id}}", server.uri());
    config.source.page_size = 10;
    config.source.requests_per_second = 100;

    config
}

async fn mount_index(server: &MockServer, ids: &[&str]) {
    let data: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({ "canister_id": id }))
        .collect();

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("limit", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "total_canisters": ids.len() })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })))
        .mount(server)
        .await;
}

fn frontier_for(words: &[&str], domains: &[&str], sink: Arc<dyn ResultSink>) -> CrawlFrontier {
    let dictionary = Dictionary::build(words, &[] as &[&str], None);
    let finder = ContentFinder::new(Arc::new(dictionary), 4);
    let domains = InterestingDomains::with_policy(domains, LinkPolicy::SuffixChain);
    let renderer = Arc::new(HttpRenderer::new("seekr-test", Duration::from_secs(5)).unwrap());

    CrawlFrontier::new(FrontierConfig::default(), finder, domains, renderer, sink)
}

#[tokio::test]
async fn test_single_page_match_before_finish() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>Welcome to DFINITY</p>"))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let frontier = frontier_for(&["dfinity"], &[], sink.clone());

    let seed = format!("{}/", server.uri());
    assert_eq!(frontier.enqueue(&seed), Admission::Queued);
    frontier.start();
    frontier.wait().await;

    assert!(frontier.is_finished());

    let results = sink.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, seed);
    assert_eq!(
        results[0].outcome,
        CrawlOutcome::Matched {
            phrases: vec!["dfinity".to_string()],
            links: vec![],
        }
    );
}

#[tokio::test]
async fn test_follows_only_interesting_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/about">about</a>
               <a href="https://elsewhere.example/">elsewhere</a>
               <a href="/logo.png">logo</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>Built on the Internet Computer</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let frontier = frontier_for(&["internet computer"], &["127.0.0.1"], sink.clone());

    frontier.enqueue(&format!("{}/", base));
    frontier.start();
    frontier.wait().await;

    let results = sink.results();
    assert_eq!(results.len(), 2);

    let root = results.iter().find(|r| r.url == format!("{}/", base)).unwrap();
    match &root.outcome {
        CrawlOutcome::NoMatch { links } => {
            assert!(links.contains(&format!("{}/about", base)));
            assert!(links.contains(&"https://elsewhere.example/".to_string()));
            assert!(!links.iter().any(|l| l.ends_with("logo.png")));
        }
        other => panic!("expected no match, got {:?}", other),
    }

    let about = results
        .iter()
        .find(|r| r.url == format!("{}/about", base))
        .unwrap();
    assert_eq!(about.phrases(), ["internet computer".to_string()]);

    let stats = frontier.statistics();
    assert_eq!(stats.matched, 1);
    assert_eq!(stats.no_match, 1);
}

#[tokio::test]
async fn test_failed_page_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let frontier = frontier_for(&["dfinity"], &[], sink.clone());

    frontier.enqueue(&format!("{}/down", server.uri()));
    frontier.start();
    frontier.wait().await;

    let results = sink.results();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].outcome, CrawlOutcome::Failed { .. }));
    assert_eq!(frontier.statistics().failed, 1);
}

#[tokio::test]
async fn test_full_seek_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let base = server.uri();

    mount_index(&server, &["aaa", "bbb"]).await;

    Mock::given(method("GET"))
        .and(path("/canister/aaa"))
        .respond_with(html(
            r#"<h1>Welcome to dfinity</h1>
               <a href="/canister/aaa/about">about</a>
               <a href="https://elsewhere.example/">elsewhere</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/canister/aaa/about"))
        .respond_with(html("<p>Built on the internet computer</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/canister/bbb"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::new(config, sink.clone()).unwrap();
    assert_eq!(coordinator.dictionary_size(), 2);

    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.ingest.state, IngestionState::Exhausted);
    assert_eq!(summary.ingest.discovered, 2);
    assert_eq!(summary.crawl.matched, 2);
    assert_eq!(summary.crawl.failed, 1);
    assert_eq!(summary.crawl.processed(), 3);

    let results = sink.results();
    let outcome_of = |url: String| {
        results
            .iter()
            .find(|r| r.url == url)
            .map(|r| r.outcome.status())
            .unwrap()
    };
    assert_eq!(outcome_of(format!("{}/canister/aaa", base)), "matched");
    assert_eq!(outcome_of(format!("{}/canister/aaa/about", base)), "matched");
    assert_eq!(outcome_of(format!("{}/canister/bbb", base)), "failed");
}

#[tokio::test]
async fn test_seek_stops_after_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index(&server, &["aaa", "bbb", "ccc"]).await;
    Mock::given(method("GET"))
        .and(path("/canister/aaa"))
        .respond_with(html("<p>dfinity</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/canister/bbb"))
        .respond_with(html("<p>nothing here</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &dir);
    config.source.stop_after = Some(1);

    let sink = Arc::new(MemorySink::new());
    let summary = Coordinator::new(config, sink.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.ingest.state, IngestionState::Stopped);
    assert_eq!(summary.ingest.processed, 1);
    assert_eq!(sink.results().len(), 1);
    assert!(sink.results()[0].is_match());
}

#[tokio::test]
async fn test_ingestion_failure_aborts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::new(config, sink.clone()).unwrap();
    let frontier = coordinator.frontier().clone();

    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, SeekrError::UpstreamStatus { status: 500, .. }));
    assert!(frontier.is_finished());
    assert_eq!(frontier.enqueue("https://aaa.raw.ic0.app"), Admission::Rejected);
    assert!(sink.results().is_empty());
}

#[tokio::test]
async fn test_results_fan_out_to_database() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_index(&server, &["aaa", "bbb"]).await;
    Mock::given(method("GET"))
        .and(path("/canister/aaa"))
        .respond_with(html("<p>dfinity</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/canister/bbb"))
        .respond_with(html("<p>plain page</p>"))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let memory = Arc::new(MemorySink::new());
    let database = Arc::new(SqliteSink::new_in_memory("test-hash").unwrap());
    let sinks: Vec<Arc<dyn ResultSink>> = vec![memory.clone(), database.clone()];
    let sink = Arc::new(FanoutSink::new(sinks));

    Coordinator::new(config, sink).unwrap().run().await.unwrap();
    database.finish_run("completed").unwrap();

    assert_eq!(memory.results().len(), 2);
    assert_eq!(database.count_by_status("matched").unwrap(), 1);
    assert_eq!(database.count_by_status("no_match").unwrap(), 1);
    assert_eq!(
        database.matched().unwrap(),
        vec![(format!("{}/canister/aaa", server.uri()), vec!["dfinity".to_string()])]
    );
    assert_eq!(database.run_status().unwrap().as_deref(), Some("completed"));
}
