//! Integration tests for the source ingester

use seekr::output::MemorySink;
use seekr::source::{IndexClient, SourceIngester};
use seekr::{IngestionState, SeekrError};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_PATH: &str = "/api/v3/canisters";

/// Mounts a five-item index served two items per page
async fn mount_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("limit", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data": [], "total_canisters": 5}"#,
            "application/json",
        ))
        .mount(server)
        .await;

    let pages = [
        ("0", r#"{"data": [{"canister_id": "aaa"}, {"canister_id": "bbb"}]}"#),
        ("2", r#"{"data": [{"canister_id": "ccc"}, {"canister_id": "ddd"}]}"#),
        ("4", r#"{"data": [{"canister_id": "eee"}]}"#),
    ];

    for (offset, body) in pages {
        Mock::given(method("GET"))
            .and(path(INDEX_PATH))
            .and(query_param("offset", offset))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(server)
            .await;
    }
}

fn ingester(server: &MockServer) -> SourceIngester {
    let base = Url::parse(&format!("{}{}", server.uri(), INDEX_PATH)).unwrap();
    SourceIngester::new(IndexClient::new(reqwest::Client::new(), base, 2, 100))
}

#[tokio::test]
async fn test_fetch_all_pages_in_order() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let mut ingester = ingester(&server);
    let mut discovered = Vec::new();
    let summary = ingester
        .fetch_all(|url| discovered.push(url), None)
        .await
        .unwrap();

    assert_eq!(
        discovered,
        vec![
            "https://aaa.raw.ic0.app",
            "https://bbb.raw.ic0.app",
            "https://ccc.raw.ic0.app",
            "https://ddd.raw.ic0.app",
            "https://eee.raw.ic0.app",
        ]
    );
    assert_eq!(summary.total, 5);
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.state, IngestionState::Exhausted);
}

#[tokio::test]
async fn test_total_pages_and_single_page() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let mut ingester = ingester(&server);
    assert_eq!(ingester.total_pages().await.unwrap(), 3);

    let items = ingester.fetch_page(1).await.unwrap();
    let ids: Vec<_> = items.iter().filter_map(|item| item.identifier()).collect();
    assert_eq!(ids, vec!["ccc", "ddd"]);
}

#[tokio::test]
async fn test_stop_after_one() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("limit", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"total_canisters": 4}"#, "application/json"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data": [{"canister_id": "aaa"}, {"canister_id": "bbb"}]}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data": [{"canister_id": "ccc"}, {"canister_id": "ddd"}]}"#,
            "application/json",
        ))
        .expect(0)
        .mount(&server)
        .await;

    let mut ingester = ingester(&server);
    let mut calls = 0;
    let summary = ingester.fetch_all(|_| calls += 1, Some(1)).await.unwrap();

    assert_eq!(calls, 1);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.state, IngestionState::Stopped);
}

#[tokio::test]
async fn test_resume_cutoff_skips_earlier_identifiers() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let mut ingester = ingester(&server).with_resume_after(Some("bbb".to_string()));
    let mut discovered = Vec::new();
    let summary = ingester
        .fetch_all(|url| discovered.push(url), None)
        .await
        .unwrap();

    assert_eq!(
        discovered,
        vec![
            "https://ccc.raw.ic0.app",
            "https://ddd.raw.ic0.app",
            "https://eee.raw.ic0.app",
        ]
    );
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.processed, 3);
}

#[tokio::test]
async fn test_probe_failures_suppress_discovery() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    Mock::given(method("HEAD"))
        .and(path("/canister/aaa"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/canister/ccc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let template = format!("{}/canister/{{id}}", server.uri());
    let mut ingester = ingester(&server)
        .with_url_template(template)
        .with_probe(true);

    let mut discovered = Vec::new();
    let summary = ingester
        .fetch_all(|url| discovered.push(url), None)
        .await
        .unwrap();

    assert_eq!(
        discovered,
        vec![
            format!("{}/canister/aaa", server.uri()),
            format!("{}/canister/ccc", server.uri()),
        ]
    );
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.probe_failures, 3);
    assert_eq!(summary.state, IngestionState::Exhausted);
}

#[tokio::test]
async fn test_total_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut ingester = ingester(&server);
    let mut calls = 0;
    let err = ingester
        .fetch_all(|_| calls += 1, None)
        .await
        .unwrap_err();

    assert!(matches!(err, SeekrError::UpstreamStatus { status: 500, .. }));
    assert_eq!(calls, 0);
    assert_eq!(ingester.state(), IngestionState::FetchingTotal);
}

#[tokio::test]
async fn test_malformed_page_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("limit", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"totalCount": 1}"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>", "text/html"))
        .mount(&server)
        .await;

    let mut ingester = ingester(&server);
    let err = ingester.fetch_all(|_| {}, None).await.unwrap_err();

    assert!(matches!(err, SeekrError::UpstreamPayload { .. }));
    assert_eq!(ingester.summary().total, 1);
}

#[tokio::test]
async fn test_finished_ingester_does_not_refetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("limit", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"total_canisters": 0}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut ingester = ingester(&server);
    let first = ingester.fetch_all(|_| {}, None).await.unwrap();
    let second = ingester.fetch_all(|_| {}, None).await.unwrap();

    assert_eq!(first.state, IngestionState::Exhausted);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_progress_is_reported_to_sink() {
    let server = MockServer::start().await;
    mount_index(&server).await;

    let sink = Arc::new(MemorySink::new());
    let mut ingester = ingester(&server).with_progress(2, sink.clone());
    ingester.fetch_all(|_| {}, None).await.unwrap();

    let progress = sink.progress();
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].processed, 2);
    assert_eq!(progress[1].processed, 4);
    assert_eq!(progress[1].total, 5);
    assert!((progress[1].percent - 80.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_huge_total_does_not_overflow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("limit", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(r#"{{"total_canisters": {}}}"#, u64::MAX),
            "application/json",
        ))
        .mount(&server)
        .await;

    let mut ingester = ingester(&server);
    assert_eq!(ingester.total_pages().await.unwrap(), u64::MAX / 2 + 1);
}
