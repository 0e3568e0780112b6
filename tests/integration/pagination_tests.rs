//! Integration tests for the fetcher and paginator
//!
//! These tests use wiremock to stand in for the LMS API and exercise
//! `Link` header pagination end-to-end, including rate header observation.

use lms_audit::client::{HttpFetcher, Paginator};
use lms_audit::config::ApiConfig;
use lms_audit::AuditError;
use serde::Deserialize;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: u64,
}

/// Creates an API configuration pointing at the mock server
fn create_test_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/api/v1/", server.uri()),
        token: Some("test-token".to_string()),
        token_env: "LMS_API_TOKEN".to_string(),
        max_rate_limit: 700,
        read_timeout: 60,
        min_read_timeout: 60,
        remaining_header: "X-Rate-Limit-Remaining".to_string(),
        cost_header: "X-Request-Cost".to_string(),
    }
}

fn create_fetcher(server: &MockServer) -> HttpFetcher {
    HttpFetcher::new(&create_test_config(server), "test-token".to_string())
        .expect("Failed to create fetcher")
}

/// A response with a full quota, so the governor never delays the next request
fn healthy(status: u16) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("X-Rate-Limit-Remaining", "700")
        .insert_header("X-Request-Cost", "1")
}

fn next_header(server: &MockServer, page: u32) -> String {
    format!(
        "<{}/api/v1/items?page={}&per_page=2>; rel=\"next\", <{}/api/v1/items?page=1&per_page=2>; rel=\"first\"",
        server.uri(),
        page,
        server.uri()
    )
}

#[tokio::test]
async fn test_collects_pages_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "1"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}, {"id": 2}]))
                .insert_header("Link", next_header(&mock_server, 2).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "2"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 3}, {"id": 4}]))
                .insert_header("Link", next_header(&mock_server, 3).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "3"))
        .respond_with(healthy(200).set_body_json(serde_json::json!([{"id": 5}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let paginator = Paginator::new(&fetcher);

    let items: Vec<Item> = paginator
        .collect_all("items?page=1&per_page=2")
        .await
        .expect("Pagination should succeed");

    let ids: Vec<u64> = items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let governor = fetcher.governor().await;
    assert_eq!(governor.admitted_count(), 3);
    assert_eq!(governor.observed_count(), 3);
    assert_eq!(governor.no_signal_count(), 0);
}

#[tokio::test]
async fn test_single_page_without_link_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(healthy(200).set_body_json(serde_json::json!([{"id": 7}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let items: Vec<Item> = Paginator::new(&fetcher)
        .collect_all("items")
        .await
        .unwrap();

    assert_eq!(items, vec![Item { id: 7 }]);
}

#[tokio::test]
async fn test_link_header_without_next_ends_pagination() {
    let mock_server = MockServer::start().await;
    let link = format!(
        "<{uri}/api/v1/items?page=1>; rel=\"first\", <{uri}/api/v1/items?page=1>; rel=\"last\"",
        uri = mock_server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([]))
                .insert_header("Link", link.as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let items: Vec<Item> = Paginator::new(&fetcher)
        .collect_all("items?page=1")
        .await
        .unwrap();

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_relative_next_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "1"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .insert_header("Link", "</api/v1/items?page=2>; rel=\"next\""),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "2"))
        .respond_with(healthy(200).set_body_json(serde_json::json!([{"id": 2}])))
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let items: Vec<Item> = Paginator::new(&fetcher)
        .collect_all("items?page=1")
        .await
        .unwrap();

    assert_eq!(items, vec![Item { id: 1 }, Item { id: 2 }]);
}

#[tokio::test]
async fn test_decode_failure_aborts_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "1"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .insert_header("Link", next_header(&mock_server, 2).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "2"))
        .respond_with(healthy(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let result: Result<Vec<Item>, AuditError> = Paginator::new(&fetcher)
        .collect_all("items?page=1&per_page=2")
        .await;

    assert!(matches!(result, Err(AuditError::Decode { .. })));
}

#[tokio::test]
async fn test_error_status_aborts_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "1"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .insert_header("Link", next_header(&mock_server, 2).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "2"))
        .respond_with(healthy(503))
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let result: Result<Vec<Item>, AuditError> = Paginator::new(&fetcher)
        .collect_all("items?page=1&per_page=2")
        .await;

    match result {
        Err(AuditError::UnexpectedStatus { status, .. }) => assert_eq!(status, 503),
        other => panic!("Expected UnexpectedStatus, got {:?}", other),
    }

    // The failed page still reported its rate headers
    let governor = fetcher.governor().await;
    assert_eq!(governor.observed_count(), 2);
}

#[tokio::test]
async fn test_self_referencing_next_link_is_a_loop() {
    let mock_server = MockServer::start().await;
    let link = format!("<{}/api/v1/items?page=1>; rel=\"next\"", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .insert_header("Link", link.as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let result: Result<Vec<Item>, AuditError> = Paginator::new(&fetcher)
        .collect_all("items?page=1")
        .await;

    assert!(matches!(result, Err(AuditError::PaginationLoop { .. })));
}

#[tokio::test]
async fn test_foreign_next_link_is_refused() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .insert_header(
                    "Link",
                    "<https://elsewhere.example.com/api/v1/items?page=2>; rel=\"next\"",
                ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let result: Result<Vec<Item>, AuditError> = Paginator::new(&fetcher)
        .collect_all("items")
        .await;

    assert!(matches!(result, Err(AuditError::ForeignUrl { .. })));
}

#[tokio::test]
async fn test_page_stream_is_lazy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "1"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .insert_header("Link", next_header(&mock_server, 2).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(query_param("page", "2"))
        .respond_with(healthy(200).set_body_json(serde_json::json!([{"id": 2}])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let paginator = Paginator::new(&fetcher);
    let mut pages = paginator.pages::<Item>("items?page=1&per_page=2");

    let first = pages.next_page().await.unwrap().unwrap();
    assert_eq!(first, vec![Item { id: 1 }]);
    assert_eq!(pages.pages_fetched(), 1);
}

#[tokio::test]
async fn test_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(healthy(200).set_body_json(serde_json::json!([{"id": 1}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let items: Vec<Item> = Paginator::new(&fetcher)
        .collect_all("items")
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_error_status_is_returned_as_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/5/front_page"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("X-Rate-Limit-Remaining", "650")
                .insert_header("X-Request-Cost", "2.5")
                .set_body_string("{\"errors\":[{\"message\":\"not found\"}]}"),
        )
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(&mock_server);
    let response = fetcher
        .get("courses/5/front_page")
        .await
        .expect("A 404 is a response, not a failure");

    assert_eq!(response.status.as_u16(), 404);
    assert!(!response.is_success());
    assert!(response.text().contains("not found"));
    assert_eq!(response.header("x-rate-limit-remaining"), Some("650"));

    let governor = fetcher.governor().await;
    assert_eq!(governor.observed_count(), 1);
    assert_eq!(governor.state().remaining_quota, 650.0);
    assert_eq!(governor.state().average_cost, 2.5);
}

#[tokio::test]
async fn test_timeout_is_not_observed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items"))
        .respond_with(
            healthy(200)
                .set_body_json(serde_json::json!([{"id": 1}]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server);
    config.read_timeout = 1;
    config.min_read_timeout = 1;
    let fetcher = HttpFetcher::new(&config, "test-token".to_string()).unwrap();

    let error = fetcher
        .get("items")
        .await
        .expect_err("A delayed response should time out");

    assert!(matches!(error, AuditError::Timeout { .. }));
    assert!(error.is_transport());

    let governor = fetcher.governor().await;
    assert_eq!(governor.admitted_count(), 1);
    assert_eq!(governor.observed_count(), 0);
    assert_eq!(governor.no_signal_count(), 1);
    assert_eq!(governor.state().remaining_quota, 700.0);
}
