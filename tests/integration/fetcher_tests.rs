//! Fetcher retry behaviour against a mock server

use pricefinder::config::UserAgentConfig;
use pricefinder::crawler::{build_http_client, FetchError, Fetcher, RetryPolicy};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        client_name: "TestClient".to_string(),
        client_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
    }
}

fn fetcher(policy: RetryPolicy) -> Fetcher {
    let client = build_http_client(&user_agent(), Duration::from_secs(5))
        .expect("Failed to build client");
    Fetcher::new(client, policy)
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10))
}

#[tokio::test]
async fn test_success_returns_body_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>page one</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetcher(fast_policy())
        .fetch(&format!("{}/page/1/", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(body, "<html>page one</html>");
}

#[tokio::test]
async fn test_retry_then_succeed_waits_linear_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&mock_server)
        .await;

    let started = Instant::now();
    let body = fetcher(RetryPolicy::default())
        .fetch(&format!("{}/flaky", mock_server.uri()))
        .await
        .expect("Fetch should succeed on the third attempt");
    let elapsed = started.elapsed();

    assert_eq!(body, "finally");
    assert!(
        elapsed >= Duration::from_secs(3),
        "Expected at least 1s + 2s of backoff, took {:?}",
        elapsed
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_stop_after_three_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = fetcher(fast_policy())
        .fetch(&format!("{}/broken", mock_server.uri()))
        .await;

    match result {
        Err(FetchError::Exhausted {
            attempts,
            last_status,
            ..
        }) => {
            assert_eq!(attempts, 3);
            assert_eq!(last_status, Some(500));
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_only_200_counts_as_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/created"))
        .respond_with(ResponseTemplate::new(201).set_body_string("not a page"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = fetcher(fast_policy())
        .fetch(&format!("{}/created", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(ref e) if e.last_status() == Some(201)));
}

#[tokio::test]
async fn test_last_observed_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/degrading"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/degrading"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = fetcher(fast_policy())
        .fetch(&format!("{}/degrading", mock_server.uri()))
        .await;

    assert_eq!(result.unwrap_err().last_status(), Some(404));
}

#[tokio::test]
async fn test_identifying_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header(
            "user-agent",
            "TestClient/1.0 (+https://example.com/about)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetcher(fast_policy())
        .fetch(&format!("{}/ua", mock_server.uri()))
        .await
        .expect("Request without the expected user agent");

    assert_eq!(body, "hello");
}

#[tokio::test]
async fn test_connection_failure_exhausts_retries() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/gone", mock_server.uri());
    drop(mock_server);

    let result = fetcher(RetryPolicy::new(2, Duration::from_millis(10)))
        .fetch(&url)
        .await;

    match result {
        Err(FetchError::Exhausted {
            attempts,
            last_status,
            last_error,
            ..
        }) => {
            assert_eq!(attempts, 2);
            assert_eq!(last_status, None);
            assert!(last_error.is_some());
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }
}
