//! Integration tests for the fetcher
//!
//! These tests use wiremock to exercise retries, status and content-type
//! handling, redirects, and the concurrency gate against a real socket.

use sitegraph::config::Config;
use sitegraph::crawler::{FetchOutcome, Fetcher};
use sitegraph::url::Origin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn test_fetcher(server: &MockServer, retry_limit: u32, max_concurrency: u32) -> Fetcher {
    let mut config = Config::default();
    config.crawler.retry_limit = retry_limit;
    config.crawler.retry_base_delay_ms = 10;
    config.crawler.request_timeout_secs = 5;
    config.crawler.max_concurrency = max_concurrency;

    let addr = server.address();
    Fetcher::new(&config, Origin::new(addr.ip().to_string(), addr.port())).unwrap()
}

fn url_on(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), path)).unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_fetch_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(html("<html><title>Page</title></html>"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/page.html")).await;

    match outcome {
        FetchOutcome::Success {
            final_url,
            status_code,
            body,
            attempts,
            ..
        } => {
            assert_eq!(final_url, url_on(&server, "/page.html"));
            assert_eq!(status_code, 200);
            assert_eq!(body, b"<html><title>Page</title></html>");
            assert_eq!(attempts, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.html"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.html"))
        .respond_with(html("<html>ok</html>"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/flaky.html")).await;

    assert!(matches!(outcome, FetchOutcome::Success { attempts: 3, .. }));
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_server_error_gives_up_after_retry_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/down.html")).await;

    assert!(matches!(
        outcome,
        FetchOutcome::HttpStatus {
            status_code: 503,
            attempts: 3
        }
    ));
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/missing.html")).await;

    assert!(matches!(
        outcome,
        FetchOutcome::HttpStatus {
            status_code: 404,
            attempts: 1
        }
    ));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_non_html_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
        )
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/data.json")).await;

    match outcome {
        FetchOutcome::ContentMismatch { content_type } => {
            assert_eq!(content_type, "application/json")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_redirect_within_origin_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old.html"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new.html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new.html"))
        .respond_with(html("<html>new</html>"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let page = fetcher
        .fetch(&url_on(&server, "/old.html"))
        .await
        .into_page()
        .unwrap();

    assert_eq!(page.final_url, url_on(&server, "/new.html"));
    assert_eq!(page.body, b"<html>new</html>");
}

#[tokio::test]
async fn test_redirect_outside_origin_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/away.html"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "http://example.invalid/x.html"),
        )
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/away.html")).await;

    match outcome {
        FetchOutcome::RedirectOutsideOrigin { location } => {
            assert_eq!(location, "http://example.invalid/x.html")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_loop_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.html"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/b.html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.html"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/a.html"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 3, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/a.html")).await;

    assert!(matches!(outcome, FetchOutcome::RedirectError { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_retried() {
    let server = MockServer::start().await;
    let fetcher = test_fetcher(&server, 2, 4);

    // Reserve a port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
    let outcome = fetcher.fetch(&url).await;

    assert!(matches!(
        outcome,
        FetchOutcome::NetworkError { attempts: 2, .. }
    ));
}

#[tokio::test]
async fn test_user_agent_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header(
            "user-agent",
            format!("sitegraph/{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .respond_with(html("<html></html>"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 1, 4);
    let outcome = fetcher.fetch(&url_on(&server, "/")).await;

    assert!(matches!(outcome, FetchOutcome::Success { .. }));
}

#[tokio::test]
async fn test_concurrency_gate_limits_parallel_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let fetcher = Arc::new(test_fetcher(&server, 1, 2));
    let started = Instant::now();

    let mut tasks = JoinSet::new();
    for i in 0..6 {
        let fetcher = Arc::clone(&fetcher);
        let url = url_on(&server, &format!("/p{}.html", i));
        tasks.spawn(async move { fetcher.fetch(&url).await });
    }

    while let Some(joined) = tasks.join_next().await {
        assert!(matches!(joined.unwrap(), FetchOutcome::Success { .. }));
    }

    // Six 100ms responses through two slots take at least three rounds
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(fetcher.available_permits(), 2);
}

#[tokio::test]
async fn test_body_bytes_are_returned_unchanged() {
    let server = MockServer::start().await;
    let raw = b"<html><title>Noter \xFE</title></html>".to_vec();
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(raw.clone(), "text/html; charset=ISO-8859-9"),
        )
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, 1, 4);
    let page = fetcher
        .fetch(&url_on(&server, "/tr.html"))
        .await
        .into_page()
        .unwrap();

    assert_eq!(page.body, raw);
    assert!(page.text().contains("Noter"));
}
