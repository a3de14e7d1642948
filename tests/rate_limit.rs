//! Rate limiting over real connections.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use agro_geo_api::AppConfig;
use reqwest::StatusCode;

mod common;

fn config(limit: u32, window_secs: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.rate_limit.requests_limit = limit;
    config.rate_limit.window_secs = window_secs;
    config
}

fn header(res: &reqwest::Response, name: &str) -> String {
    res.headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing {name}"))
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_quota_then_429() {
    let server = common::spawn_server(config(3, 60)).await;
    let client = common::client();

    for expected in ["2", "1", "0"] {
        let res = client.get(server.url("/health")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header(&res, "x-ratelimit-limit"), "3");
        assert_eq!(header(&res, "x-ratelimit-remaining"), expected);
    }

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&res, "x-ratelimit-remaining"), "0");
    assert!(header(&res, "content-type").starts_with("text/plain"));
    assert_eq!(
        res.text().await.unwrap(),
        "Rate limit exceeded. Please try again later."
    );

    server.stop().await;
}

#[tokio::test]
async fn test_reset_header_is_window_ahead() {
    let server = common::spawn_server(config(5, 60)).await;
    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

    let res = common::client().get(server.url("/")).send().await.unwrap();
    let reset: u64 = header(&res, "x-ratelimit-reset").parse().unwrap();

    let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    assert!(reset >= before + 60 && reset <= after + 60, "reset {reset}");

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_burst_admits_exactly_limit() {
    let server = common::spawn_server(config(10, 60)).await;
    let client = common::client();

    let mut tasks = Vec::new();
    for _ in 0..40 {
        let client = client.clone();
        let url = server.url("/health");
        tasks.push(tokio::spawn(async move {
            client.get(url).send().await.unwrap().status()
        }));
    }

    let mut ok = 0;
    let mut limited = 0;
    for task in tasks {
        let status = task.await.unwrap();
        if status == StatusCode::OK {
            ok += 1;
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        } else {
            panic!("unexpected status {status}");
        }
    }

    assert_eq!(ok, 10);
    assert_eq!(limited, 30);

    server.stop().await;
}

#[tokio::test]
async fn test_window_recovers() {
    let server = common::spawn_server(config(1, 1)).await;
    let client = common::client();

    assert_eq!(
        client.get(server.url("/")).send().await.unwrap().status(),
        StatusCode::OK
    );
    assert_eq!(
        client.get(server.url("/")).send().await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(
        client.get(server.url("/")).send().await.unwrap().status(),
        StatusCode::OK
    );

    server.stop().await;
}
