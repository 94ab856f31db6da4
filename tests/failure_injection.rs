//! Failure injection tests: upstream errors, unreachable targets, timeouts.

use std::time::{Duration, Instant};

use axum::{body::Body, response::Response};
use forward_proxy::ProxyConfig;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_upstream_status_is_mirrored() {
    let upstream = common::start_upstream(|_| {
        Response::builder()
            .status(404)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"msg":"not found"}"#))
            .unwrap()
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(common::proxy_url(proxy, &upstream.url("/missing"), ""))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Proxy request failed");
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], json!({"msg": "not found"}));

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_server_error_is_not_retried() {
    let upstream = common::start_upstream(|_| {
        Response::builder()
            .status(503)
            .body(Body::from("Service Unavailable"))
            .unwrap()
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(common::proxy_url(proxy, &upstream.url("/"), ""))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Service Unavailable");
    assert_eq!(upstream.received().len(), 1, "should not retry");

    shutdown.trigger();
}

#[tokio::test]
async fn test_refused_connection_is_503() {
    let target = common::closed_addr().await;
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(common::proxy_url(proxy, &format!("http://{}/", target), ""))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Service unavailable");
    assert!(body["message"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_timeout_is_503_within_bound() {
    let upstream =
        common::start_delayed_upstream(Duration::from_secs(5), |_| Response::new(Body::from("late")))
            .await;
    let mut config = ProxyConfig::default();
    config.timeouts.request_secs = 1;
    let (proxy, shutdown) = common::start_proxy(config).await;

    let start = Instant::now();
    let res = common::client()
        .get(common::proxy_url(proxy, &upstream.url("/slow"), ""))
        .send()
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(res.status(), 503);
    assert!(elapsed >= Duration::from_secs(1), "returned before the timeout: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(2500), "timeout not enforced: {elapsed:?}");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Service unavailable");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unsupported_scheme_is_400() {
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let res = common::client()
        .get(common::proxy_url(proxy, "ftp://files.example.org/a.txt", ""))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid URL format");

    shutdown.trigger();
}
