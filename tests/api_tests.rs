use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

use cloud_dancer::api::{AppState, create_router};
use cloud_dancer::backend::HttpSearchBackend;
use cloud_dancer::data_models::{SearchErrorKind, SearchOutcome};
use cloud_dancer::gateway::{GatewaySettings, SearchGateway};
use cloud_dancer::rate_limiter::RateLimiter;

mod common;
use common::*;

const MAX_QUERY_LENGTH: usize = 1800;

fn router_with(settings: GatewaySettings, limiter: RateLimiter) -> Router {
    create_router(Arc::new(AppState::new(
        SearchGateway::new(settings),
        limiter,
        MAX_QUERY_LENGTH,
    )))
}

fn generous_limiter() -> RateLimiter {
    RateLimiter::new(Duration::from_secs(1), 1000)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_probe() {
    let router = router_with(GatewaySettings::default(), generous_limiter());
    for uri in ["/", "/health"] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cloud-dancer-api");
    }
}

#[tokio::test]
async fn test_missing_query() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, items_body(vec![])).await;
    let router = router_with(upstream.settings(), generous_limiter());

    for uri in ["/api/search-artists", "/api/search-artists?query="] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing_query");
    }
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_repeated_query_key_is_a_json_rejection() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, items_body(vec![])).await;
    let router = router_with(upstream.settings(), generous_limiter());

    let (status, body) = get(&router, "/api/search-artists?query=a&query=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing_query");
    assert!(body["message"].is_string());
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_rate_limit_applies_before_query_parsing() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, items_body(vec![])).await;
    let router = router_with(
        upstream.settings(),
        RateLimiter::new(Duration::from_secs(60), 1),
    );

    let (status, _) = get(&router, "/search?query=a&query=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = get(&router, "/search?query=a&query=b").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
}

#[tokio::test]
async fn test_query_too_long_never_reaches_gateway() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, items_body(vec![])).await;
    let router = router_with(upstream.settings(), generous_limiter());

    let uri = format!("/api/search-artists?query={}", "a".repeat(2000));
    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "query_too_long");
    assert_eq!(body["length"], 2000);
    assert_eq!(body["maxLength"], 1800);
    assert_eq!(upstream.hits(), 0);

    // exactly at the cap is accepted
    let uri = format!("/search?query={}", "a".repeat(MAX_QUERY_LENGTH));
    let (status, _) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn test_local_rate_limit_is_distinct_from_upstream_quota() {
    let quota = r#"{"error":{"errors":[{"reason":"quotaExceeded"}],"code":403,"message":"q"}}"#;
    let upstream = FakeUpstream::spawn(StatusCode::FORBIDDEN, quota).await;
    let router = router_with(
        upstream.settings(),
        RateLimiter::new(Duration::from_secs(60), 2),
    );

    let (status, body) = get(&router, "/api/search-artists?query=sky").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], Value::Array(vec![]));
    assert_eq!(body["error"]["type"], "upstream_quota");
    assert_eq!(body["error"]["reason"], "quotaExceeded");

    let (status, _) = get(&router, "/api/search-artists?query=sky").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&router, "/api/search-artists?query=sky").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
    assert_eq!(upstream.hits(), 2);
}

#[tokio::test]
async fn test_config_error_travels_in_body() {
    let router = router_with(GatewaySettings::default(), generous_limiter());
    let (status, body) = get(&router, "/api/search-artists?query=sky").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["type"], "config_error");
}

#[tokio::test]
async fn test_results_are_returned() {
    let upstream = FakeUpstream::spawn(
        StatusCode::OK,
        items_body(vec![item_json("Sky", "https://art.example/sky", "blue")]),
    )
    .await;
    let router = router_with(upstream.settings(), generous_limiter());

    let (status, body) = get(&router, "/api/search-artists?query=sky").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["link"], "https://art.example/sky");
    assert_eq!(body["results"][0]["source"], "example.com");
    assert_eq!(body["results"][0]["image"], Value::Null);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let router = router_with(GatewaySettings::default(), generous_limiter());
    let (status, body) = get(&router, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

async fn serve_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_http_backend_round_trip() {
    let upstream = FakeUpstream::spawn(
        StatusCode::OK,
        items_body(vec![item_json("하늘", "https://art.example/sky", "구름")]),
    )
    .await;
    let base = serve_router(router_with(upstream.settings(), generous_limiter())).await;
    let backend = HttpSearchBackend::new(base);

    match backend.fetch("하늘 sky").await {
        SearchOutcome::Ok(items) => assert_eq!(items[0].link, "https://art.example/sky"),
        other => panic!("unexpected outcome {other:?}"),
    }
    let q = upstream.last_params().get("q").cloned().unwrap_or_default();
    assert!(q.starts_with("하늘 sky"));
}

#[tokio::test]
async fn test_http_backend_classifies_local_rate_limit_and_quota() {
    let quota = r#"{"error":{"errors":[{"reason":"dailyLimitExceeded"}],"code":429,"message":"m"}}"#;
    let upstream = FakeUpstream::spawn(StatusCode::TOO_MANY_REQUESTS, quota).await;
    let base = serve_router(router_with(
        upstream.settings(),
        RateLimiter::new(Duration::from_secs(60), 1),
    ))
    .await;
    let backend = HttpSearchBackend::new(base);

    let first = backend.fetch("sky").await;
    assert_eq!(first.error().map(|e| e.kind), Some(SearchErrorKind::Quota));

    let second = backend.fetch("sky").await;
    assert_eq!(second.error().map(|e| e.kind), Some(SearchErrorKind::RateLimited));
}

#[tokio::test]
async fn test_http_backend_empty_and_unreachable() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, items_body(vec![])).await;
    let base = serve_router(router_with(upstream.settings(), generous_limiter())).await;
    assert_eq!(HttpSearchBackend::new(base).fetch("sky").await, SearchOutcome::Empty);

    let closed = closed_endpoint().await;
    let base = closed.trim_end_matches("/customsearch/v1").to_string();
    let outcome = HttpSearchBackend::new(base).fetch("sky").await;
    assert_eq!(outcome.error().map(|e| e.kind), Some(SearchErrorKind::Network));
}
