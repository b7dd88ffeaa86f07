use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::data_models::{SearchError, SearchErrorKind, SearchOutcome, SearchResultItem};
use crate::gateway::SearchGateway;

/// The narrow `search(query) -> ranked items` contract the orchestrator depends on.
pub trait SearchBackend: Send + Sync {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, SearchOutcome>;
}

impl SearchBackend for SearchGateway {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, SearchOutcome> {
        Box::pin(SearchGateway::search(self, query))
    }
}

const RATE_LIMITED_MESSAGE: &str = "요청이 너무 빠르게 반복되고 있습니다. 잠시 후 다시 시도해 주세요.";
const UNREACHABLE_MESSAGE: &str = "검색 서버에 연결할 수 없습니다.";

/// Talks to a running gateway over its `/api/search-artists` boundary.
pub struct HttpSearchBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize, Debug)]
struct GatewayBody {
    #[serde(default)]
    results: Vec<SearchResultItem>,
    #[serde(default)]
    error: Option<SearchError>,
}

/// Boundary rejections carry the type as a plain string.
#[derive(Deserialize, Debug)]
struct RejectionBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

impl HttpSearchBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch(&self, query: &str) -> SearchOutcome {
        let url = format!("{}/api/search-artists", self.base_url);
        let response = match self.client.get(&url).query(&[("query", query)]).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("gateway request failed: {:#}", e);
                return SearchOutcome::Error(
                    SearchError::new(SearchErrorKind::Network, UNREACHABLE_MESSAGE)
                        .with_detail(e.to_string()),
                );
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return SearchOutcome::Error(
                    SearchError::new(SearchErrorKind::Network, UNREACHABLE_MESSAGE)
                        .with_status(status.as_u16())
                        .with_detail(e.to_string()),
                );
            }
        };

        if !status.is_success() {
            log::error!("gateway HTTP error {}", status.as_u16());
            return SearchOutcome::Error(classify_rejection(status, &body));
        }

        match serde_json::from_str::<GatewayBody>(&body) {
            Ok(GatewayBody {
                error: Some(err), ..
            }) => SearchOutcome::Error(err),
            Ok(GatewayBody { results, .. }) if results.is_empty() => SearchOutcome::Empty,
            Ok(GatewayBody { results, .. }) => SearchOutcome::Ok(results),
            Err(e) => SearchOutcome::Error(
                SearchError::new(SearchErrorKind::Upstream, "Malformed gateway response")
                    .with_status(status.as_u16())
                    .with_detail(e.to_string()),
            ),
        }
    }
}

impl SearchBackend for HttpSearchBackend {
    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, SearchOutcome> {
        Box::pin(self.fetch(query))
    }
}

fn classify_rejection(status: StatusCode, body: &str) -> SearchError {
    let parsed = serde_json::from_str::<RejectionBody>(body).ok();
    let kind = match parsed.as_ref().map(|b| b.error.as_str()) {
        Some("rate_limited") => SearchErrorKind::RateLimited,
        Some("missing_query") | Some("query_too_long") => SearchErrorKind::Validation,
        Some("internal_error") => SearchErrorKind::Internal,
        _ if status == StatusCode::TOO_MANY_REQUESTS => SearchErrorKind::RateLimited,
        _ if status.is_server_error() => SearchErrorKind::Internal,
        _ => SearchErrorKind::Upstream,
    };
    let message = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| match kind {
            SearchErrorKind::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            _ => format!("Gateway error (status {})", status.as_u16()),
        });
    SearchError::new(kind, message).with_status(status.as_u16())
}

#[test]
fn test_classify_rejection() {
    let err = classify_rejection(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":"rate_limited","message":"slow down"}"#,
    );
    assert_eq!(err.kind, SearchErrorKind::RateLimited);
    assert_eq!(err.message, "slow down");

    let err = classify_rejection(StatusCode::TOO_MANY_REQUESTS, "not json");
    assert_eq!(err.kind, SearchErrorKind::RateLimited);
    assert_eq!(err.message, RATE_LIMITED_MESSAGE);

    let err = classify_rejection(
        StatusCode::BAD_REQUEST,
        r#"{"error":"query_too_long","message":"too long","length":2000,"maxLength":1800}"#,
    );
    assert_eq!(err.kind, SearchErrorKind::Validation);

    let err = classify_rejection(StatusCode::BAD_GATEWAY, "");
    assert_eq!(err.kind, SearchErrorKind::Internal);
    assert_eq!(err.status, Some(502));
}
