use reqwest::StatusCode;

use crate::config::CONFIG;
use crate::data_models::{
    SearchError, SearchErrorKind, SearchOutcome, SearchResultItem, UpstreamErrorEnvelope,
    UpstreamItem, UpstreamResponse,
};

/// Upstream result-count cap per call.
pub const RESULT_COUNT: u8 = 5;
/// Longest slice of user text forwarded upstream.
pub const MAX_UPSTREAM_TEXT_CHARS: usize = 80;
pub const DEFAULT_QUERY: &str = "현대 미술 작가 디자이너";
pub const QUERY_SUFFIX: &str = "(작가 OR 디자이너 OR artist OR designer)";

/// Upstream error reasons that mean "throttled", as opposed to a real failure.
pub const QUOTA_REASONS: &[&str] = &[
    "dailyLimitExceeded",
    "userRateLimitExceeded",
    "rateLimitExceeded",
    "quotaExceeded",
];

/// Recruiting ads crowd out artist pages for many mood words.
pub const DEFAULT_BLOCKED_KEYWORDS: &[&str] = &["채용"];

const CONFIG_ERROR_MESSAGE: &str = "검색 API 설정이 올바르지 않습니다.";
const NETWORK_ERROR_MESSAGE: &str = "검색 API 호출에 실패했습니다.";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_key: Option<String>,
    pub cx: Option<String>,
    pub endpoint: String,
    pub result_count: u8,
    pub blocked_keywords: Vec<String>,
}

impl GatewaySettings {
    pub fn from_config() -> Self {
        Self {
            api_key: CONFIG.google_api_key.clone(),
            cx: CONFIG.google_cx.clone(),
            endpoint: CONFIG.search_endpoint.clone(),
            ..Self::default()
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            cx: None,
            endpoint: crate::config::DEFAULT_SEARCH_ENDPOINT.to_string(),
            result_count: RESULT_COUNT,
            blocked_keywords: DEFAULT_BLOCKED_KEYWORDS
                .iter()
                .map(|kw| kw.to_string())
                .collect(),
        }
    }
}

/// Client for the external search provider.
///
/// Every failure mode is folded into a [`SearchOutcome`]; `search` never errors.
pub struct SearchGateway {
    client: reqwest::Client,
    settings: GatewaySettings,
}

impl SearchGateway {
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    pub fn from_config() -> Self {
        Self::new(GatewaySettings::from_config())
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let (Some(api_key), Some(cx)) = (&self.settings.api_key, &self.settings.cx) else {
            log::warn!("search provider credentials are not configured");
            return SearchOutcome::Error(SearchError::new(
                SearchErrorKind::Config,
                CONFIG_ERROR_MESSAGE,
            ));
        };

        let q = build_search_query(query);
        let num = self.settings.result_count.to_string();
        log::info!("requesting search: q={q:?}, num={num}");

        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", cx.as_str()),
                ("q", q.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                log::error!("search request failed: {:#}", e);
                return SearchOutcome::Error(
                    SearchError::new(SearchErrorKind::Network, NETWORK_ERROR_MESSAGE)
                        .with_detail(e.to_string()),
                );
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::error!("failed reading search response body: {:#}", e);
                return SearchOutcome::Error(
                    SearchError::new(SearchErrorKind::Network, NETWORK_ERROR_MESSAGE)
                        .with_status(status.as_u16())
                        .with_detail(e.to_string()),
                );
            }
        };

        if !status.is_success() {
            let err = parse_upstream_error(&body, status);
            log::error!(
                "upstream error: status={}, type={}, reason={:?}",
                status.as_u16(),
                err.kind,
                err.reason
            );
            return SearchOutcome::Error(err);
        }

        let data: UpstreamResponse = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(e) => {
                log::error!("malformed search response: {:#}", e);
                return SearchOutcome::Error(
                    SearchError::new(SearchErrorKind::Upstream, generic_upstream_message(status))
                        .with_status(status.as_u16())
                        .with_detail(e.to_string()),
                );
            }
        };

        log::info!(
            "upstream totalResults = {}",
            data.search_information
                .and_then(|info| info.total_results)
                .unwrap_or_else(|| "?".to_string())
        );

        let items = data.items.unwrap_or_default();
        if items.is_empty() {
            log::info!("no items in search response");
            return SearchOutcome::Empty;
        }

        let results = filter_blocked(items, &self.settings.blocked_keywords)
            .into_iter()
            .map(SearchResultItem::from)
            .collect();
        SearchOutcome::Ok(results)
    }
}

/// Biases user text toward artist and designer pages.
pub fn build_search_query(user_text: &str) -> String {
    let base = user_text.trim();
    if base.is_empty() {
        return DEFAULT_QUERY.to_string();
    }
    let trimmed: String = base.chars().take(MAX_UPSTREAM_TEXT_CHARS).collect();
    format!("{trimmed} {QUERY_SUFFIX}")
}

/// Drops items whose title or snippet contains a blocked keyword.
///
/// Never turns a non-empty list into an empty one: if every item would be
/// dropped, the unfiltered list is returned instead.
pub fn filter_blocked(items: Vec<UpstreamItem>, blocked: &[String]) -> Vec<UpstreamItem> {
    let total = items.len();
    let blocked: Vec<String> = blocked.iter().map(|kw| kw.to_lowercase()).collect();
    let (kept, dropped): (Vec<UpstreamItem>, Vec<UpstreamItem>) = items
        .into_iter()
        .partition(|item| !is_blocked(item, &blocked));

    log::info!("items={total}, filtered={}", kept.len());

    if kept.is_empty() && !dropped.is_empty() {
        log::info!("all items filtered; falling back to unfiltered items");
        return dropped;
    }
    kept
}

fn is_blocked(item: &UpstreamItem, blocked_lowercase: &[String]) -> bool {
    let text = format!("{} {}", item.title, item.snippet).to_lowercase();
    blocked_lowercase.iter().any(|kw| text.contains(kw.as_str()))
}

/// Classifies a non-success upstream response body.
pub fn parse_upstream_error(body: &str, status: StatusCode) -> SearchError {
    let Ok(envelope) = serde_json::from_str::<UpstreamErrorEnvelope>(body) else {
        return SearchError::new(SearchErrorKind::Upstream, generic_upstream_message(status))
            .with_status(status.as_u16())
            .with_detail(body.to_string());
    };

    let error = envelope.error;
    let reason = error.errors.into_iter().next().and_then(|e| e.reason);
    let code = error.code.unwrap_or(status.as_u16());
    let message = error
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| generic_upstream_message(status));

    let kind = match reason.as_deref() {
        Some(r) if QUOTA_REASONS.contains(&r) => SearchErrorKind::Quota,
        _ => SearchErrorKind::Upstream,
    };

    SearchError::new(kind, message)
        .with_status(code)
        .with_reason(reason)
}

fn generic_upstream_message(status: StatusCode) -> String {
    format!("Search API error (status {})", status.as_u16())
}

#[test]
fn test_build_search_query() {
    assert_eq!(build_search_query("   "), DEFAULT_QUERY);
    assert_eq!(
        build_search_query(" 하늘 sky "),
        "하늘 sky (작가 OR 디자이너 OR artist OR designer)"
    );

    let long = "가".repeat(200);
    let q = build_search_query(&long);
    assert!(q.starts_with(&"가".repeat(MAX_UPSTREAM_TEXT_CHARS)));
    assert!(!q.starts_with(&"가".repeat(MAX_UPSTREAM_TEXT_CHARS + 1)));
}
