use serde::{Deserialize, Deserializer, Serialize};

/// One normalized search hit, in upstream ranking order.
///
/// `link` identifies the item when the close and contrast lists are shown together.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Display host of the result.
    pub source: String,
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchErrorKind {
    /// Gateway has no credentials; nothing can succeed until it is reconfigured.
    #[serde(rename = "config_error")]
    Config,
    /// Provider-side throttling.
    #[serde(rename = "upstream_quota", alias = "google_quota")]
    Quota,
    /// Local fixed-window limiter rejected the call.
    #[serde(rename = "rate_limited")]
    RateLimited,
    /// Any other provider failure, including unparsable error bodies.
    #[serde(rename = "upstream_error", alias = "google_error")]
    Upstream,
    #[serde(rename = "network_error")]
    Network,
    #[serde(rename = "query_too_long", alias = "missing_query")]
    Validation,
    #[serde(rename = "internal_error")]
    Internal,
}

impl SearchErrorKind {
    /// Wire name used at the gateway boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchErrorKind::Config => "config_error",
            SearchErrorKind::Quota => "upstream_quota",
            SearchErrorKind::RateLimited => "rate_limited",
            SearchErrorKind::Upstream => "upstream_error",
            SearchErrorKind::Network => "network_error",
            SearchErrorKind::Validation => "query_too_long",
            SearchErrorKind::Internal => "internal_error",
        }
    }

    /// Throttling of either origin; the user can only wait.
    pub fn is_quota_class(&self) -> bool {
        matches!(self, SearchErrorKind::Quota | SearchErrorKind::RateLimited)
    }
}

impl std::fmt::Display for SearchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchError {
    #[serde(rename = "type")]
    pub kind: SearchErrorKind,
    pub message: String,
    /// Upstream HTTP status, when the provider answered at all.
    #[serde(rename = "code", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SearchError {
    pub fn new(kind: SearchErrorKind, message: impl Into<String>) -> SearchError {
        SearchError {
            kind,
            message: message.into(),
            status: None,
            reason: None,
            detail: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> SearchError {
        self.status = Some(status);
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> SearchError {
        self.reason = reason;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> SearchError {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of exactly one search call. Failures are values, never panics or `Err`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Ok(Vec<SearchResultItem>),
    Empty,
    Error(SearchError),
}

impl SearchOutcome {
    pub fn items(&self) -> &[SearchResultItem] {
        match self {
            SearchOutcome::Ok(items) => items,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&SearchError> {
        match self {
            SearchOutcome::Error(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// Upstream (Custom Search JSON API) wire shapes
// =============================================================================

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamResponse {
    #[serde(default)]
    pub items: Option<Vec<UpstreamItem>>,
    #[serde(default)]
    pub search_information: Option<SearchInformation>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchInformation {
    #[serde(default)]
    pub total_results: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub snippet: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub display_link: String,
    #[serde(default)]
    pub pagemap: Option<PageMap>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct PageMap {
    #[serde(default)]
    pub cse_image: Vec<ImageHint>,
    #[serde(default)]
    pub thumbnail: Vec<ImageHint>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ImageHint {
    #[serde(default)]
    pub src: Option<String>,
}

/// The provider sends `null` for some fields on otherwise valid items.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl UpstreamItem {
    /// First usable image hint: `cse_image`, then `thumbnail`.
    pub fn image(&self) -> Option<String> {
        let pagemap = self.pagemap.as_ref()?;
        [pagemap.cse_image.first(), pagemap.thumbnail.first()]
            .into_iter()
            .flatten()
            .filter_map(|hint| hint.src.as_deref())
            .find(|src| !src.is_empty())
            .map(str::to_string)
    }
}

impl From<UpstreamItem> for SearchResultItem {
    fn from(item: UpstreamItem) -> Self {
        let image = item.image();
        SearchResultItem {
            title: item.title,
            link: item.link,
            snippet: item.snippet,
            source: item.display_link,
            image,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct UpstreamErrorEnvelope {
    pub error: UpstreamErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<UpstreamErrorDetail>,
}

#[derive(Deserialize, Debug)]
pub struct UpstreamErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}
