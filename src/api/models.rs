use serde::{Deserialize, Serialize};

use crate::data_models::{SearchError, SearchOutcome, SearchResultItem};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

/// Body of every answered search, including upstream failures: the caller reads
/// `error.type` to choose its copy.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchError>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Ok(results) => SearchResponse {
                results,
                error: None,
            },
            SearchOutcome::Empty => SearchResponse {
                results: Vec::new(),
                error: None,
            },
            SearchOutcome::Error(err) => SearchResponse {
                results: Vec::new(),
                error: Some(err),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Rejections raised before the search provider is contacted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}
