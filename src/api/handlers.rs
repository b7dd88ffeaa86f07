use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use std::sync::Arc;
use std::time::Instant;

use crate::rate_limiter::Admission;

use super::AppState;
use super::error::ApiError;
use super::models::{HealthResponse, SearchParams, SearchResponse};

pub const SERVICE_NAME: &str = "cloud-dancer-api";

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
    })
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    if state.limiter.admit() == Admission::Reject {
        log::warn!("local rate limit hit");
        return Err(ApiError::RateLimited);
    }

    // a query string that does not yield one `query` value carries no usable query
    let query = match params {
        Ok(Query(params)) => params.query.unwrap_or_default(),
        Err(rejection) => {
            log::warn!("unusable query string: {}", rejection.body_text());
            String::new()
        }
    };
    if query.is_empty() {
        return Err(ApiError::MissingQuery);
    }

    let length = query.chars().count();
    if length > state.max_query_length {
        return Err(ApiError::QueryTooLong {
            length,
            max_length: state.max_query_length,
        });
    }

    let start = Instant::now();
    let outcome = state.gateway.search(&query).await;
    log::info!(
        "search finished in {}ms: results={}, error={:?}",
        start.elapsed().as_millis(),
        outcome.items().len(),
        outcome.error().map(|e| e.kind)
    );

    Ok(Json(SearchResponse::from(outcome)))
}

pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}
