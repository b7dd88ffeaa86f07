use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::models::RejectionBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("query 파라미터가 비어 있습니다.")]
    MissingQuery,

    #[error("검색 문장이 너무 깁니다. 최대 {max_length}자까지 입력할 수 있습니다.")]
    QueryTooLong { length: usize, max_length: usize },

    #[error("요청이 너무 빠르게 반복되고 있습니다. 잠시 후 다시 시도해 주세요.")]
    RateLimited,

    #[error("존재하지 않는 경로입니다.")]
    NotFound,

    #[error("서버 내부 오류가 발생했습니다. 잠시 후 다시 시도해 주세요.")]
    Internal,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingQuery => "missing_query",
            ApiError::QueryTooLong { .. } => "query_too_long",
            ApiError::RateLimited => "rate_limited",
            ApiError::NotFound => "not_found",
            ApiError::Internal => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingQuery | ApiError::QueryTooLong { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (length, max_length) = match &self {
            ApiError::QueryTooLong { length, max_length } => (Some(*length), Some(*max_length)),
            _ => (None, None),
        };
        let body = RejectionBody {
            error: self.code(),
            message: self.to_string(),
            length,
            max_length,
        };
        (self.status(), Json(body)).into_response()
    }
}
