use anyhow::{Context, Result};
use axum::{Router, response::IntoResponse, response::Response, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CONFIG;
use crate::gateway::SearchGateway;
use crate::rate_limiter::RateLimiter;

pub mod error;
pub mod handlers;
pub mod models;

pub use error::ApiError;

pub struct AppState {
    pub gateway: SearchGateway,
    pub limiter: RateLimiter,
    pub max_query_length: usize,
}

impl AppState {
    pub fn new(gateway: SearchGateway, limiter: RateLimiter, max_query_length: usize) -> Self {
        Self {
            gateway,
            limiter,
            max_query_length,
        }
    }

    pub fn from_config() -> Self {
        Self::new(
            SearchGateway::from_config(),
            RateLimiter::from_config(),
            CONFIG.max_query_length,
        )
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // The browser front-end is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health_handler))
        .route("/health", get(handlers::health_handler))
        .route("/api/search-artists", get(handlers::search_handler))
        .route("/search", get(handlers::search_handler))
        .fallback(handlers::not_found_handler)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    log::error!("handler panicked: {detail}");
    ApiError::Internal.into_response()
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("{} listening on http://{}", handlers::SERVICE_NAME, addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    log::info!("server exited");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
