#![allow(dead_code)]

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use cloud_dancer::gateway::GatewaySettings;

/// Canned search provider bound on a random local port.
#[derive(Clone)]
pub struct FakeUpstream {
    pub endpoint: String,
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    last_params: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl FakeUpstream {
    pub async fn spawn(status: StatusCode, body: impl Into<String>) -> FakeUpstream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let upstream = FakeUpstream {
            endpoint: format!("http://{addr}/customsearch/v1"),
            status,
            body: body.into(),
            hits: Arc::new(AtomicUsize::new(0)),
            last_params: Arc::new(Mutex::new(None)),
        };

        let app = Router::new()
            .route("/customsearch/v1", get(respond))
            .with_state(upstream.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        upstream
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> HashMap<String, String> {
        self.last_params.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn settings(&self) -> GatewaySettings {
        settings_for(&self.endpoint)
    }
}

async fn respond(
    State(upstream): State<FakeUpstream>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    *upstream.last_params.lock().unwrap() = Some(params);
    (upstream.status, upstream.body.clone())
}

pub fn settings_for(endpoint: &str) -> GatewaySettings {
    GatewaySettings {
        api_key: Some("test-key".to_string()),
        cx: Some("test-cx".to_string()),
        endpoint: endpoint.to_string(),
        ..GatewaySettings::default()
    }
}

/// An address nothing listens on.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/customsearch/v1")
}

pub fn item_json(title: &str, link: &str, snippet: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "link": link,
        "snippet": snippet,
        "displayLink": "example.com",
    })
}

pub fn items_body(items: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "searchInformation": { "totalResults": items.len().to_string() },
        "items": items,
    })
    .to_string()
}
