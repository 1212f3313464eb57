#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use ailms_api::{
    config::Config,
    create_router,
    errors::CapabilitiesError,
    models::capabilities::Capabilities,
    services::{
        capabilities_service::CapabilitiesProvider,
        history_service::{HistoryPersister, MemoryPersister},
        AppState,
    },
};

/// Capabilities source that counts calls and can be switched to failing.
#[derive(Default)]
pub struct FakeCapabilities {
    pub calls: AtomicUsize,
    pub unavailable: bool,
}

impl FakeCapabilities {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapabilitiesProvider for FakeCapabilities {
    async fn fetch(&self) -> Result<Capabilities, CapabilitiesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(CapabilitiesError::Status(503));
        }
        Ok(Capabilities {
            text_generation: true,
            image_generation: false,
            models: vec!["gemini-flash".to_string()],
            ..Capabilities::default()
        })
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn create_test_app() -> Router {
    create_test_app_with(Arc::new(FakeCapabilities::default()), Arc::new(MemoryPersister::new()))
}

pub fn create_test_app_with(
    provider: Arc<FakeCapabilities>,
    persister: Arc<dyn HistoryPersister>,
) -> Router {
    init_tracing();
    let app_state = Arc::new(AppState::with_components(Config::default(), provider, persister));
    create_router(app_state)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
