//! HTTP request handlers and application state

use crate::analytics::AnalyticsRecorder;
use crate::assistant::AssistantSession;
use crate::cache::ResponseCache;
use crate::config::Config;
use crate::gate::IpGate;
use crate::store::KvStore;
use axum::http::HeaderValue;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod chat;
pub mod health;

/// Application state shared across all handlers
///
/// The store and assistant collaborators are injected so tests can substitute
/// in-memory and mock implementations. All fields are Arc'd for cheap cloning
/// across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    gate: Arc<IpGate>,
    cache: Arc<ResponseCache>,
    recorder: Arc<AnalyticsRecorder>,
    store: Arc<dyn KvStore>,
    assistant: Arc<dyn AssistantSession>,
}

impl AppState {
    /// Create application state from configuration and collaborators
    pub fn new(
        config: Config,
        store: Arc<dyn KvStore>,
        assistant: Arc<dyn AssistantSession>,
    ) -> Self {
        let config = Arc::new(config);
        let gate = Arc::new(IpGate::new(
            config.limits.max_requests,
            Duration::from_secs(config.limits.window_seconds),
            Duration::from_secs(config.limits.ban_seconds),
        ));
        let cache = Arc::new(ResponseCache::new(
            Duration::from_secs(config.cache.ttl_seconds),
            config.cache.max_entries,
            config.cache.similarity_threshold,
        ));
        let recorder = Arc::new(AnalyticsRecorder::new(
            store.clone(),
            config.analytics.key_prefix.clone(),
        ));

        Self {
            config,
            gate,
            cache,
            recorder,
            store,
            assistant,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gate(&self) -> &IpGate {
        &self.gate
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn recorder(&self) -> &AnalyticsRecorder {
        &self.recorder
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn assistant(&self) -> &Arc<dyn AssistantSession> {
        &self.assistant
    }
}

/// Build the application router with middleware layers applied
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config());
    Router::new()
        .route("/chat", post(chat::handler))
        .route("/analytics", get(analytics::handler))
        .route("/health", get(health::handler))
        .layer(middleware::from_fn(
            crate::middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match &config.cors.allowed_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid CORS origin, falling back to any");
                layer.allow_origin(Any)
            }
        },
        None => layer.allow_origin(Any),
    }
}
