// src/app.rs

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, MessagingConfig};
use crate::db::{DocumentStore, DEFAULT_PAGE_LIMIT};
use crate::notify::WhatsappNotifier;
use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub notifier: Arc<WhatsappNotifier>,
    pub page_limit: usize,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            notifier: Arc::new(WhatsappNotifier::new(config.messaging.clone())?),
            page_limit: config.store.page_limit,
        })
    }

    /// State around `store` with default paging and an unconfigured notifier.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            notifier: Arc::new(WhatsappNotifier::with_client(reqwest::Client::new(), MessagingConfig::default())),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    // Reports are read by the booking dashboard from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/", post(routes::dispatch::handle))
        .route("/api/v1/dispatch", post(routes::dispatch::handle))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
