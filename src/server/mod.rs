//! Webhook HTTP server
//!
//! Receives Bitbucket `pr:merged` events and hands merges into a default
//! branch to the scan queue. The caller gets an answer as soon as the scan
//! is queued; scan results only show up in the logs.

mod error;
mod webhook;

pub use error::AppError;
pub use webhook::{ResponseMessage, WebhookPayload};

use crate::platform::CodeHostFactory;
use crate::queue::ScanQueue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Creates code host clients for the host named in a webhook
    pub factory: Arc<dyn CodeHostFactory>,
    /// Where accepted merges are queued
    pub queue: ScanQueue,
}

/// Build the axum Router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(webhook::index))
        .route("/health", get(webhook::health))
        .route("/hook", post(webhook::hook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
