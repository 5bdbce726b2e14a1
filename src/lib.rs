//! FieldOps API Library
//!
//! This crate provides the job lifecycle and scheduling engine for
//! dispatchable field-service work orders.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod collaborators;
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod queries;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;

use crate::queries::JobQueryService;
use crate::services::jobs::JobLifecycleService;

// App state definition
#[derive(Clone)]
pub struct AppState {
    /// `None` when the in-memory storage backend is selected
    pub db: Option<Arc<DatabaseConnection>>,
    pub config: config::AppConfig,
    pub engine: Arc<JobLifecycleService>,
    pub queries: Arc<JobQueryService>,
    pub event_sender: events::EventSender,
}

/// The `/api/v1` surface: the job command/query routes.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new().nest("/jobs", handlers::jobs::jobs_router())
}

/// Request latency middleware feeding the Prometheus histogram.
pub async fn track_metrics(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    // Record the route template, not the raw URI, so ids do not explode the
    // label cardinality.
    let path = request
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), &path])
        .observe(start.elapsed().as_secs_f64());

    response
}
