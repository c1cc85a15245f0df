//! PO upload API
//!
//! Intake of purchase-order lines, SKU validation against the product catalog
//! and generation of draft quotations grouped by buyer order number.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod migrator;
pub mod services;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::po_uploads::PoUploadService;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub po_uploads: Arc<PoUploadService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let po_uploads = PoUploadService::new(db.clone())
            .with_page_sizes(config.api_default_page_size, config.api_max_page_size);
        Self {
            db,
            config,
            po_uploads: Arc::new(po_uploads),
        }
    }
}

/// Versioned API routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new().nest("/po-uploads", handlers::po_uploads::po_upload_routes())
}

/// Full application router with health and metrics endpoints
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics_handler() -> Result<impl IntoResponse, errors::ServiceError> {
    let body = metrics::export_metrics()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
