//! ahp-ca library - Criteria Analysis service
//!
//! HTTP front for the AHP engine: accepts uploaded comparison tables, runs
//! the analysis, writes a report document and returns the results as JSON.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use ahp_common::config::ServiceConfig;

pub mod api;
pub mod report;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration, read-only after launch
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    let reports = ServeDir::new(&state.config.reports_dir);
    let cors = cors_layer(&state.config.allowed_origins);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/uploadfile/", post(api::upload_files))
        .route("/uploadfile", post(api::upload_files))
        .nest_service("/reports", reports)
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured front-end origins
///
/// Request headers are mirrored and credentials allowed; browsers send the
/// upload as a credentialed multipart POST.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
