//! HTTP server module

mod api;
mod submit;
mod survey;
mod views;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use api::HealthResponse;
pub use survey::SurveyQuery;

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(survey::survey))
        .route("/success", get(survey::success))
        .route("/error", get(survey::failure))
        .route("/error/:kind", get(survey::failure_kind))
        .route("/:segment", get(survey::demo))
        .route("/api/v1/submit", post(submit::submit))
        .route("/api/health", get(api::health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
