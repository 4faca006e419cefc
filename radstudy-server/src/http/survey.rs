//! Survey and view handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use radstudy_core::{FailureKind, present_demo, present_for};
use serde::Deserialize;

use super::views;
use crate::AppState;

/// Query string of the survey page
#[derive(Debug, Default, Deserialize)]
pub struct SurveyQuery {
    pub uid: Option<String>,
}

/// Survey entry point.
///
/// Without an identifier this shows the instructions; otherwise it returns
/// the participant's presentation package.
pub async fn survey(State(state): State<Arc<AppState>>, Query(query): Query<SurveyQuery>) -> Response {
    let Some(identifier) = query.uid.filter(|uid| !uid.trim().is_empty()) else {
        return views::instructions().into_response();
    };

    let package = present_for(&identifier, &state.catalog, &state.policy);
    tracing::info!(
        seed = %package.seed,
        condition = %package.condition,
        order = %package.order,
        "served survey"
    );
    Json(package).into_response()
}

/// Single-segment paths; only the demo identifier is served.
pub async fn demo(State(state): State<Arc<AppState>>, Path(segment): Path<String>) -> Response {
    if !state.policy.is_demo(&segment) {
        return (StatusCode::NOT_FOUND, views::not_found()).into_response();
    }
    let package = present_demo(&state.demo_catalog, &state.policy);
    tracing::debug!(cases = package.questions.len(), "served demo");
    Json(package).into_response()
}

pub async fn success() -> impl IntoResponse {
    views::success()
}

pub async fn failure() -> impl IntoResponse {
    views::failure(None)
}

pub async fn failure_kind(Path(kind): Path<String>) -> impl IntoResponse {
    views::failure(FailureKind::from_slug(&kind))
}
