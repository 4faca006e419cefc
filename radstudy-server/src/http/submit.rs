//! Response submission handler

use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use radstudy_core::{RawSubmission, RecordingResult, SubmissionError, record_submission};

use super::views;
use crate::AppState;

/// Record a submitted survey and redirect to the outcome view.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let raw = RawSubmission::new(fields);
    let identifier = raw.identifier().to_string();

    let result = record_submission(
        &identifier,
        &raw,
        &state.catalog.options,
        &state.policy,
        state.sink.as_ref(),
    )
    .await;

    match result {
        Ok(RecordingResult::Recorded) => {
            tracing::info!(sink = state.sink.name(), "recorded submission");
            Redirect::to("/success").into_response()
        }
        Ok(RecordingResult::Demo) => {
            tracing::debug!("demo submission acknowledged");
            Redirect::to("/success").into_response()
        }
        Err(SubmissionError::Sink(e)) => {
            let kind = e.kind();
            tracing::error!(error = %e, kind = kind.as_str(), "failed to record submission");
            Redirect::to(&format!("/error/{}", kind.as_str())).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "submission rejected");
            (StatusCode::INTERNAL_SERVER_ERROR, views::internal_error()).into_response()
        }
    }
}
