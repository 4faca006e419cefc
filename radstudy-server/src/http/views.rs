//! Static HTML views.
//!
//! Pages are built from fixed text only; nothing from the request is echoed.

use axum::response::Html;
use radstudy_core::FailureKind;

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:4rem auto;padding:0 1rem}";

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    ))
}

pub fn instructions() -> Html<String> {
    page(
        "Imaging appropriateness survey",
        "<p>This survey is accessed through the personal link sent to you by email. \
         Please open that link to begin.</p>\n\
         <p>To see how the survey works without recording answers, open the \
         <a href=\"/demo\">demo</a>.</p>",
    )
}

pub fn success() -> Html<String> {
    page(
        "Thank you",
        "<p>Your responses have been recorded. You may close this window.</p>",
    )
}

fn failure_message(kind: Option<FailureKind>) -> &'static str {
    match kind {
        Some(FailureKind::Connection) => {
            "<p>We could not reach the response service. Please check your connection \
             and submit again.</p>"
        }
        Some(FailureKind::Post) => {
            "<p>The response service did not accept your submission. Please try again \
             later.</p>"
        }
        Some(FailureKind::Duplicate) => {
            "<p>Responses for this link have already been recorded.</p>"
        }
        Some(FailureKind::Storage) => {
            "<p>Your responses could not be saved. Please try again later.</p>"
        }
        None => "<p>Something went wrong while submitting your responses.</p>",
    }
}

pub fn failure(kind: Option<FailureKind>) -> Html<String> {
    page("Submission failed", failure_message(kind))
}

pub fn internal_error() -> Html<String> {
    page("Server error", "<p>An unexpected error occurred.</p>")
}

pub fn not_found() -> Html<String> {
    page("Not found", "<p>There is nothing at this address.</p>")
}
