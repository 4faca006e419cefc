//! Remote form relay.
//!
//! Each response becomes one GET request against a URL template. The
//! template names the values to interpolate with `{user}`, `{answer}`,
//! `{time}`, `{duration}` and `{is_timed}`; every value is form-escaped,
//! with spaces written as `+`.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::instrument;

use super::{ResponseSink, SinkError};
use crate::submission::SubmittedResponse;

/// Placeholder text for values the client did not send.
const ABSENT: &str = "None";

/// Forwards responses to a remote form-aggregation endpoint.
pub struct FormRelaySink {
    client: reqwest::Client,
    url_template: String,
}

impl FormRelaySink {
    /// Create a relay for `url_template`.
    ///
    /// The template must reference at least `{user}` and `{answer}`.
    pub fn new(url_template: impl Into<String>) -> Result<Self, SinkError> {
        let url_template = url_template.into();
        for required in ["{user}", "{answer}"] {
            if !url_template.contains(required) {
                return Err(SinkError::InvalidTemplate(format!(
                    "missing {} placeholder",
                    required
                )));
            }
        }
        Ok(Self {
            client: reqwest::Client::new(),
            url_template,
        })
    }

    /// Render the request URL for a response.
    pub fn render_url(&self, response: &SubmittedResponse) -> Result<String, SinkError> {
        let answer = answer_json(&response.wire_entries())?;
        let timed = response.condition.map(|c| c.as_flag()).unwrap_or(ABSENT);
        let duration = response.duration.as_deref().unwrap_or(ABSENT);

        Ok(self
            .url_template
            .replace("{user}", &form_escape(&response.identifier))
            .replace("{answer}", &form_escape(&answer))
            .replace("{time}", &form_escape(&response.timestamp()))
            .replace("{duration}", &form_escape(duration))
            .replace("{is_timed}", &form_escape(timed)))
    }
}

/// JSON array of wire entries with `", "` between items.
///
/// The form's existing responses were written with this spacing.
fn answer_json(entries: &[String]) -> Result<String, serde_json::Error> {
    let items = entries
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[{}]", items.join(", ")))
}

/// Percent-escape a query value, writing spaces as `+`.
fn form_escape(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

#[async_trait]
impl ResponseSink for FormRelaySink {
    fn name(&self) -> &'static str {
        "relay"
    }

    #[instrument(skip(self, response), fields(identifier = %response.identifier), level = "debug")]
    async fn record(&self, response: &SubmittedResponse) -> Result<(), SinkError> {
        let url = self.render_url(response)?;
        let reply = self.client.get(&url).send().await.map_err(|e| {
            if e.is_builder() {
                SinkError::InvalidTemplate(e.to_string())
            } else {
                SinkError::Connection(e.to_string())
            }
        })?;

        let status = reply.status();
        if status != StatusCode::OK {
            tracing::error!(status = status.as_u16(), "relay rejected submission");
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
