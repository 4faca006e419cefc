//! Submission parsing and recording.
//!
//! The survey form echoes back the participant's order and guidance
//! bitstring, so a submission can be reconstituted into per-question records
//! without any server-side session state.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assignment::Condition;
use crate::catalog::StudyOptions;
use crate::presentation::ConditionPolicy;
use crate::seed::Seed;
use crate::sink::{ResponseSink, SinkError};

/// Form field carrying the participant identifier.
pub const FIELD_IDENTIFIER: &str = "uid";
/// Form field carrying the comma-separated case order.
pub const FIELD_ORDER: &str = "sort_idxs";
/// Form field carrying the guidance bitstring.
pub const FIELD_GUIDANCE: &str = "with_guidance";
pub const FIELD_TIMED: &str = "timed";
pub const FIELD_SEED: &str = "seed";
pub const FIELD_DURATION: &str = "duration";
/// Hidden field that humans leave empty.
pub const FIELD_HONEYPOT: &str = "name";

/// Identifier recorded when the form carries none.
pub const MISSING_IDENTIFIER: &str = "None";

static QUESTION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Q\d+$").expect("question field pattern is valid"));

fn is_question_field(name: &str) -> bool {
    QUESTION_FIELD.is_match(name)
}

/// Errors that stop a submission from being recorded.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The honeypot field was filled in.
    #[error("submission rejected")]
    Honeypot,

    #[error("invalid question order: {0}")]
    MalformedOrder(String),

    #[error("invalid guidance flag: {0:?}")]
    MalformedGuidance(char),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Form fields as posted, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubmission {
    pub fields: Vec<(String, String)>,
}

impl RawSubmission {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// First value posted under `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn identifier(&self) -> &str {
        self.field(FIELD_IDENTIFIER).unwrap_or(MISSING_IDENTIFIER)
    }

    /// Free-text answers, in form order.
    ///
    /// A question field posted twice contributes only its first value.
    pub fn answers(&self) -> impl Iterator<Item = &str> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .filter_map(move |(key, value)| {
                (is_question_field(key) && seen.insert(key.as_str())).then_some(value.as_str())
            })
    }

    fn honeypot_filled(&self) -> bool {
        self.field(FIELD_HONEYPOT).is_some_and(|v| !v.is_empty())
    }
}

/// One answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    /// Canonical case index.
    pub question_index: usize,
    /// Index into the canonical options, or `-1` when unmatched.
    pub answer_index: i64,
    /// Whether guidance was shown for the question.
    pub guidance: bool,
}

impl ResponseEntry {
    /// Compact `Q<case>,A<answer>,<0|1>` form used in persisted payloads.
    pub fn to_wire(&self) -> String {
        format!(
            "Q{},A{},{}",
            self.question_index,
            self.answer_index,
            u8::from(self.guidance)
        )
    }
}

/// A submission ready to persist. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedResponse {
    pub identifier: String,
    pub submitted_at: DateTime<FixedOffset>,
    pub entries: Vec<ResponseEntry>,
    /// Condition as reported by the client.
    pub condition: Option<Condition>,
    /// Seed as reported by the client.
    pub seed: Option<Seed>,
    /// Elapsed time as reported by the client.
    pub duration: Option<String>,
}

impl SubmittedResponse {
    pub fn wire_entries(&self) -> Vec<String> {
        self.entries.iter().map(ResponseEntry::to_wire).collect()
    }

    /// Submission time with second precision and local offset.
    pub fn timestamp(&self) -> String {
        self.submitted_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingResult {
    /// Persisted through the active sink.
    Recorded,
    /// Demo walkthrough; nothing persisted.
    Demo,
}

fn parse_order(raw: Option<&str>) -> Result<Vec<usize>, SubmissionError> {
    let raw = raw.unwrap_or_default();
    let trimmed = raw.replace(['[', ']'], "");
    if trimmed.trim().is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| SubmissionError::MalformedOrder(raw.to_string()))
        })
        .collect()
}

fn parse_guidance(raw: Option<&str>) -> Result<Vec<bool>, SubmissionError> {
    raw.unwrap_or_default()
        .chars()
        .map(|c| match c {
            '1' => Ok(true),
            '0' => Ok(false),
            other => Err(SubmissionError::MalformedGuidance(other)),
        })
        .collect()
}

fn parse_condition(raw: Option<&str>) -> Option<Condition> {
    match raw?.trim() {
        "0" => Some(Condition::Untimed),
        "1" => Some(Condition::Timed),
        _ => None,
    }
}

/// Local time truncated to whole seconds.
pub fn submission_time() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.with_nanosecond(0).unwrap_or(now).fixed_offset()
}

/// Reconstitute per-question records from posted fields.
///
/// Answers, order and guidance flags are zipped positionally; if their
/// lengths differ the shortest wins.
pub fn parse_submission(
    identifier: &str,
    raw: &RawSubmission,
    options: &StudyOptions,
    submitted_at: DateTime<FixedOffset>,
) -> Result<SubmittedResponse, SubmissionError> {
    let answers: Vec<i64> = raw.answers().map(|a| options.index_of(a)).collect();
    let order = parse_order(raw.field(FIELD_ORDER))?;
    let guidance = parse_guidance(raw.field(FIELD_GUIDANCE))?;

    if answers.len() != order.len() || order.len() != guidance.len() {
        tracing::warn!(
            identifier,
            answers = answers.len(),
            order = order.len(),
            guidance = guidance.len(),
            "submission field lengths differ"
        );
    }

    let entries = order
        .into_iter()
        .zip(answers)
        .zip(guidance)
        .map(|((question_index, answer_index), guidance)| ResponseEntry {
            question_index,
            answer_index,
            guidance,
        })
        .collect();

    Ok(SubmittedResponse {
        identifier: identifier.to_string(),
        submitted_at,
        entries,
        condition: parse_condition(raw.field(FIELD_TIMED)),
        seed: raw
            .field(FIELD_SEED)
            .and_then(|s| s.trim().parse().ok())
            .map(Seed),
        duration: raw
            .field(FIELD_DURATION)
            .map(str::to_string)
            .filter(|d| !d.is_empty()),
    })
}

/// Parse a submission and persist it through `sink`.
///
/// Demo submissions are acknowledged without persisting.
pub async fn record_submission(
    identifier: &str,
    raw: &RawSubmission,
    options: &StudyOptions,
    policy: &ConditionPolicy,
    sink: &dyn ResponseSink,
) -> Result<RecordingResult, SubmissionError> {
    if raw.honeypot_filled() {
        tracing::warn!(identifier, "honeypot field filled, rejecting submission");
        return Err(SubmissionError::Honeypot);
    }
    if policy.is_demo(identifier) {
        return Ok(RecordingResult::Demo);
    }

    let response = parse_submission(identifier, raw, options, submission_time())?;
    let unmatched = response.entries.iter().filter(|e| e.answer_index < 0).count();
    tracing::debug!(
        identifier,
        entries = response.entries.len(),
        unmatched,
        sink = sink.name(),
        "recording submission"
    );

    sink.record(&response).await?;
    Ok(RecordingResult::Recorded)
}
