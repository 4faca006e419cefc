//! Patient case records.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CatalogError, read_jsonl};

/// One survey question: a patient case tagged with guideline topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Case vignette shown to the participant.
    #[serde(rename = "case")]
    pub case_text: String,
    /// Guideline topics relevant to the case, in display order.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Case {
    pub fn new(case_text: impl Into<String>, topics: Vec<String>) -> Self {
        Self {
            case_text: case_text.into(),
            topics,
        }
    }
}

/// Load cases from a JSON-lines file, preserving file order.
pub fn load_cases(path: &Path) -> Result<Vec<Case>, CatalogError> {
    read_jsonl(path)
}
