//! Canonical imaging-study answer options.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Option appended after the listed studies.
pub const NO_IMAGING: &str = "None";

/// Answer index recorded when free text matches no option.
pub const UNMATCHED: i64 = -1;

/// A canonical answer with the extra strings the search box should accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyOption {
    pub label: String,
    pub aliases: Vec<String>,
}

/// Ordered list of canonical answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyOptions {
    labels: Vec<String>,
}

impl StudyOptions {
    /// Build from listed study names; [`NO_IMAGING`] is appended.
    pub fn new<I, S>(studies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = studies.into_iter().map(Into::into).collect();
        labels.push(NO_IMAGING.to_string());
        Self { labels }
    }

    /// Load from a plain list file, one study per line.
    ///
    /// Blank lines are kept as empty options so every later index stays put.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(contents.lines().map(str::trim)))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Index of the option matching `answer` exactly, or [`UNMATCHED`].
    pub fn index_of(&self, answer: &str) -> i64 {
        self.labels
            .iter()
            .position(|label| label == answer)
            .map(|i| i as i64)
            .unwrap_or(UNMATCHED)
    }

    /// Options with their search aliases, in canonical order.
    pub fn with_aliases(&self) -> Vec<StudyOption> {
        self.labels
            .iter()
            .map(|label| StudyOption {
                label: label.clone(),
                aliases: search_aliases(label),
            })
            .collect()
    }
}

/// Alternate spellings a participant might type for a study.
pub fn search_aliases(study: &str) -> Vec<String> {
    let lower = study.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has_word = |w: &str| words.iter().any(|word| *word == w);

    let mut aliases = Vec::new();
    if lower.contains("radiograph") {
        aliases.extend(["X-ray", "X ray"].map(String::from));
        if lower.contains("chest") {
            aliases.extend(["CXR", "Chest X-ray", "Chest X ray"].map(String::from));
        }
    }
    if has_word("mri") {
        aliases.push("Magnetic Resonance Imaging".to_string());
    }
    if has_word("ct") || has_word("cta") {
        aliases.push("Computed Tomography".to_string());
    }
    if has_word("us") {
        aliases.push("Ultrasound".to_string());
    }
    aliases
}
