//! Topic-keyed imaging guideline tables.
//!
//! Guideline records are read once and flattened into display rows per topic.
//! Nothing here depends on the participant, so the table is built at load
//! time and shared read-only.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CatalogError, read_jsonl};

/// Symbol repeated once per relative radiation level.
pub const RADIATION_SYMBOL: &str = "\u{2622} ";

/// Maps appropriateness categories to display colours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPalette {
    /// Colour for categories without an explicit entry.
    #[serde(default = "default_colour")]
    pub default: String,
    /// Category name to colour.
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

fn default_colour() -> String {
    "gray".to_string()
}

impl Default for CategoryPalette {
    fn default() -> Self {
        let categories = [
            ("Usually appropriate", "green"),
            ("May be appropriate", "yellow"),
            ("Usually not appropriate", "red"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            default: default_colour(),
            categories,
        }
    }
}

impl CategoryPalette {
    pub fn colour(&self, category: &str) -> &str {
        self.categories
            .get(category)
            .map(String::as_str)
            .unwrap_or(self.default.as_str())
    }
}

/// Guideline record as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct GuidelineRecord {
    #[serde(rename = "Topic")]
    pub topic: String,
    #[serde(rename = "Scenarios", default)]
    pub scenarios: Vec<ScenarioRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRecord {
    #[serde(rename = "Scenario", default)]
    pub scenario: String,
    #[serde(rename = "Studies", default)]
    pub studies: Vec<StudyRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudyRecord {
    #[serde(rename = "Procedure")]
    pub procedure: String,
    #[serde(rename = "Adult RRL", deserialize_with = "de_level", default)]
    pub adult_rrl: u32,
    #[serde(rename = "Appropriateness Category", default)]
    pub category: String,
}

/// RRL appears both as a number and as a numeric string.
fn de_level<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Level {
        Number(u32),
        Text(String),
    }
    match Level::deserialize(deserializer)? {
        Level::Number(n) => Ok(n),
        Level::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One displayed guideline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineRow {
    pub procedure: String,
    /// Radiation symbols, or `None` for non-ionizing studies.
    pub radiation: String,
    /// Display colour of the appropriateness category.
    pub category: String,
}

/// Options controlling how records become rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineOptions {
    /// Topic to scenario name; the first scenario is used otherwise.
    #[serde(default)]
    pub scenario_overrides: BTreeMap<String, String>,
}

/// Immutable topic to rows lookup.
#[derive(Debug, Clone, Default)]
pub struct GuidelineTable {
    topics: HashMap<String, Vec<GuidelineRow>>,
}

impl GuidelineTable {
    /// Build the table from parsed records.
    pub fn from_records(
        records: Vec<GuidelineRecord>,
        palette: &CategoryPalette,
        options: &GuidelineOptions,
    ) -> Self {
        let mut topics = HashMap::with_capacity(records.len());
        for record in records {
            let scenario = match options.scenario_overrides.get(&record.topic) {
                Some(name) => record
                    .scenarios
                    .iter()
                    .find(|s| &s.scenario == name)
                    .or_else(|| {
                        tracing::warn!(topic = %record.topic, scenario = %name, "scenario override not found");
                        record.scenarios.first()
                    }),
                None => record.scenarios.first(),
            };
            let rows = scenario
                .map(|s| {
                    s.studies
                        .iter()
                        .map(|study| GuidelineRow {
                            procedure: study.procedure.clone(),
                            radiation: radiation_display(study.adult_rrl),
                            category: palette.colour(&study.category).to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            topics.insert(record.topic, rows);
        }
        Self { topics }
    }

    /// Load and build the table from a JSON-lines file.
    pub fn load(
        path: &Path,
        palette: &CategoryPalette,
        options: &GuidelineOptions,
    ) -> Result<Self, CatalogError> {
        let records = read_jsonl(path)?;
        Ok(Self::from_records(records, palette, options))
    }

    /// Rows for a topic, if the topic is known.
    pub fn rows(&self, topic: &str) -> Option<&[GuidelineRow]> {
        self.topics.get(topic).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

fn radiation_display(level: u32) -> String {
    if level == 0 {
        "None".to_string()
    } else {
        RADIATION_SYMBOL.repeat(level as usize)
    }
}
