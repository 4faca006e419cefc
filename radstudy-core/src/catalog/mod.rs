//! Static study content loaded once at startup.
//!
//! A [`StudyCatalog`] bundles the ordered case list, the topic guideline
//! table and the canonical answer options. It is immutable after load and
//! shared across requests behind an `Arc`.

mod cases;
mod guidelines;
mod options;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cases::{Case, load_cases};
pub use guidelines::{
    CategoryPalette, GuidelineOptions, GuidelineRecord, GuidelineRow, GuidelineTable,
    RADIATION_SYMBOL, ScenarioRecord, StudyRecord,
};
pub use options::{NO_IMAGING, StudyOption, StudyOptions, UNMATCHED, search_aliases};

/// Errors raised while loading study content.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record in {path} at line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a JSON-lines file, skipping blank lines.
pub(crate) fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CatalogError> {
    let io_err = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut records = Vec::new();
    for (index, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// File locations of the study content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    pub dir: PathBuf,
    #[serde(default = "AssetPaths::default_cases")]
    pub cases: String,
    #[serde(default = "AssetPaths::default_demo_cases")]
    pub demo_cases: String,
    #[serde(default = "AssetPaths::default_guidelines")]
    pub guidelines: String,
    #[serde(default = "AssetPaths::default_studies")]
    pub studies: String,
}

impl AssetPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cases: Self::default_cases(),
            demo_cases: Self::default_demo_cases(),
            guidelines: Self::default_guidelines(),
            studies: Self::default_studies(),
        }
    }

    fn default_cases() -> String {
        "cases.jsonl".to_string()
    }

    fn default_demo_cases() -> String {
        "demo.jsonl".to_string()
    }

    fn default_guidelines() -> String {
        "guidelines.jsonl".to_string()
    }

    fn default_studies() -> String {
        "studies.txt".to_string()
    }

    pub fn cases_path(&self) -> PathBuf {
        self.dir.join(&self.cases)
    }

    pub fn demo_cases_path(&self) -> PathBuf {
        self.dir.join(&self.demo_cases)
    }

    pub fn guidelines_path(&self) -> PathBuf {
        self.dir.join(&self.guidelines)
    }

    pub fn studies_path(&self) -> PathBuf {
        self.dir.join(&self.studies)
    }
}

/// Immutable study content for one case set.
#[derive(Debug, Clone)]
pub struct StudyCatalog {
    pub cases: Vec<Case>,
    pub guidelines: GuidelineTable,
    pub options: StudyOptions,
}

impl StudyCatalog {
    pub fn new(cases: Vec<Case>, guidelines: GuidelineTable, options: StudyOptions) -> Self {
        Self {
            cases,
            guidelines,
            options,
        }
    }

    /// Load the live case set.
    pub fn load(
        paths: &AssetPaths,
        palette: &CategoryPalette,
        options: &GuidelineOptions,
    ) -> Result<Self, CatalogError> {
        Self::load_with_cases(&paths.cases_path(), paths, palette, options)
    }

    /// Load the demo case set, sharing guidelines and options with the live set.
    pub fn load_demo(
        paths: &AssetPaths,
        palette: &CategoryPalette,
        options: &GuidelineOptions,
    ) -> Result<Self, CatalogError> {
        Self::load_with_cases(&paths.demo_cases_path(), paths, palette, options)
    }

    fn load_with_cases(
        cases_path: &Path,
        paths: &AssetPaths,
        palette: &CategoryPalette,
        options: &GuidelineOptions,
    ) -> Result<Self, CatalogError> {
        let cases = load_cases(cases_path)?;
        let guidelines = GuidelineTable::load(&paths.guidelines_path(), palette, options)?;
        let study_options = StudyOptions::load(&paths.studies_path())?;
        tracing::info!(
            cases = cases.len(),
            topics = guidelines.len(),
            options = study_options.len(),
            source = %cases_path.display(),
            "loaded study catalog"
        );
        Ok(Self::new(cases, guidelines, study_options))
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_assets(dir: &Path) {
        std::fs::write(
            dir.join("cases.jsonl"),
            "{\"case\": \"A\", \"topics\": [\"Chest Pain\"]}\n{\"case\": \"B\", \"topics\": []}\n",
        )
        .unwrap();
        std::fs::write(dir.join("demo.jsonl"), "{\"case\": \"Demo\", \"topics\": []}\n").unwrap();
        std::fs::write(
            dir.join("guidelines.jsonl"),
            "{\"Topic\": \"Chest Pain\", \"Scenarios\": [{\"Scenario\": \"Initial\", \"Studies\": [{\"Procedure\": \"Radiography chest\", \"Adult RRL\": 1, \"Appropriateness Category\": \"Usually appropriate\"}]}]}\n",
        )
        .unwrap();
        std::fs::write(dir.join("studies.txt"), "Radiography chest\nCT head\n").unwrap();
    }

    #[test]
    fn loads_live_and_demo_sets() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let paths = AssetPaths::in_dir(dir.path());

        let live = StudyCatalog::load(&paths, &CategoryPalette::default(), &GuidelineOptions::default())
            .unwrap();
        assert_eq!(live.case_count(), 2);
        assert_eq!(live.options.len(), 3);
        assert!(live.guidelines.rows("Chest Pain").is_some());

        let demo =
            StudyCatalog::load_demo(&paths, &CategoryPalette::default(), &GuidelineOptions::default())
                .unwrap();
        assert_eq!(demo.case_count(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssetPaths::in_dir(dir.path());
        let err = StudyCatalog::load(&paths, &CategoryPalette::default(), &GuidelineOptions::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
