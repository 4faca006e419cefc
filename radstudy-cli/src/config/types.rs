use radstudy_core::catalog::AssetPaths;
use radstudy_core::{CategoryPalette, ConditionPolicy, GuidelineOptions, StorageConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default host for the survey server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the survey server
pub const DEFAULT_PORT: u16 = 5000;
/// Default asset directory, relative to the working directory
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStudyConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub assets: RawAssetsConfig,

    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub condition: RawConditionConfig,

    #[serde(default)]
    pub palette: RawPaletteConfig,

    #[serde(default)]
    pub guidelines: RawGuidelinesConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAssetsConfig {
    /// Directory holding cases, guidelines and study options
    pub dir: Option<PathBuf>,
}

/// Storage backends selectable from config or the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Jsonl,
    Sqlite,
    Relay,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    pub backend: Option<StorageBackend>,
    /// File used by the jsonl and sqlite backends
    pub path: Option<PathBuf>,
    /// Form URL used by the relay backend
    pub url_template: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConditionConfig {
    pub demo_identifier: Option<String>,
    pub forced_timed: Option<Vec<String>>,
}

/// `[palette]`: `default` plus one `<category> = <colour>` entry per category
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPaletteConfig {
    pub default: Option<String>,
    #[serde(flatten)]
    pub categories: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawGuidelinesConfig {
    #[serde(default)]
    pub scenario_overrides: BTreeMap<String, String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize)]
pub struct StudyConfig {
    pub server: ServerConfig,
    pub assets: AssetPaths,
    pub storage: StorageConfig,
    pub condition: ConditionPolicy,
    pub palette: CategoryPalette,
    pub guidelines: GuidelineOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[server]
port = 9000

[storage]
backend = "sqlite"
"#;
        let raw: RawStudyConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.server.port, Some(9000));
        assert!(raw.server.host.is_none());
        assert_eq!(raw.storage.backend, Some(StorageBackend::Sqlite));
        assert!(raw.storage.path.is_none());
    }

    #[test]
    fn test_raw_config_empty_uses_none() {
        let raw: RawStudyConfig = toml::from_str("").unwrap();

        assert!(raw.server.port.is_none());
        assert!(raw.assets.dir.is_none());
        assert!(raw.condition.forced_timed.is_none());
        assert!(raw.palette.categories.is_empty());
    }

    #[test]
    fn test_palette_entries_are_flattened() {
        let toml_str = r#"
[palette]
default = "black"
"Usually appropriate" = "teal"
"#;
        let raw: RawStudyConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.palette.default.as_deref(), Some("black"));
        assert_eq!(
            raw.palette.categories.get("Usually appropriate").map(String::as_str),
            Some("teal")
        );
        assert!(!raw.palette.categories.contains_key("default"));
    }

    #[test]
    fn test_scenario_overrides_parse() {
        let toml_str = r#"
[guidelines.scenario_overrides]
"Suspected Pulmonary Embolism" = "Suspected pulmonary embolism. Pregnant patient."
"#;
        let raw: RawStudyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(raw.guidelines.scenario_overrides.len(), 1);
    }
}
