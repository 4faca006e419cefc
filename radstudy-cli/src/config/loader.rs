use super::types::{
    DEFAULT_ASSETS_DIR, DEFAULT_HOST, DEFAULT_PORT, RawAssetsConfig, RawConditionConfig,
    RawGuidelinesConfig, RawPaletteConfig, RawServerConfig, RawStorageConfig, RawStudyConfig,
    ServerConfig, StorageBackend, StudyConfig,
};
use anyhow::{Context, Result, bail};
use radstudy_core::catalog::AssetPaths;
use radstudy_core::{CategoryPalette, ConditionPolicy, GuidelineOptions, StorageConfig};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<StudyConfig> {
        Self::finalize(Self::load_raw()?)
    }

    /// Load the merged raw layers without applying defaults
    pub fn load_raw() -> Result<RawStudyConfig> {
        Self::load_layers(&[Self::user_config_path(), Self::project_config_path()])
    }

    /// Merge config files in order; missing files are skipped
    pub fn load_layers(paths: &[PathBuf]) -> Result<RawStudyConfig> {
        let mut raw = RawStudyConfig::default();
        for path in paths {
            if let Some(layer) = Self::read_layer(path)? {
                tracing::debug!("loaded config layer {}", path.display());
                raw = Self::merge_raw(raw, layer);
            }
        }
        Ok(raw)
    }

    fn read_layer(path: &Path) -> Result<Option<RawStudyConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let layer = toml::from_str(&contents)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        Ok(Some(layer))
    }

    /// Get user config path
    pub fn user_config_path() -> PathBuf {
        radstudy_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with RADSTUDY_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("RADSTUDY_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".radstudy/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    pub fn merge_raw(base: RawStudyConfig, overlay: RawStudyConfig) -> RawStudyConfig {
        let mut categories = base.palette.categories;
        categories.extend(overlay.palette.categories);
        let mut scenario_overrides = base.guidelines.scenario_overrides;
        scenario_overrides.extend(overlay.guidelines.scenario_overrides);

        RawStudyConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            assets: RawAssetsConfig {
                dir: overlay.assets.dir.or(base.assets.dir),
            },
            storage: RawStorageConfig {
                backend: overlay.storage.backend.or(base.storage.backend),
                path: overlay.storage.path.or(base.storage.path),
                url_template: overlay.storage.url_template.or(base.storage.url_template),
            },
            condition: RawConditionConfig {
                demo_identifier: overlay
                    .condition
                    .demo_identifier
                    .or(base.condition.demo_identifier),
                forced_timed: overlay.condition.forced_timed.or(base.condition.forced_timed),
            },
            palette: RawPaletteConfig {
                default: overlay.palette.default.or(base.palette.default),
                categories,
            },
            guidelines: RawGuidelinesConfig { scenario_overrides },
        }
    }

    /// Convert raw config to final config with defaults applied
    pub fn finalize(raw: RawStudyConfig) -> Result<StudyConfig> {
        let storage = Self::finalize_storage(raw.storage)?;

        let mut condition = ConditionPolicy::default();
        if let Some(demo_identifier) = raw.condition.demo_identifier {
            condition.demo_identifier = demo_identifier;
        }
        condition.forced_timed = raw.condition.forced_timed.unwrap_or_default().into_iter().collect();

        let mut palette = CategoryPalette::default();
        if let Some(default) = raw.palette.default {
            palette.default = default;
        }
        palette.categories.extend(raw.palette.categories);

        Ok(StudyConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            assets: AssetPaths::in_dir(
                raw.assets
                    .dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            ),
            storage,
            condition,
            palette,
            guidelines: GuidelineOptions {
                scenario_overrides: raw.guidelines.scenario_overrides,
            },
        })
    }

    fn finalize_storage(raw: RawStorageConfig) -> Result<StorageConfig> {
        let backend = raw.backend.unwrap_or(StorageBackend::Jsonl);
        Ok(match backend {
            StorageBackend::Jsonl => StorageConfig::Jsonl {
                path: raw
                    .path
                    .unwrap_or_else(radstudy_paths::default_responses_path),
            },
            StorageBackend::Sqlite => StorageConfig::Sqlite {
                path: raw
                    .path
                    .unwrap_or_else(|| radstudy_paths::data_dir().join("results.db")),
            },
            StorageBackend::Relay => match raw.url_template {
                Some(url_template) => StorageConfig::Relay { url_template },
                None => bail!("storage.url_template is required for the relay backend"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", contents).unwrap();
        path
    }

    // ==================== Load Tests ====================

    #[test]
    fn test_missing_layers_give_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let raw = ConfigLoader::load_layers(&[temp_dir.path().join("nope.toml")]).unwrap();
        let config = ConfigLoader::finalize(raw).unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.assets.dir, PathBuf::from(DEFAULT_ASSETS_DIR));
        assert!(matches!(config.storage, StorageConfig::Jsonl { .. }));
        assert_eq!(config.condition, ConditionPolicy::default());
        assert_eq!(config.palette, CategoryPalette::default());
    }

    #[test]
    fn test_project_layer_overrides_user_layer() {
        let temp_dir = TempDir::new().unwrap();
        let user = write_config(
            temp_dir.path(),
            "user.toml",
            r#"
[server]
host = "0.0.0.0"
port = 8000

[condition]
forced_timed = ["resident-1"]

[palette]
"May be appropriate" = "orange"
"#,
        );
        let project = write_config(
            temp_dir.path(),
            "project.toml",
            r#"
[server]
port = 9000

[storage]
backend = "sqlite"
path = "/var/lib/radstudy/results.db"

[palette]
default = "white"
"#,
        );

        let raw = ConfigLoader::load_layers(&[user, project]).unwrap();
        let config = ConfigLoader::finalize(raw).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("/var/lib/radstudy/results.db")
            }
        );
        assert!(config.condition.forced_timed.contains("resident-1"));
        assert_eq!(config.palette.default, "white");
        assert_eq!(config.palette.colour("May be appropriate"), "orange");
        assert_eq!(config.palette.colour("Usually appropriate"), "green");
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "invalid.toml", "this is not valid toml {{{{");

        let result = ConfigLoader::load_layers(&[path]);
        assert!(result.is_err());
    }

    #[test]
    fn test_relay_requires_template() {
        let raw: RawStudyConfig = toml::from_str("[storage]\nbackend = \"relay\"").unwrap();
        let err = ConfigLoader::finalize(raw).unwrap_err();
        assert!(err.to_string().contains("url_template"));

        let raw: RawStudyConfig = toml::from_str(
            "[storage]\nbackend = \"relay\"\nurl_template = \"https://forms.example.com/r?u={user}&a={answer}\"",
        )
        .unwrap();
        let config = ConfigLoader::finalize(raw).unwrap();
        assert_eq!(config.storage.backend_name(), "relay");
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_raw_none_preserves_base() {
        let base = RawStudyConfig {
            server: RawServerConfig {
                host: Some("0.0.0.0".to_string()),
                port: Some(9000),
            },
            condition: RawConditionConfig {
                demo_identifier: Some("walkthrough".to_string()),
                forced_timed: Some(vec!["a".to_string()]),
            },
            ..Default::default()
        };

        let merged = ConfigLoader::merge_raw(base, RawStudyConfig::default());

        assert_eq!(merged.server.host, Some("0.0.0.0".to_string()));
        assert_eq!(merged.server.port, Some(9000));
        assert_eq!(merged.condition.demo_identifier.as_deref(), Some("walkthrough"));
        assert_eq!(merged.condition.forced_timed, Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_merge_raw_extends_maps() {
        let mut base = RawStudyConfig::default();
        base.guidelines
            .scenario_overrides
            .insert("Chest Pain".to_string(), "base".to_string());
        base.guidelines
            .scenario_overrides
            .insert("Headache".to_string(), "base".to_string());
        let mut overlay = RawStudyConfig::default();
        overlay
            .guidelines
            .scenario_overrides
            .insert("Chest Pain".to_string(), "overlay".to_string());

        let merged = ConfigLoader::merge_raw(base, overlay);
        let overrides = &merged.guidelines.scenario_overrides;
        assert_eq!(overrides.get("Chest Pain").map(String::as_str), Some("overlay"));
        assert_eq!(overrides.get("Headache").map(String::as_str), Some("base"));
    }

    // ==================== Path Tests ====================

    #[test]
    fn test_user_config_path_is_under_radstudy() {
        let path = ConfigLoader::user_config_path();
        assert!(path.ends_with("radstudy/config.toml"));
    }

    #[test]
    #[serial]
    fn test_project_config_path_default() {
        unsafe {
            std::env::remove_var("RADSTUDY_PROJECT_CONFIG_DIR");
        }
        assert_eq!(
            ConfigLoader::project_config_path(),
            PathBuf::from(".radstudy/config.toml")
        );
    }

    #[test]
    #[serial]
    fn test_project_config_path_env_override() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), "config.toml", "[server]\nport = 6100");
        unsafe {
            std::env::set_var("RADSTUDY_PROJECT_CONFIG_DIR", temp_dir.path());
        }

        let path = ConfigLoader::project_config_path();
        let raw = ConfigLoader::load_layers(&[path.clone()]).unwrap();

        unsafe {
            std::env::remove_var("RADSTUDY_PROJECT_CONFIG_DIR");
        }
        assert_eq!(path, temp_dir.path().join("config.toml"));
        assert_eq!(raw.server.port, Some(6100));
    }
}
