//! Shared application state for the radstudy server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use radstudy_core::catalog::AssetPaths;
use radstudy_core::{
    CategoryPalette, ConditionPolicy, GuidelineOptions, ResponseSink, StorageConfig, StudyCatalog,
    open_sink,
};

use crate::ServerError;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Live case set
    pub catalog: Arc<StudyCatalog>,
    /// Case set served to the demo identifier
    pub demo_catalog: Arc<StudyCatalog>,
    /// Active response sink
    pub sink: Arc<dyn ResponseSink>,
    /// Demo and forced-timed overrides
    pub policy: ConditionPolicy,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state from already loaded components
    pub fn new(catalog: StudyCatalog, demo_catalog: StudyCatalog, sink: Arc<dyn ResponseSink>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            demo_catalog: Arc::new(demo_catalog),
            sink,
            policy: ConditionPolicy::default(),
            started_at: Utc::now(),
        }
    }

    /// Load study content from disk and open the configured sink
    pub async fn load(
        assets: &AssetPaths,
        palette: &CategoryPalette,
        guideline_options: &GuidelineOptions,
        storage: &StorageConfig,
    ) -> Result<Self, ServerError> {
        let catalog = StudyCatalog::load(assets, palette, guideline_options)?;
        let demo_catalog = StudyCatalog::load_demo(assets, palette, guideline_options)?;
        let sink = open_sink(storage).await?;
        Ok(Self::new(catalog, demo_catalog, sink))
    }

    /// Replace the condition policy
    pub fn with_policy(mut self, policy: ConditionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radstudy_core::catalog::Case;
    use radstudy_core::sink::MemorySink;

    fn catalog(texts: &[&str]) -> StudyCatalog {
        StudyCatalog::new(
            texts.iter().map(|t| Case::new(*t, vec![])).collect(),
            Default::default(),
            Default::default(),
        )
    }

    #[test]
    fn test_new_keeps_live_and_demo_catalogs_apart() {
        let state = AppState::new(catalog(&["a", "b"]), catalog(&["demo"]), Arc::new(MemorySink::new()));
        assert_eq!(state.catalog.case_count(), 2);
        assert_eq!(state.demo_catalog.case_count(), 1);
        assert!(state.uptime_seconds() >= 0);
    }

    #[test]
    fn test_with_policy_replaces_demo_identifier() {
        let policy = ConditionPolicy {
            demo_identifier: "walkthrough".to_string(),
            ..Default::default()
        };
        let state = AppState::new(catalog(&["a"]), catalog(&[]), Arc::new(MemorySink::new()))
            .with_policy(policy);
        assert!(state.policy.is_demo("Walkthrough"));
        assert!(!state.policy.is_demo("demo"));
    }

    #[tokio::test]
    async fn test_load_reports_missing_assets() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppState::load(
            &AssetPaths::in_dir(dir.path()),
            &CategoryPalette::default(),
            &GuidelineOptions::default(),
            &StorageConfig::Jsonl {
                path: dir.path().join("responses.jsonl"),
            },
        )
        .await;
        assert!(matches!(result, Err(ServerError::Catalog(_))));
    }
}
