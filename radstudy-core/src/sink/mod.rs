//! Response persistence.
//!
//! Exactly one [`ResponseSink`] is active per deployment:
//! - [`FormRelaySink`] forwards each response to a remote form endpoint
//! - [`SqliteSink`] inserts a row into a local libSQL table
//! - [`JsonlSink`] appends a line to a local file
//!
//! [`MemorySink`] keeps responses in memory for tests and dry runs.

mod error;
mod jsonl;
mod memory;
mod relay;
mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{FailureKind, SinkError};
pub use jsonl::JsonlSink;
pub use memory::MemorySink;
pub use relay::FormRelaySink;
pub use sqlite::SqliteSink;

use crate::submission::SubmittedResponse;

/// Destination for submitted responses.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Persist one response. Failures are reported once and never retried.
    async fn record(&self, response: &SubmittedResponse) -> Result<(), SinkError>;
}

/// Which persistence strategy is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Forward to a remote form endpoint.
    Relay { url_template: String },
    /// Insert into a local libSQL database.
    Sqlite { path: PathBuf },
    /// Append to a JSON-lines file.
    Jsonl { path: PathBuf },
}

impl StorageConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Relay { .. } => "relay",
            Self::Sqlite { .. } => "sqlite",
            Self::Jsonl { .. } => "jsonl",
        }
    }
}

/// Open the sink described by `config`.
pub async fn open_sink(config: &StorageConfig) -> Result<Arc<dyn ResponseSink>, SinkError> {
    let sink: Arc<dyn ResponseSink> = match config {
        StorageConfig::Relay { url_template } => Arc::new(FormRelaySink::new(url_template.clone())?),
        StorageConfig::Sqlite { path } => Arc::new(SqliteSink::new_local(path).await?),
        StorageConfig::Jsonl { path } => Arc::new(JsonlSink::new(path.clone())),
    };
    tracing::info!(backend = config.backend_name(), "response sink ready");
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_config_is_tagged_by_backend() {
        let config: StorageConfig =
            serde_json::from_str(r#"{"backend": "sqlite", "path": "/tmp/results.db"}"#).unwrap();
        assert_eq!(
            config,
            StorageConfig::Sqlite {
                path: PathBuf::from("/tmp/results.db")
            }
        );
        assert_eq!(config.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn opens_jsonl_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = open_sink(&StorageConfig::Jsonl {
            path: dir.path().join("responses.jsonl"),
        })
        .await
        .unwrap();
        assert_eq!(sink.name(), "jsonl");
    }

    #[tokio::test]
    async fn relay_template_without_user_placeholder_is_rejected() {
        let result = open_sink(&StorageConfig::Relay {
            url_template: "https://forms.example.com/submit".to_string(),
        })
        .await;
        assert!(matches!(result, Err(SinkError::InvalidTemplate(_))));
    }
}
