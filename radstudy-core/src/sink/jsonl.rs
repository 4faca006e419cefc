//! Append-only JSON-lines response file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::instrument;

use super::{ResponseSink, SinkError};
use crate::submission::SubmittedResponse;

/// File-backed response sink; every submission appends one line.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Read back every recorded response, skipping unparsable lines.
    pub async fn read_all(&self) -> Result<Vec<SubmittedResponse>, SinkError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = tokio::fs::File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut responses = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(response) => responses.push(response),
                Err(e) => tracing::warn!("skipping unreadable response line: {}", e),
            }
        }
        Ok(responses)
    }
}

#[async_trait]
impl ResponseSink for JsonlSink {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    #[instrument(skip(self, response), fields(identifier = %response.identifier), level = "debug")]
    async fn record(&self, response: &SubmittedResponse) -> Result<(), SinkError> {
        self.ensure_parent_dir().await?;

        let mut line = serde_json::to_string(response)?;
        line.push('\n');

        // Single write per record so concurrent appends do not interleave.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
