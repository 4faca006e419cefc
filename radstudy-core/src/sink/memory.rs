//! In-memory response sink.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ResponseSink, SinkError};
use crate::submission::SubmittedResponse;

/// Keeps responses in memory. Useful for tests and dry runs.
#[derive(Default)]
pub struct MemorySink {
    responses: Mutex<Vec<SubmittedResponse>>,
    reject_with: Option<u16>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every response with the given status.
    pub fn rejecting(status: u16) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            reject_with: Some(status),
        }
    }

    /// Snapshot of recorded responses.
    pub async fn responses(&self) -> Vec<SubmittedResponse> {
        self.responses.lock().await.clone()
    }
}

#[async_trait]
impl ResponseSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn record(&self, response: &SubmittedResponse) -> Result<(), SinkError> {
        if let Some(status) = self.reject_with {
            return Err(SinkError::Rejected { status });
        }
        self.responses.lock().await.push(response.clone());
        Ok(())
    }
}
