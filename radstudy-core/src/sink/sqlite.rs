//! libSQL-backed response table.
//!
//! One row per participant, keyed by identifier. A second submission for the
//! same identifier is reported as [`SinkError::AlreadyRecorded`] rather than
//! overwriting the first.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Builder, Connection, Database};
use tracing::{debug, instrument};

use super::{ResponseSink, SinkError};
use crate::submission::SubmittedResponse;

/// SQL schema for the results table.
const SCHEMA_RESULTS: &str = r#"
CREATE TABLE IF NOT EXISTS results (
    uid TEXT PRIMARY KEY,
    time TEXT NOT NULL,
    response TEXT NOT NULL
)
"#;

/// SQL index for time-ordered exports.
const INDEX_RESULTS_TIME: &str = r#"
CREATE INDEX IF NOT EXISTS idx_results_time
ON results(time)
"#;

/// Row as stored in the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResult {
    pub uid: String,
    pub time: String,
    /// Wire-form entries (`Q<case>,A<answer>,<flag>`).
    pub response: Vec<String>,
}

/// Relational response sink.
#[derive(Clone)]
pub struct SqliteSink {
    db: Arc<Database>,
    /// In-memory databases live only as long as one connection.
    pinned: Option<Connection>,
}

impl SqliteSink {
    /// Open (or create) a local database file.
    pub async fn new_local(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let db = Builder::new_local(path).build().await?;
        let sink = Self {
            db: Arc::new(db),
            pinned: None,
        };
        sink.ensure_schema().await?;
        Ok(sink)
    }

    /// In-memory database (for testing).
    pub async fn new_memory() -> Result<Self, SinkError> {
        let db = Builder::new_local(":memory:").build().await?;
        let pinned = db.connect()?;
        let sink = Self {
            db: Arc::new(db),
            pinned: Some(pinned),
        };
        sink.ensure_schema().await?;
        Ok(sink)
    }

    async fn conn(&self) -> Result<Connection, SinkError> {
        match &self.pinned {
            Some(conn) => Ok(conn.clone()),
            None => Ok(self.db.connect()?),
        }
    }

    async fn ensure_schema(&self) -> Result<(), SinkError> {
        let conn = self.conn().await?;
        conn.execute(SCHEMA_RESULTS, ()).await?;
        conn.execute(INDEX_RESULTS_TIME, ()).await?;
        Ok(())
    }

    /// Fetch the stored row for an identifier.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, uid: &str) -> Result<Option<StoredResult>, SinkError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query("SELECT uid, time, response FROM results WHERE uid = ?", [uid])
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let uid: String = row.get(0)?;
        let time: String = row.get(1)?;
        let response_json: String = row.get(2)?;
        Ok(Some(StoredResult {
            uid,
            time,
            response: serde_json::from_str(&response_json)?,
        }))
    }
}

#[async_trait]
impl ResponseSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self, response), fields(identifier = %response.identifier), level = "debug")]
    async fn record(&self, response: &SubmittedResponse) -> Result<(), SinkError> {
        let conn = self.conn().await?;
        let payload = serde_json::to_string(&response.wire_entries())?;
        let inserted = conn
            .execute(
                "INSERT INTO results (uid, time, response) VALUES (?, ?, ?) ON CONFLICT(uid) DO NOTHING",
                libsql::params![response.identifier.clone(), response.timestamp(), payload],
            )
            .await?;

        if inserted == 0 {
            return Err(SinkError::AlreadyRecorded(response.identifier.clone()));
        }
        debug!("inserted result row");
        Ok(())
    }
}
