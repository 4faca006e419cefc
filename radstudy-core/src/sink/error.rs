//! Sink error types.

use thiserror::Error;

/// Errors from persisting a response.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Remote endpoint could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Remote endpoint answered with a non-success status.
    #[error("endpoint rejected submission with status {status}")]
    Rejected { status: u16 },

    /// Relay URL template is unusable.
    #[error("invalid relay template: {0}")]
    InvalidTemplate(String),

    /// A response for this identifier already exists.
    #[error("response already recorded for {0}")]
    AlreadyRecorded(String),

    #[error("database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse failure category shown to participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connection,
    Post,
    Duplicate,
    Storage,
}

impl FailureKind {
    /// Path segment of the error view.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Post => "post",
            Self::Duplicate => "duplicate",
            Self::Storage => "storage",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "connection" => Some(Self::Connection),
            "post" => Some(Self::Post),
            "duplicate" => Some(Self::Duplicate),
            "storage" => Some(Self::Storage),
            _ => None,
        }
    }
}

impl SinkError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connection(_) => FailureKind::Connection,
            Self::Rejected { .. } => FailureKind::Post,
            Self::AlreadyRecorded(_) => FailureKind::Duplicate,
            Self::InvalidTemplate(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Serialization(_) => FailureKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_view_slugs() {
        assert_eq!(SinkError::Connection("refused".into()).kind().as_str(), "connection");
        assert_eq!(SinkError::Rejected { status: 404 }.kind().as_str(), "post");
        assert_eq!(SinkError::AlreadyRecorded("u1".into()).kind().as_str(), "duplicate");
        assert_eq!(
            SinkError::Io(std::io::Error::other("disk full")).kind().as_str(),
            "storage"
        );
    }

    #[test]
    fn slugs_parse_back() {
        assert_eq!(FailureKind::from_slug("post"), Some(FailureKind::Post));
        assert_eq!(FailureKind::from_slug("<script>"), None);
    }

    #[test]
    fn rejected_display_includes_status() {
        let err = SinkError::Rejected { status: 503 };
        assert_eq!(err.to_string(), "endpoint rejected submission with status 503");
    }
}
