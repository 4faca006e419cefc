//! Server error types

use radstudy_core::{CatalogError, SinkError};
use thiserror::Error;

/// Errors that can occur while starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Study content could not be loaded
    #[error("failed to load study content: {0}")]
    Catalog(#[from] CatalogError),

    /// Response sink could not be opened
    #[error("failed to open response storage: {0}")]
    Storage(#[from] SinkError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
