//! Error types for radstudy-core

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::sink::SinkError;
use crate::submission::SubmissionError;

/// Top-level error type for radstudy-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Storage error: {0}")]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, Error>;
