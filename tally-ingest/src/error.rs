//! Error types for statement ingestion

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The upstream text source produced nothing usable for the whole document.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Unknown statement layout: {0}")]
    UnknownLayout(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
