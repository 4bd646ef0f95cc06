//! Conflict detection errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConflictError {
    /// Sentiment analyzer failure. Only surfaces when the detector is
    /// configured to require the analyzer; the default mode degrades to a
    /// neutral score instead.
    #[error("Sentiment analyzer error: {0}")]
    Analyzer(String),
}

pub type ConflictResult<T> = Result<T, ConflictError>;
