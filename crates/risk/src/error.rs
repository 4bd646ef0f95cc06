//! Risk engine errors

use thiserror::Error;

/// Errors from rule-set loading and risk evaluation.
#[derive(Debug, Error)]
pub enum RiskError {
    /// Malformed or inconsistent rule set, rejected at load time and
    /// never partially applied.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External classifier/OCR/forensics failure that survived retries.
    /// The engine converts this into a degraded flag internally; it only
    /// surfaces from direct collaborator calls.
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("External service timed out after {0}ms")]
    ExternalServiceTimeout(u64),

    #[error("Ledger error: {0}")]
    Ledger(#[from] loanguard_ledger::LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for risk operations.
pub type RiskResult<T> = Result<T, RiskError>;
