//! Ledger errors

use thiserror::Error;

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Another appender won the race for this sequence number; the caller
    /// should re-read the tail and retry. `Ledger::append` does this
    /// transparently up to a bounded retry count.
    #[error("Append race lost for loan {loan_id} at sequence {sequence}")]
    RaceLost { loan_id: String, sequence: u64 },

    /// Append retries exhausted; never resolved by guessing a sequence number.
    #[error("Concurrent appends to loan {loan_id} exceeded {attempts} retries")]
    ConcurrencyConflict { loan_id: String, attempts: u32 },

    #[error("loan_id cannot be empty")]
    EmptyLoanId,

    #[error("performed_by cannot be empty")]
    EmptyPerformedBy,

    #[error("Ledger store lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
