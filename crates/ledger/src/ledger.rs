//! The ledger API: append, history, verify, status
//!
//! Append is the only write path. The next sequence number is not a
//! separate counter; it is derived from the stored tail on every append,
//! under the store's compare-and-swap, so it can never drift from the
//! actual entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entry::LedgerEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::event::LoanEvent;
use crate::hash::{entry_hash, GENESIS_HASH};
use crate::store::LedgerStore;
use crate::verify::{verify_entries, LedgerVerificationResult};

/// Bounded retries for append races before failing loudly.
const MAX_APPEND_RETRIES: u32 = 3;

/// What a caller supplies to `Ledger::append`; sequence number, hashes and
/// timestamp are computed by the ledger itself.
#[derive(Debug, Clone)]
pub struct AppendRequest {
    pub loan_id: String,
    pub event: LoanEvent,
    pub amount: Option<Decimal>,
    pub performed_by: String,
    pub ip_address: Option<String>,
}

impl AppendRequest {
    pub fn new(
        loan_id: impl Into<String>,
        event: LoanEvent,
        performed_by: impl Into<String>,
    ) -> Self {
        Self {
            loan_id: loan_id.into(),
            event,
            amount: None,
            performed_by: performed_by.into(),
            ip_address: None,
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }
}

/// Read-side summary of one loan's ledger, for admin tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStatus {
    pub loan_id: String,
    pub verification: LedgerVerificationResult,
    pub entry_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
    /// Set when verification found tamper evidence during this status call
    pub tampered_at: Option<DateTime<Utc>>,
}

/// Append-only, hash-chained audit ledger over a pluggable store.
pub struct Ledger<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append one event to a loan's chain.
    ///
    /// Reads the tail, derives `sequence_num`/`previous_hash`, hashes, and
    /// persists via the store's compare-and-swap. A lost race re-reads the
    /// new tail and retries, bounded at `MAX_APPEND_RETRIES`; exhaustion
    /// surfaces as `ConcurrencyConflict` rather than guessing a sequence
    /// number.
    pub fn append(&self, request: AppendRequest) -> LedgerResult<LedgerEntry> {
        if request.loan_id.is_empty() {
            return Err(LedgerError::EmptyLoanId);
        }
        if request.performed_by.is_empty() {
            return Err(LedgerError::EmptyPerformedBy);
        }

        for attempt in 0..MAX_APPEND_RETRIES {
            let tail = self.store.tail(&request.loan_id)?;
            let (sequence_num, previous_hash) = match &tail {
                Some(tail) => (tail.sequence_num + 1, tail.current_hash.clone()),
                None => (1, GENESIS_HASH.to_string()),
            };

            let mut entry = LedgerEntry {
                loan_id: request.loan_id.clone(),
                sequence_num,
                event: request.event.clone(),
                amount: request.amount,
                performed_by: request.performed_by.clone(),
                timestamp: Utc::now(),
                previous_hash,
                current_hash: String::new(),
                ip_address: request.ip_address.clone(),
            };
            entry.current_hash = entry_hash(&entry)?;

            match self.store.append_if_tail(&entry) {
                Ok(()) => {
                    debug!(
                        loan_id = %entry.loan_id,
                        sequence = entry.sequence_num,
                        event_type = entry.event.type_name(),
                        "ledger entry appended"
                    );
                    return Ok(entry);
                }
                Err(LedgerError::RaceLost { .. }) => {
                    debug!(
                        loan_id = %request.loan_id,
                        attempt = attempt + 1,
                        "append race lost, re-reading tail"
                    );
                    continue;
                }
                Err(other) => return Err(other),
            }
        }

        Err(LedgerError::ConcurrencyConflict {
            loan_id: request.loan_id,
            attempts: MAX_APPEND_RETRIES,
        })
    }

    /// All entries for a loan, ordered by sequence number. Pure read.
    pub fn history(&self, loan_id: &str) -> LedgerResult<Vec<LedgerEntry>> {
        self.store.load(loan_id)
    }

    /// Recompute hashes and continuity over a loan's chain. Pure read;
    /// findings are reported, never repaired.
    pub fn verify(&self, loan_id: &str) -> LedgerResult<LedgerVerificationResult> {
        let entries = self.store.load(loan_id)?;
        let result = verify_entries(&entries)?;
        if !result.is_valid {
            warn!(
                loan_id,
                invalid = ?result.invalid_entries,
                broken_chain = result.broken_chain,
                "ledger tamper evidence detected"
            );
        }
        Ok(result)
    }

    /// Verification summary plus activity metadata for admin tooling.
    pub fn status(&self, loan_id: &str) -> LedgerResult<LedgerStatus> {
        let entries = self.store.load(loan_id)?;
        let verification = verify_entries(&entries)?;
        let tampered_at = if verification.is_valid {
            None
        } else {
            warn!(loan_id, errors = ?verification.errors, "ledger status reports tampering");
            Some(Utc::now())
        };

        Ok(LedgerStatus {
            loan_id: loan_id.to_string(),
            entry_count: entries.len(),
            last_activity: entries.last().map(|e| e.timestamp),
            verification,
            tampered_at,
        })
    }
}
