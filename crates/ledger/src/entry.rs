//! Ledger entries
//!
//! An entry is immutable once persisted. `current_hash` is a pure function
//! of the entry's own fields plus `previous_hash`; it never depends on any
//! later entry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::event::LoanEvent;

/// One immutable, sequence-numbered, hash-linked record of a loan
/// lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub loan_id: String,
    /// 1-based, contiguous per loan
    pub sequence_num: u64,
    #[serde(flatten)]
    pub event: LoanEvent,
    /// Monetary amount tied to the event, if any
    pub amount: Option<Decimal>,
    pub performed_by: String,
    pub timestamp: DateTime<Utc>,
    /// `current_hash` of the preceding entry, or `GENESIS` for the first
    pub previous_hash: String,
    pub current_hash: String,
    pub ip_address: Option<String>,
}
