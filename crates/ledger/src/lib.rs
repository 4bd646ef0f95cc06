//! LoanGuard Ledger - Append-only hash-chained audit trail
//!
//! Every lifecycle event of a loan is appended here as an immutable,
//! sequence-numbered, hash-linked entry. There is no update or delete
//! operation; that is the central design constraint of this crate.
//!
//! # Key Types
//! - `LoanEvent`: tagged union of lifecycle events, one schema per kind
//! - `LedgerEntry`: one persisted, hash-linked record
//! - `Ledger`: append/history/verify/status over a pluggable `LedgerStore`
//! - `LedgerVerificationResult`: tamper-evidence report, computed on demand
//!
//! # Known limitation
//! An attacker with write access to the whole chain who recomputes every
//! downstream hash after a forged edit produces an internally consistent
//! but false chain. Detecting that requires anchoring the tail hash in an
//! independent append-only store, which is outside this crate.

pub mod canonical;
pub mod entry;
pub mod error;
pub mod event;
pub mod hash;
pub mod ledger;
pub mod monitor;
pub mod store;
pub mod verify;

pub use canonical::canonical_json;
pub use entry::LedgerEntry;
pub use error::{LedgerError, LedgerResult};
pub use event::LoanEvent;
pub use hash::{entry_hash, GENESIS_HASH};
pub use ledger::{AppendRequest, Ledger, LedgerStatus};
pub use monitor::{LedgerMonitor, SweepReport};
pub use store::{JsonlStore, LedgerStore, MemoryStore};
pub use verify::{verify_entries, LedgerVerificationResult};
