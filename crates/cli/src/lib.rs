//! LoanGuard CLI - command orchestration
//!
//! This crate provides the `loanguard` binary: ledger operations
//! (append/history/verify/status), the verification sweep, and risk
//! evaluation of submission files.

pub mod commands;
pub mod context;

pub use context::AppContext;
