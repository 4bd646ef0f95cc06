//! Scheduled verification sweep
//!
//! Re-verifies every loan in the store, for use from a cron-style driver.
//! Findings are reported and logged; the ledger is never modified.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::store::LedgerStore;

/// Outcome of one verification sweep across all loans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub total_loans: usize,
    pub valid_loans: usize,
    pub tampered_loans: usize,
    pub tampered_loan_ids: Vec<String>,
    /// Per-loan verification errors, prefixed with the loan id
    pub errors: Vec<String>,
}

/// Verifies every loan's chain on demand.
pub struct LedgerMonitor<'a, S: LedgerStore> {
    ledger: &'a Ledger<S>,
}

impl<'a, S: LedgerStore> LedgerMonitor<'a, S> {
    pub fn new(ledger: &'a Ledger<S>) -> Self {
        Self { ledger }
    }

    /// Verify all loans known to the store.
    pub fn sweep(&self) -> LedgerResult<SweepReport> {
        let loan_ids = self.ledger.store().loan_ids()?;
        let mut report = SweepReport {
            total_loans: loan_ids.len(),
            valid_loans: 0,
            tampered_loans: 0,
            tampered_loan_ids: Vec::new(),
            errors: Vec::new(),
        };

        for loan_id in loan_ids {
            let result = self.ledger.verify(&loan_id)?;
            if result.is_valid {
                report.valid_loans += 1;
            } else {
                report.tampered_loans += 1;
                warn!(
                    loan_id = %loan_id,
                    invalid = ?result.invalid_entries,
                    broken_chain = result.broken_chain,
                    "sweep found tamper evidence"
                );
                for error in &result.errors {
                    report.errors.push(format!("{}: {}", loan_id, error));
                }
                report.tampered_loan_ids.push(loan_id);
            }
        }

        info!(
            total = report.total_loans,
            valid = report.valid_loans,
            tampered = report.tampered_loans,
            "ledger verification sweep complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LoanEvent;
    use crate::ledger::AppendRequest;
    use crate::store::MemoryStore;

    fn seed(ledger: &Ledger<MemoryStore>, loan_id: &str, n: u64) {
        for i in 1..=n {
            ledger
                .append(AppendRequest::new(
                    loan_id,
                    LoanEvent::SubmissionCreated {
                        submission_id: format!("SUB-{}-{}", loan_id, i),
                        media_count: 4,
                        previous_submission_id: None,
                    },
                    "system",
                ))
                .unwrap();
        }
    }

    #[test]
    fn test_sweep_all_valid() {
        let ledger = Ledger::new(MemoryStore::new());
        seed(&ledger, "LOAN-A", 3);
        seed(&ledger, "LOAN-B", 2);

        let report = LedgerMonitor::new(&ledger).sweep().unwrap();
        assert_eq!(report.total_loans, 2);
        assert_eq!(report.valid_loans, 2);
        assert_eq!(report.tampered_loans, 0);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_sweep_reports_tampered_loans() {
        let ledger = Ledger::new(MemoryStore::new());
        seed(&ledger, "LOAN-A", 3);
        seed(&ledger, "LOAN-B", 3);

        ledger
            .store()
            .overwrite_entry("LOAN-B", 2, |entry| {
                entry.performed_by = "intruder".to_string();
            })
            .unwrap();

        let report = LedgerMonitor::new(&ledger).sweep().unwrap();
        assert_eq!(report.valid_loans, 1);
        assert_eq!(report.tampered_loans, 1);
        assert_eq!(report.tampered_loan_ids, vec!["LOAN-B"]);
        assert!(report.errors.iter().all(|e| e.starts_with("LOAN-B:")));
    }

    #[test]
    fn test_sweep_survives_garbage_hash_bytes() {
        // One chain poisoned with a non-hex multibyte hash must not stop
        // the sweep from reporting on the remaining loans.
        let ledger = Ledger::new(MemoryStore::new());
        seed(&ledger, "LOAN-A", 2);
        seed(&ledger, "LOAN-B", 2);

        ledger
            .store()
            .overwrite_entry("LOAN-A", 1, |entry| {
                entry.current_hash = "aaaaaaaaaaaaaaaé-tampered".to_string();
            })
            .unwrap();

        let report = LedgerMonitor::new(&ledger).sweep().unwrap();
        assert_eq!(report.total_loans, 2);
        assert_eq!(report.valid_loans, 1);
        assert_eq!(report.tampered_loan_ids, vec!["LOAN-A"]);
    }

    #[test]
    fn test_sweep_empty_store() {
        let ledger = Ledger::new(MemoryStore::new());
        let report = LedgerMonitor::new(&ledger).sweep().unwrap();
        assert_eq!(report.total_loans, 0);
    }
}
