//! Loan lifecycle events
//!
//! Each event type is a variant with its own explicit schema. Events are
//! schema-validated by serde before they are canonicalized and hashed;
//! the ledger never hashes an untyped blob.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use loanguard_core::{Decision, FlagType, LoanStatus, ReviewDecision, SubmissionStatus};

/// Events appended to a loan's audit ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LoanEvent {
    /// Loan record created at sanction
    LoanCreated {
        beneficiary_id: String,
        loan_details_id: String,
        rule_set_id: String,
        sanction_amount: Decimal,
        status: LoanStatus,
    },

    /// Bank disbursed the sanctioned funds
    LoanDisbursed {
        disbursement_method: String,
        transaction_id: String,
        disbursement_date: DateTime<Utc>,
    },

    /// Beneficiary filed an evidence submission
    SubmissionCreated {
        submission_id: String,
        media_count: usize,
        previous_submission_id: Option<String>,
    },

    /// The risk engine evaluated a submission
    AiEvaluated {
        submission_id: String,
        rule_set_id: String,
        rule_set_version: u32,
        risk_score: u8,
        decision: Decision,
        flags: Vec<FlagType>,
    },

    /// An officer recorded a manual review decision
    OfficerReviewed {
        submission_id: String,
        decision: ReviewDecision,
        remarks: String,
        officer_id: String,
    },

    /// A submission's status moved along its state machine
    StatusChanged {
        submission_id: String,
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    /// Beneficiary appealed a rejection
    Appealed {
        submission_id: String,
        reason: String,
    },
}

impl LoanEvent {
    /// Stable event-type name, as used in the serialized tag and the hash.
    pub fn type_name(&self) -> &'static str {
        match self {
            LoanEvent::LoanCreated { .. } => "loan_created",
            LoanEvent::LoanDisbursed { .. } => "loan_disbursed",
            LoanEvent::SubmissionCreated { .. } => "submission_created",
            LoanEvent::AiEvaluated { .. } => "ai_evaluated",
            LoanEvent::OfficerReviewed { .. } => "officer_reviewed",
            LoanEvent::StatusChanged { .. } => "status_changed",
            LoanEvent::Appealed { .. } => "appealed",
        }
    }

    /// The submission this event concerns, when it concerns one.
    pub fn submission_id(&self) -> Option<&str> {
        match self {
            LoanEvent::SubmissionCreated { submission_id, .. }
            | LoanEvent::AiEvaluated { submission_id, .. }
            | LoanEvent::OfficerReviewed { submission_id, .. }
            | LoanEvent::StatusChanged { submission_id, .. }
            | LoanEvent::Appealed { submission_id, .. } => Some(submission_id),
            LoanEvent::LoanCreated { .. } | LoanEvent::LoanDisbursed { .. } => None,
        }
    }

    /// Create a StatusChanged event.
    pub fn status_changed(
        submission_id: impl Into<String>,
        from: SubmissionStatus,
        to: SubmissionStatus,
    ) -> Self {
        LoanEvent::StatusChanged {
            submission_id: submission_id.into(),
            from,
            to,
        }
    }

    /// Create an OfficerReviewed event.
    pub fn officer_reviewed(
        submission_id: impl Into<String>,
        decision: ReviewDecision,
        remarks: impl Into<String>,
        officer_id: impl Into<String>,
    ) -> Self {
        LoanEvent::OfficerReviewed {
            submission_id: submission_id.into(),
            decision,
            remarks: remarks.into(),
            officer_id: officer_id.into(),
        }
    }
}
