//! Divergence classification rules
//!
//! The exact rule combining engine and officer decisions is deliberately a
//! pluggable predicate; deployments differ on whether overriding a
//! MANUAL_REVIEW counts as a conflict.

use loanguard_core::{Decision, ReviewDecision};

/// How a (engine decision, officer decision) pair is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    /// Decisions agree, or the officer followed the engine's steer
    None,
    /// Decisions diverge in a risk-reducing direction; recorded for the
    /// trail with `conflict_detected = false`
    Noted,
    /// Risk-increasing override: the engine flagged risk, the officer
    /// approved anyway
    RiskOverride,
}

pub trait ConflictRule: Send + Sync {
    fn classify(&self, engine: Decision, officer: ReviewDecision) -> Divergence;
}

/// Default rule.
///
/// - Engine HIGH_RISK or INCOMPLETE, officer APPROVED: risk override.
/// - Engine MANUAL_REVIEW, officer APPROVED: risk override only when
///   `manual_review_counts` is set; otherwise that is the normal manual
///   workflow.
/// - Engine AUTO_APPROVE, officer REJECTED or ASK_RESUBMISSION: noted
///   divergence, not a detected conflict.
#[derive(Debug, Clone, Default)]
pub struct RiskOverrideRule {
    pub manual_review_counts: bool,
}

impl ConflictRule for RiskOverrideRule {
    fn classify(&self, engine: Decision, officer: ReviewDecision) -> Divergence {
        match (engine, officer) {
            (Decision::HighRisk | Decision::Incomplete, ReviewDecision::Approved) => {
                Divergence::RiskOverride
            }
            (Decision::ManualReview, ReviewDecision::Approved) if self.manual_review_counts => {
                Divergence::RiskOverride
            }
            (
                Decision::AutoApprove,
                ReviewDecision::Rejected | ReviewDecision::AskResubmission,
            ) => Divergence::Noted,
            _ => Divergence::None,
        }
    }
}
