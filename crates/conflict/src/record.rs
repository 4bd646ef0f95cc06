//! The conflict record
//!
//! A derived, read-only artifact. It never feeds back into the risk score
//! or the ledger chain; it exists for supervisory review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use loanguard_core::{Decision, ReviewDecision};

/// How the conflict was found.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    /// The officer's decision diverged from the engine's
    DecisionBased,
    /// Remarks sentiment contradicted the officer's own decision
    SentimentBased,
}

/// One detected (or merely noted) divergence between the engine and an
/// officer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    pub submission_id: String,
    pub officer_id: String,
    pub tenant_id: String,
    /// True for risk-increasing overrides; false for divergences recorded
    /// for the trail only
    pub conflict_detected: bool,
    pub conflict_kind: ConflictKind,
    /// 0 = very negative, 5 = neutral, 10 = very positive
    pub sentiment_score: u8,
    /// Engine-side rationale (score and flags)
    pub ai_reason: String,
    pub officer_remarks: String,
    pub ai_decision: Decision,
    pub officer_decision: ReviewDecision,
    pub created_at: DateTime<Utc>,
}
