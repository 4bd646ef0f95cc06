//! Automated decision bands produced by the risk engine

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Outcome of a risk evaluation, determined by comparing the risk score to
/// the rule set thresholds (or `Incomplete` when the submission never
/// reached scoring).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Score within the auto-approve band; no human review needed
    AutoApprove,
    /// Score requires an officer's review (also the fail-safe band)
    ManualReview,
    /// Score at or above the high-risk floor
    HighRisk,
    /// Media requirements unmet; submission was never scored
    Incomplete,
}

impl Decision {
    /// Whether the engine considered the submission risky enough that an
    /// officer approval against it counts as a risk-increasing override.
    pub fn is_adverse(&self) -> bool {
        matches!(self, Decision::HighRisk | Decision::Incomplete)
    }
}
