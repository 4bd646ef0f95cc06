//! Submissions, their status machine, and officer reviews
//!
//! Status flow: `PENDING_AI → AI_COMPLETED → UNDER_REVIEW → {APPROVED,
//! REJECTED, NEED_RESUBMISSION}`. A submission asked to resubmit is
//! terminal; the beneficiary files a *new* submission referencing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::media::Media;

/// Submission lifecycle status, driven by ledger events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    PendingAi,
    AiCompleted,
    UnderReview,
    Approved,
    Rejected,
    NeedResubmission,
}

impl SubmissionStatus {
    /// Whether this status admits no further transitions for this
    /// submission. `NEED_RESUBMISSION` is terminal too: the follow-up is a
    /// new submission, not a transition of this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Approved
                | SubmissionStatus::Rejected
                | SubmissionStatus::NeedResubmission
        )
    }

    /// Validate a transition and return the new status.
    pub fn transition(self, to: SubmissionStatus) -> Result<SubmissionStatus, StatusError> {
        let allowed = match self {
            SubmissionStatus::PendingAi => matches!(to, SubmissionStatus::AiCompleted),
            SubmissionStatus::AiCompleted => matches!(to, SubmissionStatus::UnderReview),
            SubmissionStatus::UnderReview => matches!(
                to,
                SubmissionStatus::Approved
                    | SubmissionStatus::Rejected
                    | SubmissionStatus::NeedResubmission
            ),
            _ => false,
        };

        if allowed {
            Ok(to)
        } else {
            Err(StatusError::InvalidTransition { from: self, to })
        }
    }
}

/// Invalid status transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Invalid submission status transition: {from} -> {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },
}

/// Device-side capture context, recorded at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CaptureContext {
    /// GPS fix of the capturing device
    pub device_lat: Option<f64>,
    pub device_lng: Option<f64>,
    /// Whether the OS reported the fix as mocked/spoofed
    #[serde(default)]
    pub is_mock_location: bool,
}

/// A beneficiary's evidence bundle for one verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub loan_id: String,
    pub media: Vec<Media>,
    pub device_info: String,
    pub capture_context: CaptureContext,
    pub status: SubmissionStatus,
    /// Set when this submission replaces one that was asked to resubmit
    #[serde(default)]
    pub previous_submission_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// An officer's manual decision on a submission. At most one active review
/// per submission; superseding reviews are new ledger events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub submission_id: String,
    pub review_decision: ReviewDecision,
    pub review_remarks: String,
    pub reviewed_by_officer_id: String,
    pub reviewed_at: DateTime<Utc>,
}

/// Officer review outcomes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    AskResubmission,
}
