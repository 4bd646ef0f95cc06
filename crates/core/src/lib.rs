//! LoanGuard Core - Domain types
//!
//! This crate contains the fundamental types used across LoanGuard:
//! - `Loan`: a sanctioned, government-backed loan under verification
//! - `Submission`: a beneficiary's evidence bundle with its status machine
//! - `Media`: one immutable photo/video/document item of a submission
//! - `Review`: an officer's manual decision on a submission
//! - `FlagType`: discrete fraud/compliance signals raised by the risk engine

pub mod decision;
pub mod flag;
pub mod loan;
pub mod media;
pub mod submission;

pub use decision::Decision;
pub use flag::FlagType;
pub use loan::{GeoPoint, Loan, LoanStatus};
pub use media::{Media, MediaKind};
pub use submission::{
    CaptureContext, Review, ReviewDecision, StatusError, Submission, SubmissionStatus,
};
