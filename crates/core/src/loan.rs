//! Loan domain type
//!
//! A loan is created at sanction and never deleted. Its status transitions
//! are driven by ledger events; the struct here is the read-side shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A geographic point (beneficiary home / expected asset location).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Loan lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Sanctioned,
    Disbursed,
    UnderVerification,
    Verified,
    Flagged,
    Closed,
}

/// A sanctioned, government-backed loan under utilization verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub beneficiary_id: String,
    /// Loan product/scheme record; carries the applicable rule set
    pub loan_details_id: String,
    pub rule_set_id: String,
    pub sanction_amount: Decimal,
    pub sanction_date: DateTime<Utc>,
    /// Where the financed asset is expected to be (for GPS checks)
    pub expected_location: Option<GeoPoint>,
    pub status: LoanStatus,
}
