//! LoanGuard Conflict Detector - AI/officer divergence analysis
//!
//! When an officer's review decision diverges from the engine's assessment,
//! the detector produces a `Conflict` record for audit oversight. The
//! divergence rule is an injected predicate (`ConflictRule`); the default
//! `RiskOverrideRule` marks risk-increasing overrides (engine flagged risk,
//! officer approved anyway) as detected conflicts. Review remarks are
//! scored 0-10 by an injected `SentimentAnalyzer`; analyzer failure
//! degrades to a neutral score rather than failing the detection.

pub mod detector;
pub mod error;
pub mod record;
pub mod rule;
pub mod sentiment;

pub use detector::{ConflictDetector, DetectorConfig};
pub use error::{ConflictError, ConflictResult};
pub use record::{Conflict, ConflictKind};
pub use rule::{ConflictRule, Divergence, RiskOverrideRule};
pub use sentiment::{MockSentiment, SentimentAnalyzer, NEUTRAL_SENTIMENT};
