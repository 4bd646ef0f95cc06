//! LoanGuard Risk Engine - Rule-driven evaluation of evidence submissions
//!
//! `RiskEngine::evaluate` turns a `Submission` plus an applicable `RuleSet`
//! into a `RiskAssessment`: a set of fraud/compliance flags, a weighted
//! 0-100 score, and a decision band. Evaluation is stateless per call and
//! deterministic for a fixed (submission, rule set version, collaborator
//! outputs) triple; only the `validated_at` stamp reads the clock.
//!
//! External classifiers/OCR/forensics are injected capability traits with
//! bounded timeouts; a persistent collaborator failure degrades to an
//! `*_UNAVAILABLE` flag instead of aborting the evaluation.

pub mod assessment;
pub mod checks;
pub mod collaborators;
pub mod engine;
pub mod error;
pub mod ruleset;
pub mod service;

pub use assessment::RiskAssessment;
pub use collaborators::{
    AssetClassifier, ClassifierVerdict, CollaboratorConfig, CollaboratorError, Collaborators,
    ForensicsReport, ImageForensics, InvoiceOcr, MockClassifier, MockForensics, MockOcr,
};
pub use engine::RiskEngine;
pub use error::{RiskError, RiskResult};
pub use ruleset::{
    AssetRules, DocumentRules, FraudDetectionRules, GpsRules, ImageQualityRules,
    MediaRequirements, MinResolution, RuleSet, Rules, Thresholds, TimeRules,
};
pub use service::ValidationService;
