//! Risk assessments: the scored outcome of one evaluation
//!
//! An assessment is produced exactly once per (submission, rule set
//! version) pair. Re-evaluation under a new rule set version creates a new
//! assessment; nothing is overwritten.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use loanguard_core::{Decision, FlagType};

use crate::ruleset::{RuleSet, Thresholds};

/// The outcome of evaluating one submission against one rule set version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: String,
    pub submission_id: String,
    pub rule_set_id: String,
    pub rule_set_version: u32,
    /// 0-100; capped sum of configured flag weights
    pub risk_score: u8,
    pub decision: Decision,
    /// Sorted, deduplicated
    pub flags: Vec<FlagType>,
    /// Diagnostic payload (distances, shortfall reasons, confidences)
    #[serde(default)]
    pub features: Map<String, Value>,
    pub validated_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// A scored assessment. Flags are deduplicated and sorted so the same
    /// findings always produce the same assessment body.
    pub fn scored(
        submission_id: &str,
        rule_set: &RuleSet,
        flags: BTreeSet<FlagType>,
        features: Map<String, Value>,
    ) -> Self {
        let risk_score = score_flags(rule_set, &flags);
        let decision = band_decision(&rule_set.rules.thresholds, risk_score);

        Self {
            id: Uuid::new_v4().to_string(),
            submission_id: submission_id.to_string(),
            rule_set_id: rule_set.id.clone(),
            rule_set_version: rule_set.version,
            risk_score,
            decision,
            flags: flags.into_iter().collect(),
            features,
            validated_at: Utc::now(),
        }
    }

    /// The media-requirements short-circuit: decision INCOMPLETE, score 0,
    /// no section evaluated.
    pub fn incomplete(submission_id: &str, rule_set: &RuleSet, reason: String) -> Self {
        let mut features = Map::new();
        features.insert("incomplete_reason".to_string(), Value::String(reason));

        Self {
            id: Uuid::new_v4().to_string(),
            submission_id: submission_id.to_string(),
            rule_set_id: rule_set.id.clone(),
            rule_set_version: rule_set.version,
            risk_score: 0,
            decision: Decision::Incomplete,
            flags: Vec::new(),
            features,
            validated_at: Utc::now(),
        }
    }
}

/// Capped weighted sum over the raised flags. Flags with no configured
/// weight contribute 0.
pub fn score_flags(rule_set: &RuleSet, flags: &BTreeSet<FlagType>) -> u8 {
    let total: u32 = flags.iter().map(|f| rule_set.weight_of(*f)).sum();
    total.min(100) as u8
}

/// Map a score into a decision band, top band first. A score falling in a
/// configuration gap between the auto-approve ceiling and the
/// manual-review floor resolves to MANUAL_REVIEW, the safe middle band.
pub fn band_decision(thresholds: &Thresholds, score: u8) -> Decision {
    if score >= thresholds.high_risk_min_risk {
        Decision::HighRisk
    } else if score >= thresholds.manual_review_min_risk {
        Decision::ManualReview
    } else if score <= thresholds.auto_approve_max_risk {
        Decision::AutoApprove
    } else {
        Decision::ManualReview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_set() -> RuleSet {
        RuleSet::from_json(
            r#"{
                "id": "RS-001",
                "tenant_id": "TEN-001",
                "name": "Scoring",
                "version": 3,
                "rules": {
                    "thresholds": {
                        "auto_approve_max_risk": 20,
                        "manual_review_min_risk": 21,
                        "high_risk_min_risk": 60
                    },
                    "risk_weights": {
                        "GPS_MISMATCH": 25,
                        "EXIF_MISSING": 20,
                        "ELA_TAMPERED": 50,
                        "DUPLICATE_IMAGE": 40
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_single_flag_at_auto_approve_boundary() {
        let flags = BTreeSet::from([FlagType::ExifMissing]);
        let a = RiskAssessment::scored("SUB-001", &rule_set(), flags, Map::new());
        assert_eq!(a.risk_score, 20);
        assert_eq!(a.decision, Decision::AutoApprove);
        assert_eq!(a.rule_set_version, 3);
    }

    #[test]
    fn test_two_flags_reach_manual_review() {
        let flags = BTreeSet::from([FlagType::GpsMismatch, FlagType::ExifMissing]);
        let a = RiskAssessment::scored("SUB-001", &rule_set(), flags, Map::new());
        assert_eq!(a.risk_score, 45);
        assert_eq!(a.decision, Decision::ManualReview);
    }

    #[test]
    fn test_heavy_flags_reach_high_risk() {
        let flags = BTreeSet::from([FlagType::ElaTampered, FlagType::DuplicateImage]);
        let a = RiskAssessment::scored("SUB-001", &rule_set(), flags, Map::new());
        assert_eq!(a.risk_score, 90);
        assert_eq!(a.decision, Decision::HighRisk);
    }

    #[test]
    fn test_score_capped_at_100() {
        let flags = BTreeSet::from([
            FlagType::ElaTampered,
            FlagType::DuplicateImage,
            FlagType::GpsMismatch,
        ]);
        assert_eq!(score_flags(&rule_set(), &flags), 100);
    }

    #[test]
    fn test_unconfigured_flag_contributes_zero() {
        let flags = BTreeSet::from([FlagType::LowQuality]);
        let a = RiskAssessment::scored("SUB-001", &rule_set(), flags, Map::new());
        assert_eq!(a.risk_score, 0);
        assert_eq!(a.decision, Decision::AutoApprove);
        // The flag itself is still recorded
        assert_eq!(a.flags, vec![FlagType::LowQuality]);
    }

    #[test]
    fn test_no_flags_auto_approves() {
        let a = RiskAssessment::scored("SUB-001", &rule_set(), BTreeSet::new(), Map::new());
        assert_eq!(a.risk_score, 0);
        assert_eq!(a.decision, Decision::AutoApprove);
        assert!(a.flags.is_empty());
    }

    #[test]
    fn test_threshold_gap_resolves_to_manual_review() {
        // auto ceiling 20, manual floor 30: scores 21-29 fall in the gap
        let t = Thresholds {
            auto_approve_max_risk: 20,
            manual_review_min_risk: 30,
            high_risk_min_risk: 60,
        };
        assert_eq!(band_decision(&t, 25), Decision::ManualReview);
        assert_eq!(band_decision(&t, 20), Decision::AutoApprove);
        assert_eq!(band_decision(&t, 30), Decision::ManualReview);
        assert_eq!(band_decision(&t, 60), Decision::HighRisk);
    }

    #[test]
    fn test_manual_equal_high_collapses_band() {
        let t = Thresholds {
            auto_approve_max_risk: 20,
            manual_review_min_risk: 40,
            high_risk_min_risk: 40,
        };
        assert_eq!(band_decision(&t, 40), Decision::HighRisk);
        assert_eq!(band_decision(&t, 39), Decision::ManualReview);
    }

    #[test]
    fn test_adding_flags_never_lowers_score() {
        let rs = rule_set();
        let all = [
            FlagType::GpsMismatch,
            FlagType::ExifMissing,
            FlagType::ElaTampered,
            FlagType::DuplicateImage,
            FlagType::LowQuality,
        ];

        let mut flags = BTreeSet::new();
        let mut previous = 0;
        for flag in all {
            flags.insert(flag);
            let score = score_flags(&rs, &flags);
            assert!(score >= previous, "{:?} lowered the score", flag);
            previous = score;
        }
    }

    #[test]
    fn test_incomplete_assessment_shape() {
        let a = RiskAssessment::incomplete("SUB-001", &rule_set(), "2 photos, 4 required".into());
        assert_eq!(a.decision, Decision::Incomplete);
        assert_eq!(a.risk_score, 0);
        assert!(a.flags.is_empty());
        assert_eq!(
            a.features.get("incomplete_reason").and_then(|v| v.as_str()),
            Some("2 photos, 4 required")
        );
    }
}
