//! The rule-driven evaluation engine
//!
//! `RiskEngine::evaluate` walks the enabled rule sections, collects flags,
//! scores them, and bands the score into a decision. Absent sections are
//! skipped entirely. The media-requirements precondition short-circuits to
//! INCOMPLETE before any other section runs.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, info};

use loanguard_core::{FlagType, Loan, MediaKind, Submission};

use crate::assessment::RiskAssessment;
use crate::checks;
use crate::collaborators::{call_with_retry, Collaborators};
use crate::error::RiskResult;
use crate::ruleset::{AssetRules, DocumentRules, FraudDetectionRules, RuleSet};

/// Stateless evaluator over injected collaborators. Safe to share across
/// concurrent evaluations.
pub struct RiskEngine {
    collaborators: Collaborators,
}

impl RiskEngine {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Evaluate one submission against one rule set version.
    ///
    /// Deterministic for fixed (submission, rule set version, collaborator
    /// outputs); only the `validated_at` stamp reads the clock.
    pub async fn evaluate(
        &self,
        submission: &Submission,
        loan: &Loan,
        rule_set: &RuleSet,
    ) -> RiskResult<RiskAssessment> {
        if let Some(req) = &rule_set.rules.media_requirements {
            if let Some(reason) = checks::media_shortfall(submission, req) {
                info!(
                    submission_id = %submission.id,
                    %reason,
                    "submission incomplete, not scored"
                );
                return Ok(RiskAssessment::incomplete(&submission.id, rule_set, reason));
            }
        }

        let mut flags = BTreeSet::new();
        let mut features = Map::new();

        if let Some(rules) = &rule_set.rules.gps_rules {
            let (gps, min_distance) = checks::gps_flags(submission, loan, rules);
            flags.extend(gps);
            if let Some(distance) = min_distance {
                features.insert("gps_min_distance_km".to_string(), json_f64(distance));
            }
        }

        if let Some(rules) = &rule_set.rules.time_rules {
            flags.extend(checks::time_flags(submission, loan, rules));
        }

        if let Some(rules) = &rule_set.rules.image_quality_rules {
            flags.extend(checks::quality_flags(submission, rules));
        }

        if let Some(rules) = &rule_set.rules.fraud_detection_rules {
            self.run_forensics(submission, rules, &mut flags).await;
        }

        if let Some(rules) = &rule_set.rules.document_rules {
            self.run_document_checks(submission, loan, rules, &mut flags, &mut features)
                .await;
        }

        if let Some(rules) = &rule_set.rules.asset_rules {
            self.run_asset_checks(submission, rules, &mut flags, &mut features)
                .await;
        }

        let assessment = RiskAssessment::scored(&submission.id, rule_set, flags, features);
        debug!(
            submission_id = %submission.id,
            rule_set_version = rule_set.version,
            risk_score = assessment.risk_score,
            decision = %assessment.decision,
            flag_count = assessment.flags.len(),
            "evaluation complete"
        );
        Ok(assessment)
    }

    async fn run_forensics(
        &self,
        submission: &Submission,
        rules: &FraudDetectionRules,
        flags: &mut BTreeSet<FlagType>,
    ) {
        let any_enabled =
            rules.duplicate_detection || rules.ela_tampering_check || rules.ai_generated_detection;
        if !any_enabled {
            return;
        }

        let Some(forensics) = &self.collaborators.forensics else {
            flags.insert(FlagType::ForensicsUnavailable);
            return;
        };

        let images: Vec<_> = submission
            .media
            .iter()
            .filter(|m| m.is_image())
            .cloned()
            .collect();

        let report = call_with_retry(&self.collaborators.config, "forensics", || {
            forensics.inspect(&images, rules.max_hash_distance)
        })
        .await;

        match report {
            Ok(report) => {
                if rules.duplicate_detection && report.duplicate_image {
                    flags.insert(FlagType::DuplicateImage);
                }
                if rules.ela_tampering_check && report.ela_tampered {
                    flags.insert(FlagType::ElaTampered);
                }
                if rules.ai_generated_detection && report.ai_generated {
                    flags.insert(FlagType::AiGenerated);
                }
            }
            Err(_) => {
                flags.insert(FlagType::ForensicsUnavailable);
            }
        }
    }

    async fn run_document_checks(
        &self,
        submission: &Submission,
        loan: &Loan,
        rules: &DocumentRules,
        flags: &mut BTreeSet<FlagType>,
        features: &mut Map<String, Value>,
    ) {
        let invoice = submission
            .media
            .iter()
            .find(|m| m.kind == MediaKind::Invoice);

        if rules.require_invoice && invoice.is_none() {
            flags.insert(FlagType::InvoiceMissing);
        }

        let (Some(invoice), true) = (invoice, rules.invoice_ocr_match_amount) else {
            return;
        };

        let Some(ocr) = &self.collaborators.ocr else {
            flags.insert(FlagType::OcrUnavailable);
            return;
        };

        let amount = call_with_retry(&self.collaborators.config, "invoice_ocr", || {
            ocr.read_amount(invoice)
        })
        .await;

        match amount {
            Ok(Some(amount)) => {
                features.insert(
                    "invoice_ocr_amount".to_string(),
                    Value::String(amount.to_string()),
                );
                let tolerance = Decimal::from(rules.invoice_amount_tolerance);
                if (amount - loan.sanction_amount).abs() > tolerance {
                    flags.insert(FlagType::InvoiceAmountMismatch);
                }
            }
            // OCR ran but found no amount-like text; the amount cannot be
            // confirmed against the sanction
            Ok(None) => {
                flags.insert(FlagType::InvoiceAmountMismatch);
            }
            Err(_) => {
                flags.insert(FlagType::OcrUnavailable);
            }
        }
    }

    async fn run_asset_checks(
        &self,
        submission: &Submission,
        rules: &AssetRules,
        flags: &mut BTreeSet<FlagType>,
        features: &mut Map<String, Value>,
    ) {
        let Some(classifier) = &self.collaborators.classifier else {
            if rules.classifier_required {
                flags.insert(FlagType::ClassifierUnavailable);
            }
            return;
        };

        let photos: Vec<_> = submission
            .media
            .iter()
            .filter(|m| m.kind.is_photo())
            .collect();
        if photos.is_empty() {
            return;
        }

        let mut best_confidence: Option<f64> = None;
        let mut matched = false;
        let mut any_verdict = false;

        for photo in &photos {
            let verdict = call_with_retry(&self.collaborators.config, "asset_classifier", || {
                classifier.classify(photo, &rules.allowed_asset_types)
            })
            .await;

            if let Ok(verdict) = verdict {
                any_verdict = true;
                if verdict.matched_asset.is_some() {
                    matched = true;
                    if best_confidence.map_or(true, |c| verdict.confidence > c) {
                        best_confidence = Some(verdict.confidence);
                    }
                }
            }
        }

        if !any_verdict {
            flags.insert(FlagType::ClassifierUnavailable);
            return;
        }

        if let Some(confidence) = best_confidence {
            features.insert("classifier_confidence".to_string(), json_f64(confidence));
        }

        if !matched {
            flags.insert(FlagType::UnknownAsset);
        } else if best_confidence.map_or(true, |c| c < rules.confidence_threshold) {
            flags.insert(FlagType::LowConfidence);
        }
    }
}

fn json_f64(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
