//! Validation service: evaluate, then record
//!
//! Glues the engine to the audit ledger. A successful evaluation appends
//! exactly one `AiEvaluated` event to the owning loan's chain; the
//! assessment and the ledger entry carry the same score, decision and
//! flags.

use tracing::info;

use loanguard_core::{Loan, Submission};
use loanguard_ledger::{AppendRequest, Ledger, LedgerStore, LoanEvent};

use crate::assessment::RiskAssessment;
use crate::engine::RiskEngine;
use crate::error::RiskResult;
use crate::ruleset::RuleSet;

/// Performer recorded on engine-produced ledger entries.
const ENGINE_ACTOR: &str = "risk-engine";

pub struct ValidationService<S: LedgerStore> {
    engine: RiskEngine,
    ledger: Ledger<S>,
}

impl<S: LedgerStore> ValidationService<S> {
    pub fn new(engine: RiskEngine, ledger: Ledger<S>) -> Self {
        Self { engine, ledger }
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    /// Evaluate a submission and append the outcome to the loan's ledger.
    ///
    /// The append happens only after a successful evaluation, so a failed
    /// evaluation leaves the chain untouched. An INCOMPLETE outcome is
    /// still recorded; it is a decision, not an error.
    pub async fn evaluate_and_record(
        &self,
        submission: &Submission,
        loan: &Loan,
        rule_set: &RuleSet,
    ) -> RiskResult<RiskAssessment> {
        let assessment = self.engine.evaluate(submission, loan, rule_set).await?;

        let event = LoanEvent::AiEvaluated {
            submission_id: submission.id.clone(),
            rule_set_id: rule_set.id.clone(),
            rule_set_version: rule_set.version,
            risk_score: assessment.risk_score,
            decision: assessment.decision,
            flags: assessment.flags.clone(),
        };
        let entry = self
            .ledger
            .append(AppendRequest::new(&loan.id, event, ENGINE_ACTOR))?;

        info!(
            loan_id = %loan.id,
            submission_id = %submission.id,
            sequence = entry.sequence_num,
            decision = %assessment.decision,
            risk_score = assessment.risk_score,
            "assessment recorded"
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    use loanguard_core::{
        CaptureContext, Decision, GeoPoint, LoanStatus, Media, MediaKind, SubmissionStatus,
    };
    use loanguard_ledger::MemoryStore;

    use crate::collaborators::{Collaborators, MockClassifier, MockForensics, MockOcr};

    fn photo(kind: MediaKind) -> Media {
        Media {
            kind,
            file_key: format!("uploads/{}.jpg", kind),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 1_200_000,
            captured_at: Some(Utc::now()),
            gps_lat: Some(17.385),
            gps_lng: Some(78.4867),
            has_exif: true,
            has_gps_exif: true,
            is_screenshot: false,
            is_printed_photo_suspect: false,
            width: Some(1920),
            height: Some(1080),
            blur_variance: Some(320.0),
            duration_seconds: None,
        }
    }

    fn fixture() -> (Submission, Loan, RuleSet) {
        let submission = Submission {
            id: "SUB-001".to_string(),
            loan_id: "LOAN-001".to_string(),
            media: vec![
                photo(MediaKind::Front),
                photo(MediaKind::Back),
                photo(MediaKind::Invoice),
            ],
            device_info: "test-device".to_string(),
            capture_context: CaptureContext::default(),
            status: SubmissionStatus::PendingAi,
            previous_submission_id: None,
            submitted_at: Utc::now(),
        };
        let loan = Loan {
            id: "LOAN-001".to_string(),
            beneficiary_id: "BEN-001".to_string(),
            loan_details_id: "LD-001".to_string(),
            rule_set_id: "RS-001".to_string(),
            sanction_amount: dec!(250000),
            sanction_date: Utc::now() - Duration::days(10),
            expected_location: Some(GeoPoint {
                lat: 17.385,
                lng: 78.4867,
            }),
            status: LoanStatus::Disbursed,
        };
        let rule_set = RuleSet::from_json(
            r#"{
                "id": "RS-001",
                "tenant_id": "TEN-001",
                "name": "Tractor scheme",
                "version": 1,
                "rules": {
                    "media_requirements": {"min_photos": 2},
                    "gps_rules": {"max_distance_km": 5.0},
                    "document_rules": {"require_invoice": true, "invoice_ocr_match_amount": true},
                    "asset_rules": {"allowed_asset_types": ["TRACTOR"]},
                    "risk_weights": {"GPS_MISMATCH": 25, "INVOICE_AMOUNT_MISMATCH": 25}
                }
            }"#,
        )
        .unwrap();
        (submission, loan, rule_set)
    }

    fn service() -> ValidationService<MemoryStore> {
        let collaborators = Collaborators::none()
            .with_classifier(Arc::new(MockClassifier::recognizing(0.95)))
            .with_ocr(Arc::new(MockOcr::reading(Some(dec!(250000)))))
            .with_forensics(Arc::new(MockForensics::clean()));
        ValidationService::new(
            RiskEngine::new(collaborators),
            Ledger::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn test_evaluation_appends_one_event() {
        let service = service();
        let (submission, loan, rule_set) = fixture();

        let assessment = service
            .evaluate_and_record(&submission, &loan, &rule_set)
            .await
            .unwrap();
        assert_eq!(assessment.decision, Decision::AutoApprove);

        let history = service.ledger().history("LOAN-001").unwrap();
        assert_eq!(history.len(), 1);
        match &history[0].event {
            LoanEvent::AiEvaluated {
                submission_id,
                risk_score,
                decision,
                ..
            } => {
                assert_eq!(submission_id, "SUB-001");
                assert_eq!(*risk_score, assessment.risk_score);
                assert_eq!(*decision, assessment.decision);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(service.ledger().verify("LOAN-001").unwrap().is_valid);
    }

    #[tokio::test]
    async fn test_incomplete_outcome_is_recorded_too() {
        let service = service();
        let (mut submission, loan, rule_set) = fixture();
        submission.media.truncate(1);

        let assessment = service
            .evaluate_and_record(&submission, &loan, &rule_set)
            .await
            .unwrap();
        assert_eq!(assessment.decision, Decision::Incomplete);

        let history = service.ledger().history("LOAN-001").unwrap();
        assert_eq!(history.len(), 1);
        assert!(matches!(
            history[0].event,
            LoanEvent::AiEvaluated {
                decision: Decision::Incomplete,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_reevaluation_appends_a_second_event() {
        let service = service();
        let (submission, loan, rule_set) = fixture();

        service
            .evaluate_and_record(&submission, &loan, &rule_set)
            .await
            .unwrap();
        service
            .evaluate_and_record(&submission, &loan, &rule_set)
            .await
            .unwrap();

        let history = service.ledger().history("LOAN-001").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].previous_hash, history[0].current_hash);
    }
}
