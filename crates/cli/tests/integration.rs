//! Integration tests for LoanGuard
//!
//! These tests drive the complete flow through the CLI context: risk
//! evaluation, ledger recording, officer review, conflict detection, and
//! tamper verification over the on-disk JSONL store.

use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tempfile::TempDir;

use loanguard_cli::{commands, AppContext};
use loanguard_core::{
    CaptureContext, Decision, FlagType, GeoPoint, Loan, LoanStatus, Media, MediaKind, Review,
    ReviewDecision, Submission, SubmissionStatus,
};
use loanguard_ledger::{AppendRequest, LoanEvent};
use loanguard_risk::RuleSet;

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

fn submission() -> Submission {
    Submission {
        id: "SUB-001".to_string(),
        loan_id: "LOAN-001".to_string(),
        media: vec![
            photo(MediaKind::Front),
            photo(MediaKind::Back),
            photo(MediaKind::Invoice),
        ],
        device_info: "integration-test".to_string(),
        capture_context: CaptureContext::default(),
        status: SubmissionStatus::PendingAi,
        previous_submission_id: None,
        submitted_at: Utc::now(),
    }
}

fn loan() -> Loan {
    Loan {
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
    }
}

fn rule_set() -> RuleSet {
    RuleSet::from_json(
        r#"{
            "id": "RS-001",
            "tenant_id": "TEN-001",
            "name": "Tractor scheme",
            "version": 1,
            "rules": {
                "media_requirements": {"min_photos": 2},
                "gps_rules": {"max_distance_km": 5.0, "mock_location_block": true},
                "time_rules": {"max_days_after_sanction": 30},
                "fraud_detection_rules": {"duplicate_detection": true},
                "document_rules": {"require_invoice": true, "invoice_ocr_match_amount": true},
                "asset_rules": {"allowed_asset_types": ["TRACTOR"]},
                "thresholds": {
                    "auto_approve_max_risk": 20,
                    "manual_review_min_risk": 21,
                    "high_risk_min_risk": 60
                },
                "risk_weights": {
                    "GPS_MISMATCH": 25,
                    "EXIF_MISSING": 20,
                    "TIME_MISMATCH": 20,
                    "DUPLICATE_IMAGE": 40,
                    "INVOICE_MISSING": 15
                }
            }
        }"#,
    )
    .unwrap()
}

fn write_fixtures(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let submission_path = dir.join("submission.json");
    let loan_path = dir.join("loan.json");
    let ruleset_path = dir.join("ruleset.json");
    fs::write(
        &submission_path,
        serde_json::to_string_pretty(&submission()).unwrap(),
    )
    .unwrap();
    fs::write(&loan_path, serde_json::to_string_pretty(&loan()).unwrap()).unwrap();
    fs::write(
        &ruleset_path,
        serde_json::to_string_pretty(&rule_set()).unwrap(),
    )
    .unwrap();
    (submission_path, loan_path, ruleset_path)
}

/// Evaluate → record → officer review → verify, all against one chain.
#[tokio::test]
async fn test_full_verification_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(temp_dir.path(), true).unwrap();

    let sub = submission();
    let loan = loan();
    let rs = rule_set();
    ctx.prime_mock_ocr(loan.sanction_amount);

    // 1. Clean submission auto-approves
    let assessment = ctx
        .service()
        .evaluate_and_record(&sub, &loan, &rs)
        .await
        .unwrap();
    assert_eq!(assessment.decision, Decision::AutoApprove);
    assert_eq!(assessment.risk_score, 0);

    // 2. Officer agrees; review lands on the same chain
    ctx.ledger()
        .append(AppendRequest::new(
            &loan.id,
            LoanEvent::officer_reviewed(&sub.id, ReviewDecision::Approved, "verified", "OFF-007"),
            "OFF-007",
        ))
        .unwrap();

    let history = ctx.ledger().history(&loan.id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event.type_name(), "ai_evaluated");
    assert_eq!(history[1].event.type_name(), "officer_reviewed");
    assert_eq!(history[1].previous_hash, history[0].current_hash);

    // 3. No divergence, no conflict
    let review = Review {
        submission_id: sub.id.clone(),
        review_decision: ReviewDecision::Approved,
        review_remarks: "verified".to_string(),
        reviewed_by_officer_id: "OFF-007".to_string(),
        reviewed_at: Utc::now(),
    };
    let conflict = ctx
        .detector()
        .detect(&sub, &assessment, &review)
        .await
        .unwrap();
    assert!(conflict.is_none());

    assert!(ctx.ledger().verify(&loan.id).unwrap().is_valid);
}

/// A chain written by one context is readable and valid from a fresh one.
#[tokio::test]
async fn test_chain_survives_reload() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = AppContext::new(temp_dir.path(), true).unwrap();
        let loan = loan();
        ctx.prime_mock_ocr(loan.sanction_amount);
        ctx.service()
            .evaluate_and_record(&submission(), &loan, &rule_set())
            .await
            .unwrap();
    }

    let ctx = AppContext::new(temp_dir.path(), true).unwrap();
    let history = ctx.ledger().history("LOAN-001").unwrap();
    assert_eq!(history.len(), 1);
    assert!(ctx.ledger().verify("LOAN-001").unwrap().is_valid);
}

/// Editing the JSONL file on disk is detected by verification.
#[tokio::test]
async fn test_on_disk_tamper_detected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(temp_dir.path(), true).unwrap();
    let loan = loan();
    ctx.prime_mock_ocr(loan.sanction_amount);
    ctx.service()
        .evaluate_and_record(&submission(), &loan, &rule_set())
        .await
        .unwrap();
    ctx.service()
        .evaluate_and_record(&submission(), &loan, &rule_set())
        .await
        .unwrap();

    let chain_file = ctx.ledger_path().join("LOAN-001.jsonl");
    let tampered = fs::read_to_string(&chain_file)
        .unwrap()
        .replacen("\"risk-engine\"", "\"intruder\"", 1);
    fs::write(&chain_file, tampered).unwrap();

    let ctx = AppContext::new(temp_dir.path(), true).unwrap();
    let result = ctx.ledger().verify("LOAN-001").unwrap();
    assert!(!result.is_valid);
    assert_eq!(result.invalid_entries, vec![1]);
}

/// Without external services the enabled sections degrade but the
/// evaluation still lands on a decision.
#[tokio::test]
async fn test_degraded_services_still_decide() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(temp_dir.path(), false).unwrap();

    let assessment = ctx
        .service()
        .evaluate_and_record(&submission(), &loan(), &rule_set())
        .await
        .unwrap();

    assert!(assessment.flags.contains(&FlagType::ForensicsUnavailable));
    assert!(assessment.flags.contains(&FlagType::OcrUnavailable));
    // Degraded flags carry no weight in this rule set
    assert_eq!(assessment.decision, Decision::AutoApprove);
    assert!(ctx.ledger().verify("LOAN-001").unwrap().is_valid);
}

/// The file-driven CLI commands run end to end.
#[tokio::test]
async fn test_cli_commands_over_fixture_files() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(temp_dir.path(), true).unwrap();
    let (submission_path, loan_path, ruleset_path) = write_fixtures(temp_dir.path());

    commands::evaluate(&ctx, &submission_path, &loan_path, &ruleset_path)
        .await
        .unwrap();
    commands::review(
        &ctx,
        &submission_path,
        &loan_path,
        &ruleset_path,
        "APPROVED",
        "asset verified on site",
        "OFF-007",
    )
    .await
    .unwrap();

    commands::history(&ctx, "LOAN-001").unwrap();
    commands::verify(&ctx, "LOAN-001").unwrap();
    commands::verify_all(&ctx).unwrap();
    commands::status(&ctx, "LOAN-001").unwrap();

    let history = ctx.ledger().history("LOAN-001").unwrap();
    // evaluate + (review's evaluate + officer_reviewed)
    assert_eq!(history.len(), 3);
    assert!(ctx.ledger().verify("LOAN-001").unwrap().is_valid);
}

/// Appending an event file through the CLI extends the chain.
#[tokio::test]
async fn test_cli_append_event_file() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(temp_dir.path(), true).unwrap();

    let event_path = temp_dir.path().join("event.json");
    fs::write(
        &event_path,
        serde_json::to_string(&LoanEvent::SubmissionCreated {
            submission_id: "SUB-001".to_string(),
            media_count: 3,
            previous_submission_id: None,
        })
        .unwrap(),
    )
    .unwrap();

    commands::append(&ctx, "LOAN-001", &event_path, "BEN-001", None, None).unwrap();

    let history = ctx.ledger().history("LOAN-001").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].performed_by, "BEN-001");
}
