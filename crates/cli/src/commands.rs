//! CLI commands

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use loanguard_core::{Loan, Review, ReviewDecision, Submission};
use loanguard_ledger::{AppendRequest, LedgerMonitor, LoanEvent};
use loanguard_risk::RuleSet;

use crate::context::AppContext;

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    Ok(serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("malformed {}: {}", path.display(), e))?)
}

/// Append an event (read from a JSON file) to a loan's chain.
pub fn append(
    ctx: &AppContext,
    loan_id: &str,
    event_path: &Path,
    performed_by: &str,
    amount: Option<Decimal>,
    ip: Option<String>,
) -> anyhow::Result<()> {
    let event: LoanEvent = load_json(event_path)?;

    let mut request = AppendRequest::new(loan_id, event, performed_by);
    if let Some(amount) = amount {
        request = request.with_amount(amount);
    }
    if let Some(ip) = ip {
        request = request.with_ip(ip);
    }

    let entry = ctx.ledger().append(request)?;
    println!(
        "✅ Appended {} to {} (seq: {}, hash: {}...)",
        entry.event.type_name(),
        loan_id,
        entry.sequence_num,
        &entry.current_hash[..12]
    );
    Ok(())
}

/// Print a loan's chain in sequence order.
pub fn history(ctx: &AppContext, loan_id: &str) -> anyhow::Result<()> {
    let entries = ctx.ledger().history(loan_id)?;
    if entries.is_empty() {
        println!("No entries for {}", loan_id);
        return Ok(());
    }

    println!("Ledger for {} ({} entries):", loan_id, entries.len());
    for entry in &entries {
        println!(
            "  #{:<4} {}  {:<20} by {}  [{}...]",
            entry.sequence_num,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.event.type_name(),
            entry.performed_by,
            &entry.current_hash[..12]
        );
    }
    Ok(())
}

/// Verify one loan's chain.
pub fn verify(ctx: &AppContext, loan_id: &str) -> anyhow::Result<()> {
    let result = ctx.ledger().verify(loan_id)?;
    if result.is_valid {
        println!(
            "✅ Chain valid for {} ({} entries)",
            loan_id, result.total_entries
        );
    } else {
        println!("❌ Tamper evidence for {}:", loan_id);
        if !result.invalid_entries.is_empty() {
            println!("   invalid entries: {:?}", result.invalid_entries);
        }
        if result.broken_chain {
            println!("   chain linkage broken");
        }
        for error in &result.errors {
            println!("   {}", error);
        }
    }
    Ok(())
}

/// Verify every loan in the store.
pub fn verify_all(ctx: &AppContext) -> anyhow::Result<()> {
    let report = LedgerMonitor::new(ctx.ledger()).sweep()?;
    println!(
        "Sweep: {} loans, {} valid, {} tampered",
        report.total_loans, report.valid_loans, report.tampered_loans
    );
    for loan_id in &report.tampered_loan_ids {
        println!("❌ {}", loan_id);
    }
    for error in &report.errors {
        println!("   {}", error);
    }
    Ok(())
}

/// Verification summary plus activity metadata.
pub fn status(ctx: &AppContext, loan_id: &str) -> anyhow::Result<()> {
    let status = ctx.ledger().status(loan_id)?;
    println!("Loan {}", status.loan_id);
    println!("  entries:       {}", status.entry_count);
    println!(
        "  last activity: {}",
        status
            .last_activity
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  chain:         {}",
        if status.verification.is_valid {
            "✅ valid"
        } else {
            "❌ tampered"
        }
    );
    Ok(())
}

/// Evaluate a submission and record the outcome on the loan's ledger.
pub async fn evaluate(
    ctx: &AppContext,
    submission_path: &Path,
    loan_path: &Path,
    ruleset_path: &Path,
) -> anyhow::Result<()> {
    let submission: Submission = load_json(submission_path)?;
    let loan: Loan = load_json(loan_path)?;
    let rule_set = RuleSet::from_file(ruleset_path)?;
    ctx.prime_mock_ocr(loan.sanction_amount);

    let assessment = ctx
        .service()
        .evaluate_and_record(&submission, &loan, &rule_set)
        .await?;

    println!("Assessment for {}:", submission.id);
    println!("  risk score: {}", assessment.risk_score);
    println!("  decision:   {}", assessment.decision);
    if assessment.flags.is_empty() {
        println!("  flags:      none");
    } else {
        for flag in &assessment.flags {
            println!("  flag:       {}", flag);
        }
    }
    Ok(())
}

/// Record an officer review and check it against the engine's assessment.
#[allow(clippy::too_many_arguments)]
pub async fn review(
    ctx: &AppContext,
    submission_path: &Path,
    loan_path: &Path,
    ruleset_path: &Path,
    decision: &str,
    remarks: &str,
    officer_id: &str,
) -> anyhow::Result<()> {
    let submission: Submission = load_json(submission_path)?;
    let loan: Loan = load_json(loan_path)?;
    let rule_set = RuleSet::from_file(ruleset_path)?;
    ctx.prime_mock_ocr(loan.sanction_amount);

    let review_decision = ReviewDecision::from_str(decision)
        .map_err(|_| anyhow::anyhow!("unknown review decision: {}", decision))?;

    let assessment = ctx
        .service()
        .evaluate_and_record(&submission, &loan, &rule_set)
        .await?;

    let review = Review {
        submission_id: submission.id.clone(),
        review_decision,
        review_remarks: remarks.to_string(),
        reviewed_by_officer_id: officer_id.to_string(),
        reviewed_at: Utc::now(),
    };
    ctx.ledger().append(AppendRequest::new(
        &loan.id,
        LoanEvent::officer_reviewed(&submission.id, review_decision, remarks, officer_id),
        officer_id,
    ))?;

    println!(
        "✅ Review recorded: {} {} (engine said {})",
        officer_id, review_decision, assessment.decision
    );

    match ctx.detector().detect(&submission, &assessment, &review).await? {
        Some(conflict) if conflict.conflict_detected => {
            println!(
                "❌ Conflict detected ({}): {}",
                conflict.conflict_kind, conflict.ai_reason
            );
        }
        Some(conflict) => {
            println!(
                "⚠️  Divergence noted ({}), sentiment {}",
                conflict.conflict_kind, conflict.sentiment_score
            );
        }
        None => println!("No conflict."),
    }
    Ok(())
}
