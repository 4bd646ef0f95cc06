//! The conflict detector

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use loanguard_core::{Review, ReviewDecision, Submission};
use loanguard_risk::RiskAssessment;

use crate::error::{ConflictError, ConflictResult};
use crate::record::{Conflict, ConflictKind};
use crate::rule::{ConflictRule, Divergence, RiskOverrideRule};
use crate::sentiment::{SentimentAnalyzer, NEUTRAL_SENTIMENT};

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub tenant_id: String,
    /// Fail detection when the analyzer is down instead of degrading to a
    /// neutral score
    pub require_analyzer: bool,
    /// Sentiment at or below this, on an approval, raises a
    /// SENTIMENT_BASED conflict even without decision divergence
    pub negative_sentiment_max: u8,
}

impl DetectorConfig {
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            require_analyzer: false,
            negative_sentiment_max: 2,
        }
    }
}

/// Compares the engine's assessment with the officer's review.
pub struct ConflictDetector {
    rule: Box<dyn ConflictRule>,
    analyzer: Option<Arc<dyn SentimentAnalyzer>>,
    config: DetectorConfig,
}

impl ConflictDetector {
    /// Detector with the default `RiskOverrideRule`.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            rule: Box::new(RiskOverrideRule::default()),
            analyzer: None,
            config,
        }
    }

    pub fn with_rule(mut self, rule: Box<dyn ConflictRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Compare the assessment with the review. `Ok(None)` means no
    /// divergence and no sentiment contradiction; nothing to record.
    pub async fn detect(
        &self,
        submission: &Submission,
        assessment: &RiskAssessment,
        review: &Review,
    ) -> ConflictResult<Option<Conflict>> {
        let divergence = self
            .rule
            .classify(assessment.decision, review.review_decision);

        // The analyzer only matters when there is something to record or
        // an approval whose remarks could contradict it.
        let needs_sentiment = divergence != Divergence::None
            || review.review_decision == ReviewDecision::Approved;
        if !needs_sentiment {
            return Ok(None);
        }

        let sentiment_score = self.sentiment_of(&review.review_remarks).await?;

        let (conflict_detected, conflict_kind) = match divergence {
            Divergence::RiskOverride => (true, ConflictKind::DecisionBased),
            Divergence::Noted => (false, ConflictKind::DecisionBased),
            Divergence::None => {
                if review.review_decision == ReviewDecision::Approved
                    && sentiment_score <= self.config.negative_sentiment_max
                {
                    // Approval with strongly negative remarks
                    (true, ConflictKind::SentimentBased)
                } else {
                    return Ok(None);
                }
            }
        };

        let conflict = Conflict {
            id: Uuid::new_v4().to_string(),
            submission_id: submission.id.clone(),
            officer_id: review.reviewed_by_officer_id.clone(),
            tenant_id: self.config.tenant_id.clone(),
            conflict_detected,
            conflict_kind,
            sentiment_score,
            ai_reason: ai_reason(assessment),
            officer_remarks: review.review_remarks.clone(),
            ai_decision: assessment.decision,
            officer_decision: review.review_decision,
            created_at: Utc::now(),
        };

        info!(
            submission_id = %conflict.submission_id,
            officer_id = %conflict.officer_id,
            detected = conflict.conflict_detected,
            kind = %conflict.conflict_kind,
            sentiment = conflict.sentiment_score,
            "divergence recorded"
        );
        Ok(Some(conflict))
    }

    async fn sentiment_of(&self, remarks: &str) -> ConflictResult<u8> {
        let Some(analyzer) = &self.analyzer else {
            if self.config.require_analyzer {
                return Err(ConflictError::Analyzer("no analyzer configured".to_string()));
            }
            return Ok(NEUTRAL_SENTIMENT);
        };

        match analyzer.score(remarks).await {
            Ok(score) => Ok(score.min(10)),
            Err(err) if self.config.require_analyzer => Err(err),
            Err(err) => {
                warn!(error = %err, "sentiment analyzer failed, assuming neutral");
                Ok(NEUTRAL_SENTIMENT)
            }
        }
    }
}

fn ai_reason(assessment: &RiskAssessment) -> String {
    let flags: Vec<String> = assessment.flags.iter().map(|f| f.to_string()).collect();
    format!(
        "risk score {} ({}), flags: [{}]",
        assessment.risk_score,
        assessment.decision,
        flags.join(", ")
    )
}
