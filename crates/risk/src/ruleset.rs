//! Rule set documents
//!
//! A rule set is versioned, tenant-scoped configuration describing which
//! checks apply and how they are weighted and thresholded. Sections are
//! `Option<Section>`: an absent section is skipped entirely, never
//! evaluated with default-false toggles. Rule sets are immutable once a
//! scored submission references them; a new version supersedes.
//!
//! All structural and consistency problems are rejected at load time via
//! `RuleSet::validate`, never at evaluation time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use loanguard_core::FlagType;

use crate::error::{RiskError, RiskResult};

/// Minimum media counts for a submission to be scorable at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaRequirements {
    pub min_photos: u32,
    #[serde(default)]
    pub min_video_seconds: u32,
    #[serde(default)]
    pub allowed_mime_types: Vec<String>,
}

/// GPS distance and EXIF-GPS requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpsRules {
    pub max_distance_km: f64,
    #[serde(default)]
    pub require_exif_gps: bool,
    #[serde(default)]
    pub mock_location_block: bool,
}

/// Capture-time window around the sanction date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeRules {
    pub max_days_after_sanction: i64,
    #[serde(default)]
    pub allow_before_sanction: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinResolution {
    pub width: u32,
    pub height: u32,
}

/// Blur/resolution floors and screenshot/printed-photo rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageQualityRules {
    /// Minimum Laplacian variance; images below this are too blurry
    #[serde(default)]
    pub blur_threshold: Option<f64>,
    #[serde(default)]
    pub min_resolution: Option<MinResolution>,
    #[serde(default)]
    pub reject_screenshots: bool,
    #[serde(default)]
    pub reject_printed_photos: bool,
}

/// Toggles for the image-forensics collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FraudDetectionRules {
    #[serde(default)]
    pub duplicate_detection: bool,
    #[serde(default = "default_max_hash_distance")]
    pub max_hash_distance: u32,
    #[serde(default)]
    pub ela_tampering_check: bool,
    #[serde(default)]
    pub ai_generated_detection: bool,
}

/// Invoice presence and OCR cross-checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentRules {
    #[serde(default)]
    pub require_invoice: bool,
    #[serde(default)]
    pub invoice_ocr_match_amount: bool,
    /// Absolute tolerance when matching the OCR'd amount
    #[serde(default = "default_invoice_amount_tolerance")]
    pub invoice_amount_tolerance: u64,
}

/// Asset classification requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetRules {
    pub allowed_asset_types: Vec<String>,
    #[serde(default)]
    pub classifier_required: bool,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

/// Decision-band thresholds over the 0-100 risk score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    pub auto_approve_max_risk: u8,
    pub manual_review_min_risk: u8,
    pub high_risk_min_risk: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            auto_approve_max_risk: 20,
            manual_review_min_risk: 21,
            high_risk_min_risk: 60,
        }
    }
}

/// The optional rule sections plus weights and thresholds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rules {
    #[serde(default)]
    pub media_requirements: Option<MediaRequirements>,
    #[serde(default)]
    pub gps_rules: Option<GpsRules>,
    #[serde(default)]
    pub time_rules: Option<TimeRules>,
    #[serde(default)]
    pub image_quality_rules: Option<ImageQualityRules>,
    #[serde(default)]
    pub fraud_detection_rules: Option<FraudDetectionRules>,
    #[serde(default)]
    pub document_rules: Option<DocumentRules>,
    #[serde(default)]
    pub asset_rules: Option<AssetRules>,
    /// FlagType -> weight 0-100; flags without a weight contribute 0
    #[serde(default)]
    pub risk_weights: BTreeMap<FlagType, u8>,
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// A versioned, tenant-scoped rule set document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub rules: Rules,
}

fn default_true() -> bool {
    true
}

fn default_max_hash_distance() -> u32 {
    8
}

fn default_invoice_amount_tolerance() -> u64 {
    5_000
}

fn default_confidence_threshold() -> f64 {
    0.8
}

impl RuleSet {
    /// Parse and validate a rule set from a JSON string. Unknown fields in
    /// any rule section are a structural error.
    pub fn from_json(json: &str) -> RiskResult<Self> {
        let rule_set: RuleSet = serde_json::from_str(json)
            .map_err(|e| RiskError::Configuration(format!("malformed rule set: {}", e)))?;
        rule_set.validate()?;
        Ok(rule_set)
    }

    /// Load and validate a rule set from a JSON file.
    pub fn from_file(path: &Path) -> RiskResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Consistency checks beyond structure. Runs at load time so a bad
    /// rule set is rejected before any submission is evaluated against it.
    ///
    /// Threshold ordering: `auto_approve_max < manual_review_min <=
    /// high_risk_min`. Equal manual/high collapses the MANUAL_REVIEW band
    /// into HIGH_RISK at that score, which is legal.
    pub fn validate(&self) -> RiskResult<()> {
        let t = self.rules.thresholds;

        if t.auto_approve_max_risk >= t.manual_review_min_risk {
            return Err(RiskError::Configuration(format!(
                "auto_approve_max_risk ({}) must be below manual_review_min_risk ({})",
                t.auto_approve_max_risk, t.manual_review_min_risk
            )));
        }
        if t.manual_review_min_risk > t.high_risk_min_risk {
            return Err(RiskError::Configuration(format!(
                "manual_review_min_risk ({}) must not exceed high_risk_min_risk ({})",
                t.manual_review_min_risk, t.high_risk_min_risk
            )));
        }

        for (flag, weight) in &self.rules.risk_weights {
            if *weight > 100 {
                return Err(RiskError::Configuration(format!(
                    "risk weight for {} is {} (must be 0-100)",
                    flag, weight
                )));
            }
        }

        if let Some(gps) = &self.rules.gps_rules {
            if gps.max_distance_km < 0.0 {
                return Err(RiskError::Configuration(
                    "gps_rules.max_distance_km must be non-negative".to_string(),
                ));
            }
        }
        if let Some(asset) = &self.rules.asset_rules {
            if !(0.0..=1.0).contains(&asset.confidence_threshold) {
                return Err(RiskError::Configuration(
                    "asset_rules.confidence_threshold must be within 0.0-1.0".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Weight for a flag; unconfigured flags contribute 0 and never fail
    /// the evaluation.
    pub fn weight_of(&self, flag: FlagType) -> u32 {
        self.rules
            .risk_weights
            .get(&flag)
            .copied()
            .map(u32::from)
            .unwrap_or(0)
    }
}
