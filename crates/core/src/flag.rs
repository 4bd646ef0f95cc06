//! Fraud/compliance flags raised during risk evaluation
//!
//! Flags are discrete signals; their weights live in the `RuleSet`, not here.
//! A flag with no configured weight contributes 0 to the risk score.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A discrete fraud/compliance signal detected during risk evaluation.
///
/// The `*_UNAVAILABLE` variants are degraded signals: an external
/// classifier/OCR/forensics collaborator timed out or failed after retries,
/// so the corresponding check could not produce a verdict. They carry no
/// default weight and exist so the assessment records the gap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagType {
    /// EXIF GPS is farther from the expected asset location than allowed
    GpsMismatch,
    /// No image in the submission carries EXIF metadata (or GPS EXIF where required)
    ExifMissing,
    /// Capture timestamp outside the allowed window around the sanction date
    TimeMismatch,
    /// Perceptual-hash match against a previously seen image
    DuplicateImage,
    /// Classifier found no allowed asset type in the imagery
    UnknownAsset,
    /// Error-level analysis indicates the image was edited
    ElaTampered,
    /// Image judged to be AI-generated
    AiGenerated,
    /// No invoice document attached
    InvoiceMissing,
    /// OCR'd invoice amount diverges from the sanctioned amount
    InvoiceAmountMismatch,
    /// Blur/resolution below the configured quality floor
    LowQuality,
    /// Classifier verdict below the configured confidence threshold
    LowConfidence,
    /// Photo-of-a-printed-photo heuristics triggered
    PrintedPhotoDetected,
    /// Screenshot heuristics triggered
    ScreenshotDetected,
    /// Asset classifier unreachable after bounded retries
    ClassifierUnavailable,
    /// Invoice OCR unreachable after bounded retries
    OcrUnavailable,
    /// Image forensics service unreachable after bounded retries
    ForensicsUnavailable,
}

impl FlagType {
    /// Whether this flag is a degraded-collaborator signal rather than a
    /// positive fraud finding.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            FlagType::ClassifierUnavailable
                | FlagType::OcrUnavailable
                | FlagType::ForensicsUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_flag_serialization_screaming_snake() {
        let json = serde_json::to_string(&FlagType::GpsMismatch).unwrap();
        assert_eq!(json, "\"GPS_MISMATCH\"");

        let parsed: FlagType = serde_json::from_str("\"PRINTED_PHOTO_DETECTED\"").unwrap();
        assert_eq!(parsed, FlagType::PrintedPhotoDetected);
    }

    #[test]
    fn test_flag_display_round_trip() {
        let flag = FlagType::ElaTampered;
        assert_eq!(flag.to_string(), "ELA_TAMPERED");
        assert_eq!(FlagType::from_str("ELA_TAMPERED").unwrap(), flag);
    }

    #[test]
    fn test_degraded_flags() {
        assert!(FlagType::ClassifierUnavailable.is_degraded());
        assert!(FlagType::OcrUnavailable.is_degraded());
        assert!(!FlagType::GpsMismatch.is_degraded());
    }
}
