//! Media items attached to a submission
//!
//! Media is immutable once the submission is submitted. Capture-side
//! diagnostics (EXIF presence, GPS, blur variance, screenshot heuristics)
//! are extracted on device and travel with the item; the risk engine only
//! consults these attributes, never the raw bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The role of a media item within an evidence submission.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    /// Front view photo of the financed asset
    Front,
    /// Back view photo
    Back,
    /// Left side photo
    Left,
    /// Right side photo
    Right,
    /// Purchase invoice (photo or scan)
    Invoice,
    /// Walk-around video of the asset
    Video,
}

impl MediaKind {
    /// Photo kinds that count toward `min_photos`.
    pub fn is_photo(&self) -> bool {
        matches!(
            self,
            MediaKind::Front | MediaKind::Back | MediaKind::Left | MediaKind::Right
        )
    }
}

/// One immutable media item of a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub kind: MediaKind,
    /// Object-store key of the uploaded file
    pub file_key: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Capture timestamp from EXIF (None when the file carries none)
    pub captured_at: Option<DateTime<Utc>>,
    pub gps_lat: Option<f64>,
    pub gps_lng: Option<f64>,
    pub has_exif: bool,
    pub has_gps_exif: bool,
    pub is_screenshot: bool,
    pub is_printed_photo_suspect: bool,
    /// Pixel width, when known at capture time
    #[serde(default)]
    pub width: Option<u32>,
    /// Pixel height, when known at capture time
    #[serde(default)]
    pub height: Option<u32>,
    /// Laplacian blur variance computed on device (higher = sharper)
    #[serde(default)]
    pub blur_variance: Option<f64>,
    /// Duration in seconds for video items
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

impl Media {
    /// GPS coordinates from EXIF, when both components are present.
    pub fn exif_gps(&self) -> Option<(f64, f64)> {
        if !self.has_gps_exif {
            return None;
        }
        match (self.gps_lat, self.gps_lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}
