//! Deterministic per-section checks
//!
//! Each function evaluates one enabled rule section against the
//! submission's media attributes and returns the flags it raises. These
//! checks are pure; the collaborator-backed sections (forensics, OCR,
//! asset classification) live in the engine where timeouts apply.

use chrono::Duration;

use loanguard_core::{FlagType, GeoPoint, Loan, MediaKind, Submission};

use crate::ruleset::{GpsRules, ImageQualityRules, MediaRequirements, TimeRules};

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Why a submission fails the media-requirements precondition. A failing
/// submission is INCOMPLETE, never partially scored.
pub fn media_shortfall(submission: &Submission, req: &MediaRequirements) -> Option<String> {
    let photo_count = submission
        .media
        .iter()
        .filter(|m| m.kind.is_photo())
        .count() as u32;
    if photo_count < req.min_photos {
        return Some(format!(
            "{} photos submitted, {} required",
            photo_count, req.min_photos
        ));
    }

    if req.min_video_seconds > 0 {
        let video_seconds: f64 = submission
            .media
            .iter()
            .filter(|m| m.kind == MediaKind::Video)
            .filter_map(|m| m.duration_seconds)
            .sum();
        if video_seconds < req.min_video_seconds as f64 {
            return Some(format!(
                "{:.0}s of video submitted, {}s required",
                video_seconds, req.min_video_seconds
            ));
        }
    }

    if !req.allowed_mime_types.is_empty() {
        for media in &submission.media {
            if !req.allowed_mime_types.contains(&media.mime_type) {
                return Some(format!("mime type {} not allowed", media.mime_type));
            }
        }
    }

    None
}

/// GPS section. Returns the raised flags plus the closest EXIF-GPS
/// distance to the expected location (diagnostic).
pub fn gps_flags(
    submission: &Submission,
    loan: &Loan,
    rules: &GpsRules,
) -> (Vec<FlagType>, Option<f64>) {
    let mut flags = Vec::new();

    let images: Vec<_> = submission.media.iter().filter(|m| m.is_image()).collect();

    // Both conditions can hold at once; the flag is raised at most once.
    let exif_absent = !images.is_empty() && images.iter().all(|m| !m.has_exif);
    let gps_absent = rules.require_exif_gps && images.iter().all(|m| m.exif_gps().is_none());
    if exif_absent || gps_absent {
        flags.push(FlagType::ExifMissing);
    }

    let mut min_distance = None;
    if let Some(expected) = loan.expected_location {
        for media in &images {
            if let Some((lat, lng)) = media.exif_gps() {
                let distance = haversine_km(GeoPoint { lat, lng }, expected);
                if min_distance.map_or(true, |d| distance < d) {
                    min_distance = Some(distance);
                }
            }
        }
        if let Some(distance) = min_distance {
            if distance > rules.max_distance_km {
                flags.push(FlagType::GpsMismatch);
            }
        }
    }

    if rules.mock_location_block && submission.capture_context.is_mock_location {
        flags.push(FlagType::GpsMismatch);
    }

    (flags, min_distance)
}

/// Capture-time window around the sanction date.
pub fn time_flags(submission: &Submission, loan: &Loan, rules: &TimeRules) -> Vec<FlagType> {
    let deadline = loan.sanction_date + Duration::days(rules.max_days_after_sanction);

    for media in &submission.media {
        let Some(captured_at) = media.captured_at else {
            continue;
        };
        if captured_at < loan.sanction_date && !rules.allow_before_sanction {
            return vec![FlagType::TimeMismatch];
        }
        if captured_at > deadline {
            return vec![FlagType::TimeMismatch];
        }
    }

    Vec::new()
}

/// Blur/resolution floors and screenshot/printed-photo rejection.
pub fn quality_flags(submission: &Submission, rules: &ImageQualityRules) -> Vec<FlagType> {
    let mut flags = Vec::new();

    for media in submission.media.iter().filter(|m| m.is_image()) {
        if let (Some(threshold), Some(variance)) = (rules.blur_threshold, media.blur_variance) {
            if variance < threshold {
                flags.push(FlagType::LowQuality);
            }
        }
        if let Some(min) = rules.min_resolution {
            if let (Some(width), Some(height)) = (media.width, media.height) {
                if width < min.width || height < min.height {
                    flags.push(FlagType::LowQuality);
                }
            }
        }
        if rules.reject_screenshots && media.is_screenshot {
            flags.push(FlagType::ScreenshotDetected);
        }
        if rules.reject_printed_photos && media.is_printed_photo_suspect {
            flags.push(FlagType::PrintedPhotoDetected);
        }
    }

    flags
}
