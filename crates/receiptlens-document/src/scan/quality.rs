// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop quality analysis: brightness and contrast statistics of a finished
// crop, with a recommendation for how much preprocessing the recognition side
// should apply.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Standard deviation at or above which grayscale alone is sufficient.
const GOOD_CONTRAST: f32 = 40.0;
/// Standard deviation below which full enhancement is recommended.
const LOW_CONTRAST: f32 = 30.0;
/// Mean brightness outside `[DARK, BRIGHT]` needs a brightness correction.
const DARK: f32 = 100.0;
const BRIGHT: f32 = 200.0;

/// How much preprocessing the recognition collaborator should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preprocessing {
    /// Good contrast: grayscale conversion is enough.
    Minimal,
    /// Low contrast: local histogram equalisation recommended.
    Adaptive,
    /// Very low contrast: equalisation plus adaptive thresholding.
    FullEnhancement,
}

/// Luminance statistics of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Mean luminance, 0–255.
    pub brightness: f32,
    /// Standard deviation of luminance.
    pub contrast: f32,
    pub needs_brightness_adjustment: bool,
    pub recommendation: Preprocessing,
}

/// Analyze a crop. Returns `None` for an empty image.
pub fn analyze_quality(image: &RgbaImage) -> Option<QualityReport> {
    let gray = image::imageops::grayscale(image);
    let count = gray.width() as usize * gray.height() as usize;
    if count == 0 {
        return None;
    }

    let n = count as f64;
    let mean = gray.pixels().map(|p| p.0[0] as f64).sum::<f64>() / n;
    let variance = gray
        .pixels()
        .map(|p| {
            let d = p.0[0] as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    let brightness = mean as f32;
    let contrast = variance.sqrt() as f32;
    let recommendation = if contrast >= GOOD_CONTRAST {
        Preprocessing::Minimal
    } else if contrast >= LOW_CONTRAST {
        Preprocessing::Adaptive
    } else {
        Preprocessing::FullEnhancement
    };

    let report = QualityReport {
        brightness,
        contrast,
        needs_brightness_adjustment: !(DARK..=BRIGHT).contains(&brightness),
        recommendation,
    };
    debug!(?report, "Crop quality analyzed");
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Two-tone image: half `low`, half `high`. Its standard deviation is
    /// `(high - low) / 2`.
    fn two_tone(low: u8, high: u8) -> RgbaImage {
        RgbaImage::from_fn(40, 40, |x, _| {
            let v = if x < 20 { low } else { high };
            Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn empty_image_has_no_report() {
        assert!(analyze_quality(&RgbaImage::new(0, 0)).is_none());
    }

    #[test]
    fn high_contrast_needs_minimal_preprocessing() {
        let report = analyze_quality(&two_tone(50, 200)).expect("report");
        assert!((report.contrast - 75.0).abs() < 0.5);
        assert!((report.brightness - 125.0).abs() < 0.5);
        assert_eq!(report.recommendation, Preprocessing::Minimal);
        assert!(!report.needs_brightness_adjustment);
    }

    #[test]
    fn moderate_contrast_needs_adaptive_preprocessing() {
        let report = analyze_quality(&two_tone(115, 185)).expect("report");
        assert!((report.contrast - 35.0).abs() < 0.5);
        assert_eq!(report.recommendation, Preprocessing::Adaptive);
    }

    #[test]
    fn flat_image_needs_full_enhancement() {
        let report = analyze_quality(&two_tone(230, 240)).expect("report");
        assert_eq!(report.recommendation, Preprocessing::FullEnhancement);
        assert!(report.needs_brightness_adjustment);
    }

    #[test]
    fn dark_image_needs_brightness_adjustment() {
        let report = analyze_quality(&two_tone(10, 30)).expect("report");
        assert!(report.needs_brightness_adjustment);
    }
}
