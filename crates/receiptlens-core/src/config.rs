// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration: detection thresholds, editor behaviour, crop policy,
// and the device resource profile.

use serde::{Deserialize, Serialize};

use crate::error::{ReceiptLensError, Result};
use crate::types::ResourceProfile;

/// Largest accepted density grid. The locator's search grows with the cube
/// of the grid side, and the grid itself with its square.
pub const MAX_GRID_SIZE: u32 = 256;

/// Thresholds for the edge map and the density-grid rectangle search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Cells per side of the density grid, `2..=MAX_GRID_SIZE`.
    pub grid_size: u32,
    /// Gradient magnitude (L1) above which a pixel counts as an edge.
    pub edge_threshold: u16,
    /// Edge-map value above which a pixel is counted into its grid cell.
    pub density_threshold: u8,
    /// Smallest search square, as a fraction of `grid_size`.
    pub min_search_fraction: f32,
    /// Regions narrower or shorter than this are rejected.
    pub min_extent: f32,
    /// Regions wider or taller than this are rejected.
    pub max_extent: f32,
    /// Lowest accepted `height / width`.
    pub min_aspect: f32,
    /// Highest accepted `height / width`.
    pub max_aspect: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            edge_threshold: 40,
            density_threshold: 128,
            min_search_fraction: 0.4,
            min_extent: 0.15,
            max_extent: 0.98,
            min_aspect: 0.3,
            max_aspect: 5.0,
        }
    }
}

/// Interactive corner editor settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum normalized distance from a corner for a press to grab it.
    pub hit_radius: f32,
    /// Margin of the fallback rectangle when no valid detection exists.
    pub default_inset: f32,
    /// Handle radius in overlay pixels.
    pub handle_radius_px: u32,
    /// Opacity of the dimming mask outside the document (0 = none, 1 = black).
    pub mask_alpha: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_radius: 0.08,
            default_inset: 0.05,
            handle_radius_px: 12,
            mask_alpha: 0.5,
        }
    }
}

/// Crop and enhancement policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Minimum output width and height in pixels.
    pub min_size_px: u32,
    /// Linear contrast factor around mid-gray (1.0 = unchanged).
    pub contrast_factor: f32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_size_px: 50,
            contrast_factor: 1.2,
        }
    }
}

/// Complete scanner settings, persisted by the host as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub detector: DetectorConfig,
    pub editor: EditorConfig,
    pub crop: CropConfig,
    pub profile: ResourceProfile,
}

impl ScannerConfig {
    /// Default settings with the profile chosen from a capability flag.
    pub fn for_device(constrained: bool) -> Self {
        Self {
            profile: ResourceProfile::for_device(constrained),
            ..Self::default()
        }
    }

    /// Parse and validate settings from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        if d.grid_size < 2 {
            return Err(invalid(format!("grid_size must be >= 2, got {}", d.grid_size)));
        }
        if d.grid_size > MAX_GRID_SIZE {
            return Err(invalid(format!(
                "grid_size must be <= {MAX_GRID_SIZE}, got {}",
                d.grid_size
            )));
        }
        if !(d.min_search_fraction > 0.0 && d.min_search_fraction < 1.0) {
            return Err(invalid(format!(
                "min_search_fraction must be in (0, 1), got {}",
                d.min_search_fraction
            )));
        }
        if !(d.min_extent >= 0.0 && d.min_extent < d.max_extent && d.max_extent <= 1.0) {
            return Err(invalid(format!(
                "extent range [{}, {}] is not a valid sub-range of [0, 1]",
                d.min_extent, d.max_extent
            )));
        }
        if !(d.min_aspect > 0.0 && d.min_aspect < d.max_aspect) {
            return Err(invalid(format!(
                "aspect range [{}, {}] is inverted or non-positive",
                d.min_aspect, d.max_aspect
            )));
        }
        if !(self.editor.hit_radius > 0.0) {
            return Err(invalid("hit_radius must be positive".into()));
        }
        if !(self.editor.default_inset >= 0.0 && self.editor.default_inset < 0.5) {
            return Err(invalid(format!(
                "default_inset must be in [0, 0.5), got {}",
                self.editor.default_inset
            )));
        }
        if !(0.0..=1.0).contains(&self.editor.mask_alpha) {
            return Err(invalid("mask_alpha must be in [0, 1]".into()));
        }
        if !(self.crop.contrast_factor > 0.0) {
            return Err(invalid("contrast_factor must be positive".into()));
        }
        let p = &self.profile;
        if !(p.downscale_factor > 0.0 && p.downscale_factor <= 1.0) {
            return Err(invalid(format!(
                "downscale_factor must be in (0, 1], got {}",
                p.downscale_factor
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ReceiptLensError {
    ReceiptLensError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ScannerConfig::default().validate().expect("defaults validate");
        ScannerConfig::for_device(true).validate().expect("constrained validates");
    }

    #[test]
    fn json_round_trip_preserves_settings() {
        let mut config = ScannerConfig::for_device(true);
        config.detector.edge_threshold = 55;
        config.crop.min_size_px = 64;

        let json = config.to_json_string().expect("serialize");
        let parsed = ScannerConfig::from_json_str(&json).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let parsed = ScannerConfig::from_json_str(r#"{ "detector": { "grid_size": 16 } }"#)
            .expect("parse");
        assert_eq!(parsed.detector.grid_size, 16);
        assert_eq!(parsed.detector.edge_threshold, 40);
        assert_eq!(parsed.crop, CropConfig::default());
        assert_eq!(parsed.profile, ResourceProfile::standard());
    }

    #[test]
    fn inverted_aspect_range_is_rejected() {
        let mut config = ScannerConfig::default();
        config.detector.min_aspect = 6.0;
        assert!(matches!(
            config.validate(),
            Err(ReceiptLensError::InvalidConfig(_))
        ));
    }

    #[test]
    fn grid_size_has_an_upper_bound() {
        let mut config = ScannerConfig::default();
        config.detector.grid_size = MAX_GRID_SIZE;
        config.validate().expect("largest grid validates");

        config.detector.grid_size = MAX_GRID_SIZE + 1;
        assert!(matches!(
            config.validate(),
            Err(ReceiptLensError::InvalidConfig(_))
        ));
        assert!(ScannerConfig::from_json_str(r#"{ "detector": { "grid_size": 4294967295 } }"#).is_err());
    }

    #[test]
    fn zero_downscale_is_rejected() {
        let json = r#"{ "profile": { "max_frame_skip": 0, "downscale_factor": 0.0, "tick_interval_ms": 100 } }"#;
        assert!(ScannerConfig::from_json_str(json).is_err());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            ScannerConfig::from_json_str("{ not json"),
            Err(ReceiptLensError::Serialization(_))
        ));
    }
}
