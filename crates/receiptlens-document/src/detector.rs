// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-frame detection chain: downscale → edge map → density-grid locate.

use image::RgbaImage;
use receiptlens_core::config::DetectorConfig;
use receiptlens_core::{DetectionResult, ResourceProfile};
use tracing::{instrument, trace};

use crate::image::processor::downscale_rgba;
use crate::scan::edges::build_edge_map;
use crate::scan::locator::locate;

/// Stateless document detector for live frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentDetector {
    config: DetectorConfig,
    downscale_factor: f32,
}

impl DocumentDetector {
    /// Build a detector from host settings. Settings assembled in code rather
    /// than loaded through `ScannerConfig::from_json_str` should pass
    /// `ScannerConfig::validate` first; an oversized `grid_size` is capped
    /// at `MAX_GRID_SIZE` regardless.
    pub fn new(config: DetectorConfig, profile: &ResourceProfile) -> Self {
        Self {
            config,
            downscale_factor: profile.downscale_factor,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect the document in one full-size frame.
    ///
    /// Coordinates are normalized, so they apply unchanged to the full frame
    /// even though analysis runs on the downscaled copy. A frame with a zero
    /// dimension yields `None` without further work.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn detect(&self, frame: &RgbaImage) -> Option<DetectionResult> {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return None;
        }

        let small = downscale_rgba(frame, self.downscale_factor);
        trace!(
            work_w = small.width(),
            work_h = small.height(),
            "Frame downscaled"
        );
        let edges = build_edge_map(&small, self.config.edge_threshold);
        locate(&edges, &self.config)
    }
}

impl Default for DocumentDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default(), &ResourceProfile::standard())
    }
}
