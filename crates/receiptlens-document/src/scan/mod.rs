// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: edge maps, density-grid document location, bounding-box
// crop with contrast enhancement, and crop quality analysis.

pub mod crop;
pub mod edges;
pub mod locator;
pub mod quality;

pub use crop::{CropOutcome, CropRegion, FallbackReason, crop_and_enhance};
pub use edges::{EdgeMap, build_edge_map};
pub use locator::{DensityGrid, DetectionGate, Rejection, RegionCandidate, locate};
pub use quality::{Preprocessing, QualityReport, analyze_quality};
