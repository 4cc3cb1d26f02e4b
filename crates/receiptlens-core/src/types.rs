// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for ReceiptLens: normalized geometry, detection results,
// device resource profiles, and the finished-capture hand-off record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 2D point in normalized frame coordinates (`0.0..=1.0` on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp each axis independently into `[0, 1]`. NaN maps to 0.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One of the four named document corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners in outline order: TL → TR → BR → BL.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Short handle label shown next to the corner in the overlay.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TopLeft => "TL",
            Self::TopRight => "TR",
            Self::BottomRight => "BR",
            Self::BottomLeft => "BL",
        }
    }
}

/// Four named normalized points describing a document boundary.
///
/// Coordinates are always stored clamped to `[0, 1]`, including when
/// deserialized. No ordering is enforced between corners: a user may drag
/// `top_left` to the right of `top_right`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCornerSet")]
pub struct CornerSet {
    top_left: Point,
    top_right: Point,
    bottom_left: Point,
    bottom_right: Point,
}

impl CornerSet {
    pub fn new(top_left: Point, top_right: Point, bottom_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left: top_left.clamped(),
            top_right: top_right.clamped(),
            bottom_left: bottom_left.clamped(),
            bottom_right: bottom_right.clamped(),
        }
    }

    /// Axis-aligned rectangle spanning `[min_x, max_x] × [min_y, max_y]`.
    pub fn from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(min_x, max_y),
            Point::new(max_x, max_y),
        )
    }

    /// Rectangle inset from every frame edge by `margin` (e.g. 0.05 → 5%/95%).
    pub fn inset(margin: f32) -> Self {
        Self::from_bounds(margin, margin, 1.0 - margin, 1.0 - margin)
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn top_right(&self) -> Point {
        self.top_right
    }

    pub fn bottom_left(&self) -> Point {
        self.bottom_left
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    pub fn get(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    /// Replace one corner, clamping the new position into `[0, 1]`.
    /// The other three corners are never touched.
    pub fn set(&mut self, corner: Corner, point: Point) {
        let point = point.clamped();
        match corner {
            Corner::TopLeft => self.top_left = point,
            Corner::TopRight => self.top_right = point,
            Corner::BottomRight => self.bottom_right = point,
            Corner::BottomLeft => self.bottom_left = point,
        }
    }

    /// Corners in outline order (TL → TR → BR → BL).
    pub fn outline(&self) -> [Point; 4] {
        Corner::ALL.map(|corner| self.get(corner))
    }

    /// Bounding box of the four points as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let points = self.outline();
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (min_x, min_y, max_x, max_y)
    }

    /// Horizontal extent (max − min).
    pub fn width(&self) -> f32 {
        let (min_x, _, max_x, _) = self.bounds();
        max_x - min_x
    }

    /// Vertical extent (max − min).
    pub fn height(&self) -> f32 {
        let (_, min_y, _, max_y) = self.bounds();
        max_y - min_y
    }
}

impl Default for CornerSet {
    fn default() -> Self {
        Self::inset(0.05)
    }
}

/// Wire form of [`CornerSet`]; converted through the clamping constructor.
#[derive(Deserialize)]
struct RawCornerSet {
    top_left: Point,
    top_right: Point,
    bottom_left: Point,
    bottom_right: Point,
}

impl From<RawCornerSet> for CornerSet {
    fn from(raw: RawCornerSet) -> Self {
        Self::new(raw.top_left, raw.top_right, raw.bottom_left, raw.bottom_right)
    }
}

/// A per-frame document detection. Absence ("no document this frame") is
/// expressed as `Option::<DetectionResult>::None`, never as an error.
///
/// `width` and `height` are derived from `corners`; deserialization
/// recomputes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDetectionResult")]
pub struct DetectionResult {
    corners: CornerSet,
    width: f32,
    height: f32,
    confidence: f32,
}

impl DetectionResult {
    pub fn new(corners: CornerSet, confidence: f32) -> Self {
        Self {
            width: corners.width(),
            height: corners.height(),
            corners,
            confidence: confidence.max(0.0),
        }
    }

    pub fn corners(&self) -> CornerSet {
        self.corners
    }

    /// Normalized horizontal extent, `0.0..=1.0`.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Normalized vertical extent, `0.0..=1.0`.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Edge density per grid cell of the winning region.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

#[derive(Deserialize)]
struct RawDetectionResult {
    corners: CornerSet,
    confidence: f32,
}

impl From<RawDetectionResult> for DetectionResult {
    fn from(raw: RawDetectionResult) -> Self {
        Self::new(raw.corners, raw.confidence)
    }
}

/// Per-device sampling policy, passed in by the host instead of sniffing the
/// platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    /// Ticks skipped between two processed ticks (2 → process one of three).
    pub max_frame_skip: u32,
    /// Scale applied to live frames before edge analysis.
    pub downscale_factor: f32,
    /// Delay between two sampler ticks, in milliseconds.
    pub tick_interval_ms: u64,
}

impl ResourceProfile {
    /// Profile for phones and other resource-constrained devices.
    pub fn constrained() -> Self {
        Self {
            max_frame_skip: 2,
            downscale_factor: 0.25,
            tick_interval_ms: 150,
        }
    }

    /// Profile for desktops and capable devices.
    pub fn standard() -> Self {
        Self {
            max_frame_skip: 0,
            downscale_factor: 0.5,
            tick_interval_ms: 100,
        }
    }

    /// Select a profile from an explicit capability flag.
    pub fn for_device(constrained: bool) -> Self {
        if constrained {
            Self::constrained()
        } else {
            Self::standard()
        }
    }
}

impl Default for ResourceProfile {
    fn default() -> Self {
        Self::standard()
    }
}

/// Unique identifier for one capture (adjustment session and its crop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureId(pub Uuid);

impl CaptureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaptureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaptureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finished, enhanced crop ready for the recognition and stitching
/// collaborators. `encoded` holds the image bytes in `mime_type` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedCrop {
    pub id: CaptureId,
    pub captured_at: DateTime<Utc>,
    /// Corners the crop was taken from (detected or user-adjusted).
    pub corners: CornerSet,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub encoded: Vec<u8>,
}
