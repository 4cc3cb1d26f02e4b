// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adjustment session state: the captured still, its editable corners, and the
// Idle/Dragging pointer state machine.

use image::RgbaImage;
use receiptlens_core::config::EditorConfig;
use receiptlens_core::{CaptureId, Corner, CornerSet, DetectionResult, Point};
use tracing::debug;

use crate::scan::locator::DetectionGate;

/// Pointer state of an adjustment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Corner),
}

/// One pointer or touch event, in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up,
    Cancel,
}

/// Convert a display-space pointer position into normalized coordinates.
///
/// The result is not clamped; the session clamps when storing. Returns `None`
/// for a display with no area.
pub fn normalize_pointer(px: f32, py: f32, display_width: f32, display_height: f32) -> Option<Point> {
    if display_width <= 0.0 || display_height <= 0.0 {
        return None;
    }
    Some(Point::new(px / display_width, py / display_height))
}

/// Corners to start an adjustment from: the last detection when it still
/// passes the validation gate, otherwise the default inset rectangle.
pub fn seed_corners(
    last_detection: Option<&DetectionResult>,
    gate: &DetectionGate,
    default_inset: f32,
) -> CornerSet {
    match last_detection {
        Some(detection) if gate.accepts(&detection.corners()) => detection.corners(),
        Some(_) => {
            debug!("Last detection fails the gate; using default corners");
            CornerSet::inset(default_inset)
        }
        None => CornerSet::inset(default_inset),
    }
}

/// The editable state of one capture between still capture and crop.
#[derive(Debug, Clone)]
pub struct AdjustmentSession {
    id: CaptureId,
    still: Option<RgbaImage>,
    corners: CornerSet,
    drag: DragState,
}

impl AdjustmentSession {
    pub fn new(still: RgbaImage, corners: CornerSet) -> Self {
        Self {
            id: CaptureId::new(),
            still: Some(still),
            corners,
            drag: DragState::Idle,
        }
    }

    pub fn id(&self) -> CaptureId {
        self.id
    }

    pub fn still(&self) -> Option<&RgbaImage> {
        self.still.as_ref()
    }

    /// Drop the still image. Corners stay readable.
    pub fn release_still(&mut self) -> Option<RgbaImage> {
        self.drag = DragState::Idle;
        self.still.take()
    }

    pub fn corners(&self) -> CornerSet {
        self.corners
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Nearest corner to `pointer` if it lies strictly within `hit_radius`.
    pub fn hit_test(&self, pointer: Point, hit_radius: f32) -> Option<Corner> {
        Corner::ALL
            .iter()
            .map(|&c| (c, self.corners.get(c).distance(&pointer)))
            .filter(|(_, d)| *d < hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }

    /// Apply one pointer event. Returns `true` when the corners changed.
    pub fn apply_input(&mut self, input: PointerInput, config: &EditorConfig) -> bool {
        match (self.drag, input) {
            (_, PointerInput::Down(pointer)) => {
                self.drag = match self.hit_test(pointer, config.hit_radius) {
                    Some(corner) => DragState::Dragging(corner),
                    None => DragState::Idle,
                };
                false
            }
            (DragState::Dragging(corner), PointerInput::Move(pointer)) => {
                self.corners.set(corner, pointer);
                true
            }
            (DragState::Idle, PointerInput::Move(_)) => false,
            (_, PointerInput::Up | PointerInput::Cancel) => {
                self.drag = DragState::Idle;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AdjustmentSession {
        AdjustmentSession::new(RgbaImage::new(100, 100), CornerSet::default())
    }

    #[test]
    fn press_near_corner_starts_drag() {
        let mut s = session();
        s.apply_input(PointerInput::Down(Point::new(0.07, 0.06)), &EditorConfig::default());
        assert_eq!(s.drag_state(), DragState::Dragging(Corner::TopLeft));
    }

    #[test]
    fn press_beyond_hit_radius_does_not_drag() {
        let mut s = session();
        let config = EditorConfig::default();
        s.apply_input(PointerInput::Down(Point::new(0.5, 0.5)), &config);
        assert_eq!(s.drag_state(), DragState::Idle);

        let before = s.corners();
        assert!(!s.apply_input(PointerInput::Move(Point::new(0.3, 0.3)), &config));
        assert_eq!(s.corners(), before);
    }

    #[test]
    fn hit_radius_is_strict() {
        let s = session();
        // Exactly 0.08 from (0.05, 0.05) along x, well away from the others.
        let on_edge = Point::new(0.05 + 0.08, 0.05);
        let d = s.corners().top_left().distance(&on_edge);
        assert_eq!(s.hit_test(on_edge, d), None);
        assert_eq!(s.hit_test(on_edge, d + 1e-4), Some(Corner::TopLeft));
    }

    #[test]
    fn drag_moves_only_the_selected_corner() {
        let mut s = session();
        let config = EditorConfig::default();
        let before = s.corners();
        s.apply_input(PointerInput::Down(Point::new(0.94, 0.94)), &config);
        assert!(s.apply_input(PointerInput::Move(Point::new(0.7, 0.8)), &config));

        let after = s.corners();
        assert_eq!(after.bottom_right(), Point::new(0.7, 0.8));
        assert_eq!(after.top_left(), before.top_left());
        assert_eq!(after.top_right(), before.top_right());
        assert_eq!(after.bottom_left(), before.bottom_left());
    }

    #[test]
    fn release_and_cancel_return_to_idle() {
        let config = EditorConfig::default();
        for end in [PointerInput::Up, PointerInput::Cancel] {
            let mut s = session();
            s.apply_input(PointerInput::Down(Point::new(0.05, 0.95)), &config);
            assert_eq!(s.drag_state(), DragState::Dragging(Corner::BottomLeft));
            s.apply_input(end, &config);
            assert_eq!(s.drag_state(), DragState::Idle);
        }
    }

    #[test]
    fn normalize_pointer_divides_by_display_size() {
        assert_eq!(normalize_pointer(50.0, 30.0, 200.0, 120.0), Some(Point::new(0.25, 0.25)));
        assert_eq!(normalize_pointer(-20.0, 0.0, 200.0, 100.0), Some(Point::new(-0.1, 0.0)));
        assert_eq!(normalize_pointer(1.0, 1.0, 0.0, 100.0), None);
    }

    #[test]
    fn valid_detection_seeds_corners() {
        let corners = CornerSet::from_bounds(0.2, 0.1, 0.8, 0.9);
        let detection = DetectionResult::new(corners, 0.6);
        assert_eq!(
            seed_corners(Some(&detection), &DetectionGate::default(), 0.05),
            corners
        );
        assert_eq!(
            seed_corners(None, &DetectionGate::default(), 0.05),
            CornerSet::inset(0.05)
        );
    }
}
