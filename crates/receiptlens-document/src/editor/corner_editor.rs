// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive corner editor: owns one adjustment session from still capture
// until the crop is taken or the editor is destroyed.
//
// Corners move independently; nothing stops them from crossing. The crop step
// only uses their bounding box, and the overlay fills a crossed outline with
// the even-odd rule.

use image::RgbaImage;
use receiptlens_core::config::ScannerConfig;
use receiptlens_core::error::{ReceiptLensError, Result};
use receiptlens_core::{CaptureId, CapturedCrop, Corner, CornerSet, DetectionResult, Point};
use tracing::{debug, info, instrument};

use crate::capture::{EncodeFormat, package_crop};
use crate::editor::overlay::{self, Overlay};
use crate::editor::session::{AdjustmentSession, DragState, PointerInput, seed_corners};
use crate::scan::crop::{CropOutcome, crop_and_enhance};
use crate::scan::locator::DetectionGate;

/// Callback fired after every stored corner update.
pub type UpdateCallback = Box<dyn FnMut(&CornerSet)>;

pub struct CornerEditor {
    session: AdjustmentSession,
    config: ScannerConfig,
    on_update: Option<UpdateCallback>,
    closed: bool,
}

impl std::fmt::Debug for CornerEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CornerEditor")
            .field("session", &self.session.id())
            .field("corners", &self.session.corners())
            .field("drag", &self.session.drag_state())
            .field("closed", &self.closed)
            .finish()
    }
}

impl CornerEditor {
    /// Open an adjustment session on `still`.
    ///
    /// Starts from `last_detection` when it passes the detection gate,
    /// otherwise from the default inset rectangle.
    #[instrument(skip_all, fields(width = still.width(), height = still.height()))]
    pub fn new(
        still: RgbaImage,
        last_detection: Option<&DetectionResult>,
        config: &ScannerConfig,
    ) -> Self {
        let gate = DetectionGate::from_config(&config.detector);
        let corners = seed_corners(last_detection, &gate, config.editor.default_inset);
        let session = AdjustmentSession::new(still, corners);
        info!(session = %session.id(), seeded = last_detection.is_some(), "Adjustment session opened");
        Self {
            session,
            config: *config,
            on_update: None,
            closed: false,
        }
    }

    pub fn id(&self) -> CaptureId {
        self.session.id()
    }

    /// The live corners, by value.
    pub fn get_corners(&self) -> CornerSet {
        self.session.corners()
    }

    pub fn drag_state(&self) -> DragState {
        self.session.drag_state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_on_update<F>(&mut self, callback: F)
    where
        F: FnMut(&CornerSet) + 'static,
    {
        if self.closed {
            return;
        }
        self.on_update = Some(Box::new(callback));
    }

    /// Feed one pointer event. Ignored once the editor is destroyed.
    pub fn handle(&mut self, input: PointerInput) {
        if self.closed {
            return;
        }
        if self.session.apply_input(input, &self.config.editor) {
            let corners = self.session.corners();
            if let Some(callback) = self.on_update.as_mut() {
                callback(&corners);
            }
        }
    }

    /// Press at `pointer`. Returns the grabbed corner, if any.
    pub fn pointer_down(&mut self, pointer: Point) -> Option<Corner> {
        self.handle(PointerInput::Down(pointer));
        match self.session.drag_state() {
            DragState::Dragging(corner) => {
                debug!(corner = corner.label(), "Corner grabbed");
                Some(corner)
            }
            DragState::Idle => None,
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        self.handle(PointerInput::Move(pointer));
    }

    pub fn pointer_up(&mut self) {
        self.handle(PointerInput::Up);
    }

    /// Render the adjustment overlay for the current corners.
    pub fn render_overlay(&self) -> Result<Overlay> {
        let still = self.live_still()?;
        let active = match self.session.drag_state() {
            DragState::Dragging(corner) => Some(corner),
            DragState::Idle => None,
        };
        Ok(overlay::render(
            still,
            &self.session.corners(),
            active,
            &self.config.editor,
        ))
    }

    /// Crop and enhance the still with the current corners, then close the
    /// session.
    pub fn apply(&mut self) -> Result<CropOutcome> {
        let outcome = crop_and_enhance(
            self.live_still()?,
            &self.session.corners(),
            &self.config.crop,
        )?;
        self.destroy();
        Ok(outcome)
    }

    /// [`apply`](Self::apply) and encode the result for the collaborators.
    pub fn finish(&mut self, format: EncodeFormat) -> Result<CapturedCrop> {
        let corners = self.session.corners();
        let id = self.session.id();
        let outcome = self.apply()?;
        package_crop(outcome, corners, id, format)
    }

    /// Release the still image and callback. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.on_update = None;
        self.session.release_still();
        debug!(session = %self.session.id(), "Adjustment session closed");
    }

    fn live_still(&self) -> Result<&RgbaImage> {
        if self.closed {
            return Err(ReceiptLensError::SessionClosed);
        }
        self.session.still().ok_or(ReceiptLensError::SessionClosed)
    }
}

impl Drop for CornerEditor {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn still() -> RgbaImage {
        RgbaImage::from_pixel(400, 300, Rgba([180, 170, 160, 255]))
    }

    fn editor() -> CornerEditor {
        CornerEditor::new(still(), None, &ScannerConfig::default())
    }

    #[test]
    fn narrow_detection_is_replaced_by_default_inset() {
        let narrow = DetectionResult::new(CornerSet::from_bounds(0.4, 0.1, 0.45, 0.9), 0.9);
        let editor = CornerEditor::new(still(), Some(&narrow), &ScannerConfig::default());
        let corners = editor.get_corners();

        assert!((corners.top_left().x - 0.05).abs() < 1e-6);
        assert!((corners.top_left().y - 0.05).abs() < 1e-6);
        assert!((corners.bottom_right().x - 0.95).abs() < 1e-6);
        assert!((corners.bottom_right().y - 0.95).abs() < 1e-6);
    }

    #[test]
    fn valid_detection_is_used_as_seed() {
        let found = DetectionResult::new(CornerSet::from_bounds(0.2, 0.1, 0.7, 0.9), 0.7);
        let editor = CornerEditor::new(still(), Some(&found), &ScannerConfig::default());
        assert_eq!(editor.get_corners(), found.corners());
    }

    #[test]
    fn dragging_past_the_frame_stores_clamped_corner() {
        let mut editor = editor();
        assert_eq!(editor.pointer_down(Point::new(0.05, 0.05)), Some(Corner::TopLeft));
        editor.pointer_move(Point::new(-0.5, -0.5));
        assert_eq!(editor.get_corners().top_left(), Point::new(0.0, 0.0));
        editor.pointer_up();
        assert_eq!(editor.drag_state(), DragState::Idle);
    }

    #[test]
    fn out_of_range_drags_always_stay_in_unit_square() {
        let mut editor = editor();
        assert_eq!(editor.pointer_down(Point::new(0.95, 0.05)), Some(Corner::TopRight));

        // Deterministic LCG sweep over [-3, 4) on both axes.
        let mut state: u32 = 0x2545_f491;
        for _ in 0..500 {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let x = (state >> 8) as f32 / (1u32 << 24) as f32 * 7.0 - 3.0;
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let y = (state >> 8) as f32 / (1u32 << 24) as f32 * 7.0 - 3.0;

            editor.pointer_move(Point::new(x, y));
            let p = editor.get_corners().top_right();
            assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y), "{p:?}");
        }
    }

    #[test]
    fn press_in_the_middle_grabs_nothing() {
        let mut editor = editor();
        let before = editor.get_corners();
        assert_eq!(editor.pointer_down(Point::new(0.5, 0.5)), None);
        editor.pointer_move(Point::new(0.1, 0.1));
        assert_eq!(editor.get_corners(), before);
    }

    #[test]
    fn update_callback_sees_each_stored_position() {
        let mut editor = editor();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.set_on_update(move |c| sink.borrow_mut().push(c.bottom_left()));

        editor.pointer_down(Point::new(0.05, 0.95));
        editor.pointer_move(Point::new(0.1, 0.9));
        editor.pointer_move(Point::new(0.2, 1.4));
        editor.pointer_up();
        editor.pointer_move(Point::new(0.3, 0.3));

        assert_eq!(
            *seen.borrow(),
            vec![Point::new(0.1, 0.9), Point::new(0.2, 1.0)]
        );
    }

    #[test]
    fn corners_may_cross() {
        let mut editor = editor();
        editor.pointer_down(Point::new(0.05, 0.05));
        editor.pointer_move(Point::new(0.99, 0.5));
        let corners = editor.get_corners();
        assert!(corners.top_left().x > corners.top_right().x);
        assert!(editor.render_overlay().is_ok());
    }

    #[test]
    fn destroy_twice_is_safe_and_stops_input() {
        let mut editor = editor();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        editor.set_on_update(move |_| *counter.borrow_mut() += 1);

        editor.destroy();
        editor.destroy();
        assert!(editor.is_closed());

        let before = editor.get_corners();
        assert_eq!(editor.pointer_down(Point::new(0.05, 0.05)), None);
        editor.pointer_move(Point::new(0.5, 0.5));
        assert_eq!(editor.get_corners(), before);
        assert_eq!(*calls.borrow(), 0);
        assert!(matches!(
            editor.render_overlay(),
            Err(ReceiptLensError::SessionClosed)
        ));
        assert!(matches!(editor.apply(), Err(ReceiptLensError::SessionClosed)));
    }

    #[test]
    fn apply_crops_with_current_corners_and_closes() {
        let mut editor = editor();
        editor.pointer_down(Point::new(0.05, 0.05));
        editor.pointer_move(Point::new(0.25, 0.25));
        editor.pointer_up();
        editor.pointer_down(Point::new(0.95, 0.95));
        editor.pointer_move(Point::new(0.75, 0.75));
        editor.pointer_up();

        let outcome = editor.apply().expect("crop");
        // Bounding box x 0.05..0.95 (TR and BL untouched), y 0.05..0.95.
        assert!(outcome.is_cropped());
        assert_eq!(outcome.image.dimensions(), (360, 270));
        assert!(editor.is_closed());
    }

    #[test]
    fn finish_packages_the_session_crop() {
        let mut editor = editor();
        let id = editor.id();
        let corners = editor.get_corners();
        let crop = editor.finish(EncodeFormat::Png).expect("finish");
        assert_eq!(crop.id, id);
        assert_eq!(crop.corners, corners);
        assert_eq!((crop.width, crop.height), (360, 270));
    }
}
