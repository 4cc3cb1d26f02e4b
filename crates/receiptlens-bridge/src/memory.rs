// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory bridge implementations for desktop hosts and tests: a frame
// source that replays a fixed picture, and a service that collects the crops
// handed to it.

use std::cell::RefCell;

use image::RgbaImage;
use receiptlens_core::CapturedCrop;
use receiptlens_core::error::{ReceiptLensError, Result};
use tracing::debug;

use crate::traits::{FrameSource, RecognitionService, StillCapture, StitchingService};

/// Frame source that returns the same picture on every snapshot.
///
/// With no picture loaded it reports `(0, 0)`, like a camera that has not
/// produced its first frame yet.
#[derive(Debug, Default)]
pub struct StaticFrameSource {
    frame: Option<RgbaImage>,
    snapshots: usize,
}

impl StaticFrameSource {
    pub fn new(frame: RgbaImage) -> Self {
        Self {
            frame: Some(frame),
            snapshots: 0,
        }
    }

    /// A source with no picture yet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_frame(&mut self, frame: RgbaImage) {
        self.frame = Some(frame);
    }

    pub fn clear(&mut self) {
        self.frame = None;
    }

    /// Number of snapshots taken so far.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots
    }
}

impl FrameSource for StaticFrameSource {
    fn dimensions(&self) -> (u32, u32) {
        self.frame
            .as_ref()
            .map(|frame| frame.dimensions())
            .unwrap_or((0, 0))
    }

    fn snapshot(&mut self) -> Result<RgbaImage> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| ReceiptLensError::FrameUnavailable("no frame loaded".into()))?;
        self.snapshots += 1;
        Ok(frame.clone())
    }
}

impl StillCapture for StaticFrameSource {
    fn capture_still(&self) -> Result<Option<RgbaImage>> {
        Ok(self.frame.clone())
    }
}

/// Recognition and stitching sink that keeps every crop it receives.
#[derive(Debug, Default)]
pub struct CollectingService {
    recognised: RefCell<Vec<CapturedCrop>>,
    stitched: RefCell<Vec<CapturedCrop>>,
}

impl CollectingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crops submitted for recognition, in submission order.
    pub fn recognised(&self) -> Vec<CapturedCrop> {
        self.recognised.borrow().clone()
    }

    /// Crops contributed for stitching, in contribution order.
    pub fn stitched(&self) -> Vec<CapturedCrop> {
        self.stitched.borrow().clone()
    }
}

impl RecognitionService for CollectingService {
    fn submit(&self, crop: &CapturedCrop) -> Result<()> {
        debug!(capture = %crop.id, bytes = crop.encoded.len(), "Crop collected for recognition");
        self.recognised.borrow_mut().push(crop.clone());
        Ok(())
    }
}

impl StitchingService for CollectingService {
    fn contribute(&self, crop: &CapturedCrop) -> Result<()> {
        debug!(capture = %crop.id, "Crop collected for stitching");
        self.stitched.borrow_mut().push(crop.clone());
        Ok(())
    }
}
