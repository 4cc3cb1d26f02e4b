// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the collaborators around the
// detection core: the live camera, the still-photo primitive, and the
// recognition and stitching services that consume finished crops.

use image::RgbaImage;
use receiptlens_core::CapturedCrop;
use receiptlens_core::error::Result;

/// Unified bridge that groups the capture-time capabilities of a platform.
///
/// The live frame source is not part of the bridge: it is handed to the frame
/// sampler by value, which owns it exclusively while detection runs.
pub trait PlatformBridge: StillCapture + RecognitionService + StitchingService {
    /// Human-readable platform name (e.g. "iOS 17", "Android 14").
    fn platform_name(&self) -> &str;
}

/// A live video feed the frame sampler can poll.
pub trait FrameSource {
    /// Current frame dimensions in pixels. `(0, 0)` while the camera is
    /// still warming up or has no picture.
    fn dimensions(&self) -> (u32, u32);

    /// Copy the current frame into an RGBA buffer.
    fn snapshot(&mut self) -> Result<RgbaImage>;
}

/// Full-resolution still capture.
pub trait StillCapture {
    /// Take a still photo. Returns `Ok(None)` if the user cancelled.
    fn capture_still(&self) -> Result<Option<RgbaImage>>;
}

/// The text recognition service boundary.
///
/// Receives one finished, enhanced crop per capture. The core never sees or
/// retries the recognition response.
pub trait RecognitionService {
    fn submit(&self, crop: &CapturedCrop) -> Result<()>;
}

/// The multi-image stitching service boundary.
///
/// Each contributed crop carries the corners it was cut from; aggregation
/// happens on the other side.
pub trait StitchingService {
    fn contribute(&self, crop: &CapturedCrop) -> Result<()>;
}

impl<F: FrameSource + ?Sized> FrameSource for Box<F> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn snapshot(&mut self) -> Result<RgbaImage> {
        (**self).snapshot()
    }
}
