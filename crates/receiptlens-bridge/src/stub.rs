// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where no camera or collaborator services
// are wired up.
//
// Every trait method returns `PlatformUnavailable`.

use image::RgbaImage;
use receiptlens_core::CapturedCrop;
use receiptlens_core::error::{ReceiptLensError, Result};

use crate::traits::*;

/// No-op bridge returned when the host has not registered a real one.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl StillCapture for StubBridge {
    fn capture_still(&self) -> Result<Option<RgbaImage>> {
        tracing::warn!("StillCapture::capture_still called on stub bridge");
        Err(ReceiptLensError::PlatformUnavailable)
    }
}

impl RecognitionService for StubBridge {
    fn submit(&self, crop: &CapturedCrop) -> Result<()> {
        tracing::warn!(capture = %crop.id, "RecognitionService::submit called on stub bridge");
        Err(ReceiptLensError::PlatformUnavailable)
    }
}

impl StitchingService for StubBridge {
    fn contribute(&self, crop: &CapturedCrop) -> Result<()> {
        tracing::warn!(capture = %crop.id, "StitchingService::contribute called on stub bridge");
        Err(ReceiptLensError::PlatformUnavailable)
    }
}
