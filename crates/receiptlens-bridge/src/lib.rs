// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ReceiptLens: platform bridge abstractions.
//
// Defines the seams between the detection core and its collaborators: the
// live camera feed, still capture, and the recognition and stitching
// services. Hosts supply real implementations; `stub` and `memory` cover
// desktop, CI, and tests.

pub mod memory;
pub mod stub;
pub mod traits;

pub use memory::{CollectingService, StaticFrameSource};
pub use traits::{FrameSource, PlatformBridge, RecognitionService, StillCapture, StitchingService};

/// Returns the default bridge for this build.
///
/// Camera and service integrations are registered by the host application;
/// without one, every capability reports `PlatformUnavailable`.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    Box::new(stub::StubBridge)
}
