// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// receiptlens-document: Live document-boundary detection for ReceiptLens.
//
// Samples camera frames and locates the document in each one (edge map plus
// density-grid search), lets the user adjust the four corners on a still, and
// crops and enhances the result for the recognition and stitching services.

pub mod capture;
pub mod detector;
pub mod editor;
pub mod image;
pub mod sampler;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export the primary entry points so callers can use
// `receiptlens_document::FrameSampler` etc.
pub use capture::{EncodeFormat, hand_off, package_crop};
pub use detector::DocumentDetector;
pub use editor::{CornerEditor, Overlay, PointerInput, normalize_pointer};
pub use image::processor::ImageProcessor;
pub use sampler::{FrameSampler, SamplerHandle, TickOutcome};
pub use scan::crop::{CropOutcome, crop_and_enhance};
pub use scan::quality::analyze_quality;
