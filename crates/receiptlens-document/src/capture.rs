// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture packaging: encodes a finished crop and hands it to the recognition
// and stitching collaborators.

use chrono::Utc;
use receiptlens_bridge::traits::{RecognitionService, StitchingService};
use receiptlens_core::error::Result;
use receiptlens_core::{CaptureId, CapturedCrop, CornerSet};
use tracing::{info, instrument};

use crate::image::processor::ImageProcessor;
use crate::scan::crop::CropOutcome;

/// Wire format for the crop handed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Png,
    Jpeg { quality: u8 },
}

impl EncodeFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

impl Default for EncodeFormat {
    fn default() -> Self {
        Self::Jpeg { quality: 90 }
    }
}

/// Encode `outcome` into a [`CapturedCrop`] stamped with the current time.
///
/// `corners` are the corners the crop was cut from, recorded for stitching.
#[instrument(skip(outcome, corners), fields(width = outcome.image.width(), height = outcome.image.height()))]
pub fn package_crop(
    outcome: CropOutcome,
    corners: CornerSet,
    id: CaptureId,
    format: EncodeFormat,
) -> Result<CapturedCrop> {
    let (width, height) = outcome.image.dimensions();
    let processor = ImageProcessor::from_rgba(outcome.image);
    let encoded = match format {
        EncodeFormat::Png => processor.to_png_bytes()?,
        EncodeFormat::Jpeg { quality } => processor.to_jpeg_bytes(quality)?,
    };

    Ok(CapturedCrop {
        id,
        captured_at: Utc::now(),
        corners,
        width,
        height,
        mime_type: format.mime_type().to_owned(),
        encoded,
    })
}

/// Submit a crop for recognition and, when a stitching service is present,
/// contribute it to the multi-image session.
///
/// Recognition failures propagate; the crop is not contributed to stitching
/// in that case.
#[instrument(skip_all, fields(id = %crop.id))]
pub fn hand_off(
    crop: &CapturedCrop,
    recognition: &dyn RecognitionService,
    stitching: Option<&dyn StitchingService>,
) -> Result<()> {
    recognition.submit(crop)?;
    if let Some(stitching) = stitching {
        stitching.contribute(crop)?;
    }
    info!(
        bytes = crop.encoded.len(),
        mime = %crop.mime_type,
        stitched = stitching.is_some(),
        "Crop handed off"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::crop::crop_and_enhance;
    use image::{Rgba, RgbaImage};
    use receiptlens_bridge::memory::CollectingService;
    use receiptlens_bridge::stub::StubBridge;
    use receiptlens_core::config::CropConfig;
    use receiptlens_core::error::ReceiptLensError;

    fn outcome() -> CropOutcome {
        let source = RgbaImage::from_pixel(200, 200, Rgba([90, 120, 150, 255]));
        crop_and_enhance(&source, &CornerSet::default(), &CropConfig::default()).expect("crop")
    }

    #[test]
    fn png_package_decodes_back_to_crop_size() {
        let corners = CornerSet::default();
        let id = CaptureId::new();
        let crop = package_crop(outcome(), corners, id, EncodeFormat::Png).expect("package");

        assert_eq!(crop.id, id);
        assert_eq!(crop.mime_type, "image/png");
        assert_eq!((crop.width, crop.height), (180, 180));
        let decoded = ImageProcessor::from_bytes(&crop.encoded).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (180, 180));
    }

    #[test]
    fn jpeg_is_the_default_format() {
        let crop = package_crop(outcome(), CornerSet::default(), CaptureId::new(), EncodeFormat::default())
            .expect("package");
        assert_eq!(crop.mime_type, "image/jpeg");
        assert!(!crop.encoded.is_empty());
    }

    #[test]
    fn hand_off_reaches_both_collaborators() {
        let crop = package_crop(outcome(), CornerSet::default(), CaptureId::new(), EncodeFormat::Png)
            .expect("package");
        let sink = CollectingService::new();
        hand_off(&crop, &sink, Some(&sink)).expect("hand off");
        assert_eq!(sink.recognised().len(), 1);
        assert_eq!(sink.stitched().len(), 1);
        assert_eq!(sink.recognised()[0].id, crop.id);
    }

    #[test]
    fn hand_off_without_stitching_only_recognises() {
        let crop = package_crop(outcome(), CornerSet::default(), CaptureId::new(), EncodeFormat::Png)
            .expect("package");
        let sink = CollectingService::new();
        hand_off(&crop, &sink, None).expect("hand off");
        assert_eq!(sink.recognised().len(), 1);
        assert!(sink.stitched().is_empty());
    }

    #[test]
    fn recognition_failure_stops_hand_off() {
        let crop = package_crop(outcome(), CornerSet::default(), CaptureId::new(), EncodeFormat::Png)
            .expect("package");
        let sink = CollectingService::new();
        let err = hand_off(&crop, &StubBridge, Some(&sink)).expect_err("stub fails");
        assert!(matches!(err, ReceiptLensError::PlatformUnavailable));
        assert!(sink.stitched().is_empty());
    }
}
