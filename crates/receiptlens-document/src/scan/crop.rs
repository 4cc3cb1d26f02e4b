// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop and enhance: turns final corners (detected or user-adjusted) into a
// recognition-ready image.
//
// The crop is the axis-aligned bounding box of the four corners, never a
// perspective warp: a skewed quadrilateral still yields a plain rectangle.
// Expected problems (degenerate corners, a failed copy) fall back to the
// uncropped source image; only a failed output allocation is an error.

use image::{GenericImage, Rgba, RgbaImage};
use receiptlens_core::CornerSet;
use receiptlens_core::config::CropConfig;
use receiptlens_core::error::{ReceiptLensError, Result};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;

/// Opaque white, the background of every freshly allocated crop buffer.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Pixel-space crop rectangle inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Why the source image was returned uncropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Corners collapse to a zero-width or zero-height box, or the source is
    /// empty.
    DegenerateGeometry,
    /// Copying the region into the output buffer failed.
    DrawFailed,
}

/// Result of the crop step. Always carries an image.
#[derive(Debug, Clone)]
pub struct CropOutcome {
    pub image: RgbaImage,
    /// Region that was extracted, or `None` on fallback.
    pub region: Option<CropRegion>,
    pub fallback: Option<FallbackReason>,
}

impl CropOutcome {
    fn uncropped(source: &RgbaImage, reason: FallbackReason) -> Self {
        Self {
            image: source.clone(),
            region: None,
            fallback: Some(reason),
        }
    }

    pub fn is_cropped(&self) -> bool {
        self.fallback.is_none()
    }
}

/// Compute the clamped pixel crop region for `corners` on a
/// `source_width × source_height` image.
///
/// Returns `None` when the bounding box has no area. Otherwise the box is
/// grown to at least `min_size` on each axis and kept inside the image: an
/// oversized box is shifted back from the far edge before its extent is cut,
/// so the result is only smaller than `min_size` when the source is.
pub fn crop_region(
    corners: &CornerSet,
    source_width: u32,
    source_height: u32,
    min_size: u32,
) -> Option<CropRegion> {
    if source_width == 0 || source_height == 0 {
        return None;
    }

    let (min_x, min_y, max_x, max_y) = corners.bounds();
    let (sw, sh) = (source_width as f64, source_height as f64);

    // Degeneracy is decided on the exact extent; rounding to whole pixels
    // must not turn a thin box into an empty one.
    if (max_x as f64 - min_x as f64) * sw <= 0.0 || (max_y as f64 - min_y as f64) * sh <= 0.0 {
        return None;
    }

    let left = (min_x as f64 * sw).round().max(0.0);
    let top = (min_y as f64 * sh).round().max(0.0);
    let right = (max_x as f64 * sw).round();
    let bottom = (max_y as f64 * sh).round();

    let width = ((right - left).max(0.0) as u32).max(min_size).max(1);
    let height = ((bottom - top).max(0.0) as u32).max(min_size).max(1);

    let width = width.min(source_width);
    let height = height.min(source_height);
    let x = (left as u32).min(source_width - width);
    let y = (top as u32).min(source_height - height);

    Some(CropRegion {
        x,
        y,
        width,
        height,
    })
}

/// Crop `source` to the bounding box of `corners` and apply the contrast
/// stretch.
///
/// Deterministic: the same `(source, corners, config)` always yields a
/// bit-identical image.
#[instrument(skip(source, config), fields(src_w = source.width(), src_h = source.height()))]
pub fn crop_and_enhance(
    source: &RgbaImage,
    corners: &CornerSet,
    config: &CropConfig,
) -> Result<CropOutcome> {
    let (src_w, src_h) = source.dimensions();

    let Some(region) = crop_region(corners, src_w, src_h, config.min_size_px) else {
        warn!(?corners, "Degenerate crop geometry; returning original image");
        return Ok(CropOutcome::uncropped(source, FallbackReason::DegenerateGeometry));
    };
    debug!(?region, "Crop region computed");

    let mut output = allocate_white(region.width, region.height)?;
    let extracted =
        image::imageops::crop_imm(source, region.x, region.y, region.width, region.height)
            .to_image();
    if let Err(err) = output.copy_from(&extracted, 0, 0) {
        warn!(error = %err, "Copying crop region failed; returning original image");
        return Ok(CropOutcome::uncropped(source, FallbackReason::DrawFailed));
    }

    let enhanced = ImageProcessor::from_rgba(output)
        .adjust_contrast(config.contrast_factor)
        .into_rgba();

    info!(
        x = region.x,
        y = region.y,
        width = region.width,
        height = region.height,
        "Crop and enhance complete"
    );

    Ok(CropOutcome {
        image: enhanced,
        region: Some(region),
        fallback: None,
    })
}

/// Allocate a white, opaque RGBA buffer without aborting on allocation
/// failure.
fn allocate_white(width: u32, height: u32) -> Result<RgbaImage> {
    let failed = || ReceiptLensError::BufferAllocation { width, height };

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(failed)?;

    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| failed())?;
    buffer.resize(len, u8::MAX);

    RgbaImage::from_raw(width, height, buffer).ok_or_else(failed)
}
