// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, contrast adjustment, encoding, and frame downscaling.
// Operates on in-memory images using the `image` crate.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use receiptlens_core::error::ReceiptLensError;
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// All operations consume `self` and return a new `ImageProcessor` wrapping
/// the transformed image, enabling method chaining.
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&jpeg)?
///     .adjust_contrast(1.2)
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ReceiptLensError> {
        let img = image::load_from_memory(data).map_err(|err| {
            ReceiptLensError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an RGBA frame or still.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the image as 8-bit RGBA.
    pub fn into_rgba(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Linear contrast stretch around mid-gray:
    /// `out = clamp(in * factor + 128 * (1 - factor))` on R, G and B.
    /// Alpha is left untouched. A factor of 1.0 is a no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        debug!(factor, "Adjusting contrast");

        let mut rgba = self.image.into_rgba8();
        for pixel in rgba.pixels_mut() {
            let image::Rgba([r, g, b, a]) = *pixel;
            let adjust = |channel: u8| -> u8 {
                let val = factor * (channel as f32 - 128.0) + 128.0;
                val.round().clamp(0.0, 255.0) as u8
            };
            *pixel = image::Rgba([adjust(r), adjust(g), adjust(b), a]);
        }

        Self::from_rgba(rgba)
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ReceiptLensError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, ReceiptLensError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            ReceiptLensError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Resize an RGBA frame by `factor` (e.g. 0.25), never below 1 pixel.
/// Uses a triangle (bilinear) filter: cheap enough for per-frame use.
pub fn downscale_rgba(frame: &RgbaImage, factor: f32) -> RgbaImage {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return frame.clone();
    }
    let new_w = ((w as f32 * factor).round() as u32).max(1);
    let new_h = ((h as f32 * factor).round() as u32).max(1);
    if (new_w, new_h) == (w, h) {
        return frame.clone();
    }
    image::imageops::resize(frame, new_w, new_h, FilterType::Triangle)
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, ReceiptLensError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        ReceiptLensError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}
