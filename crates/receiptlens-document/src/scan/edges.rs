// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge map builder: channel-mean grayscale, 3x3 Sobel gradients, L1
// magnitude, and a fixed binarization threshold.

use image::{GrayImage, Luma, RgbaImage};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use tracing::{debug, instrument};

/// Value written for edge pixels. Non-edge pixels are 0.
pub const EDGE: u8 = 255;

/// Binary per-pixel edge map with the same dimensions as its source frame.
///
/// Every pixel is either 0 or [`EDGE`]. The outermost pixel ring is never
/// evaluated and is always 0.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    image: GrayImage,
}

impl EdgeMap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Edge value at `(x, y)`: 0 or 255.
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.image.get_pixel(x, y).0[0]
    }

    /// Number of pixels marked as edges.
    pub fn edge_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] == EDGE).count()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }
}

/// Grayscale as the plain channel mean `(R + G + B) / 3`. Alpha is ignored.
pub fn channel_mean_gray(frame: &RgbaImage) -> GrayImage {
    let (w, h) = frame.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (src, dst) in frame.pixels().zip(gray.pixels_mut()) {
        let [r, g, b, _] = src.0;
        let mean = (r as u16 + g as u16 + b as u16) / 3;
        *dst = Luma([mean as u8]);
    }
    gray
}

/// Build the binary edge map of a (downscaled) frame.
///
/// Gradients use the 1-2-1 weighted Sobel pair; the magnitude is the L1 norm
/// `|Gx| + |Gy|`. A pixel is an edge when its magnitude is strictly above
/// `threshold`. Pure function of the input: no state survives between calls.
#[instrument(skip(frame), fields(width = frame.width(), height = frame.height()))]
pub fn build_edge_map(frame: &RgbaImage, threshold: u16) -> EdgeMap {
    let (w, h) = frame.dimensions();
    let mut edges = GrayImage::new(w, h);

    // Without an interior there is nothing to evaluate.
    if w < 3 || h < 3 {
        return EdgeMap { image: edges };
    }

    let gray = channel_mean_gray(frame);
    let gx = horizontal_sobel(&gray);
    let gy = vertical_sobel(&gray);
    let threshold = threshold as u32;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mag = gx.get_pixel(x, y).0[0].unsigned_abs() as u32
                + gy.get_pixel(x, y).0[0].unsigned_abs() as u32;
            if mag > threshold {
                edges.put_pixel(x, y, Luma([EDGE]));
            }
        }
    }

    let map = EdgeMap { image: edges };
    debug!(edge_pixels = map.edge_count(), "Edge map built");
    map
}
