// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared synthetic frames for unit tests.

use image::{Rgba, RgbaImage};

/// A 640x480 camera frame with a light receipt (x 200..440, y 60..420) on a
/// dark table.
pub(crate) fn receipt_frame() -> RgbaImage {
    RgbaImage::from_fn(640, 480, |x, y| {
        if (200..440).contains(&x) && (60..420).contains(&y) {
            Rgba([240, 238, 230, 255])
        } else {
            Rgba([40, 35, 30, 255])
        }
    })
}

/// A featureless mid-gray frame.
pub(crate) fn gray_frame(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([128, 128, 128, 255]))
}
