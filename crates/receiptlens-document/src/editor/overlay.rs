// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adjustment overlay rendering: dimmed mask outside the document quad,
// outline, and corner handles drawn over the still image.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use receiptlens_core::config::EditorConfig;
use receiptlens_core::{Corner, CornerSet, Point};

/// Outline stroke colour.
pub const OUTLINE: Rgba<u8> = Rgba([0, 200, 83, 255]);
/// Handle fill for corners not being dragged.
pub const HANDLE: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Handle fill for the corner being dragged.
pub const HANDLE_ACTIVE: Rgba<u8> = Rgba([255, 193, 7, 255]);

/// Pixel position and label of one corner handle. Hosts draw the text label
/// themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleMarker {
    pub corner: Corner,
    pub label: &'static str,
    pub center: (i32, i32),
}

/// A rendered adjustment overlay.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub image: RgbaImage,
    /// Handles in outline order TL, TR, BR, BL.
    pub handles: Vec<HandleMarker>,
}

/// Map a normalized point onto the pixel grid of a `width × height` image.
pub fn to_pixel(point: Point, width: u32, height: u32) -> (f32, f32) {
    let max_x = width.saturating_sub(1) as f32;
    let max_y = height.saturating_sub(1) as f32;
    (point.x * max_x, point.y * max_y)
}

/// Even-odd point-in-polygon test. Self-intersecting outlines (crossed
/// corners) leave the overlapping lobes outside.
fn point_in_polygon(x: f32, y: f32, polygon: &[(f32, f32); 4]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

fn dim(pixel: &mut Rgba<u8>, keep: f32) {
    for c in pixel.0.iter_mut().take(3) {
        *c = (*c as f32 * keep).round().clamp(0.0, 255.0) as u8;
    }
}

/// Render the overlay for `corners` on a copy of `still`.
///
/// The outline is stroked in the fixed order TL → TR → BR → BL regardless of
/// where the corners currently are.
pub fn render(
    still: &RgbaImage,
    corners: &CornerSet,
    active: Option<Corner>,
    config: &EditorConfig,
) -> Overlay {
    let (w, h) = still.dimensions();
    let mut image = still.clone();

    let quad: [(f32, f32); 4] = Corner::ALL.map(|c| to_pixel(corners.get(c), w, h));

    let keep = 1.0 - config.mask_alpha.clamp(0.0, 1.0);
    if keep < 1.0 {
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            if !point_in_polygon(x as f32, y as f32, &quad) {
                dim(pixel, keep);
            }
        }
    }

    for i in 0..quad.len() {
        let next = (i + 1) % quad.len();
        draw_line_segment_mut(&mut image, quad[i], quad[next], OUTLINE);
    }

    let radius = config.handle_radius_px as i32;
    let handles: Vec<HandleMarker> = Corner::ALL
        .iter()
        .zip(quad.iter())
        .map(|(&corner, &(px, py))| {
            let center = (px.round() as i32, py.round() as i32);
            let fill = if active == Some(corner) {
                HANDLE_ACTIVE
            } else {
                HANDLE
            };
            if radius > 0 {
                draw_filled_circle_mut(&mut image, center, radius, fill);
                draw_hollow_circle_mut(&mut image, center, radius, OUTLINE);
            }
            HandleMarker {
                corner,
                label: corner.label(),
                center,
            }
        })
        .collect();

    Overlay { image, handles }
}
