// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document rectangle locator: aggregates an edge map into a coarse density
// grid and searches it exhaustively for the square sub-region holding the most
// edge pixels. The winner is validated by size and aspect gates and returned
// as an axis-aligned corner set.
//
// The search never looks for actual lines or corner points; it only finds the
// densest block of edge activity, which is robust to noise and partial
// occlusion and good enough for a live guide overlay.

use receiptlens_core::config::{DetectorConfig, MAX_GRID_SIZE};
use receiptlens_core::{CornerSet, DetectionResult};
use thiserror::Error;
use tracing::{debug, instrument};

use super::edges::EdgeMap;

/// Coarse `size × size` grid of edge-pixel counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityGrid {
    size: u32,
    cells: Vec<u32>,
}

impl DensityGrid {
    /// Count edge pixels (value above `threshold`) per cell. Each cell covers
    /// `(width / size) × (height / size)` pixels; leftover columns and rows
    /// past the last full cell are ignored. A map smaller than the grid
    /// yields an all-zero grid. `size` is clamped to `1..=MAX_GRID_SIZE`.
    pub fn from_edge_map(edges: &EdgeMap, size: u32, threshold: u8) -> Self {
        let size = size.clamp(1, MAX_GRID_SIZE);
        let mut cells = vec![0u32; (size * size) as usize];
        let cell_w = edges.width() / size;
        let cell_h = edges.height() / size;

        if cell_w == 0 || cell_h == 0 {
            return Self { size, cells };
        }

        for gy in 0..size {
            for gx in 0..size {
                let mut count = 0u32;
                for y in gy * cell_h..(gy + 1) * cell_h {
                    for x in gx * cell_w..(gx + 1) * cell_w {
                        if edges.value(x, y) > threshold {
                            count += 1;
                        }
                    }
                }
                cells[(gy * size + gx) as usize] = count;
            }
        }

        Self { size, cells }
    }

    /// Build a grid directly from row-major counts. `cells.len()` must be
    /// `size * size`.
    pub fn from_cells(size: u32, cells: Vec<u32>) -> Option<Self> {
        let expected = (size as usize).checked_mul(size as usize);
        (size > 0 && expected == Some(cells.len())).then_some(Self { size, cells })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.cells[(y * self.size + x) as usize]
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    /// Summed-area table with a zero-padded first row and column:
    /// `table[y * (size+1) + x]` is the sum of cells in `[0, x) × [0, y)`.
    fn summed_area_table(&self) -> Vec<u64> {
        let stride = (self.size + 1) as usize;
        let mut table = vec![0u64; stride * stride];

        for y in 0..self.size {
            let mut row_sum: u64 = 0;
            for x in 0..self.size {
                row_sum += self.get(x, y) as u64;
                let idx = (y + 1) as usize * stride + (x + 1) as usize;
                let above = y as usize * stride + (x + 1) as usize;
                table[idx] = row_sum + table[above];
            }
        }

        table
    }
}

/// A grid-aligned region in cell units. `max_x` and `max_y` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionCandidate {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    /// Sum of the edge counts of every cell inside the region.
    pub density: u64,
}

impl RegionCandidate {
    pub fn width_cells(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height_cells(&self) -> u32 {
        self.max_y - self.min_y
    }

    /// Region bounds divided by the grid size: `(min_x, min_y, max_x, max_y)`.
    pub fn normalized(&self, grid_size: u32) -> (f32, f32, f32, f32) {
        let g = grid_size as f32;
        (
            self.min_x as f32 / g,
            self.min_y as f32 / g,
            self.max_x as f32 / g,
            self.max_y as f32 / g,
        )
    }

    /// Density per cell of area.
    pub fn confidence(&self) -> f32 {
        let area = self.width_cells() as u64 * self.height_cells() as u64;
        if area == 0 {
            0.0
        } else {
            self.density as f32 / area as f32
        }
    }
}

/// Find the square region with the highest edge density.
///
/// Sizes run from `floor(min_fraction · G)` to `G − 1` in increasing order,
/// offsets row by row from the top-left. Only a strictly greater sum replaces
/// the current best, so ties keep the smallest, top-left-most region. An
/// all-zero grid has no candidate.
pub fn find_densest_region(grid: &DensityGrid, min_fraction: f32) -> Option<RegionCandidate> {
    let g = grid.size();
    let stride = (g + 1) as usize;
    let table = grid.summed_area_table();
    let min_size = ((g as f32 * min_fraction).floor() as u32).max(1);

    let mut best: Option<RegionCandidate> = None;
    let mut best_sum: u64 = 0;

    for s in min_size..g {
        for y in 0..=g - s {
            for x in 0..=g - s {
                let (x1, y1) = (x as usize, y as usize);
                let (x2, y2) = ((x + s) as usize, (y + s) as usize);
                let sum = table[y2 * stride + x2] + table[y1 * stride + x1]
                    - table[y1 * stride + x2]
                    - table[y2 * stride + x1];
                if sum > best_sum {
                    best_sum = sum;
                    best = Some(RegionCandidate {
                        min_x: x,
                        min_y: y,
                        max_x: x + s,
                        max_y: y + s,
                        density: sum,
                    });
                }
            }
        }
    }

    best
}

/// Why a candidate region was not accepted as a document.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Rejection {
    #[error("region too small ({width:.3} x {height:.3})")]
    TooSmall { width: f32, height: f32 },

    #[error("region covers almost the whole frame ({width:.3} x {height:.3})")]
    TooLarge { width: f32, height: f32 },

    #[error("aspect ratio {aspect:.2} outside the accepted range")]
    BadAspect { aspect: f32 },
}

/// Size and aspect validation for candidate document regions.
///
/// A pure function of the normalized extents; image content plays no part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionGate {
    pub min_extent: f32,
    pub max_extent: f32,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl DetectionGate {
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            min_extent: config.min_extent,
            max_extent: config.max_extent,
            min_aspect: config.min_aspect,
            max_aspect: config.max_aspect,
        }
    }

    /// Check normalized `width` and `height` (aspect = height / width).
    pub fn check(&self, width: f32, height: f32) -> Result<(), Rejection> {
        if width < self.min_extent || height < self.min_extent {
            return Err(Rejection::TooSmall { width, height });
        }
        if width > self.max_extent || height > self.max_extent {
            return Err(Rejection::TooLarge { width, height });
        }
        let aspect = height / width;
        if !(self.min_aspect..=self.max_aspect).contains(&aspect) {
            return Err(Rejection::BadAspect { aspect });
        }
        Ok(())
    }

    /// Whether a corner set's bounding box passes the gate.
    pub fn accepts(&self, corners: &CornerSet) -> bool {
        self.check(corners.width(), corners.height()).is_ok()
    }
}

impl Default for DetectionGate {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}

/// Locate the most likely document rectangle in an edge map.
///
/// Returns `None` when the grid holds no edges or the densest region fails
/// the size/aspect gate.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn locate(edges: &EdgeMap, config: &DetectorConfig) -> Option<DetectionResult> {
    let grid = DensityGrid::from_edge_map(edges, config.grid_size, config.density_threshold);
    let Some(region) = find_densest_region(&grid, config.min_search_fraction) else {
        debug!("No edge density in grid");
        return None;
    };

    let (min_x, min_y, max_x, max_y) = region.normalized(grid.size());
    let (width, height) = (max_x - min_x, max_y - min_y);

    if let Err(rejection) = DetectionGate::from_config(config).check(width, height) {
        debug!(%rejection, "Candidate region rejected");
        return None;
    }

    let corners = CornerSet::from_bounds(min_x, min_y, max_x, max_y);
    let result = DetectionResult::new(corners, region.confidence());
    debug!(
        min_x,
        min_y,
        max_x,
        max_y,
        confidence = result.confidence(),
        "Document region located"
    );
    Some(result)
}
