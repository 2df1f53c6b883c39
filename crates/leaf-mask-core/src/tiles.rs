use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use leaf_mask_types::{LeafMask, TileCoverage, TileCoverageMap};

use crate::error::MaskError;

pub const DEFAULT_TILE_SIZE: u32 = 224;
pub const DEFAULT_MIN_COVERAGE: f32 = 0.7;

/// Fixed-size tiling laid over a photograph, centred so the leftover margin
/// is split evenly on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileLayout {
    pub tile_width: u32,
    pub tile_height: u32,
    /// A tile counts as in focus when its mask coverage is strictly above this.
    pub min_coverage: f32,
}

impl Default for TileLayout {
    fn default() -> Self {
        Self::square(DEFAULT_TILE_SIZE, DEFAULT_MIN_COVERAGE)
    }
}

impl TileLayout {
    pub fn square(size: u32, min_coverage: f32) -> Self {
        Self {
            tile_width: size,
            tile_height: size,
            min_coverage,
        }
    }
}

/// Mask coverage of every full tile of `layout` over `mask`.
pub fn tile_coverage(mask: &LeafMask, layout: &TileLayout) -> Result<TileCoverageMap, MaskError> {
    if layout.tile_width == 0 || layout.tile_height == 0 {
        return Err(MaskError::InvalidTileSize {
            tile_width: layout.tile_width,
            tile_height: layout.tile_height,
        });
    }
    let cols = mask.width() / layout.tile_width;
    let rows = mask.height() / layout.tile_height;
    if cols == 0 || rows == 0 {
        return Ok(TileCoverageMap::empty(layout.tile_width, layout.tile_height));
    }
    let origin_x = (mask.width() % layout.tile_width) / 2;
    let origin_y = (mask.height() % layout.tile_height) / 2;

    let tiles = (0..rows * cols)
        .into_par_iter()
        .map(|idx| {
            let row = idx / cols;
            let col = idx % cols;
            let x = origin_x + col * layout.tile_width;
            let y = origin_y + row * layout.tile_height;
            let coverage = tile_fraction(mask, x, y, layout.tile_width, layout.tile_height);
            TileCoverage {
                row,
                col,
                x,
                y,
                coverage,
                in_focus: coverage > layout.min_coverage,
            }
        })
        .collect();

    Ok(TileCoverageMap {
        cols,
        rows,
        origin_x,
        origin_y,
        tile_width: layout.tile_width,
        tile_height: layout.tile_height,
        tiles,
    })
}

fn tile_fraction(mask: &LeafMask, x: u32, y: u32, tile_width: u32, tile_height: u32) -> f32 {
    let stride = mask.width() as usize;
    let x0 = x as usize;
    let x1 = x0 + tile_width as usize;
    let mut sum = 0u64;
    for row in y as usize..(y + tile_height) as usize {
        let line = &mask.data()[row * stride + x0..row * stride + x1];
        sum += line.iter().map(|&v| v as u64).sum::<u64>();
    }
    let area = tile_width as u64 * tile_height as u64;
    (sum as f64 / (area as f64 * 255.0)) as f32
}
