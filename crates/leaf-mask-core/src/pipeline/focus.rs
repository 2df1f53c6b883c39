use rayon::prelude::*;

use leaf_mask_types::{COLOR_CHANNELS, ColorFrame};

use crate::grid::FocusMap;

/// Square sampling window slid over the photograph at a fixed stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FocusWindow {
    pub size: usize,
    pub step: usize,
}

impl FocusWindow {
    pub(crate) const DEFAULT: Self = Self { size: 50, step: 6 };

    /// Coarse grid dimensions `(width, height)`, or `None` when the image
    /// cannot hold a single cell.
    pub(crate) fn grid_dims(&self, width: usize, height: usize) -> Option<(usize, usize)> {
        debug_assert!(self.step > 0 && self.step <= self.size);
        let offset = self.size / self.step;
        let grid_width = (width / self.step).checked_sub(offset)?;
        let grid_height = (height / self.step).checked_sub(offset)?;
        if grid_width == 0 || grid_height == 0 {
            return None;
        }
        Some((grid_width, grid_height))
    }
}

/// Builds the focus map: each cell holds the largest per-channel standard
/// deviation of the window anchored at `(col * step, row * step)`.
///
/// Grid rows are independent and are filled in parallel. Window sums are
/// exact integers, so the result does not depend on scheduling.
pub(crate) fn build_focus_map(
    frame: &ColorFrame,
    window: FocusWindow,
    grid_width: usize,
    grid_height: usize,
) -> FocusMap {
    let mut cells = vec![0.0f64; grid_width * grid_height];
    cells
        .par_chunks_mut(grid_width)
        .enumerate()
        .for_each(|(row, out)| focus_row(frame, window, row, out));
    FocusMap::from_vec(grid_width, grid_height, cells)
}

fn focus_row(frame: &ColorFrame, window: FocusWindow, row: usize, out: &mut [f64]) {
    let width = frame.width() as usize;
    let y0 = row * window.step;

    // Column sums over the window's rows, then prefix sums along x.
    let mut column_sum = vec![[0u64; COLOR_CHANNELS]; width];
    let mut column_sq = vec![[0u64; COLOR_CHANNELS]; width];
    for y in y0..y0 + window.size {
        for (x, px) in frame.row(y).chunks_exact(COLOR_CHANNELS).enumerate() {
            for c in 0..COLOR_CHANNELS {
                let value = px[c] as u64;
                column_sum[x][c] += value;
                column_sq[x][c] += value * value;
            }
        }
    }

    let mut prefix_sum = vec![[0u64; COLOR_CHANNELS]; width + 1];
    let mut prefix_sq = vec![[0u64; COLOR_CHANNELS]; width + 1];
    for x in 0..width {
        for c in 0..COLOR_CHANNELS {
            prefix_sum[x + 1][c] = prefix_sum[x][c] + column_sum[x][c];
            prefix_sq[x + 1][c] = prefix_sq[x][c] + column_sq[x][c];
        }
    }

    let samples = (window.size * window.size) as f64;
    for (col, cell) in out.iter_mut().enumerate() {
        let x0 = col * window.step;
        let x1 = x0 + window.size;
        let mut sharpest = 0.0f64;
        for c in 0..COLOR_CHANNELS {
            let sum = (prefix_sum[x1][c] - prefix_sum[x0][c]) as f64;
            let sq = (prefix_sq[x1][c] - prefix_sq[x0][c]) as f64;
            let mean = sum / samples;
            let variance = (sq / samples - mean * mean).max(0.0);
            sharpest = sharpest.max(variance.sqrt());
        }
        *cell = sharpest;
    }
}
