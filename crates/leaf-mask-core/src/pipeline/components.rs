use image::Luma;
use imageproc::region_labelling::{Connectivity, connected_components};
use rayon::prelude::*;

use crate::grid::{BinaryGrid, LabelGrid};

/// Bounding box and area of one labeled component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentStats {
    pub label: u32,
    pub area: usize,
    pub left: usize,
    pub top: usize,
    pub width: usize,
    pub height: usize,
}

/// Label image plus per-component statistics. Label 0 is background;
/// `stats[i]` describes label `i + 1`.
#[derive(Clone, Debug)]
pub struct Labeling {
    pub labels: LabelGrid,
    pub stats: Vec<ComponentStats>,
}

impl Labeling {
    /// Number of foreground components.
    pub fn component_count(&self) -> usize {
        self.stats.len()
    }

    /// Number of distinct labels, background included.
    pub fn label_count(&self) -> usize {
        self.stats.len() + 1
    }
}

/// 8-connected labeling of the non-zero cells of `mask`.
///
/// Labels are handed out in raster order of each component's first cell.
pub fn label_components(mask: &BinaryGrid) -> Labeling {
    let labels = LabelGrid::from(connected_components(
        &mask.to_image(),
        Connectivity::Eight,
        Luma([0u8]),
    ));
    let stats = component_stats(&labels);
    Labeling { labels, stats }
}

#[derive(Clone, Copy)]
struct Extent {
    area: usize,
    left: usize,
    top: usize,
    right: usize,
    bottom: usize,
}

fn component_stats(labels: &LabelGrid) -> Vec<ComponentStats> {
    let count = labels.cells().iter().copied().max().unwrap_or(0) as usize;
    let mut extents = vec![
        Extent {
            area: 0,
            left: usize::MAX,
            top: usize::MAX,
            right: 0,
            bottom: 0,
        };
        count
    ];
    for (y, row) in labels.rows().enumerate() {
        for (x, &label) in row.iter().enumerate() {
            if label == 0 {
                continue;
            }
            let extent = &mut extents[label as usize - 1];
            extent.area += 1;
            extent.left = extent.left.min(x);
            extent.top = extent.top.min(y);
            extent.right = extent.right.max(x);
            extent.bottom = extent.bottom.max(y);
        }
    }
    extents
        .iter()
        .enumerate()
        .filter(|(_, extent)| extent.area > 0)
        .map(|(idx, extent)| ComponentStats {
            label: idx as u32 + 1,
            area: extent.area,
            left: extent.left,
            top: extent.top,
            width: extent.right + 1 - extent.left,
            height: extent.bottom + 1 - extent.top,
        })
        .collect()
}

/// Component with the largest area; the lowest label wins ties.
pub fn largest_component(labeling: &Labeling) -> Option<&ComponentStats> {
    let mut best: Option<&ComponentStats> = None;
    for stats in &labeling.stats {
        if best.is_none_or(|current| stats.area > current.area) {
            best = Some(stats);
        }
    }
    best
}

/// Binary grid holding 255 exactly where `labels == label`.
pub fn keep_label(labels: &LabelGrid, label: u32) -> BinaryGrid {
    let width = labels.width();
    let mut cells = vec![0u8; labels.len()];
    if width > 0 {
        cells
            .par_chunks_mut(width)
            .zip(labels.cells().par_chunks(width))
            .for_each(|(dst, src)| {
                for (out, &value) in dst.iter_mut().zip(src) {
                    *out = if value == label { 255 } else { 0 };
                }
            });
    }
    BinaryGrid::from_vec(width, labels.height(), cells)
}
