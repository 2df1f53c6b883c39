use crate::grid::{BinaryGrid, FocusMap};

/// Threshold used for the second pass when the first pass selects no cell.
pub(crate) const EMPTY_SELECTION_THRESHOLD: f64 = 0.0;

#[derive(Clone, Debug)]
pub(crate) struct ThresholdOutcome {
    pub grid: BinaryGrid,
    pub max_focus: f64,
    pub first_threshold: f64,
    pub refined_threshold: f64,
    pub first_candidates: usize,
    pub refined_candidates: usize,
}

/// Two-pass inverted binarization of the focus map.
///
/// Pass one cuts at `relative_threshold * max`; pass two cuts the original
/// map again at the mean focus of the cells pass one selected. Selected
/// (low focus) cells become 255.
pub(crate) fn adaptive_threshold(map: &FocusMap, relative_threshold: f32) -> ThresholdOutcome {
    let max_focus = max_value(map);
    let first_threshold = f64::from(relative_threshold) * max_focus;
    let first = threshold_inverted(map, first_threshold);
    let first_candidates = first.count_nonzero();

    let refined_threshold = masked_mean(map, &first).unwrap_or(EMPTY_SELECTION_THRESHOLD);
    let grid = threshold_inverted(map, refined_threshold);
    let refined_candidates = grid.count_nonzero();

    ThresholdOutcome {
        grid,
        max_focus,
        first_threshold,
        refined_threshold,
        first_candidates,
        refined_candidates,
    }
}

pub(crate) fn max_value(map: &FocusMap) -> f64 {
    map.cells()
        .iter()
        .copied()
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        .unwrap_or(0.0)
}

/// `value <= threshold` maps to 255, everything else to 0.
pub(crate) fn threshold_inverted(map: &FocusMap, threshold: f64) -> BinaryGrid {
    let cells = map
        .cells()
        .iter()
        .map(|&v| if v > threshold { 0 } else { 255 })
        .collect();
    BinaryGrid::from_vec(map.width(), map.height(), cells)
}

/// Mean of `map` over the cells where `mask` is non-zero.
pub(crate) fn masked_mean(map: &FocusMap, mask: &BinaryGrid) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for (&value, &flag) in map.cells().iter().zip(mask.cells()) {
        if flag != 0 {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}
