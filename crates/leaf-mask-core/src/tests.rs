use leaf_mask_types::ColorFrame;

use crate::{
    DEFAULT_RELATIVE_THRESHOLD, MaskError, Rejection, TileLayout, mask_stats, process, segment,
    tile_coverage,
};

const BACKGROUND: u8 = 128;

/// Flat grey photograph with a sharp checkerboard patch covering
/// `[lo, hi)` on both axes.
fn textured_square(size: u32, lo: u32, hi: u32) -> ColorFrame {
    textured_frame(size, lo, hi, None)
}

/// Like [`textured_square`] with an optional flat `[lo, hi)` hole inside the
/// patch.
fn textured_frame(size: u32, lo: u32, hi: u32, hole: Option<(u32, u32)>) -> ColorFrame {
    let mut data = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            let in_hole =
                hole.is_some_and(|(a, b)| (a..b).contains(&x) && (a..b).contains(&y));
            let inside = (lo..hi).contains(&x) && (lo..hi).contains(&y) && !in_hole;
            let value = if !inside {
                BACKGROUND
            } else if (x + y) % 2 == 0 {
                64
            } else {
                192
            };
            data.extend_from_slice(&[value, value, value]);
        }
    }
    ColorFrame::from_owned(size, size, data).unwrap()
}

#[test]
fn sharp_patch_is_segmented() {
    let frame = textured_square(600, 60, 540);
    let mask = process(&frame, DEFAULT_RELATIVE_THRESHOLD)
        .unwrap()
        .expect("mask");
    assert_eq!((mask.width(), mask.height()), (600, 600));
    assert!(mask.data().iter().all(|&v| v == 0 || v == 255));
    assert!(mask.is_foreground(300, 300));
    assert!(!mask.is_foreground(0, 0));
    assert!(!mask.is_foreground(599, 599));
    assert!(!mask.is_foreground(80, 300));
}

#[test]
fn flat_centre_inside_sharp_patch_is_foreground() {
    let frame = textured_frame(600, 60, 540, Some((240, 360)));
    let segmentation = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    assert_eq!(segmentation.diagnostics.rejection, None);
    let mask = segmentation.mask.expect("mask");
    for y in (240..360).step_by(10) {
        for x in (240..360).step_by(10) {
            assert!(mask.is_foreground(x, y), "({x}, {y})");
        }
    }
    assert!(!mask.is_foreground(0, 0));
}

#[test]
fn segmentation_is_deterministic() {
    let frame = textured_square(600, 60, 540);
    let first = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    let second = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    assert_eq!(first.mask, second.mask);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn diagnostics_describe_the_accepted_component() {
    let frame = textured_square(600, 60, 540);
    let segmentation = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    let diagnostics = segmentation.diagnostics;
    assert_eq!((diagnostics.grid_width, diagnostics.grid_height), (92, 92));
    assert!((diagnostics.max_focus - 64.0).abs() < 1e-9);
    assert_eq!(diagnostics.component_count, 1);
    assert!(diagnostics.largest_area as f64 >= diagnostics.required_area);
    assert_eq!(diagnostics.rejection, None);
    assert!(diagnostics.refined_threshold <= diagnostics.first_threshold);
}

#[test]
fn small_patch_is_rejected_as_too_small() {
    let frame = textured_square(600, 180, 420);
    let segmentation = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    assert!(segmentation.mask.is_none());
    assert_eq!(segmentation.diagnostics.rejection, Some(Rejection::TooSmall));
    assert!(segmentation.diagnostics.largest_area > 0);
}

#[test]
fn tiny_patch_leaves_no_component() {
    let frame = textured_square(600, 240, 360);
    let segmentation = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    assert!(segmentation.mask.is_none());
    assert_eq!(
        segmentation.diagnostics.rejection,
        Some(Rejection::NoComponent)
    );
    assert!(process(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap().is_none());
}

#[test]
fn uniform_image_has_no_mask() {
    let frame = ColorFrame::from_owned(300, 200, vec![77; 300 * 200 * 3]).unwrap();
    let segmentation = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    assert!(segmentation.mask.is_none());
    assert_eq!(segmentation.diagnostics.max_focus, 0.0);
    assert_eq!(
        segmentation.diagnostics.rejection,
        Some(Rejection::NoComponent)
    );
}

#[test]
fn fully_sharp_image_uses_zero_refined_threshold() {
    let frame = textured_square(300, 0, 300);
    let segmentation = segment(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap();
    assert_eq!(segmentation.diagnostics.first_candidates, 0);
    assert_eq!(segmentation.diagnostics.refined_threshold, 0.0);
    let mask = segmentation.mask.expect("mask");
    assert!(mask.is_foreground(150, 150));
    assert!(!mask.is_foreground(0, 150));
}

#[test]
fn frames_without_a_grid_are_rejected() {
    let frame = ColorFrame::from_owned(50, 50, vec![0; 50 * 50 * 3]).unwrap();
    let err = process(&frame, DEFAULT_RELATIVE_THRESHOLD).unwrap_err();
    assert!(matches!(
        err,
        MaskError::DegenerateSize {
            width: 50,
            height: 50,
            window: 50
        }
    ));
}

#[test]
fn tiles_and_stats_follow_the_mask() {
    let frame = textured_square(600, 60, 540);
    let mask = process(&frame, DEFAULT_RELATIVE_THRESHOLD)
        .unwrap()
        .expect("mask");
    let stats = mask_stats(&frame, &mask).unwrap();
    assert_eq!(stats.foreground_pixels, mask.foreground_pixels());
    assert!(stats.foreground_ratio > 0.1 && stats.foreground_ratio < 0.5);
    // Checkerboard luma averages to the grey midpoint.
    assert!((stats.mean_luma - 128.0).abs() < 1.0);

    let map = tile_coverage(&mask, &TileLayout::square(100, 0.7)).unwrap();
    assert_eq!((map.cols, map.rows), (6, 6));
    assert!(map.get(2, 2).unwrap().in_focus);
    assert!(!map.get(0, 0).unwrap().in_focus);
}
