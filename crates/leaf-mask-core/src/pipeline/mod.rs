//! Focus-driven leaf segmentation.
//!
//! The photograph is reduced to a coarse focus map, thresholded, cleaned up
//! morphologically, reduced to its largest connected region and stretched
//! back to full resolution.

mod cleanup;
pub mod components;
mod fill;
mod focus;
pub mod ops;
mod threshold;
mod upscale;

use log::{debug, trace};
use serde::Serialize;

use leaf_mask_types::{ColorFrame, LeafMask};

use crate::error::MaskError;

use components::{keep_label, label_components, largest_component};
use focus::{FocusWindow, build_focus_map};
use threshold::adaptive_threshold;

/// Fraction of the focus map maximum used as the first threshold pass.
pub const DEFAULT_RELATIVE_THRESHOLD: f32 = 0.2;

/// The retained component must cover at least this share of the coarse grid.
pub const MIN_AREA_RATIO: f64 = 0.15;

/// Reason a photograph produced no mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    NoComponent,
    TooSmall,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::NoComponent => "no_component",
            Rejection::TooSmall => "too_small",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationDiagnostics {
    pub grid_width: usize,
    pub grid_height: usize,
    pub max_focus: f64,
    pub first_threshold: f64,
    pub refined_threshold: f64,
    pub first_candidates: usize,
    pub refined_candidates: usize,
    pub component_count: usize,
    pub largest_area: usize,
    pub required_area: f64,
    pub rejection: Option<Rejection>,
}

#[derive(Debug, Clone)]
pub struct Segmentation {
    pub mask: Option<LeafMask>,
    pub diagnostics: SegmentationDiagnostics,
}

/// Segments the leaf in `frame`.
///
/// `Ok(None)` means no leaf-like region was found; use [`segment`] to learn
/// why.
pub fn process(frame: &ColorFrame, relative_threshold: f32) -> Result<Option<LeafMask>, MaskError> {
    segment(frame, relative_threshold).map(|segmentation| segmentation.mask)
}

/// Same as [`process`] but also reports the intermediate statistics.
pub fn segment(frame: &ColorFrame, relative_threshold: f32) -> Result<Segmentation, MaskError> {
    let window = FocusWindow::DEFAULT;
    let (grid_width, grid_height) = window
        .grid_dims(frame.width() as usize, frame.height() as usize)
        .ok_or(MaskError::DegenerateSize {
            width: frame.width(),
            height: frame.height(),
            window: window.size,
        })?;

    let focus = build_focus_map(frame, window, grid_width, grid_height);
    let outcome = adaptive_threshold(&focus, relative_threshold);
    debug!(
        "focus grid {}x{}: max={:.3} th1={:.3} ({} cells) th2={:.3} ({} cells)",
        grid_width,
        grid_height,
        outcome.max_focus,
        outcome.first_threshold,
        outcome.first_candidates,
        outcome.refined_threshold,
        outcome.refined_candidates
    );

    let cleaned = cleanup::clean(&outcome.grid);
    let labeling = label_components(&cleaned);
    let required_area = MIN_AREA_RATIO * (grid_width * grid_height) as f64;

    let mut diagnostics = SegmentationDiagnostics {
        grid_width,
        grid_height,
        max_focus: outcome.max_focus,
        first_threshold: outcome.first_threshold,
        refined_threshold: outcome.refined_threshold,
        first_candidates: outcome.first_candidates,
        refined_candidates: outcome.refined_candidates,
        component_count: labeling.component_count(),
        largest_area: 0,
        required_area,
        rejection: None,
    };

    let largest = if labeling.label_count() < 2 {
        None
    } else {
        largest_component(&labeling).copied()
    };
    let Some(largest) = largest else {
        debug!("no component left after cleanup");
        diagnostics.rejection = Some(Rejection::NoComponent);
        return Ok(Segmentation {
            mask: None,
            diagnostics,
        });
    };

    diagnostics.largest_area = largest.area;
    debug!(
        "{} components, largest label {} area {} (required {:.1})",
        labeling.component_count(),
        largest.label,
        largest.area,
        required_area
    );
    if (largest.area as f64) < required_area {
        diagnostics.rejection = Some(Rejection::TooSmall);
        return Ok(Segmentation {
            mask: None,
            diagnostics,
        });
    }

    let component = keep_label(&labeling.labels, largest.label);
    let mask = upscale::upscale(&component, frame.width(), frame.height())?;
    trace!(
        "mask {}x{} covers {} pixels",
        mask.width(),
        mask.height(),
        mask.foreground_pixels()
    );
    Ok(Segmentation {
        mask: Some(mask),
        diagnostics,
    })
}
