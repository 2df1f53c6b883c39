//! Leaf segmentation crate entry point with flat, easy-to-import modules.

pub mod error;
pub mod grid;
pub mod pipeline;
pub mod stats;
pub mod tiles;

pub use error::MaskError;
pub use grid::{BinaryGrid, FocusMap, Grid, LabelGrid};
pub use pipeline::{
    DEFAULT_RELATIVE_THRESHOLD, MIN_AREA_RATIO, Rejection, Segmentation, SegmentationDiagnostics,
    process, segment,
};
pub use stats::mask_stats;
pub use tiles::{DEFAULT_MIN_COVERAGE, DEFAULT_TILE_SIZE, TileLayout, tile_coverage};

#[cfg(test)]
mod tests;
