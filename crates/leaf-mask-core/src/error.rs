use leaf_mask_types::FrameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaskError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(
        "image {width}x{height} is too small for a {window}px focus window; the coarse grid would be empty"
    )]
    DegenerateSize { width: u32, height: u32, window: usize },
    #[error("mask is {mask_width}x{mask_height} but the frame is {frame_width}x{frame_height}")]
    DimensionMismatch {
        frame_width: u32,
        frame_height: u32,
        mask_width: u32,
        mask_height: u32,
    },
    #[error("tile size must be at least 1x1, got {tile_width}x{tile_height}")]
    InvalidTileSize { tile_width: u32, tile_height: u32 },
}
