use leaf_mask_types::LeafMask;

use crate::error::MaskError;
use crate::grid::BinaryGrid;

use super::ops::{erode, resize_nearest};

pub(crate) const UPSCALE_EROSION: u8 = 10;

/// Erodes the retained component once more and stretches it back to the
/// photograph's resolution.
pub(crate) fn upscale(component: &BinaryGrid, width: u32, height: u32) -> Result<LeafMask, MaskError> {
    let eroded = erode(component, UPSCALE_EROSION);
    let data = resize_nearest(&eroded, width as usize, height as usize);
    Ok(LeafMask::from_owned(width, height, data)?)
}
