use rayon::prelude::*;

use leaf_mask_types::{ColorFrame, LeafMask, MaskStats};

use crate::error::MaskError;

/// Share of the photograph covered by the mask and the mean luminance of the
/// covered pixels.
pub fn mask_stats(frame: &ColorFrame, mask: &LeafMask) -> Result<MaskStats, MaskError> {
    if frame.width() != mask.width() || frame.height() != mask.height() {
        return Err(MaskError::DimensionMismatch {
            frame_width: frame.width(),
            frame_height: frame.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }
    let width = mask.width() as usize;
    if width == 0 || mask.height() == 0 {
        return Ok(MaskStats::empty());
    }

    let luma = frame.luminance();
    let (count, sum) = luma
        .data()
        .par_chunks(width)
        .zip(mask.data().par_chunks(width))
        .map(|(luma_row, mask_row)| {
            let mut count = 0usize;
            let mut sum = 0u64;
            for (&y, &m) in luma_row.iter().zip(mask_row) {
                if m != 0 {
                    count += 1;
                    sum += y as u64;
                }
            }
            (count, sum)
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    if count == 0 {
        return Ok(MaskStats::empty());
    }
    let total = mask.data().len();
    Ok(MaskStats {
        foreground_pixels: count,
        foreground_ratio: count as f32 / total as f32,
        mean_luma: (sum as f64 / count as f64) as f32,
    })
}
