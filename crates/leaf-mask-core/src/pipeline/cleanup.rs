use crate::grid::BinaryGrid;

use super::fill::fill_holes;
use super::ops::{clear_border, erode, invert};

pub(crate) const FIRST_EROSION: u8 = 10;
pub(crate) const SECOND_EROSION: u8 = 4;

/// Morphological cleanup of the thresholded grid.
///
/// The low-focus selection is inverted into a foreground candidate, holes are
/// filled, thin structures are eroded away, the border frame is cleared so
/// nothing stays attached to the image edge, and the result is eroded and
/// hole-filled once more.
pub(crate) fn clean(thresholded: &BinaryGrid) -> BinaryGrid {
    let candidate = invert(thresholded);
    let filled = fill_holes(&candidate);
    let mut eroded = erode(&filled, FIRST_EROSION);
    clear_border(&mut eroded, 0);
    let eroded = erode(&eroded, SECOND_EROSION);
    fill_holes(&eroded)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Low-focus everywhere except the sharp `[lo, hi)` block.
    fn sharp_block(size: usize, lo: usize, hi: usize) -> BinaryGrid {
        let mut thresholded = BinaryGrid::filled(size, size, 255);
        for y in lo..hi {
            for x in lo..hi {
                thresholded.set(x, y, 0);
            }
        }
        thresholded
    }

    #[test]
    fn large_block_survives_with_erosion_margin() {
        let cleaned = clean(&sharp_block(60, 10, 50));
        let margin = usize::from(FIRST_EROSION + SECOND_EROSION);
        for y in 0..60 {
            for x in 0..60 {
                let inside = (10 + margin..50 - margin).contains(&x)
                    && (10 + margin..50 - margin).contains(&y);
                assert_eq!(cleaned.get(x, y), if inside { 255 } else { 0 }, "({x}, {y})");
            }
        }
    }

    #[test]
    fn enclosed_low_focus_patch_becomes_foreground() {
        let solid = sharp_block(60, 10, 50);
        let mut holed = solid.clone();
        for y in 25..35 {
            for x in 25..35 {
                holed.set(x, y, 255);
            }
        }
        // Left open, the hole would grow through the whole block under the
        // first erosion.
        let cleaned = clean(&holed);
        assert_eq!(cleaned.get(30, 30), 255);
        assert_eq!(cleaned, clean(&solid));
    }

    #[test]
    fn cleaned_grid_has_no_enclosed_background() {
        // A sharp ring whose low-focus centre is wider than the ring itself.
        let mut thresholded = sharp_block(80, 8, 72);
        for y in 20..60 {
            for x in 20..60 {
                thresholded.set(x, y, 255);
            }
        }
        let cleaned = clean(&thresholded);
        assert_eq!(cleaned.get(40, 40), 255);
        assert_eq!(fill_holes(&cleaned), cleaned);
    }

    #[test]
    fn small_blocks_are_eroded_away() {
        assert_eq!(clean(&sharp_block(40, 15, 25)).count_nonzero(), 0);
    }

    #[test]
    fn all_sharp_grid_is_cleared_from_the_border() {
        let thresholded = BinaryGrid::filled(30, 30, 0);
        let cleaned = clean(&thresholded);
        // Clearing the frame lets the second erosion eat four more rings.
        let inner = 1 + usize::from(SECOND_EROSION);
        assert_eq!(cleaned.get(15, 15), 255);
        assert_eq!(cleaned.get(inner - 1, 15), 0);
        assert_eq!(cleaned.get(inner, 15), 255);
    }
}
