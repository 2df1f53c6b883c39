use image::Luma;
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::grid::{BinaryGrid, LabelGrid};

const FILL_VALUE: u8 = 255;

/// Fills background regions that are not reachable from the grid border.
///
/// Zero cells are grouped into 4-connected regions. Regions without a cell on
/// the outer frame are enclosed holes and are set to 255; on a 0/255 grid
/// this matches flooding the border zeros with any tolerance below 255.
pub(crate) fn fill_holes(mask: &BinaryGrid) -> BinaryGrid {
    let width = mask.width();
    let height = mask.height();
    if width == 0 || height == 0 {
        return mask.clone();
    }

    let regions = LabelGrid::from(connected_components(
        &mask.to_image(),
        Connectivity::Four,
        Luma([FILL_VALUE]),
    ));
    let count = regions.cells().iter().copied().max().unwrap_or(0) as usize;
    let mut open = vec![false; count + 1];
    for x in 0..width {
        open[regions.get(x, 0) as usize] = true;
        open[regions.get(x, height - 1) as usize] = true;
    }
    for y in 0..height {
        open[regions.get(0, y) as usize] = true;
        open[regions.get(width - 1, y) as usize] = true;
    }

    let mut filled = mask.clone();
    for (cell, &region) in filled.cells_mut().iter_mut().zip(regions.cells()) {
        if *cell == 0 && !open[region as usize] {
            *cell = FILL_VALUE;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rows: &[&str]) -> BinaryGrid {
        let width = rows[0].len();
        let cells = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| if b == b'#' { 255 } else { 0 }))
            .collect();
        BinaryGrid::from_vec(width, rows.len(), cells)
    }

    #[test]
    fn enclosed_island_is_filled() {
        let mask = parse(&[
            ".......", //
            ".#####.", //
            ".#...#.", //
            ".#.#.#.", //
            ".#...#.", //
            ".#####.", //
            ".......",
        ]);
        let expected = parse(&[
            ".......", //
            ".#####.", //
            ".#####.", //
            ".#####.", //
            ".#####.", //
            ".#####.", //
            ".......",
        ]);
        assert_eq!(fill_holes(&mask), expected);
    }

    #[test]
    fn border_touching_background_is_kept() {
        let mask = parse(&[
            "##.####", //
            "#.....#", //
            "#.###.#", //
            "#.....#", //
            "#######",
        ]);
        assert_eq!(fill_holes(&mask), mask);
    }

    #[test]
    fn diagonal_gap_does_not_leak_the_flood() {
        // The hole touches the outside only through a corner, which a
        // 4-connected flood cannot cross.
        let mask = parse(&[
            ".....", //
            ".##..", //
            ".#.#.", //
            "..##.", //
            ".....",
        ]);
        let filled = fill_holes(&mask);
        assert_eq!(filled.get(2, 2), 255);
        assert_eq!(filled.get(3, 1), 0);
        assert_eq!(filled.get(1, 3), 0);
    }

    #[test]
    fn filling_is_idempotent() {
        let mask = parse(&[
            "#########", //
            "#...#...#", //
            "#.#.#.#.#", //
            "#...#....", //
            "#########",
        ]);
        let once = fill_holes(&mask);
        let twice = fill_holes(&once);
        assert_eq!(once, twice);
        assert_eq!(once.get(1, 1), 255);
        assert_eq!(once.get(7, 3), 0);
    }

    #[test]
    fn every_enclosed_hole_is_filled() {
        let mask = parse(&[
            "#######", //
            "#.#...#", //
            "###.#.#", //
            "#.#...#", //
            "#######",
        ]);
        let filled = fill_holes(&mask);
        assert_eq!(filled.count_nonzero(), 35);
    }
}
