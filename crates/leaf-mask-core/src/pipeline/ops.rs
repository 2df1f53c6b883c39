use imageproc::distance_transform::Norm;
use imageproc::morphology;
use rayon::prelude::*;

use crate::grid::BinaryGrid;

/// Erosion by a square element of radius `radius`, equivalent to `radius`
/// passes of a 3x3 square.
///
/// Cells outside the grid never count as background, so border cells only
/// shrink when an in-grid neighbour is zero.
pub fn erode(mask: &BinaryGrid, radius: u8) -> BinaryGrid {
    if radius == 0 || mask.is_empty() {
        return mask.clone();
    }
    BinaryGrid::from(morphology::erode(&mask.to_image(), Norm::LInf, radius))
}

/// Overwrites the outermost one-cell frame with `value`.
pub fn clear_border(mask: &mut BinaryGrid, value: u8) {
    let width = mask.width();
    let height = mask.height();
    if width == 0 || height == 0 {
        return;
    }
    for x in 0..width {
        mask.set(x, 0, value);
        mask.set(x, height - 1, value);
    }
    for y in 0..height {
        mask.set(0, y, value);
        mask.set(width - 1, y, value);
    }
}

/// Bitwise complement of every cell.
pub fn invert(mask: &BinaryGrid) -> BinaryGrid {
    let cells = mask.cells().iter().map(|&v| !v).collect();
    BinaryGrid::from_vec(mask.width(), mask.height(), cells)
}

/// Nearest-neighbour resize: destination `(dx, dy)` samples source
/// `(floor(dx * w / new_w), floor(dy * h / new_h))`.
pub fn resize_nearest(mask: &BinaryGrid, new_width: usize, new_height: usize) -> Vec<u8> {
    let width = mask.width();
    let height = mask.height();
    let mut output = vec![0u8; new_width * new_height];
    if width == 0 || height == 0 || new_width == 0 || new_height == 0 {
        return output;
    }
    let x_map: Vec<usize> = (0..new_width)
        .map(|dx| (dx * width / new_width).min(width - 1))
        .collect();
    output
        .par_chunks_mut(new_width)
        .enumerate()
        .for_each(|(dy, dst)| {
            let sy = (dy * height / new_height).min(height - 1);
            let src = mask.row(sy);
            for (value, &sx) in dst.iter_mut().zip(x_map.iter()) {
                *value = src[sx];
            }
        });
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(width: usize, height: usize, x0: usize, y0: usize, side: usize) -> BinaryGrid {
        let mut grid = BinaryGrid::filled(width, height, 0);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                grid.set(x, y, 255);
            }
        }
        grid
    }

    #[test]
    fn erosion_shrinks_square_by_iteration_count() {
        let grid = square(20, 20, 5, 5, 9);
        let eroded = erode(&grid, 2);
        assert_eq!(eroded, square(20, 20, 7, 7, 5));
    }

    #[test]
    fn zero_radius_is_identity() {
        let grid = square(8, 8, 1, 1, 3);
        assert_eq!(erode(&grid, 0), grid);
    }

    #[test]
    fn erosion_ignores_out_of_grid_neighbours() {
        let grid = BinaryGrid::filled(6, 4, 255);
        let eroded = erode(&grid, 3);
        assert_eq!(eroded, grid);
    }

    #[test]
    fn erosion_removes_thin_filaments() {
        let mut grid = square(20, 20, 2, 2, 7);
        for x in 9..18 {
            grid.set(x, 5, 255);
        }
        let eroded = erode(&grid, 1);
        assert_eq!(eroded, square(20, 20, 3, 3, 5));
    }

    #[test]
    fn clear_border_only_touches_frame() {
        let mut grid = BinaryGrid::filled(4, 3, 255);
        clear_border(&mut grid, 0);
        assert_eq!(grid.cells(), &[0, 0, 0, 0, 0, 255, 255, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn resize_nearest_replicates_cells() {
        let grid = BinaryGrid::from_vec(2, 2, vec![0, 255, 255, 0]);
        let resized = resize_nearest(&grid, 4, 3);
        assert_eq!(
            resized,
            vec![0, 0, 255, 255, 0, 0, 255, 255, 255, 255, 0, 0]
        );
    }
}
