use std::slice::ChunksExact;

use image::{GrayImage, ImageBuffer, Luma, Primitive};

/// Dense row-major grid used for every coarse-resolution stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// Binary grid with values restricted to 0 and 255.
pub type BinaryGrid = Grid<u8>;
/// Per-cell sharpness scores.
pub type FocusMap = Grid<f64>;
/// Component labels, 0 reserved for background.
pub type LabelGrid = Grid<u32>;

impl<T: Copy> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Self {
        assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.cells[y * self.width + x] = value;
    }

    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Row iterator; yields nothing for zero-width grids.
    pub fn rows(&self) -> ChunksExact<'_, T> {
        self.cells.chunks_exact(self.width.max(1))
    }
}

impl Grid<u8> {
    /// Number of cells that are not zero.
    pub fn count_nonzero(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Copies the grid into an 8-bit luma image for the `imageproc` operators.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([self.get(x as usize, y as usize)])
        })
    }
}

impl<T: Primitive> From<ImageBuffer<Luma<T>, Vec<T>>> for Grid<T> {
    fn from(image: ImageBuffer<Luma<T>, Vec<T>>) -> Self {
        let (width, height) = image.dimensions();
        Self::from_vec(width as usize, height as usize, image.into_raw())
    }
}
