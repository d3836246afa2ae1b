// src/image/mod.rs

//! Grayscale images and their partition into square blocks.
//!
//! An [`Image`] is immutable once built. Blocks are borrowed views into it:
//! nothing about a block is stored apart from its grid position.

use crate::core::{HqrError, Result};

/// A row-major grid of intensity values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    height: usize,
    width: usize,
    pixels: Vec<u16>,
}

impl Image {
    /// Builds an image from a row-major pixel buffer.
    ///
    /// # Errors
    /// * `InvalidShape` if either dimension is zero.
    /// * `InvalidPixelData` if `pixels.len() != height * width`.
    pub fn new(height: usize, width: usize, pixels: Vec<u16>) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(HqrError::InvalidShape {
                height,
                width,
                block_size: 0,
                reason: "image dimensions must be non-zero",
            });
        }
        let expected = height * width;
        if pixels.len() != expected {
            return Err(HqrError::InvalidPixelData { expected, actual: pixels.len() });
        }
        Ok(Self { height, width, pixels })
    }

    /// Image of constant intensity.
    pub fn filled(height: usize, width: usize, value: u16) -> Result<Self> {
        Self::new(height, width, vec![value; height * width])
    }

    /// Builds an image by evaluating `f(y, x)` for every pixel.
    pub fn from_fn<F>(height: usize, width: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> u16,
    {
        let mut pixels = Vec::with_capacity(height * width);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(y, x));
            }
        }
        Self::new(height, width, pixels)
    }

    /// Builds an image from nested rows. All rows must share one length.
    pub fn from_rows(rows: &[Vec<u16>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut pixels = Vec::with_capacity(height * width);
        for row in rows {
            if row.len() != width {
                return Err(HqrError::InvalidPixelData {
                    expected: height * width,
                    actual: rows.iter().map(Vec::len).sum(),
                });
            }
            pixels.extend_from_slice(row);
        }
        Self::new(height, width, pixels)
    }

    /// Rows of pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Columns of pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Intensity at row `y`, column `x`. Panics when out of bounds.
    pub fn get(&self, y: usize, x: usize) -> u16 {
        self.pixels[y * self.width + x]
    }

    /// Row-major pixel buffer.
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Largest intensity present, `0` for an all-black image.
    pub fn max_intensity(&self) -> u16 {
        self.pixels.iter().copied().max().unwrap_or(0)
    }

    /// Partitions the image into `block_size × block_size` blocks.
    ///
    /// # Errors
    /// `InvalidShape` if `block_size` is zero or does not divide both dimensions.
    pub fn block_grid(&self, block_size: usize) -> Result<BlockGrid> {
        BlockGrid::new(self.height, self.width, block_size)
    }

    /// View of the block at grid position `(row, col)`.
    pub fn block(&self, grid: &BlockGrid, row: usize, col: usize) -> Block<'_> {
        debug_assert!(row < grid.rows && col < grid.cols);
        Block { image: self, row, col, size: grid.block_size }
    }

    /// All blocks of `grid` in row-major order.
    pub fn blocks<'a>(&'a self, grid: &BlockGrid) -> impl Iterator<Item = Block<'a>> + use<'a> {
        let grid = *grid;
        grid.positions().map(move |(row, col)| self.block(&grid, row, col))
    }
}

/// Shape of a block partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    rows: usize,
    cols: usize,
    block_size: usize,
}

impl BlockGrid {
    /// Validates that a `height × width` image splits into whole blocks.
    pub fn new(height: usize, width: usize, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(HqrError::InvalidShape {
                height,
                width,
                block_size,
                reason: "block size must be non-zero",
            });
        }
        if height == 0 || width == 0 {
            return Err(HqrError::InvalidShape {
                height,
                width,
                block_size,
                reason: "image dimensions must be non-zero",
            });
        }
        if height % block_size != 0 || width % block_size != 0 {
            return Err(HqrError::InvalidShape {
                height,
                width,
                block_size,
                reason: "dimensions must be divisible by the block size",
            });
        }
        Ok(Self { rows: height / block_size, cols: width / block_size, block_size })
    }

    /// Block rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Block columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Side of a block in pixels.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// `true` for a grid without blocks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major address of block `(row, col)`.
    pub fn address(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Grid positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let cols = self.cols;
        (0..self.len()).map(move |i| (i / cols, i % cols))
    }
}

/// A borrowed square sub-grid of an [`Image`].
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    image: &'a Image,
    row: usize,
    col: usize,
    size: usize,
}

impl<'a> Block<'a> {
    /// Block row on the grid.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Block column on the grid.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Side of the block in pixels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of pixels in the block.
    pub fn area(&self) -> usize {
        self.size * self.size
    }

    /// Pixel values, row by row.
    pub fn values(&self) -> impl Iterator<Item = u16> + use<'a> {
        let image = self.image;
        let (y0, x0, size) = (self.row * self.size, self.col * self.size, self.size);
        (0..size).flat_map(move |dy| (0..size).map(move |dx| image.get(y0 + dy, x0 + dx)))
    }

    /// Largest pixel value, `None` for an empty block.
    pub fn max(&self) -> Option<u16> {
        self.values().max()
    }

    /// Arithmetic mean intensity, `None` for an empty block.
    pub fn mean(&self) -> Option<f64> {
        let area = self.area();
        if area == 0 {
            return None;
        }
        let sum: u64 = self.values().map(u64::from).sum();
        Some(sum as f64 / area as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_wrong_buffer_length() {
        let err = Image::new(2, 2, vec![0; 3]).unwrap_err();
        assert_eq!(err, HqrError::InvalidPixelData { expected: 4, actual: 3 });
    }

    #[test]
    fn block_grid_requires_divisible_dimensions() {
        let image = Image::filled(16, 12, 0).unwrap();
        assert!(image.block_grid(4).is_ok());
        assert!(matches!(image.block_grid(8), Err(HqrError::InvalidShape { .. })));
        assert!(matches!(image.block_grid(0), Err(HqrError::InvalidShape { .. })));
    }

    #[test]
    fn block_views_read_the_right_pixels() {
        let image = Image::from_fn(4, 4, |y, x| (y * 4 + x) as u16).unwrap();
        let grid = image.block_grid(2).unwrap();
        let block = image.block(&grid, 1, 0);
        assert_eq!(block.values().collect::<Vec<_>>(), vec![8, 9, 12, 13]);
        assert_eq!(block.max(), Some(13));
        assert_eq!(block.mean(), Some(10.5));
    }

    #[test]
    fn positions_are_row_major() {
        let grid = BlockGrid::new(8, 12, 4).unwrap();
        let positions: Vec<_> = grid.positions().collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
        assert_eq!(grid.address(1, 2), 5);
    }

    #[test]
    fn block_size_eight_halves_the_grid() {
        let four = BlockGrid::new(16, 16, 4).unwrap();
        let eight = BlockGrid::new(16, 16, 8).unwrap();
        assert_eq!((four.rows(), four.cols()), (4, 4));
        assert_eq!((eight.rows(), eight.cols()), (2, 2));
    }
}
