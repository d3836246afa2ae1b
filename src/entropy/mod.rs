// src/entropy/mod.rs

//! Shannon entropy of image blocks.

use crate::core::{HqrError, Result};
use crate::image::{Block, BlockGrid, Image};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Empirical Shannon entropy of a block, in bits.
///
/// Only values present in the block contribute, so `log2(0)` is never
/// evaluated and a single-valued block yields exactly `0.0`.
///
/// # Errors
/// `EmptyBlock` if the block has no pixels.
pub fn entropy(block: &Block<'_>) -> Result<f64> {
    let total = block.area();
    if total == 0 {
        return Err(HqrError::EmptyBlock { row: block.row(), col: block.col() });
    }

    let mut counts: HashMap<u16, usize> = HashMap::new();
    for value in block.values() {
        *counts.entry(value).or_insert(0) += 1;
    }
    if counts.len() == 1 {
        return Ok(0.0);
    }

    // Sum in value order so the result does not depend on hash iteration order.
    let mut counts: Vec<(u16, usize)> = counts.into_iter().collect();
    counts.sort_unstable_by_key(|(value, _)| *value);

    let total = total as f64;
    let h: f64 = counts
        .iter()
        .map(|&(_, count)| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum();
    Ok(h.max(0.0))
}

/// Entropy of every block of an image, laid out on the block grid.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl EntropyGrid {
    /// Builds a grid from row-major values.
    ///
    /// # Errors
    /// `ShapeMismatch` if `values.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(HqrError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: values.len() / cols.max(1),
                cols,
            });
        }
        Ok(Self { rows, cols, values })
    }

    /// Evaluates every block of `image` on `grid`.
    ///
    /// Blocks are independent, so the work fans out across the rayon pool;
    /// the collected grid is always row-major.
    pub fn compute(image: &Image, grid: &BlockGrid) -> Result<Self> {
        let positions: Vec<(usize, usize)> = grid.positions().collect();
        let values = positions
            .par_iter()
            .map(|&(row, col)| entropy(&image.block(grid, row, col)))
            .collect::<Vec<Result<f64>>>()
            .into_iter()
            .collect::<Result<Vec<f64>>>()?;
        debug!(rows = grid.rows(), cols = grid.cols(), "computed entropy grid");
        Self::new(grid.rows(), grid.cols(), values)
    }

    /// Block rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Block columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entropy of block `(row, col)`. Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.cols.max(1)).map(<[f64]>::to_vec).collect()
    }
}

/// Partitions `image` and evaluates the entropy of every block.
pub fn entropy_grid(image: &Image, block_size: usize) -> Result<EntropyGrid> {
    let grid = image.block_grid(block_size)?;
    EntropyGrid::compute(image, &grid)
}

impl fmt::Display for EntropyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.values.chunks(self.cols.max(1)) {
            let cells: Vec<String> = row.iter().map(|h| format!("{:.3}", h)).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_block(size: usize, values: Vec<u16>) -> Image {
        Image::new(size, size, values).unwrap()
    }

    #[test]
    fn uniform_block_is_exactly_zero() {
        let image = Image::filled(4, 4, 200).unwrap();
        let grid = image.block_grid(4).unwrap();
        let h = entropy(&image.block(&grid, 0, 0)).unwrap();
        assert_eq!(h, 0.0);
        assert!(!h.is_nan());
    }

    #[test]
    fn distinct_values_give_log2_of_count() {
        let image = single_block(4, (0..16).map(|v| v * 10).collect());
        let grid = image.block_grid(4).unwrap();
        let h = entropy(&image.block(&grid, 0, 0)).unwrap();
        assert_relative_eq!(h, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn two_equal_halves_give_one_bit() {
        let mut values = vec![0u16; 8];
        values.extend(vec![255u16; 8]);
        let image = single_block(4, values);
        let grid = image.block_grid(4).unwrap();
        let h = entropy(&image.block(&grid, 0, 0)).unwrap();
        assert_relative_eq!(h, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_matches_block_layout() {
        // Left half constant, right half a ramp.
        let image = Image::from_fn(4, 8, |y, x| if x < 4 { 7 } else { (y * 4 + x) as u16 }).unwrap();
        let grid = entropy_grid(&image, 4).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (1, 2));
        assert_eq!(grid.get(0, 0), 0.0);
        assert_relative_eq!(grid.get(0, 1), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_rejects_indivisible_image() {
        let image = Image::filled(6, 6, 0).unwrap();
        assert!(matches!(entropy_grid(&image, 4), Err(HqrError::InvalidShape { .. })));
    }
}
