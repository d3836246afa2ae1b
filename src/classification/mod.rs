// src/classification/mod.rs

//! Threshold classification of blocks into encoding schemes.

use crate::core::{HqrError, Result};
use crate::entropy::EntropyGrid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a block is written into the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingScheme {
    /// Bit-precise value register (NEQR-style).
    Exact,
    /// One rotation on the intensity qubit (FRQI-style).
    Approx,
}

impl EncodingScheme {
    /// `1` for `Exact`, `0` for `Approx`.
    pub fn as_bit(self) -> u8 {
        match self {
            EncodingScheme::Exact => 1,
            EncodingScheme::Approx => 0,
        }
    }
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingScheme::Exact => write!(f, "EXACT"),
            EncodingScheme::Approx => write!(f, "APPROX"),
        }
    }
}

/// One encoding decision per block, on the block grid.
///
/// Maps are produced by [`classify`] and never edited afterwards; a new
/// threshold or image means a new map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDecisionMap")]
pub struct DecisionMap {
    rows: usize,
    cols: usize,
    cells: Vec<EncodingScheme>,
}

/// Unchecked wire form; deserialised maps go through [`DecisionMap::new`].
#[derive(Deserialize)]
struct RawDecisionMap {
    rows: usize,
    cols: usize,
    cells: Vec<EncodingScheme>,
}

impl TryFrom<RawDecisionMap> for DecisionMap {
    type Error = HqrError;

    fn try_from(raw: RawDecisionMap) -> Result<Self> {
        DecisionMap::new(raw.rows, raw.cols, raw.cells)
    }
}

impl DecisionMap {
    /// Builds a map from row-major decisions.
    pub fn new(rows: usize, cols: usize, cells: Vec<EncodingScheme>) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(HqrError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: cells.len() / cols.max(1),
                cols,
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Every block assigned the same scheme.
    pub fn uniform(rows: usize, cols: usize, scheme: EncodingScheme) -> Self {
        Self { rows, cols, cells: vec![scheme; rows * cols] }
    }

    /// Block rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Block columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Decision for block `(row, col)`. Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> EncodingScheme {
        self.cells[row * self.cols + col]
    }

    /// Row-major decisions.
    pub fn cells(&self) -> &[EncodingScheme] {
        &self.cells
    }

    /// Number of blocks using `scheme`.
    pub fn count(&self, scheme: EncodingScheme) -> usize {
        self.cells.iter().filter(|&&s| s == scheme).count()
    }

    /// Plain `{0, 1}` grid, `1` marking EXACT blocks.
    pub fn to_bits(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().map(|s| s.as_bit()).collect())
            .collect()
    }
}

impl fmt::Display for DecisionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_bits() {
            let cells: Vec<String> = row.iter().map(u8::to_string).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Checks that a threshold is usable.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(HqrError::InvalidConfig {
            message: format!("entropy threshold must be finite and non-negative, got {}", threshold),
        });
    }
    Ok(())
}

/// Classifies every block: `Exact` iff its entropy is strictly above
/// `threshold`. A block sitting on the threshold gets the cheaper `Approx`.
pub fn classify(entropy: &EntropyGrid, threshold: f64) -> Result<DecisionMap> {
    validate_threshold(threshold)?;
    let cells = entropy
        .values()
        .iter()
        .map(|&h| if h > threshold { EncodingScheme::Exact } else { EncodingScheme::Approx })
        .collect();
    DecisionMap::new(entropy.rows(), entropy.cols(), cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(values: Vec<f64>, cols: usize) -> EntropyGrid {
        EntropyGrid::new(values.len() / cols, cols, values).unwrap()
    }

    #[test]
    fn strict_threshold_ties_go_approx() {
        let map = classify(&grid(vec![0.6, 0.61, 0.0, 4.0], 2), 0.6).unwrap();
        assert_eq!(map.get(0, 0), EncodingScheme::Approx);
        assert_eq!(map.get(0, 1), EncodingScheme::Exact);
        assert_eq!(map.get(1, 0), EncodingScheme::Approx);
        assert_eq!(map.get(1, 1), EncodingScheme::Exact);
        assert_eq!(map.to_bits(), vec![vec![0, 1], vec![0, 1]]);
    }

    #[test]
    fn rejects_bad_thresholds() {
        let g = grid(vec![1.0], 1);
        assert!(matches!(classify(&g, -0.1), Err(HqrError::InvalidConfig { .. })));
        assert!(matches!(classify(&g, f64::NAN), Err(HqrError::InvalidConfig { .. })));
    }

    #[test]
    fn deserialising_checks_cell_count() {
        let err = serde_json::from_str::<DecisionMap>(r#"{"rows":2,"cols":2,"cells":["Exact"]}"#).unwrap_err();
        assert!(err.to_string().contains("Shape mismatch"), "{}", err);

        let map: DecisionMap =
            serde_json::from_str(r#"{"rows":1,"cols":2,"cells":["Exact","Approx"]}"#).unwrap();
        assert_eq!(map.to_bits(), vec![vec![1, 0]]);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"rows":1,"cols":2,"cells":["Exact","Approx"]}"#);
    }

    #[test]
    fn counts_per_scheme() {
        let map = classify(&grid(vec![0.0, 1.0, 2.0, 3.0, 0.2, 0.9], 3), 0.5).unwrap();
        assert_eq!(map.count(EncodingScheme::Exact), 4);
        assert_eq!(map.count(EncodingScheme::Approx), 2);
    }
}
