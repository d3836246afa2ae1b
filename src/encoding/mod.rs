// src/encoding/mod.rs

//! Per-block sub-circuits over a shared register layout.
//!
//! Every block writes into the same three registers:
//!
//! ```text
//! q[0 .. a)        address   which block an amplitude belongs to (big-endian)
//! q[a .. a+v)      value     bit-exact intensity of EXACT blocks (big-endian)
//! q[a+v]           intensity rotation carrying the mean of APPROX blocks
//! ```
//!
//! The layout is fixed before the first block is encoded and never grows.
//! A block's gates are pinned to its address by controlling them on the
//! address bits, open controls for `0` bits and closed controls for `1` bits.

use crate::classification::EncodingScheme;
use crate::core::{ceil_log2, HqrError, QubitId, Result};
use crate::image::{Block, BlockGrid};
use crate::operations::{Control, Operation};
use std::f64::consts::FRAC_PI_2;
use std::ops::Range;

/// Qubit allocation shared by every block of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLayout {
    address_qubits: usize,
    value_qubits: usize,
    max_intensity: u16,
}

impl RegisterLayout {
    /// Sizes the registers for `num_blocks` addresses and intensities in
    /// `0..=max_intensity`.
    pub fn new(num_blocks: usize, max_intensity: u16) -> Self {
        Self {
            address_qubits: ceil_log2(num_blocks),
            value_qubits: ceil_log2(usize::from(max_intensity) + 1),
            max_intensity,
        }
    }

    /// Layout for every block of `grid`.
    pub fn for_grid(grid: &BlockGrid, max_intensity: u16) -> Self {
        Self::new(grid.len(), max_intensity)
    }

    /// Width of the address register.
    pub fn address_qubits(&self) -> usize {
        self.address_qubits
    }

    /// Width of the value register.
    pub fn value_qubits(&self) -> usize {
        self.value_qubits
    }

    /// Largest intensity the value register holds.
    pub fn max_intensity(&self) -> u16 {
        self.max_intensity
    }

    /// `address + value + 1`.
    pub fn total_qubits(&self) -> usize {
        self.address_qubits + self.value_qubits + 1
    }

    /// `i`-th address qubit, most significant first.
    pub fn address_qubit(&self, i: usize) -> QubitId {
        debug_assert!(i < self.address_qubits);
        QubitId(i as u64)
    }

    /// `j`-th value qubit, most significant first.
    pub fn value_qubit(&self, j: usize) -> QubitId {
        debug_assert!(j < self.value_qubits);
        QubitId((self.address_qubits + j) as u64)
    }

    /// The qubit carrying APPROX rotations.
    pub fn intensity_qubit(&self) -> QubitId {
        QubitId((self.address_qubits + self.value_qubits) as u64)
    }

    /// Bitstring positions of the address register.
    pub fn address_range(&self) -> Range<usize> {
        0..self.address_qubits
    }

    /// Bitstring positions of the value register.
    pub fn value_range(&self) -> Range<usize> {
        self.address_qubits..self.address_qubits + self.value_qubits
    }

    /// Bitstring position of the intensity qubit.
    pub fn intensity_index(&self) -> usize {
        self.address_qubits + self.value_qubits
    }

    /// Binds a block address to the address register.
    ///
    /// # Errors
    /// `InvalidOperation` if the address does not fit the register.
    pub fn position(&self, address: usize) -> Result<PositionRegister> {
        let capacity = 1usize << self.address_qubits;
        if address >= capacity {
            return Err(HqrError::InvalidOperation {
                message: format!(
                    "address {} does not fit a {}-qubit address register",
                    address, self.address_qubits
                ),
            });
        }
        let qubits = (0..self.address_qubits).map(|i| self.address_qubit(i)).collect();
        Ok(PositionRegister { address, qubits })
    }
}

/// A block address bound to the shared address qubits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRegister {
    address: usize,
    qubits: Vec<QubitId>,
}

impl PositionRegister {
    /// Row-major block address.
    pub fn address(&self) -> usize {
        self.address
    }

    /// Controls that fire only on this address, most significant bit first.
    pub fn controls(&self) -> Vec<Control> {
        let width = self.qubits.len();
        self.qubits
            .iter()
            .enumerate()
            .map(|(i, &qubit)| Control { qubit, on_one: (self.address >> (width - 1 - i)) & 1 == 1 })
            .collect()
    }
}

/// The gates encoding one block.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCircuit {
    /// Block row.
    pub row: usize,
    /// Block column.
    pub col: usize,
    /// Scheme the block was encoded with.
    pub scheme: EncodingScheme,
    /// Gates, in emission order.
    pub operations: Vec<Operation>,
}

/// FRQI angle `θ ∈ [0, π/2]` for an intensity in `[0, max_intensity]`.
/// The emitted gate is `Ry(2θ)`, leaving `cos θ |0> + sin θ |1>`.
pub fn intensity_angle(intensity: f64, max_intensity: u16) -> f64 {
    if max_intensity == 0 {
        return 0.0;
    }
    intensity / f64::from(max_intensity) * FRAC_PI_2
}

/// Integer representative of an EXACT block: its mean rounded half up.
pub fn exact_value(mean: f64) -> u32 {
    (mean + 0.5).floor() as u32
}

/// Emits sub-circuits for single blocks on a fixed layout.
#[derive(Debug, Clone, Copy)]
pub struct BlockEncoder {
    layout: RegisterLayout,
}

impl BlockEncoder {
    /// Encoder over a fixed layout.
    pub fn new(layout: RegisterLayout) -> Self {
        Self { layout }
    }

    /// Layout the encoder writes into.
    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    /// Encodes `block` with `scheme`, every gate conditioned on `position`.
    ///
    /// # Errors
    /// * `EmptyBlock` for a block without pixels.
    /// * `ValueOverflow` if a pixel exceeds the layout's `max_intensity`.
    pub fn encode(
        &self,
        block: &Block<'_>,
        scheme: EncodingScheme,
        position: &PositionRegister,
    ) -> Result<SubCircuit> {
        let (row, col) = (block.row(), block.col());
        let (Some(peak), Some(mean)) = (block.max(), block.mean()) else {
            return Err(HqrError::EmptyBlock { row, col });
        };
        let max_intensity = self.layout.max_intensity;
        if peak > max_intensity {
            return Err(HqrError::ValueOverflow { row, col, value: u32::from(peak), max_intensity });
        }

        let controls = position.controls();
        let operations = match scheme {
            EncodingScheme::Approx => {
                let theta = 2.0 * intensity_angle(mean, max_intensity);
                vec![self.rotation(&controls, theta)]
            }
            EncodingScheme::Exact => {
                let value = exact_value(mean);
                if value > u32::from(max_intensity) {
                    return Err(HqrError::ValueOverflow { row, col, value, max_intensity });
                }
                let width = self.layout.value_qubits;
                (0..width)
                    .filter(|j| (value >> (width - 1 - j)) & 1 == 1)
                    .map(|j| self.flip(&controls, self.layout.value_qubit(j)))
                    .collect()
            }
        };
        Ok(SubCircuit { row, col, scheme, operations })
    }

    fn rotation(&self, controls: &[Control], theta: f64) -> Operation {
        let target = self.layout.intensity_qubit();
        if controls.is_empty() {
            Operation::Rotate { target, theta }
        } else {
            Operation::ControlledRotate { controls: controls.to_vec(), target, theta }
        }
    }

    fn flip(&self, controls: &[Control], target: QubitId) -> Operation {
        if controls.is_empty() {
            Operation::Flip { target }
        } else {
            Operation::ControlledFlip { controls: controls.to_vec(), target }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use approx::assert_relative_eq;

    #[test]
    fn layout_sizes_registers() {
        let layout = RegisterLayout::new(16, 255);
        assert_eq!(layout.address_qubits(), 4);
        assert_eq!(layout.value_qubits(), 8);
        assert_eq!(layout.total_qubits(), 13);
        assert_eq!(layout.value_qubit(0), QubitId(4));
        assert_eq!(layout.intensity_qubit(), QubitId(12));
        assert_eq!(layout.value_range(), 4..12);
    }

    #[test]
    fn position_controls_follow_address_bits() {
        let layout = RegisterLayout::new(8, 1);
        let controls = layout.position(5).unwrap().controls();
        let bits: Vec<bool> = controls.iter().map(|c| c.on_one).collect();
        assert_eq!(bits, vec![true, false, true]);
        assert!(layout.position(8).is_err());
    }

    #[test]
    fn exact_block_flips_set_bits_only() {
        // Mean 5 = 0b0000_0101 on an 8-bit value register.
        let image = Image::filled(2, 2, 5).unwrap();
        let grid = image.block_grid(2).unwrap();
        let layout = RegisterLayout::for_grid(&grid, 255);
        let encoder = BlockEncoder::new(layout);
        let sub = encoder
            .encode(&image.block(&grid, 0, 0), EncodingScheme::Exact, &layout.position(0).unwrap())
            .unwrap();
        assert_eq!(
            sub.operations,
            vec![
                Operation::Flip { target: layout.value_qubit(5) },
                Operation::Flip { target: layout.value_qubit(7) },
            ]
        );
    }

    #[test]
    fn approx_block_is_one_rotation() {
        let image = Image::from_fn(2, 4, |_, x| if x < 2 { 0 } else { 255 }).unwrap();
        let grid = image.block_grid(2).unwrap();
        let layout = RegisterLayout::for_grid(&grid, 255);
        let encoder = BlockEncoder::new(layout);
        let sub = encoder
            .encode(&image.block(&grid, 0, 1), EncodingScheme::Approx, &layout.position(1).unwrap())
            .unwrap();
        assert_eq!(sub.operations.len(), 1);
        match &sub.operations[0] {
            Operation::ControlledRotate { controls, target, theta } => {
                assert_eq!(controls, &vec![Control::one(QubitId(0))]);
                assert_eq!(*target, layout.intensity_qubit());
                assert_relative_eq!(*theta, std::f64::consts::PI, epsilon = 1e-12);
            }
            other => panic!("unexpected operation {:?}", other),
        }
    }

    #[test]
    fn overflow_reports_block_and_value() {
        let image = Image::from_fn(4, 4, |y, x| if (y, x) == (3, 3) { 300 } else { 0 }).unwrap();
        let grid = image.block_grid(2).unwrap();
        let layout = RegisterLayout::for_grid(&grid, 255);
        let err = BlockEncoder::new(layout)
            .encode(&image.block(&grid, 1, 1), EncodingScheme::Approx, &layout.position(3).unwrap())
            .unwrap_err();
        assert_eq!(err, HqrError::ValueOverflow { row: 1, col: 1, value: 300, max_intensity: 255 });
    }

    #[test]
    fn exact_value_rounds_half_up() {
        assert_eq!(exact_value(2.5), 3);
        assert_eq!(exact_value(2.49), 2);
        assert_eq!(exact_value(0.0), 0);
    }
}
