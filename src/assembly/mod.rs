// src/assembly/mod.rs

//! Composition of per-block sub-circuits into one hybrid circuit.

use crate::circuits::{Circuit, CircuitBuilder, CircuitStats};
use crate::classification::{DecisionMap, EncodingScheme};
use crate::core::{HqrError, QubitId, Result};
use crate::encoding::{BlockEncoder, RegisterLayout, SubCircuit};
use crate::image::{BlockGrid, Image};
use crate::operations::Operation;
use rayon::prelude::*;
use tracing::{debug, info};

/// The assembled representation of a whole image.
///
/// Holds the decision map and layout it was built from, so readout can be
/// interpreted without re-running classification.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridCircuit {
    layout: RegisterLayout,
    grid: BlockGrid,
    decisions: DecisionMap,
    circuit: Circuit,
}

impl HybridCircuit {
    /// Register layout every block was encoded on.
    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    /// Block grid of the source image.
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    /// Decision map the circuit was built from.
    pub fn decisions(&self) -> &DecisionMap {
        &self.decisions
    }

    /// The circuit handed to an execution adapter.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Drops the metadata and keeps the circuit.
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Register width, `address + value + 1`.
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// Gate statistics of the circuit.
    pub fn stats(&self) -> CircuitStats {
        self.circuit.stats()
    }
}

/// Builds the hybrid circuit for `image` under `decisions`.
///
/// Registers are sized once from the block count and `max_intensity`. The
/// address register is put in uniform superposition, then each block's
/// sub-circuit is appended in row-major order, then every qubit is
/// measured. Blocks are encoded in parallel; if any fails, the whole
/// assembly fails with the first error in row-major order.
///
/// # Errors
/// * `InvalidShape` if `block_size` does not partition the image.
/// * `ShapeMismatch` if `decisions` is not on the image's block grid.
/// * `ValueOverflow` if a pixel exceeds `max_intensity`.
#[tracing::instrument(level = "debug", skip(image, decisions), fields(height = image.height(), width = image.width()))]
pub fn assemble(
    image: &Image,
    decisions: &DecisionMap,
    block_size: usize,
    max_intensity: u16,
) -> Result<HybridCircuit> {
    let grid = image.block_grid(block_size)?;
    if decisions.rows() != grid.rows()
        || decisions.cols() != grid.cols()
        || decisions.cells().len() != grid.len()
    {
        return Err(HqrError::ShapeMismatch {
            expected_rows: grid.rows(),
            expected_cols: grid.cols(),
            rows: decisions.rows(),
            cols: decisions.cols(),
        });
    }

    let layout = RegisterLayout::for_grid(&grid, max_intensity);
    debug!(
        address_qubits = layout.address_qubits(),
        value_qubits = layout.value_qubits(),
        total_qubits = layout.total_qubits(),
        "register layout fixed"
    );

    let encoder = BlockEncoder::new(layout);
    let positions: Vec<(usize, usize)> = grid.positions().collect();
    let sub_circuits = positions
        .par_iter()
        .map(|&(row, col)| {
            let position = layout.position(grid.address(row, col))?;
            encoder.encode(&image.block(&grid, row, col), decisions.get(row, col), &position)
        })
        .collect::<Vec<Result<SubCircuit>>>()
        .into_iter()
        .collect::<Result<Vec<SubCircuit>>>()?;

    let mut builder = CircuitBuilder::with_width(layout.total_qubits())
        .add_ops(
            (0..layout.address_qubits()).map(|i| Operation::Hadamard { target: layout.address_qubit(i) }),
        )
        .add_op(Operation::Barrier);
    for sub in sub_circuits {
        builder = builder.add_ops(sub.operations);
    }
    let circuit = builder
        .add_op(Operation::Barrier)
        .add_op(Operation::Measure {
            targets: (0..layout.total_qubits() as u64).map(QubitId).collect(),
        })
        .build();

    info!(
        blocks = grid.len(),
        exact = decisions.count(EncodingScheme::Exact),
        approx = decisions.count(EncodingScheme::Approx),
        operations = circuit.len(),
        "assembled hybrid circuit"
    );
    Ok(HybridCircuit { layout, grid, decisions: decisions.clone(), circuit })
}
