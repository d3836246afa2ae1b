// src/simulation/engine.rs
use crate::core::constants::MAX_SIMULATED_QUBITS;
use crate::core::{HqrError, QubitId, Result, StateVector};
use crate::operations::{Control, Operation};
use num_complex::Complex;
use num_traits::{One, Zero};
use std::collections::{BTreeSet, HashMap};
use std::f64::consts::FRAC_1_SQRT_2;

type Matrix2 = [[Complex<f64>; 2]; 2];

/// State-vector engine evolving a register of up to
/// [`MAX_SIMULATED_QUBITS`] qubits under the crate's gate set.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Maps qubit ids to their index (0..N-1) in ascending id order.
    qubit_indices: HashMap<QubitId, usize>,
    /// Amplitudes over the 2^N basis states.
    state: StateVector,
    /// Number of qubits being simulated (N).
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes the engine in `|0...0>` over the given qubits.
    pub(crate) fn init(qubits: &BTreeSet<QubitId>) -> Result<Self> {
        if qubits.is_empty() {
            return Err(HqrError::InvalidOperation {
                message: "Cannot initialize simulation engine with zero qubits".to_string(),
            });
        }
        let num_qubits = qubits.len();
        if num_qubits > MAX_SIMULATED_QUBITS {
            return Err(HqrError::SimulationError {
                message: format!(
                    "{} qubits exceed the simulator limit of {}",
                    num_qubits, MAX_SIMULATED_QUBITS
                ),
            });
        }
        let dim = 1usize << num_qubits;

        // BTreeSet iteration is ascending, so index assignment is deterministic.
        let qubit_indices = qubits.iter().enumerate().map(|(index, q)| (*q, index)).collect();

        let mut initial = vec![Complex::zero(); dim];
        initial[0] = Complex::one();

        Ok(Self { qubit_indices, state: StateVector::new(initial), num_qubits })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<()> {
        if state.dim() != self.state.dim() {
            return Err(HqrError::SimulationError {
                message: format!(
                    "Cannot set state: provided dimension {} does not match engine dimension {}",
                    state.dim(),
                    self.state.dim()
                ),
            });
        }
        self.state = state;
        Ok(())
    }

    pub(crate) fn get_state(&self) -> &StateVector {
        &self.state
    }

    pub(crate) fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Applies one state-changing operation. Barriers are no-ops;
    /// measurements are resolved by the simulator, not here.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::Hadamard { target } => {
                let t = self.bit_of(target)?;
                self.apply_controlled_gate(0, 0, t, &hadamard_matrix())
            }
            Operation::Flip { target } => {
                let t = self.bit_of(target)?;
                self.apply_controlled_gate(0, 0, t, &flip_matrix())
            }
            Operation::Rotate { target, theta } => {
                let t = self.bit_of(target)?;
                self.apply_controlled_gate(0, 0, t, &ry_matrix(*theta))
            }
            Operation::ControlledFlip { controls, target } => {
                let t = self.bit_of(target)?;
                let (mask, value) = self.control_pattern(controls, t)?;
                self.apply_controlled_gate(mask, value, t, &flip_matrix())
            }
            Operation::ControlledRotate { controls, target, theta } => {
                let t = self.bit_of(target)?;
                let (mask, value) = self.control_pattern(controls, t)?;
                self.apply_controlled_gate(mask, value, t, &ry_matrix(*theta))
            }
            Operation::Barrier => Ok(()),
            Operation::Measure { .. } => Err(HqrError::InvalidOperation {
                message: "Measure should not be passed directly to apply_operation".to_string(),
            }),
        }
    }

    /// Basis-index bit position of a qubit. Qubit index `i` owns bit `N-1-i`.
    pub(crate) fn bit_of(&self, qubit: &QubitId) -> Result<usize> {
        self.qubit_indices
            .get(qubit)
            .map(|index| self.num_qubits - 1 - index)
            .ok_or_else(|| HqrError::ReferenceViolation {
                qubit: *qubit,
                message: "qubit not found in simulation context".to_string(),
            })
    }

    /// Collapses a control list into a `(mask, value)` pair: the gate fires
    /// on basis states `k` with `k & mask == value`.
    fn control_pattern(&self, controls: &[Control], target_bit: usize) -> Result<(usize, usize)> {
        let mut mask = 0usize;
        let mut value = 0usize;
        for control in controls {
            let bit = self.bit_of(&control.qubit)?;
            if bit == target_bit {
                return Err(HqrError::InvalidOperation {
                    message: format!("{} cannot control itself", control.qubit),
                });
            }
            let bit_mask = 1usize << bit;
            if mask & bit_mask != 0 && (value & bit_mask != 0) != control.on_one {
                return Err(HqrError::InvalidOperation {
                    message: format!("{} carries contradictory controls", control.qubit),
                });
            }
            mask |= bit_mask;
            if control.on_one {
                value |= bit_mask;
            }
        }
        Ok((mask, value))
    }

    /// Applies `matrix` to the target bit on every basis pair whose control
    /// bits match `value` under `mask`. An empty mask is an unconditioned gate.
    fn apply_controlled_gate(
        &mut self,
        mask: usize,
        value: usize,
        target_bit: usize,
        matrix: &Matrix2,
    ) -> Result<()> {
        let t_mask = 1usize << target_bit;
        let dim = self.state.dim();
        let amplitudes = self.state.vector_mut();
        for i0 in 0..dim {
            if i0 & t_mask != 0 || i0 & mask != value {
                continue;
            }
            let i1 = i0 | t_mask;
            let psi_0 = amplitudes[i0];
            let psi_1 = amplitudes[i1];
            amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
        Ok(())
    }
}

fn hadamard_matrix() -> Matrix2 {
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    [[h, h], [h, -h]]
}

fn flip_matrix() -> Matrix2 {
    [[Complex::zero(), Complex::one()], [Complex::one(), Complex::zero()]]
}

/// `Ry(theta) = [[cos a, -sin a], [sin a, cos a]]` with `a = theta / 2`.
fn ry_matrix(theta: f64) -> Matrix2 {
    let (sin_a, cos_a) = (theta / 2.0).sin_cos();
    [
        [Complex::new(cos_a, 0.0), Complex::new(-sin_a, 0.0)],
        [Complex::new(sin_a, 0.0), Complex::new(cos_a, 0.0)],
    ]
}
