// src/operations/mod.rs

//! Gates emitted by the block encoders and understood by the simulator.
//!
//! The set is deliberately narrow: uniform superposition over the address
//! register, single-qubit flips and Y rotations, their address-controlled
//! forms, barriers and measurement. Controls can trigger on `|1>` (closed)
//! or on `|0>` (open), which is how a gate is pinned to one block address.

use crate::core::QubitId;

/// A control condition on one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Control {
    /// Qubit being tested.
    pub qubit: QubitId,
    /// `true` fires on `|1>`, `false` fires on `|0>`.
    pub on_one: bool,
}

impl Control {
    /// Fires when `qubit` is `|1>`.
    pub fn one(qubit: QubitId) -> Self {
        Self { qubit, on_one: true }
    }

    /// Fires when `qubit` is `|0>`.
    pub fn zero(qubit: QubitId) -> Self {
        Self { qubit, on_one: false }
    }
}

/// One step of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Hadamard on `target`.
    Hadamard {
        /// Target qubit.
        target: QubitId,
    },

    /// Pauli-X on `target`.
    Flip {
        /// Target qubit.
        target: QubitId,
    },

    /// `Ry(theta)` on `target`.
    Rotate {
        /// Target qubit.
        target: QubitId,
        /// Rotation angle in radians.
        theta: f64,
    },

    /// Pauli-X on `target` when every control fires.
    ControlledFlip {
        /// Conditions, all of which must hold.
        controls: Vec<Control>,
        /// Target qubit.
        target: QubitId,
    },

    /// `Ry(theta)` on `target` when every control fires.
    ControlledRotate {
        /// Conditions, all of which must hold.
        controls: Vec<Control>,
        /// Target qubit.
        target: QubitId,
        /// Rotation angle in radians.
        theta: f64,
    },

    /// Scheduling fence. No effect on the state.
    Barrier,

    /// Computational-basis measurement of `targets`, recorded in that order.
    Measure {
        /// Qubits to measure.
        targets: Vec<QubitId>,
    },
}

impl Operation {
    /// Every qubit the operation names, controls first.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Hadamard { target }
            | Operation::Flip { target }
            | Operation::Rotate { target, .. } => vec![*target],
            Operation::ControlledFlip { controls, target }
            | Operation::ControlledRotate { controls, target, .. } => {
                let mut qubits: Vec<QubitId> = controls.iter().map(|c| c.qubit).collect();
                qubits.push(*target);
                qubits
            }
            Operation::Barrier => Vec::new(),
            Operation::Measure { targets } => targets.clone(),
        }
    }

    /// `true` for operations that change the state (everything but barriers
    /// and measurements).
    pub fn is_gate(&self) -> bool {
        !matches!(self, Operation::Barrier | Operation::Measure { .. })
    }

    /// Short gate name, as used in diagrams and statistics.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Hadamard { .. } => "h",
            Operation::Flip { .. } => "x",
            Operation::Rotate { .. } => "ry",
            Operation::ControlledFlip { .. } => "mcx",
            Operation::ControlledRotate { .. } => "mcry",
            Operation::Barrier => "barrier",
            Operation::Measure { .. } => "measure",
        }
    }
}
