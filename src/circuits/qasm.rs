// src/circuits/qasm.rs

//! OpenQASM 3 export.
//!
//! Output depends only on the operation sequence, so equal circuits render
//! to byte-identical text.

use super::Circuit;
use crate::core::QubitId;
use crate::operations::{Control, Operation};
use std::fmt::Write;

pub(super) fn render(circuit: &Circuit) -> String {
    let width = circuit.qubits().iter().next_back().map_or(0, |q| q.0 as usize + 1);
    let mut out = String::new();
    out.push_str("OPENQASM 3.0;\n");
    out.push_str("include \"stdgates.inc\";\n");
    let _ = writeln!(out, "qubit[{}] q;", width);

    let measured: usize = circuit
        .operations()
        .iter()
        .map(|op| match op {
            Operation::Measure { targets } => targets.len(),
            _ => 0,
        })
        .sum();
    if measured > 0 {
        let _ = writeln!(out, "bit[{}] c;", measured);
    }

    let mut next_bit = 0usize;
    for op in circuit.operations() {
        match op {
            Operation::Hadamard { target } => {
                let _ = writeln!(out, "h {};", qref(*target));
            }
            Operation::Flip { target } => {
                let _ = writeln!(out, "x {};", qref(*target));
            }
            Operation::Rotate { target, theta } => {
                let _ = writeln!(out, "ry({}) {};", theta, qref(*target));
            }
            Operation::ControlledFlip { controls, target } => {
                let _ = writeln!(out, "{}x {};", modifiers(controls), operands(controls, *target));
            }
            Operation::ControlledRotate { controls, target, theta } => {
                let _ = writeln!(
                    out,
                    "{}ry({}) {};",
                    modifiers(controls),
                    theta,
                    operands(controls, *target)
                );
            }
            Operation::Barrier => out.push_str("barrier q;\n"),
            Operation::Measure { targets } => {
                for target in targets {
                    let _ = writeln!(out, "c[{}] = measure {};", next_bit, qref(*target));
                    next_bit += 1;
                }
            }
        }
    }
    out
}

fn qref(qubit: QubitId) -> String {
    format!("q[{}]", qubit.0)
}

fn modifiers(controls: &[Control]) -> String {
    controls
        .iter()
        .map(|c| if c.on_one { "ctrl @ " } else { "negctrl @ " })
        .collect()
}

fn operands(controls: &[Control], target: QubitId) -> String {
    controls
        .iter()
        .map(|c| qref(c.qubit))
        .chain(std::iter::once(qref(target)))
        .collect::<Vec<_>>()
        .join(", ")
}
