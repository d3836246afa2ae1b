// src/circuits/mod.rs

//! Ordered sequences of [`Operation`]s over a fixed qubit register.
//!
//! A [`Circuit`] is the artifact the assembler hands to an execution
//! adapter. Its width is declared up front by the register layout, so a
//! qubit that no gate touches still counts (and is still measured).

mod qasm;

use crate::core::QubitId;
use crate::operations::Operation;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Represents an ordered sequence of Operations applied to a set of qubits.
///
/// Analogy: Similar to `qiskit.QuantumCircuit`, without classical registers;
/// measurement results are reported as bitstrings over all qubits.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    /// Qubits declared by the layout or named by an operation.
    qubits: BTreeSet<QubitId>,

    /// The ordered sequence of operations. Order is significant for
    /// serialisation even where gates commute.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new, empty circuit.
    pub fn new() -> Self {
        Self { qubits: BTreeSet::new(), operations: Vec::new() }
    }

    /// Creates an empty circuit on qubits `0..width`.
    pub fn with_width(width: usize) -> Self {
        let mut circuit = Self::new();
        circuit.qubits.extend((0..width as u64).map(QubitId));
        circuit
    }

    /// Adds a single operation to the end of the circuit's sequence,
    /// registering every qubit it names.
    pub fn add_operation(&mut self, op: Operation) {
        for qubit in op.involved_qubits() {
            self.qubits.insert(qubit);
        }
        self.operations.push(op);
    }

    /// Adds multiple operations to the end of the circuit's sequence.
    pub fn add_operations<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op);
        }
    }

    /// The qubits of the circuit, in ascending order.
    pub fn qubits(&self) -> &BTreeSet<QubitId> {
        &self.qubits
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Returns a slice containing the ordered sequence of operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the total number of operations, barriers and measurements included.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Gate counts and control fan-in.
    pub fn stats(&self) -> CircuitStats {
        let mut stats = CircuitStats { num_qubits: self.num_qubits(), ..CircuitStats::default() };
        for op in &self.operations {
            if !op.is_gate() {
                continue;
            }
            *stats.gate_counts.entry(op.name()).or_insert(0) += 1;
            stats.total_gates += 1;
            if let Operation::ControlledFlip { controls, .. }
            | Operation::ControlledRotate { controls, .. } = op
            {
                stats.max_controls = stats.max_controls.max(controls.len());
            }
        }
        stats
    }

    /// Deterministic OpenQASM 3 rendering of the circuit.
    pub fn to_qasm(&self) -> String {
        qasm::render(self)
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

/// Cost summary of a circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircuitStats {
    /// Register width.
    pub num_qubits: usize,
    /// Gates by name (`h`, `x`, `ry`, `mcx`, `mcry`).
    pub gate_counts: BTreeMap<&'static str, usize>,
    /// Gates in total; barriers and measurements are not gates.
    pub total_gates: usize,
    /// Largest number of controls on a single gate.
    pub max_controls: usize,
}

impl CircuitStats {
    /// Count for one gate name, `0` if absent.
    pub fn count(&self, name: &str) -> usize {
        self.gate_counts.get(name).copied().unwrap_or(0)
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
pub struct CircuitBuilder {
    circuit: Circuit,
}

impl CircuitBuilder {
    /// Creates a new, empty CircuitBuilder.
    pub fn new() -> Self {
        Self { circuit: Circuit::new() }
    }

    /// Starts from an empty circuit on qubits `0..width`.
    pub fn with_width(width: usize) -> Self {
        Self { circuit: Circuit::with_width(width) }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.circuit.add_operation(op);
        self
    }

    /// Adds multiple operations to the circuit being built.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.circuit.add_operations(ops);
        self
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Circuit {
        self.circuit
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "ebahqr::Circuit[0 operations on {} qubits]", self.num_qubits());
        }

        let ops = &self.operations;
        let num_ops = ops.len();

        let sorted_qubits: Vec<QubitId> = self.qubits.iter().copied().collect();
        let num_qubits = sorted_qubits.len();
        let qubit_to_row: HashMap<QubitId, usize> =
            sorted_qubits.iter().enumerate().map(|(i, q)| (*q, i)).collect();

        let max_label_width = sorted_qubits.iter().map(|q| q.to_string().len()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2);

        const GATE_WIDTH: usize = 7;
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the cell drawn on that wire at that step,
        // v_connect[row][time] the connector drawn below it.
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Hadamard { target } | Operation::Flip { target } => {
                    if let Some(r) = qubit_to_row.get(target) {
                        let symbol = if matches!(op, Operation::Hadamard { .. }) { "H" } else { "X" };
                        op_grid[*r][t] = format_gate(symbol);
                    }
                }
                Operation::Rotate { target, theta } => {
                    if let Some(r) = qubit_to_row.get(target) {
                        op_grid[*r][t] = format_gate(&format!("Ry{:.2}", theta));
                    }
                }
                Operation::ControlledFlip { controls, target }
                | Operation::ControlledRotate { controls, target, .. } => {
                    let Some(r_tgt) = qubit_to_row.get(target).copied() else { continue };
                    let symbol = match op {
                        Operation::ControlledRotate { theta, .. } => format!("Ry{:.2}", theta),
                        _ => "X".to_string(),
                    };
                    op_grid[r_tgt][t] = format_gate(&symbol);

                    let mut r_min = r_tgt;
                    let mut r_max = r_tgt;
                    for control in controls {
                        if let Some(r_ctrl) = qubit_to_row.get(&control.qubit).copied() {
                            op_grid[r_ctrl][t] = format_gate(if control.on_one { "@" } else { "○" });
                            r_min = r_min.min(r_ctrl);
                            r_max = r_max.max(r_ctrl);
                        }
                    }
                    for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row_vec[t] = V_WIRE;
                    }
                }
                Operation::Barrier => {
                    for row in op_grid.iter_mut() {
                        row[t] = format_gate("░");
                    }
                }
                Operation::Measure { targets } => {
                    for target in targets {
                        if let Some(r) = qubit_to_row.get(target) {
                            op_grid[*r][t] = format_gate("M");
                        }
                    }
                }
            }
        }

        writeln!(f, "ebahqr::Circuit[{} operations on {} qubits]", num_ops, num_qubits)?;
        for r in 0..num_qubits {
            let label = format!("{}: ", sorted_qubits[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Control;

    fn q(id: u64) -> QubitId {
        QubitId(id)
    }

    #[test]
    fn declared_width_counts_idle_qubits() {
        let circuit = CircuitBuilder::with_width(5)
            .add_op(Operation::Hadamard { target: q(0) })
            .build();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn stats_skip_barriers_and_measurements() {
        let circuit = CircuitBuilder::with_width(3)
            .add_op(Operation::Hadamard { target: q(0) })
            .add_op(Operation::Barrier)
            .add_op(Operation::ControlledFlip { controls: vec![Control::one(q(0))], target: q(1) })
            .add_op(Operation::ControlledRotate {
                controls: vec![Control::zero(q(0)), Control::one(q(1))],
                target: q(2),
                theta: 0.5,
            })
            .add_op(Operation::Measure { targets: vec![q(0), q(1), q(2)] })
            .build();
        let stats = circuit.stats();
        assert_eq!(stats.total_gates, 3);
        assert_eq!(stats.count("h"), 1);
        assert_eq!(stats.count("mcx"), 1);
        assert_eq!(stats.count("mcry"), 1);
        assert_eq!(stats.count("ry"), 0);
        assert_eq!(stats.max_controls, 2);
    }

    #[test]
    fn display_draws_one_row_per_qubit() {
        let circuit = CircuitBuilder::with_width(2)
            .add_op(Operation::ControlledFlip { controls: vec![Control::zero(q(0))], target: q(1) })
            .build();
        let text = circuit.to_string();
        assert!(text.starts_with("ebahqr::Circuit[1 operations on 2 qubits]"));
        assert!(text.contains("q0: ───○───"));
        assert!(text.contains("q1: ───X───"));
    }
}
