// src/simulation/mod.rs

//! Execution of circuits.
//!
//! [`ExecutionAdapter`] is the boundary to whatever runs a circuit (a local
//! simulator, a remote service). The crate ships one implementation, the
//! state-vector [`Simulator`], which is exact up to sampling: it evolves the
//! full amplitude vector and draws shots from the Born distribution with a
//! seeded PRNG, so equal inputs give equal histograms.

mod results;
pub(crate) mod engine;

pub use results::Histogram;

use crate::circuits::Circuit;
use crate::core::constants::{AMPLITUDE_TOLERANCE, DEFAULT_SIMULATION_SEED};
use crate::core::{HqrError, QubitId, Result, StateVector};
use crate::operations::Operation;
use crate::validation::check_normalization;
use engine::SimulationEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Runs a circuit and reports measurement statistics.
///
/// Implementations own every policy around execution (transpilation,
/// queueing, timeouts, retries). Failures are reported as
/// [`HqrError::ExecutionFailure`] (or a more specific variant) and callers
/// propagate them unchanged.
pub trait ExecutionAdapter {
    /// Executes `circuit` for `shots` repetitions.
    fn execute(&self, circuit: &Circuit, shots: u32) -> Result<Histogram>;
}

/// Local state-vector simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Simulator {
    seed: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self { seed: DEFAULT_SIMULATION_SEED }
    }
}

impl Simulator {
    /// Creates a new Simulator with the default sampling seed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulator drawing shots from a PRNG seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed of the sampling PRNG.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// State just before measurement.
    ///
    /// # Errors
    /// * `InvalidOperation` for an empty register or a gate after a measurement.
    /// * `SimulationError` if the register exceeds the simulator limit.
    /// * `Incoherence` if the state lost normalisation.
    pub fn final_state(&self, circuit: &Circuit) -> Result<StateVector> {
        Ok(self.evolve(circuit)?.get_state().clone())
    }

    /// Exact probability of every measurable bitstring with non-zero weight.
    pub fn probabilities(&self, circuit: &Circuit) -> Result<BTreeMap<String, f64>> {
        let engine = self.evolve(circuit)?;
        let measured = measured_bits(circuit, &engine)?;
        let mut distribution = BTreeMap::new();
        for (k, amplitude) in engine.get_state().vector().iter().enumerate() {
            let p = amplitude.norm_sqr();
            if p > AMPLITUDE_TOLERANCE {
                *distribution.entry(bitstring(k, &measured)).or_insert(0.0) += p;
            }
        }
        Ok(distribution)
    }

    fn evolve(&self, circuit: &Circuit) -> Result<SimulationEngine> {
        let mut engine = SimulationEngine::init(circuit.qubits())?;
        let mut measured = false;
        for op in circuit.operations() {
            match op {
                Operation::Measure { .. } => measured = true,
                Operation::Barrier => {}
                _ if measured => {
                    return Err(HqrError::InvalidOperation {
                        message: "gates after measurement are not supported".to_string(),
                    });
                }
                _ => engine.apply_operation(op)?,
            }
        }
        check_normalization(engine.get_state(), None)?;
        trace!(qubits = engine.num_qubits(), "state evolved");
        Ok(engine)
    }
}

impl ExecutionAdapter for Simulator {
    fn execute(&self, circuit: &Circuit, shots: u32) -> Result<Histogram> {
        if shots == 0 {
            return Err(HqrError::InvalidConfig { message: "shot count must be positive".to_string() });
        }
        let distribution: Vec<(String, f64)> = self.probabilities(circuit)?.into_iter().collect();
        let total: f64 = distribution.iter().map(|(_, p)| p).sum();
        if distribution.is_empty() || total < AMPLITUDE_TOLERANCE {
            return Err(HqrError::SimulationError {
                message: "no outcome carries measurable probability".to_string(),
            });
        }

        let mut cumulative = Vec::with_capacity(distribution.len());
        let mut running = 0.0;
        for (_, p) in &distribution {
            running += p;
            cumulative.push(running);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut histogram = Histogram::new();
        for _ in 0..shots {
            let sample: f64 = rng.random::<f64>() * total;
            // Clamp guards against `sample` landing on `total` through rounding.
            let index = cumulative.partition_point(|&c| c <= sample).min(distribution.len() - 1);
            histogram.record(distribution[index].0.as_str(), 1);
        }
        debug!(shots, outcomes = histogram.counts().len(), "sampled histogram");
        Ok(histogram)
    }
}

/// Bit positions read out by the circuit, in measurement order. A circuit
/// without measurements reads every qubit in ascending order.
fn measured_bits(circuit: &Circuit, engine: &SimulationEngine) -> Result<Vec<usize>> {
    let targets: Vec<QubitId> = circuit
        .operations()
        .iter()
        .filter_map(|op| match op {
            Operation::Measure { targets } => Some(targets.iter().copied()),
            _ => None,
        })
        .flatten()
        .collect();
    let targets = if targets.is_empty() { circuit.qubits().iter().copied().collect() } else { targets };
    targets.iter().map(|q| engine.bit_of(q)).collect()
}

fn bitstring(k: usize, bits: &[usize]) -> String {
    bits.iter().map(|&bit| if (k >> bit) & 1 == 1 { '1' } else { '0' }).collect()
}
