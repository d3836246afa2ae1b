// src/validation/mod.rs

//! Consistency checks on simulated states and sampled histograms.

use crate::core::{HqrError, Result, StateVector};
use crate::simulation::Histogram;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks if the state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// # Arguments
/// * `state` - The `StateVector` to check.
/// * `tolerance` - Allowed deviation from 1.0; defaults to `1e-9`.
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(HqrError::Incoherence)` if normalization fails.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.vector().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(HqrError::Incoherence {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}

/// Checks a histogram returned by an adapter: every bitstring has
/// `expected_width` binary characters and, when `shots` is given, the
/// counts add up to it.
pub fn check_histogram(histogram: &Histogram, expected_width: usize, shots: Option<u32>) -> Result<()> {
    if let Some(shots) = shots {
        if histogram.shots() != u64::from(shots) {
            return Err(HqrError::ExecutionFailure {
                message: format!("histogram holds {} shots, {} requested", histogram.shots(), shots),
            });
        }
    }
    for bits in histogram.counts().keys() {
        if bits.len() != expected_width || !bits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(HqrError::ExecutionFailure {
                message: format!("malformed bitstring '{}' (expected {} bits)", bits, expected_width),
            });
        }
    }
    Ok(())
}
