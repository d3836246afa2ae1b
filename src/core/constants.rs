//! Defaults and numeric limits shared by the pipeline stages.

/// Side of a square block, in pixels.
pub const DEFAULT_BLOCK_SIZE: usize = 4;

/// Entropy threshold separating APPROX from EXACT blocks.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Largest intensity of an 8-bit grayscale image.
pub const DEFAULT_MAX_INTENSITY: u16 = 255;

/// Largest register the local simulator accepts (2^24 amplitudes).
pub const MAX_SIMULATED_QUBITS: usize = 24;

/// Seed of the simulator's sampling PRNG unless overridden.
pub const DEFAULT_SIMULATION_SEED: u64 = 0x5eed_eba0;

/// Amplitudes with squared norm below this are treated as zero.
pub const AMPLITUDE_TOLERANCE: f64 = 1e-12;

/// Ceiling of `log2(n)`, with `ceil_log2(0) == ceil_log2(1) == 0`.
pub fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}
