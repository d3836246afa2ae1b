//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Identifier of a qubit inside a circuit.
///
/// Ids are positions in the register layout: the simulator maps them to
/// state-vector bit positions in ascending order, so `QubitId(0)` is the most
/// significant bit of a basis index and the leftmost character of a measured
/// bitstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub u64);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, HqrError>;

/// Errors raised while partitioning, classifying, encoding or executing.
///
/// Classification and encoding errors are never retried: they point at a
/// mismatch between the image and the configuration, and carry the block
/// coordinates or offending value needed to find it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HqrError {
    /// Image dimensions cannot be partitioned into whole blocks.
    #[error("Invalid shape {height}x{width} for block size {block_size}: {reason}")]
    InvalidShape {
        /// Image height in pixels.
        height: usize,
        /// Image width in pixels.
        width: usize,
        /// Requested block side.
        block_size: usize,
        /// Why the shape was rejected.
        reason: &'static str,
    },

    /// Pixel buffer length does not match the declared dimensions.
    #[error("Expected {expected} pixels, got {actual}")]
    InvalidPixelData {
        /// `height * width`
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// A block with zero pixels reached the entropy evaluator.
    /// Unreachable once the shape check passed; signals a partitioning bug.
    #[error("Empty block at ({row}, {col})")]
    EmptyBlock {
        /// Block row.
        row: usize,
        /// Block column.
        col: usize,
    },

    /// A block holds an intensity the value register was not sized for.
    #[error("Value overflow at block ({row}, {col}): intensity {value} exceeds max intensity {max_intensity}")]
    ValueOverflow {
        /// Block row.
        row: usize,
        /// Block column.
        col: usize,
        /// Offending intensity.
        value: u32,
        /// Configured maximum intensity.
        max_intensity: u16,
    },

    /// A grid does not match the block grid it is combined with.
    #[error("Shape mismatch: expected {expected_rows}x{expected_cols} blocks, got {rows}x{cols}")]
    ShapeMismatch {
        /// Rows of the image's block grid.
        expected_rows: usize,
        /// Columns of the image's block grid.
        expected_cols: usize,
        /// Rows of the supplied grid.
        rows: usize,
        /// Columns of the supplied grid.
        cols: usize,
    },

    /// A configuration value is outside its accepted range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },

    /// An operation references a qubit that is not part of the simulated register.
    #[error("Reference violation ({qubit}): {message}")]
    ReferenceViolation {
        /// Unknown qubit.
        qubit: QubitId,
        /// Context.
        message: String,
    },

    /// An operation is malformed (e.g. a qubit controls itself).
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Context.
        message: String,
    },

    /// The state vector lost normalisation during simulation.
    #[error("Incoherence: {message}")]
    Incoherence {
        /// Context.
        message: String,
    },

    /// General failure inside the local simulator.
    #[error("Simulation error: {message}")]
    SimulationError {
        /// Context.
        message: String,
    },

    /// Failure reported by an execution adapter. Passed through untouched.
    #[error("Execution failure: {message}")]
    ExecutionFailure {
        /// Adapter-supplied description.
        message: String,
    },
}
