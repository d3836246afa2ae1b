// src/core/mod.rs

//! Core data structures and types

pub mod constants;
pub mod error;
pub mod state;

pub use constants::{
    ceil_log2, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_INTENSITY, DEFAULT_THRESHOLD,
};
pub use error::{HqrError, QubitId, Result};
pub use state::StateVector;
