// src/lib.rs

//! `ebahqr` - Entropy-Based Adaptive Hybrid Quantum Representation of images.
//!
//! A grayscale image is cut into square blocks. Each block's Shannon entropy
//! decides how it is written into a quantum circuit: detail-rich blocks get
//! a bit-exact value register (NEQR-style), smooth blocks a single amplitude
//! rotation (FRQI-style). All blocks share one address register, so the
//! per-block sub-circuits compose into a single circuit over a fixed number
//! of qubits.
//!
//! ```text
//! Image → blocks → entropy → classify → DecisionMap
//!                                          ↓
//!                     BlockEncoder (per block) → assemble → Circuit → ExecutionAdapter → Histogram
//! ```

pub mod assembly;
pub mod circuits;
pub mod classification;
pub mod core;
pub mod decoding;
pub mod encoding;
pub mod entropy;
pub mod image;
pub mod operations;
pub mod pipeline;
pub mod simulation;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use assembly::{assemble, HybridCircuit};
pub use circuits::{Circuit, CircuitBuilder, CircuitStats};
pub use classification::{classify, DecisionMap, EncodingScheme};
pub use self::core::{HqrError, QubitId, Result, StateVector};
pub use decoding::{decode, reconstruct, BlockEstimate};
pub use encoding::{BlockEncoder, PositionRegister, RegisterLayout, SubCircuit};
pub use entropy::{entropy, entropy_grid, EntropyGrid};
pub use image::{Block, BlockGrid, Image};
pub use operations::{Control, Operation};
pub use pipeline::{Analysis, Experiment, HqrConfig, Pipeline};
pub use simulation::{ExecutionAdapter, Histogram, Simulator};
pub use validation::{check_histogram, check_normalization};

// Example 1: Decision map of a half-smooth, half-noisy image
// The left half is flat (entropy 0), the right half holds 16 distinct values
// per block (entropy 4), so only right-hand blocks are encoded EXACT.
/// ```
/// use ebahqr::{HqrConfig, Image, Pipeline};
///
/// let image = Image::from_fn(8, 8, |y, x| if x < 4 { 10 } else { ((y % 4) * 4 + x % 4) as u16 * 3 })?;
/// let pipeline = Pipeline::new(HqrConfig::default())?;
/// let analysis = pipeline.analyze(&image)?;
///
/// assert_eq!(analysis.decisions.to_bits(), vec![vec![0, 1], vec![0, 1]]);
/// assert_eq!(analysis.entropy.get(0, 0), 0.0);
/// # Ok::<(), ebahqr::HqrError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Encode and simulate
// A single 4x4 EXACT block of intensity 6 is read back deterministically.
/// ```
/// use ebahqr::{decode, HqrConfig, Image, Pipeline, Simulator};
///
/// let pixels: Vec<u16> = (0..16).map(|i| if i < 8 { 5 } else { 7 }).collect();
/// let image = Image::new(4, 4, pixels)?;
///
/// let pipeline = Pipeline::new(HqrConfig::default().with_max_intensity(15))?;
/// let experiment = pipeline.run(&image, &Simulator::new(), 256)?;
///
/// // 0 address qubits + 4 value qubits + 1 intensity qubit.
/// assert_eq!(experiment.circuit.num_qubits(), 5);
/// // Mean 6 = 0b0110, intensity qubit untouched.
/// assert_eq!(experiment.histogram.get("01100"), 256);
/// let estimates = decode(&experiment.histogram, &experiment.circuit)?;
/// assert_eq!(estimates[0].intensity, Some(6.0));
/// # Ok::<(), ebahqr::HqrError>(())
/// ```
#[doc(hidden)]
const _: () = ();
