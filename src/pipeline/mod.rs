// src/pipeline/mod.rs

//! End-to-end driver: analyse, encode, execute.
//!
//! Configuration is an explicit [`HqrConfig`] value owned by the
//! [`Pipeline`]; no stage reads ambient state.

use crate::assembly::{assemble, HybridCircuit};
use crate::classification::{classify, validate_threshold, DecisionMap};
use crate::core::{
    HqrError, Result, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_INTENSITY, DEFAULT_THRESHOLD,
};
use crate::decoding::{decode, BlockEstimate};
use crate::entropy::EntropyGrid;
use crate::image::Image;
use crate::simulation::{ExecutionAdapter, Histogram};
use crate::validation::check_histogram;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Tunables of the encoding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HqrConfig {
    /// Blocks with entropy strictly above this are encoded EXACT.
    pub threshold: f64,
    /// Side of a square block in pixels.
    pub block_size: usize,
    /// Largest intensity the value register must hold.
    pub max_intensity: u16,
}

impl Default for HqrConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            block_size: DEFAULT_BLOCK_SIZE,
            max_intensity: DEFAULT_MAX_INTENSITY,
        }
    }
}

impl HqrConfig {
    /// Replaces the entropy threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replaces the block side.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Replaces the intensity bound.
    pub fn with_max_intensity(mut self, max_intensity: u16) -> Self {
        self.max_intensity = max_intensity;
        self
    }

    /// Checks the threshold and block size.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if self.block_size == 0 {
            return Err(HqrError::InvalidConfig { message: "block size must be non-zero".to_string() });
        }
        Ok(())
    }

    /// Parses a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| HqrError::InvalidConfig { message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }
}

/// Entropy grid and the decisions derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub entropy: EntropyGrid,
    pub decisions: DecisionMap,
}

/// Everything produced by one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub analysis: Analysis,
    pub circuit: HybridCircuit,
    pub histogram: Histogram,
}

impl Experiment {
    /// Per-block intensities recovered from the histogram.
    pub fn estimates(&self) -> Result<Vec<BlockEstimate>> {
        decode(&self.histogram, &self.circuit)
    }
}

/// Drives the stages with one validated configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipeline {
    config: HqrConfig,
}

impl Pipeline {
    /// # Errors
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(config: HqrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &HqrConfig {
        &self.config
    }

    /// Entropy grid and decision map for `image`.
    #[tracing::instrument(level = "debug", skip(self, image), fields(height = image.height(), width = image.width()))]
    pub fn analyze(&self, image: &Image) -> Result<Analysis> {
        let grid = image.block_grid(self.config.block_size)?;
        let entropy = EntropyGrid::compute(image, &grid)?;
        let decisions = classify(&entropy, self.config.threshold)?;
        Ok(Analysis { entropy, decisions })
    }

    /// Analyses and assembles the hybrid circuit.
    pub fn encode(&self, image: &Image) -> Result<(Analysis, HybridCircuit)> {
        let analysis = self.analyze(image)?;
        let circuit = assemble(image, &analysis.decisions, self.config.block_size, self.config.max_intensity)?;
        Ok((analysis, circuit))
    }

    /// Encodes `image` and executes the circuit once on `adapter`.
    ///
    /// Adapter errors are returned as the adapter produced them.
    pub fn run<A>(&self, image: &Image, adapter: &A, shots: u32) -> Result<Experiment>
    where
        A: ExecutionAdapter + ?Sized,
    {
        let (analysis, circuit) = self.encode(image)?;
        let histogram = adapter.execute(circuit.circuit(), shots)?;
        check_histogram(&histogram, circuit.num_qubits(), Some(shots))?;
        info!(shots, outcomes = histogram.counts().len(), "experiment complete");
        Ok(Experiment { analysis, circuit, histogram })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_settings() {
        let config = HqrConfig::default();
        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.block_size, 4);
        assert_eq!(config.max_intensity, 255);
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = HqrConfig::from_json(r#"{"threshold": 1.25}"#).unwrap();
        assert_eq!(config, HqrConfig::default().with_threshold(1.25));
        assert!(matches!(HqrConfig::from_json(r#"{"block_size": 0}"#), Err(HqrError::InvalidConfig { .. })));
        assert!(matches!(HqrConfig::from_json("not json"), Err(HqrError::InvalidConfig { .. })));
    }

    #[test]
    fn pipeline_rejects_negative_threshold() {
        assert!(Pipeline::new(HqrConfig::default().with_threshold(-1.0)).is_err());
    }
}
