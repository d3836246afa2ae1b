// src/decoding/mod.rs

//! Readout of measurement histograms back into block intensities.
//!
//! EXACT blocks are read from the value register at their address: the
//! most frequent reading wins. APPROX blocks are read from the intensity
//! qubit: with `n0` and `n1` observations of `|0>` and `|1>` at the address,
//! the angle estimate is `atan2(√n1, √n0)`, mapped back linearly onto
//! `[0, max_intensity]`.

use crate::assembly::HybridCircuit;
use crate::classification::EncodingScheme;
use crate::core::Result;
use crate::image::Image;
use crate::simulation::Histogram;
use crate::validation::check_histogram;
use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

/// Recovered intensity of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEstimate {
    pub row: usize,
    pub col: usize,
    pub scheme: EncodingScheme,
    /// `None` if no shot landed on the block's address.
    pub intensity: Option<f64>,
    /// Shots observed at the block's address.
    pub observations: u64,
}

#[derive(Default)]
struct AddressTally {
    values: BTreeMap<u32, u64>,
    intensity: [u64; 2],
}

/// Estimates every block's intensity, row-major.
///
/// # Errors
/// `ExecutionFailure` if a bitstring does not span the circuit's register.
pub fn decode(histogram: &Histogram, hybrid: &HybridCircuit) -> Result<Vec<BlockEstimate>> {
    let layout = hybrid.layout();
    check_histogram(histogram, layout.total_qubits(), None)?;

    let mut tallies: BTreeMap<usize, AddressTally> = BTreeMap::new();
    for (bits, &n) in histogram.counts() {
        let bits = bits.as_bytes();
        let address = read_register(&bits[layout.address_range()]) as usize;
        let value = read_register(&bits[layout.value_range()]) as u32;
        let tally = tallies.entry(address).or_default();
        *tally.values.entry(value).or_insert(0) += n;
        tally.intensity[usize::from(bits[layout.intensity_index()] == b'1')] += n;
    }

    let grid = hybrid.grid();
    let max_intensity = f64::from(layout.max_intensity());
    let estimates = grid
        .positions()
        .map(|(row, col)| {
            let scheme = hybrid.decisions().get(row, col);
            let tally = tallies.get(&grid.address(row, col));
            let observations = tally.map_or(0, |t| t.intensity[0] + t.intensity[1]);
            let intensity = tally.filter(|_| observations > 0).map(|t| match scheme {
                EncodingScheme::Exact => f64::from(mode(&t.values)),
                EncodingScheme::Approx => {
                    let [n0, n1] = t.intensity;
                    let theta = (n1 as f64).sqrt().atan2((n0 as f64).sqrt());
                    theta / FRAC_PI_2 * max_intensity
                }
            });
            BlockEstimate { row, col, scheme, intensity, observations }
        })
        .collect();
    Ok(estimates)
}

/// Block-resolution image: every pixel of a block set to its rounded
/// estimate, unobserved blocks left at zero.
pub fn reconstruct(histogram: &Histogram, hybrid: &HybridCircuit) -> Result<Image> {
    let estimates = decode(histogram, hybrid)?;
    let grid = hybrid.grid();
    let size = grid.block_size();
    let max = hybrid.layout().max_intensity();
    Image::from_fn(grid.rows() * size, grid.cols() * size, |y, x| {
        let estimate = &estimates[grid.address(y / size, x / size)];
        estimate.intensity.map_or(0, |v| v.round().clamp(0.0, f64::from(max)) as u16)
    })
}

fn read_register(bits: &[u8]) -> u64 {
    bits.iter().fold(0, |acc, &b| (acc << 1) | u64::from(b == b'1'))
}

/// Most frequent value; ties go to the smaller value.
fn mode(values: &BTreeMap<u32, u64>) -> u32 {
    values
        .iter()
        .fold((0, 0), |(best, best_n), (&v, &n)| if n > best_n { (v, n) } else { (best, best_n) })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_reads_big_endian() {
        assert_eq!(read_register(b"101"), 5);
        assert_eq!(read_register(b""), 0);
    }

    #[test]
    fn mode_prefers_smaller_on_ties() {
        let values: BTreeMap<u32, u64> = [(9, 4), (3, 4), (7, 1)].into_iter().collect();
        assert_eq!(mode(&values), 3);
    }
}
