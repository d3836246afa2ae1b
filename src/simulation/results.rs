// src/simulation/results.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Measured bitstrings and how often each was observed.
///
/// Bitstrings list measured qubits in measurement order (for assembled
/// circuits: qubit 0 first). Keys are ordered, so iteration and
/// serialisation are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Histogram {
    counts: BTreeMap<String, u64>,
}

impl Histogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps counts produced elsewhere, e.g. by a remote adapter.
    pub fn from_counts(counts: BTreeMap<String, u64>) -> Self {
        Self { counts }
    }

    /// Adds `n` observations of `bits`.
    pub fn record(&mut self, bits: impl Into<String>, n: u64) {
        *self.counts.entry(bits.into()).or_insert(0) += n;
    }

    /// Observations of `bits`, `0` if never seen.
    pub fn get(&self, bits: &str) -> u64 {
        self.counts.get(bits).copied().unwrap_or(0)
    }

    /// Counts keyed by bitstring.
    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Total observations.
    pub fn shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `true` before any shot is recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Observed frequency of `bits` in `[0, 1]`.
    pub fn frequency(&self, bits: &str) -> f64 {
        let shots = self.shots();
        if shots == 0 {
            return 0.0;
        }
        self.get(bits) as f64 / shots as f64
    }

    /// Frequency of every observed bitstring.
    pub fn frequencies(&self) -> BTreeMap<String, f64> {
        let shots = self.shots().max(1) as f64;
        self.counts.iter().map(|(bits, &n)| (bits.clone(), n as f64 / shots)).collect()
    }

    /// Most frequent bitstring; ties go to the lexicographically smallest.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (bits, &n) in &self.counts {
            if best.is_none_or(|(_, m)| n > m) {
                best = Some((bits.as_str(), n));
            }
        }
        best
    }

    /// JSON object `{bitstring: count}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Histogram ({} shots):", self.shots())?;
        if self.counts.is_empty() {
            writeln!(f, "  No outcomes recorded.")?;
        }
        for (bits, n) in &self.counts {
            writeln!(f, "  {}: {}", bits, n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequencies_and_mode() {
        let mut h = Histogram::new();
        h.record("01", 3);
        h.record("10", 1);
        h.record("00", 3);
        assert_eq!(h.shots(), 7);
        assert_eq!(h.most_frequent(), Some(("00", 3)));
        assert!((h.frequency("10") - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(h.frequency("11"), 0.0);
    }

    #[test]
    fn json_is_a_plain_map() {
        let mut h = Histogram::new();
        h.record("1", 2);
        h.record("0", 5);
        assert_eq!(h.to_json().unwrap(), r#"{"0":5,"1":2}"#);
        let back: Histogram = serde_json::from_str(r#"{"0":5,"1":2}"#).unwrap();
        assert_eq!(back, h);
    }
}
