//! Encodes a synthetic 16x16 image with a smooth left half and a noisy
//! right half, then simulates and decodes the hybrid circuit.
//!
//! Run with `RUST_LOG=ebahqr=debug` to see the per-stage logs.

use ebahqr::{HqrConfig, HqrError, Image, Pipeline, Simulator};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), HqrError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("--- ebahqr Example: Entropy-Adaptive Hybrid Encoding ---");

    let image = Image::from_fn(16, 16, |y, x| {
        if x < 8 {
            (y * 8) as u16
        } else {
            ((y * 37 + x * 101) % 256) as u16
        }
    })?;

    let pipeline = Pipeline::new(HqrConfig::default())?;
    let simulator = Simulator::with_seed(2024);
    let experiment = pipeline.run(&image, &simulator, 8192)?;

    println!("\nBlock entropies:\n{}", experiment.analysis.entropy);
    println!("Decision map (1 = EXACT, 0 = APPROX):\n{}", experiment.analysis.decisions);

    let stats = experiment.circuit.stats();
    println!(
        "Circuit: {} qubits, {} gates ({} h, {} mcry, {} mcx), widest control {}",
        stats.num_qubits,
        stats.total_gates,
        stats.count("h"),
        stats.count("mcry"),
        stats.count("mcx"),
        stats.max_controls,
    );

    println!("\nOpenQASM 3 (first lines):");
    for line in experiment.circuit.circuit().to_qasm().lines().take(12) {
        println!("  {}", line);
    }

    if let Some((bits, n)) = experiment.histogram.most_frequent() {
        println!("\nMost frequent outcome: {} ({} of {} shots)", bits, n, experiment.histogram.shots());
    }

    println!("\nRecovered block intensities:");
    for estimate in experiment.estimates()? {
        let value = estimate
            .intensity
            .map_or_else(|| "unobserved".to_string(), |v| format!("{:7.2}", v));
        println!(
            "  block ({}, {}) {:<6} {} from {} shots",
            estimate.row, estimate.col, estimate.scheme.to_string(), value, estimate.observations
        );
    }

    Ok(())
}
