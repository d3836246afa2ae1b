// tests/pipeline_tests.rs

use ebahqr::core::ceil_log2;
use ebahqr::{
    assemble, DecisionMap, EncodingScheme, ExecutionAdapter, Circuit, HqrConfig, HqrError, Histogram,
    Image, Operation, Pipeline, Simulator,
};
use std::cell::Cell;

fn distinct_block_image() -> Result<Image, HqrError> {
    Image::new(4, 4, (0..16).map(|v| v * 16).collect())
}

#[test]
fn test_all_zero_image_is_all_approx_with_zero_rotations() -> Result<(), HqrError> {
    let image = Image::filled(16, 16, 0)?;
    let pipeline = Pipeline::new(HqrConfig::default().with_threshold(0.6).with_block_size(4))?;
    let (analysis, hybrid) = pipeline.encode(&image)?;

    assert!(analysis.entropy.values().iter().all(|&h| h == 0.0));
    assert_eq!(analysis.decisions.count(EncodingScheme::Approx), 16);
    assert_eq!(analysis.decisions.to_bits(), vec![vec![0u8; 4]; 4]);

    let stats = hybrid.stats();
    assert_eq!(stats.count("h"), 4);
    assert_eq!(stats.count("mcry"), 16);
    assert_eq!(stats.count("mcx") + stats.count("x"), 0);
    for op in hybrid.circuit().operations() {
        if let Operation::ControlledRotate { theta, .. } = op {
            assert_eq!(*theta, 0.0);
        }
    }
    Ok(())
}

#[test]
fn test_sixteen_distinct_values_classify_exact() -> Result<(), HqrError> {
    let pipeline = Pipeline::new(HqrConfig::default().with_threshold(0.6))?;
    let analysis = pipeline.analyze(&distinct_block_image()?)?;
    assert!((analysis.entropy.get(0, 0) - 4.0).abs() < 1e-12);
    assert_eq!(analysis.decisions.get(0, 0), EncodingScheme::Exact);
    Ok(())
}

#[test]
fn test_block_size_changes_grid_and_address_width() -> Result<(), HqrError> {
    let image = Image::from_fn(16, 16, |y, x| ((y * 16 + x) % 7) as u16)?;

    let (small, small_circuit) = Pipeline::new(HqrConfig::default().with_block_size(4))?.encode(&image)?;
    let (large, large_circuit) = Pipeline::new(HqrConfig::default().with_block_size(8))?.encode(&image)?;

    assert_eq!((small.decisions.rows(), small.decisions.cols()), (4, 4));
    assert_eq!((large.decisions.rows(), large.decisions.cols()), (2, 2));
    assert_eq!(small_circuit.layout().address_qubits(), 4);
    assert_eq!(large_circuit.layout().address_qubits(), 2);
    Ok(())
}

#[test]
fn test_qubit_count_is_independent_of_decisions() -> Result<(), HqrError> {
    let image = Image::from_fn(12, 12, |y, x| (y * 12 + x) as u16)?;
    let grid = image.block_grid(4)?;
    let checkerboard: Vec<EncodingScheme> = grid
        .positions()
        .map(|(r, c)| if (r + c) % 2 == 0 { EncodingScheme::Exact } else { EncodingScheme::Approx })
        .collect();
    let maps = [
        DecisionMap::uniform(3, 3, EncodingScheme::Exact),
        DecisionMap::uniform(3, 3, EncodingScheme::Approx),
        DecisionMap::new(3, 3, checkerboard)?,
    ];
    for max_intensity in [143u16, 255, 1000] {
        let expected = ceil_log2(9) + ceil_log2(usize::from(max_intensity) + 1) + 1;
        for map in &maps {
            let hybrid = assemble(&image, map, 4, max_intensity)?;
            assert_eq!(hybrid.num_qubits(), expected);
            assert_eq!(hybrid.layout().total_qubits(), expected);
        }
    }
    Ok(())
}

#[test]
fn test_indivisible_image_fails_before_entropy() {
    let image = Image::filled(10, 8, 3).unwrap();
    let pipeline = Pipeline::new(HqrConfig::default()).unwrap();
    let err = pipeline.analyze(&image).unwrap_err();
    assert!(matches!(err, HqrError::InvalidShape { height: 10, width: 8, block_size: 4, .. }));
}

#[test]
fn test_misconfigured_max_intensity_overflows() {
    let image = distinct_block_image().unwrap();
    let pipeline = Pipeline::new(HqrConfig::default().with_max_intensity(100)).unwrap();
    let err = pipeline.encode(&image).unwrap_err();
    assert_eq!(err, HqrError::ValueOverflow { row: 0, col: 0, value: 240, max_intensity: 100 });
}

#[test]
fn test_serialisation_is_reproducible() -> Result<(), HqrError> {
    let image = Image::from_fn(16, 16, |y, x| if x < 8 { 40 } else { ((y * 31 + x * 17) % 256) as u16 })?;
    let pipeline = Pipeline::new(HqrConfig::default())?;
    let (_, first) = pipeline.encode(&image)?;
    let (_, second) = pipeline.encode(&image)?;
    assert_eq!(first.circuit().to_qasm(), second.circuit().to_qasm());
    assert_eq!(first, second);
    Ok(())
}

struct CountingAdapter {
    calls: Cell<u32>,
    inner: Simulator,
}

impl ExecutionAdapter for CountingAdapter {
    fn execute(&self, circuit: &Circuit, shots: u32) -> ebahqr::Result<Histogram> {
        self.calls.set(self.calls.get() + 1);
        self.inner.execute(circuit, shots)
    }
}

struct OfflineAdapter;

impl ExecutionAdapter for OfflineAdapter {
    fn execute(&self, _circuit: &Circuit, _shots: u32) -> ebahqr::Result<Histogram> {
        Err(HqrError::ExecutionFailure { message: "backend unreachable".to_string() })
    }
}

#[test]
fn test_run_executes_once() -> Result<(), HqrError> {
    let image = Image::filled(8, 8, 128)?;
    let adapter = CountingAdapter { calls: Cell::new(0), inner: Simulator::new() };
    let experiment = Pipeline::new(HqrConfig::default())?.run(&image, &adapter, 512)?;
    assert_eq!(adapter.calls.get(), 1);
    assert_eq!(experiment.histogram.shots(), 512);
    Ok(())
}

#[test]
fn test_adapter_errors_propagate_unchanged() {
    let image = Image::filled(8, 8, 128).unwrap();
    let err = Pipeline::new(HqrConfig::default()).unwrap().run(&image, &OfflineAdapter, 100).unwrap_err();
    assert_eq!(err, HqrError::ExecutionFailure { message: "backend unreachable".to_string() });
}

#[test]
fn test_deserialised_decision_map_is_checked() -> Result<(), HqrError> {
    assert!(serde_json::from_str::<DecisionMap>(r#"{"rows":2,"cols":2,"cells":["Exact"]}"#).is_err());

    let image = Image::filled(8, 8, 3)?;
    let json = r#"{"rows":2,"cols":2,"cells":["Exact","Approx","Approx","Exact"]}"#;
    let map: DecisionMap = serde_json::from_str(json)
        .map_err(|e| HqrError::InvalidConfig { message: e.to_string() })?;
    let hybrid = assemble(&image, &map, 4, 255)?;
    assert_eq!(hybrid.decisions().to_bits(), vec![vec![1, 0], vec![0, 1]]);
    Ok(())
}
