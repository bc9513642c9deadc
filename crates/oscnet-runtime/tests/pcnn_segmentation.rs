use oscnet_runtime::{
    CancellationToken, ConnectionRepresentation, ConnectionType, OscillatoryNetwork, PcnnBuilder,
    PcnnNetwork, PcnnParameters, RuntimeError, SolveType,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 4x4 image whose two left columns are lit
fn half_lit_stimulus() -> Vec<f64> {
    (0..16).map(|index| if index % 4 < 2 { 1.0 } else { 0.0 }).collect()
}

fn segmentation_network(fast_linking: bool, seed: u64) -> PcnnNetwork {
    // no feeding from neighbors: dark pixels can never fire
    let params = PcnnParameters {
        m: 0.0,
        ..Default::default()
    }
    .with_fast_linking(fast_linking);

    PcnnBuilder::new(16)
        .stimulus(half_lit_stimulus())
        .parameters(params)
        .connection(ConnectionType::GridFour)
        .representation(ConnectionRepresentation::List)
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn lit_region_forms_one_ensemble() {
    init_logging();
    for fast_linking in [false, true] {
        let mut network = segmentation_network(fast_linking, 7);
        network.simulate(10, None, SolveType::Rk4, true).unwrap();

        let ensembles = network.allocate_sync_ensembles(0.0).unwrap();
        assert_eq!(ensembles, vec![vec![0, 1, 4, 5, 8, 9, 12, 13]]);

        // every lit pixel fires on the first step
        let signal = network.time_signal();
        assert_eq!(signal.len(), 11);
        assert_eq!(signal[0], 0.0);
        assert_eq!(signal[1], 8.0);
    }
}

#[test]
fn spike_ensembles_are_stable_across_calls() {
    init_logging();
    let mut network = segmentation_network(true, 1);
    network.simulate(12, None, SolveType::Rk4, true).unwrap();

    let first = network.allocate_spike_ensembles();
    let second = network.allocate_spike_ensembles();
    assert_eq!(first, second);
    assert!(!first.is_empty());
    assert!(first.iter().flatten().all(|&index| index % 4 < 2));
}

#[test]
fn same_seed_same_dynamics() {
    init_logging();
    let stimulus: Vec<f64> = (0..25).map(|i| (i % 7) as f64 / 7.0).collect();
    let build = || {
        PcnnBuilder::new(25)
            .stimulus(stimulus.clone())
            .parameters(PcnnParameters::default().with_fast_linking(true))
            .connection(ConnectionType::GridEight)
            .seed(99)
            .build()
            .unwrap()
    };

    let mut full = build();
    let mut last_only = build();
    let full_trace = full.simulate(30, None, SolveType::Rk4, true).unwrap();
    let last_trace = last_only.simulate(30, None, SolveType::Rk4, false).unwrap();

    assert!(full_trace.is_full_history());
    assert!(!last_trace.is_full_history());
    assert_eq!(last_trace.time(), &[30.0]);
    assert_eq!(full_trace.last(), last_trace.last());
    assert_eq!(full.thresholds(), last_only.thresholds());

    let mut again = build();
    assert_eq!(again.simulate(30, None, SolveType::Rk4, true).unwrap(), full_trace);
}

#[test]
fn ensembles_need_full_history() {
    init_logging();
    let mut network = segmentation_network(false, 3);
    assert!(network.allocate_sync_ensembles(0.0).is_none());

    network.simulate(5, None, SolveType::Rk4, false).unwrap();
    assert!(network.allocate_sync_ensembles(0.0).is_none());
}

#[test]
fn stimulus_size_mismatch_is_rejected() {
    let err = PcnnNetwork::new(
        9,
        Some(vec![1.0; 8]),
        None,
        ConnectionType::GridFour,
        ConnectionRepresentation::Matrix,
    )
    .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidConfiguration { .. }));
    assert!(err.is_configuration_error());

    let err = PcnnNetwork::new(
        8,
        None,
        None,
        ConnectionType::GridFour,
        ConnectionRepresentation::Matrix,
    )
    .unwrap_err();
    assert!(matches!(err, RuntimeError::Topology { .. }));
}

#[test]
fn cancelled_run_commits_nothing() {
    init_logging();
    let token = CancellationToken::new();
    let mut network = PcnnBuilder::new(4)
        .stimulus(vec![1.0; 4])
        .cancellation(token.clone())
        .build()
        .unwrap();
    let thresholds = network.thresholds().to_vec();

    token.cancel();
    let err = network.simulate(5, None, SolveType::Rk4, true).unwrap_err();
    assert_eq!(err, RuntimeError::Cancelled { step: 1 });
    assert!(network.dynamics().is_none());
    assert_eq!(network.thresholds(), thresholds.as_slice());

    token.reset();
    assert!(network.simulate(5, None, SolveType::Rk4, true).is_ok());
}
