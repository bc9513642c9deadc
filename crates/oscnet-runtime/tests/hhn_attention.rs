use oscnet_runtime::{
    ConnectionRepresentation, ConnectionType, HhnBuilder, HhnNetwork, HhnParameters,
    OscillatoryNetwork, RuntimeError, SolveType,
};
use std::collections::HashSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn network(stimulus: Vec<f64>, seed: u64) -> HhnNetwork {
    HhnBuilder::new(stimulus.len())
        .stimulus(stimulus)
        .seed(seed)
        .build()
        .unwrap()
}

fn assert_increasing(times: &[f64]) {
    assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn stimulated_oscillators_generate_pulses() {
    init_logging();
    let mut network = network(vec![27.0, 27.0, 0.0], 4);
    let trace = network.simulate(400, Some(100.0), SolveType::Rk4, true).unwrap();

    assert_eq!(trace.len(), 400);
    assert_eq!(trace.channel_count(), 5);

    for oscillator in &network.peripheral()[..2] {
        assert!(!oscillator.pulses.times().is_empty());
        assert_increasing(oscillator.pulses.times());
    }

    // the second central neuron is driven hard enough to pulse on its own
    let central = network.central_elements();
    assert!(!central[1].pulses.times().is_empty());
    assert_increasing(central[1].pulses.times());
}

#[test]
fn ensembles_only_contain_peripheral_oscillators() {
    init_logging();
    let mut network = network(vec![27.0, 27.0, 0.0], 4);
    assert!(network.allocate_sync_ensembles(0.1).is_none());

    network.simulate(400, Some(100.0), SolveType::Rk4, true).unwrap();
    let ensembles = network.allocate_sync_ensembles(0.1).unwrap();

    let mut seen = HashSet::new();
    for &index in ensembles.iter().flatten() {
        assert!(index < 3);
        assert!(seen.insert(index));
    }
}

#[test]
fn same_seed_same_dynamics() {
    init_logging();
    let stimulus = vec![25.0, 25.0, 50.0, 50.0];
    let params = HhnParameters::default().with_link_strength(0.0);
    let build = || {
        HhnBuilder::new(4)
            .stimulus(stimulus.clone())
            .parameters(params.clone())
            .representation(ConnectionRepresentation::List)
            .seed(21)
            .build()
            .unwrap()
    };

    let mut full = build();
    let mut last_only = build();
    let full_trace = full.simulate(80, Some(20.0), SolveType::Rk4, true).unwrap();
    let last_trace = last_only.simulate(80, Some(20.0), SolveType::Rk4, false).unwrap();

    assert_eq!(full_trace.last(), last_trace.last());
    assert_eq!(last_trace.len(), 1);
    assert!((last_trace.time()[0] - 20.0).abs() < 1e-9);
    assert_eq!(full.noise(), last_only.noise());
    assert!(full.link_weights().iter().all(|&w| w == 0.0));
}

#[test]
fn continuing_a_run_keeps_history() {
    init_logging();
    let mut network = network(vec![30.0], 8);
    network.simulate(100, Some(25.0), SolveType::Rk4, false).unwrap();
    let pulses = network.peripheral()[0].pulses.times().len();

    assert!((network.elapsed() - 25.0).abs() < 1e-9);

    let trace = network.simulate(100, Some(25.0), SolveType::Rk4, true).unwrap();
    assert!(network.peripheral()[0].pulses.times().len() >= pulses);
    assert!((network.elapsed() - 50.0).abs() < 1e-9);

    // the second run continues the model clock of the first
    assert!((trace.time()[0] - 25.25).abs() < 1e-9);
    assert!((trace.time()[99] - 50.0).abs() < 1e-9);
    assert!(trace.states().iter().flatten().all(|v| v.is_finite()));

    assert_increasing(network.peripheral()[0].pulses.times());
    for element in network.central_elements() {
        assert_increasing(element.pulses.times());
    }
}

#[test]
fn rejected_runs_commit_nothing() {
    init_logging();
    let mut network = network(vec![27.0, 10.0], 2);
    let potentials = network.membrane_potentials();

    for solver in [SolveType::Fast, SolveType::Rkf45] {
        let err = network.simulate(10, Some(5.0), solver, true).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedOperation { .. }));
    }
    let err = network.simulate_dynamic(0.99, SolveType::Rk4, true).unwrap_err();
    assert!(matches!(err, RuntimeError::UnsupportedOperation { .. }));
    let err = network.simulate(0, Some(5.0), SolveType::Rk4, true).unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidParameter { .. }));

    assert!(network.dynamics().is_none());
    assert_eq!(network.membrane_potentials(), potentials);
}

#[test]
fn stimulus_size_mismatch_is_rejected() {
    let err = HhnNetwork::new(
        2,
        Some(vec![1.0; 3]),
        None,
        ConnectionType::AllToAll,
        ConnectionRepresentation::Matrix,
    )
    .unwrap_err();
    assert!(err.is_configuration_error());

    // the connection scheme is accepted but peripherals stay uncoupled
    let network = HhnNetwork::new(
        4,
        None,
        None,
        ConnectionType::GridFour,
        ConnectionRepresentation::Matrix,
    )
    .unwrap();
    assert_eq!(network.topology().connection_type(), ConnectionType::None);
    assert_eq!(network.topology().connection_count(), 0);
}

#[cfg(feature = "serde")]
#[test]
fn parameters_from_partial_config() {
    let params: HhnParameters = serde_json::from_str(r#"{ "w3": 0.0, "deltah": 100.0 }"#).unwrap();
    assert_eq!(params.w3, 0.0);
    assert_eq!(params.deltah, 100.0);
    assert_eq!(params.g_na, HhnParameters::default().g_na);

    let pcnn: oscnet_runtime::PcnnParameters =
        serde_json::from_str(r#"{ "fast_linking": true }"#).unwrap();
    assert!(pcnn.fast_linking);
    assert_eq!(pcnn.vt, 10.0);

    let solver: SolveType = serde_json::from_str("\"rk4\"").unwrap();
    assert_eq!(solver, SolveType::Rk4);
    assert_eq!(serde_json::to_string(&ConnectionRepresentation::List).unwrap(), "\"list\"");
}
