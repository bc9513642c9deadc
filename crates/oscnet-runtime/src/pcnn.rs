//! Pulse-coupled neural network based on the Eckhorn model
//!
//! Every oscillator has a feeding compartment driven by its stimulus and its
//! neighbors, a linking compartment driven by neighbors only, and an adaptive
//! threshold. An oscillator fires when its internal activity
//! `feeding * (1 + B * linking)` exceeds its threshold. Oscillators that fire
//! on the same step form an ensemble, which is how an image gets segmented.

use crate::{
    control::CancellationToken,
    dynamics::DynamicsTrace,
    ensemble::{self, Ensemble},
    error::*,
    integrator::SolveType,
    network::{check_steps, OscillatoryNetwork},
    ConnectionRepresentation, ConnectionType, Topology,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a pulse-coupled network, shared by all oscillators
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PcnnParameters {
    /// Multiplier for the feeding compartment at the current step
    pub vf: f64,
    /// Multiplier for the linking compartment at the current step
    pub vl: f64,
    /// Multiplier for the threshold at the current step
    pub vt: f64,
    /// Multiplier for the feeding compartment at the previous step
    pub af: f64,
    /// Multiplier for the linking compartment at the previous step
    pub al: f64,
    /// Multiplier for the threshold at the previous step
    pub at: f64,
    /// Synaptic weight of neighbors on the linking compartment
    pub w: f64,
    /// Synaptic weight of neighbors on the feeding compartment
    pub m: f64,
    /// Linking strength
    pub b: f64,
    /// Output value of a firing oscillator
    pub output_true: f64,
    /// Output value of a resting oscillator
    pub output_false: f64,
    /// Let the linking wave settle inside a step before thresholds adapt
    pub fast_linking: bool,
    /// Upper bound on fast-linking passes within one step
    pub max_fast_linking_iterations: usize,
}

impl Default for PcnnParameters {
    fn default() -> Self {
        Self {
            vf: 1.0,
            vl: 1.0,
            vt: 10.0,
            af: 0.1,
            al: 0.1,
            at: 0.5,
            w: 1.0,
            m: 1.0,
            b: 0.1,
            output_true: 1.0,
            output_false: 0.0,
            fast_linking: false,
            max_fast_linking_iterations: 100,
        }
    }
}

impl PcnnParameters {
    /// Enable or disable fast linking
    pub fn with_fast_linking(mut self, enabled: bool) -> Self {
        self.fast_linking = enabled;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        let constants = [
            ("vf", self.vf),
            ("vl", self.vl),
            ("vt", self.vt),
            ("af", self.af),
            ("al", self.al),
            ("at", self.at),
            ("w", self.w),
            ("m", self.m),
            ("b", self.b),
            ("output_true", self.output_true),
            ("output_false", self.output_false),
        ];
        for (name, value) in constants {
            if !value.is_finite() {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), "finite"));
            }
        }
        for (name, value) in [("af", self.af), ("al", self.al), ("at", self.at)] {
            if value < 0.0 {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), ">= 0.0"));
            }
        }
        if self.output_true == self.output_false {
            return Err(RuntimeError::invalid_parameter(
                "output_true",
                format!("{} (with output_false={})", self.output_true, self.output_false),
                "!= output_false",
            ));
        }
        if self.max_fast_linking_iterations == 0 {
            return Err(RuntimeError::invalid_parameter(
                "max_fast_linking_iterations",
                "0",
                "> 0",
            ));
        }
        Ok(())
    }
}

/// Compartments of every oscillator after a step
#[derive(Debug, Clone, PartialEq)]
struct PcnnState {
    outputs: Vec<f64>,
    feeding: Vec<f64>,
    linking: Vec<f64>,
    threshold: Vec<f64>,
}

/// Pulse-coupled oscillatory network
#[derive(Debug, Clone)]
pub struct PcnnNetwork {
    params: PcnnParameters,
    topology: Topology,
    stimulus: Vec<f64>,
    state: PcnnState,
    dynamics: Option<DynamicsTrace>,
    cancellation: Option<CancellationToken>,
}

impl PcnnNetwork {
    /// Create a network with thresholds drawn from the default seed.
    ///
    /// `stimulus` defaults to all zeros and must hold one value per
    /// oscillator; `parameters` defaults to [`PcnnParameters::default`].
    pub fn new(
        size: usize,
        stimulus: Option<Vec<f64>>,
        parameters: Option<PcnnParameters>,
        connection_type: ConnectionType,
        representation: ConnectionRepresentation,
    ) -> Result<Self> {
        let mut builder = PcnnBuilder::new(size)
            .connection(connection_type)
            .representation(representation);
        if let Some(stimulus) = stimulus {
            builder = builder.stimulus(stimulus);
        }
        if let Some(parameters) = parameters {
            builder = builder.parameters(parameters);
        }
        builder.build()
    }

    /// Network parameters
    pub fn params(&self) -> &PcnnParameters {
        &self.params
    }

    /// External stimulus of each oscillator
    pub fn stimulus(&self) -> &[f64] {
        &self.stimulus
    }

    /// Current output of each oscillator
    pub fn outputs(&self) -> &[f64] {
        &self.state.outputs
    }

    /// Current feeding compartment of each oscillator
    pub fn feeding(&self) -> &[f64] {
        &self.state.feeding
    }

    /// Current linking compartment of each oscillator
    pub fn linking(&self) -> &[f64] {
        &self.state.linking
    }

    /// Current threshold of each oscillator
    pub fn thresholds(&self) -> &[f64] {
        &self.state.threshold
    }

    /// Per-step groups of firing oscillators, in chronological order
    pub fn allocate_spike_ensembles(&self) -> Vec<Ensemble> {
        self.dynamics
            .as_ref()
            .map(|trace| ensemble::allocate_spike_ensembles(trace, self.params.output_true))
            .unwrap_or_default()
    }

    fn fire(&self, feeding: f64, linking: f64, threshold: f64) -> f64 {
        let internal_activity = feeding * (1.0 + self.params.b * linking);
        if internal_activity > threshold {
            self.params.output_true
        } else {
            self.params.output_false
        }
    }

    /// Compute the state after one step from the previous one
    fn next_state(&self, prev: &PcnnState) -> Result<PcnnState> {
        let p = &self.params;
        let size = self.stimulus.len();

        let mut feeding = vec![0.0; size];
        let mut linking = vec![0.0; size];
        let mut outputs = vec![p.output_false; size];
        let mut output_change = false;

        for index in 0..size {
            let neighbors = self.topology.neighbors(index)?;

            let feeding_influence =
                neighbors.iter().map(|&j| prev.outputs[j] * p.m).sum::<f64>() * p.vf;
            let linking_influence =
                neighbors.iter().map(|&j| prev.outputs[j] * p.w).sum::<f64>() * p.vl;

            feeding[index] = p.af * prev.feeding[index] + self.stimulus[index] + feeding_influence;
            linking[index] = p.al * prev.linking[index] + linking_influence;
            outputs[index] = self.fire(feeding[index], linking[index], prev.threshold[index]);

            if outputs[index] != prev.outputs[index] {
                output_change = true;
            }
        }

        if p.fast_linking && output_change {
            self.fast_link(&feeding, &mut linking, &mut outputs, &prev.threshold)?;
        }

        // thresholds adapt once, from the settled outputs
        let threshold = prev
            .threshold
            .iter()
            .zip(&outputs)
            .map(|(&threshold, &output)| p.at * threshold + p.vt * output)
            .collect();

        Ok(PcnnState {
            outputs,
            feeding,
            linking,
            threshold,
        })
    }

    /// Recompute linking and outputs with feeding held fixed until no output
    /// changes, or the iteration bound is reached.
    fn fast_link(
        &self,
        feeding: &[f64],
        linking: &mut [f64],
        outputs: &mut [f64],
        threshold: &[f64],
    ) -> Result<usize> {
        let p = &self.params;
        let mut iterations = 0;

        loop {
            let snapshot = outputs.to_vec();
            let mut changed = false;

            for index in 0..snapshot.len() {
                let neighbors = self.topology.neighbors(index)?;
                linking[index] = neighbors.iter().map(|&j| snapshot[j] * p.w).sum::<f64>() * p.vl;
                outputs[index] = self.fire(feeding[index], linking[index], threshold[index]);
                changed |= outputs[index] != snapshot[index];
            }

            iterations += 1;
            if !changed {
                break;
            }
            if iterations >= p.max_fast_linking_iterations {
                log::warn!(
                    "Fast linking did not settle after {} iterations, keeping current outputs",
                    iterations
                );
                break;
            }
        }

        log::trace!("Fast linking settled after {} iterations", iterations);
        Ok(iterations)
    }

    fn check_cancelled(&self, step: usize) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                log::warn!("Pulse-coupled simulation cancelled at step {}", step);
                Err(RuntimeError::Cancelled { step })
            }
            _ => Ok(()),
        }
    }
}

impl OscillatoryNetwork for PcnnNetwork {
    fn size(&self) -> usize {
        self.stimulus.len()
    }

    fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Steps are discrete, so `time` and `solver` are ignored.
    fn simulate(
        &mut self,
        steps: usize,
        _time: Option<f64>,
        _solver: SolveType,
        collect_dynamic: bool,
    ) -> Result<DynamicsTrace> {
        check_steps(steps)?;
        log::info!(
            "Starting pulse-coupled simulation: {} oscillators, {} steps (fast linking: {})",
            self.size(),
            steps,
            self.params.fast_linking
        );

        let mut state = self.state.clone();
        let mut time = Vec::new();
        let mut states = Vec::new();
        if collect_dynamic {
            time.push(0.0);
            states.push(state.outputs.clone());
        }

        for step in 1..=steps {
            self.check_cancelled(step)?;
            state = self.next_state(&state)?;

            if collect_dynamic {
                time.push(step as f64);
                states.push(state.outputs.clone());
            }

            if step % (steps / 10).max(1) == 0 {
                let progress = (step as f32 / steps as f32) * 100.0;
                log::debug!("Simulation progress: {:.1}%", progress);
            }
        }

        let trace = if collect_dynamic {
            DynamicsTrace::full(time, states)
        } else {
            DynamicsTrace::last_only(steps as f64, state.outputs.clone())
        };

        let firing = state
            .outputs
            .iter()
            .filter(|&&output| output == self.params.output_true)
            .count();
        log::info!(
            "Simulation completed: {} of {} oscillators firing at the last step",
            firing,
            self.size()
        );

        self.state = state;
        self.dynamics = Some(trace.clone());
        Ok(trace)
    }

    fn dynamics(&self) -> Option<&DynamicsTrace> {
        self.dynamics.as_ref()
    }

    /// Backward-in-time allocation over binary outputs; `tolerance` is unused.
    fn allocate_sync_ensembles(&self, _tolerance: f64) -> Option<Vec<Ensemble>> {
        self.dynamics.as_ref().and_then(|trace| {
            ensemble::allocate_output_sync_ensembles(trace, self.params.output_true)
        })
    }
}

/// Builder for pulse-coupled networks
#[derive(Debug, Clone)]
pub struct PcnnBuilder {
    size: usize,
    stimulus: Option<Vec<f64>>,
    params: PcnnParameters,
    connection_type: ConnectionType,
    representation: ConnectionRepresentation,
    initial_thresholds: Option<Vec<f64>>,
    seed: u64,
    cancellation: Option<CancellationToken>,
}

impl PcnnBuilder {
    /// Start a network of `size` oscillators
    pub fn new(size: usize) -> Self {
        Self {
            size,
            stimulus: None,
            params: PcnnParameters::default(),
            connection_type: ConnectionType::AllToAll,
            representation: ConnectionRepresentation::Matrix,
            initial_thresholds: None,
            seed: crate::DEFAULT_SEED,
            cancellation: None,
        }
    }

    /// External stimulus, one value per oscillator
    pub fn stimulus(mut self, stimulus: Vec<f64>) -> Self {
        self.stimulus = Some(stimulus);
        self
    }

    /// Network parameters
    pub fn parameters(mut self, params: PcnnParameters) -> Self {
        self.params = params;
        self
    }

    /// Connection scheme
    pub fn connection(mut self, connection_type: ConnectionType) -> Self {
        self.connection_type = connection_type;
        self
    }

    /// Internal representation of the connections
    pub fn representation(mut self, representation: ConnectionRepresentation) -> Self {
        self.representation = representation;
        self
    }

    /// Explicit initial thresholds instead of random ones
    pub fn initial_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.initial_thresholds = Some(thresholds);
        self
    }

    /// Seed of the generator drawing the initial thresholds
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Token that can stop a running simulation
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Build the network
    pub fn build(self) -> Result<PcnnNetwork> {
        self.params.validate()?;

        let stimulus = self.stimulus.unwrap_or_else(|| vec![0.0; self.size]);
        if stimulus.len() != self.size {
            return Err(RuntimeError::invalid_config(format!(
                "Number of stimulus values ({}) should be equal to number of oscillators ({})",
                stimulus.len(),
                self.size
            )));
        }

        let topology = Topology::new(self.size, self.connection_type, self.representation)?;

        let threshold = match self.initial_thresholds {
            Some(thresholds) if thresholds.len() != self.size => {
                return Err(RuntimeError::invalid_config(format!(
                    "Number of initial thresholds ({}) should be equal to number of oscillators ({})",
                    thresholds.len(),
                    self.size
                )));
            }
            Some(thresholds) => thresholds,
            None => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                (0..self.size).map(|_| rng.gen::<f64>()).collect()
            }
        };

        let state = PcnnState {
            outputs: vec![self.params.output_false; self.size],
            feeding: vec![0.0; self.size],
            linking: vec![0.0; self.size],
            threshold,
        };

        Ok(PcnnNetwork {
            params: self.params,
            topology,
            stimulus,
            state,
            dynamics: None,
            cancellation: self.cancellation,
        })
    }
}
