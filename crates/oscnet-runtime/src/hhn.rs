//! Oscillatory network of Hodgkin-Huxley neurons with a central element
//!
//! Peripheral oscillators never talk to each other directly. They interact
//! through two central neurons: the first collects excitation from every
//! peripheral pulse and answers with network-wide inhibition, the second
//! inhibits, through a temporary high-strength link, only the peripheral
//! oscillators that have been active for long enough. Oscillators that end
//! up pulsing together form an ensemble (selective attention).
//!
//! Synaptic memory is modelled with alpha functions summed over the complete
//! pulse history of the source neurons. Histories are append-only and every
//! evaluation walks them in full, so one derivative evaluation costs
//! O(recorded pulses).

use crate::{
    control::CancellationToken,
    dynamics::DynamicsTrace,
    ensemble::{self, Ensemble},
    error::*,
    integrator::{self, SolveType},
    network::{check_steps, OscillatoryNetwork},
    ConnectionRepresentation, ConnectionType, Topology,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integration sub-steps per macro-step
pub const SUB_STEPS: usize = 10;

/// Membrane potential (mV) above which a pulse counts for ensemble allocation
pub const AMPLITUDE_THRESHOLD: f64 = 20.0;

/// Parameters of the Hodgkin-Huxley network
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HhnParameters {
    /// Maximal conductivity of the sodium current
    pub g_na: f64,
    /// Maximal conductivity of the potassium current
    pub g_k: f64,
    /// Maximal conductivity of the leakage current
    pub g_l: f64,
    /// Reversal potential of the sodium current (mV)
    pub v_na: f64,
    /// Reversal potential of the potassium current (mV)
    pub v_k: f64,
    /// Reversal potential of the leakage current (mV)
    pub v_l: f64,
    /// Resting potential (mV)
    pub v_rest: f64,
    /// External current of the first central neuron
    pub icn1: f64,
    /// External current of the second central neuron
    pub icn2: f64,
    /// Synaptic reversal potential of inhibitory effects (mV)
    pub v_syn_inh: f64,
    /// Synaptic reversal potential of excitatory effects (mV)
    pub v_syn_exc: f64,
    /// Amplitude of the inhibitory alpha function
    pub alfa_inhibitory: f64,
    /// Decay rate of the inhibitory alpha function
    pub betta_inhibitory: f64,
    /// Amplitude of the excitatory alpha function
    pub alfa_excitatory: f64,
    /// Decay rate of the excitatory alpha function
    pub betta_excitatory: f64,
    /// Strength of the connection from peripheral oscillators to the first central neuron
    pub w1: f64,
    /// Strength of the connection from the first central neuron to peripheral oscillators
    pub w2: f64,
    /// Strength of the temporary link from the second central neuron to a peripheral oscillator
    pub w3: f64,
    /// Duration (ms) of the temporary link once activated
    pub deltah: f64,
    /// Potential (mV) above which a peripheral oscillator accumulates link activity
    pub threshold: f64,
    /// Link activates once accumulated activity reaches `1 / eps`
    pub eps: f64,
    /// Half-width of the multiplicative noise band around 1 applied to stimuli
    pub noise_amplitude: f64,
}

impl Default for HhnParameters {
    fn default() -> Self {
        Self {
            g_na: 120.0,
            g_k: 36.0,
            g_l: 0.3,
            v_na: 50.0,
            v_k: -77.0,
            v_l: -54.4,
            v_rest: -65.0,
            icn1: 5.0,
            icn2: 30.0,
            v_syn_inh: -80.0,
            v_syn_exc: 0.0,
            alfa_inhibitory: 6.0,
            betta_inhibitory: 0.3,
            alfa_excitatory: 40.0,
            betta_excitatory: 2.0,
            w1: 0.1,
            w2: 9.0,
            w3: 5.0,
            deltah: 650.0,
            threshold: -10.0,
            eps: 0.16,
            noise_amplitude: 0.01,
        }
    }
}

impl HhnParameters {
    /// Nominal parameters with ionic conductances perturbed by one common
    /// factor drawn uniformly within ±2%.
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let nu: f64 = rng.gen_range(-1.0..1.0);
        let scale = 1.0 + 0.02 * nu;
        let nominal = Self::default();
        Self {
            g_na: nominal.g_na * scale,
            g_k: nominal.g_k * scale,
            g_l: nominal.g_l * scale,
            ..nominal
        }
    }

    /// Set the strength of the temporary link; zero disables selective
    /// inhibition by the second central neuron
    pub fn with_link_strength(mut self, w3: f64) -> Self {
        self.w3 = w3;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("g_na", self.g_na),
            ("g_k", self.g_k),
            ("g_l", self.g_l),
            ("v_na", self.v_na),
            ("v_k", self.v_k),
            ("v_l", self.v_l),
            ("v_rest", self.v_rest),
            ("icn1", self.icn1),
            ("icn2", self.icn2),
            ("v_syn_inh", self.v_syn_inh),
            ("v_syn_exc", self.v_syn_exc),
            ("alfa_inhibitory", self.alfa_inhibitory),
            ("betta_inhibitory", self.betta_inhibitory),
            ("alfa_excitatory", self.alfa_excitatory),
            ("betta_excitatory", self.betta_excitatory),
            ("w1", self.w1),
            ("w2", self.w2),
            ("w3", self.w3),
            ("deltah", self.deltah),
            ("threshold", self.threshold),
            ("eps", self.eps),
            ("noise_amplitude", self.noise_amplitude),
        ];
        for (name, value) in all {
            if !value.is_finite() {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), "finite"));
            }
        }
        for (name, value) in [("g_na", self.g_na), ("g_k", self.g_k), ("g_l", self.g_l)] {
            if value < 0.0 {
                return Err(RuntimeError::invalid_parameter(name, value.to_string(), ">= 0.0"));
            }
        }
        if self.eps <= 0.0 {
            return Err(RuntimeError::invalid_parameter("eps", self.eps.to_string(), "> 0.0"));
        }
        if !(0.0..1.0).contains(&self.noise_amplitude) {
            return Err(RuntimeError::invalid_parameter(
                "noise_amplitude",
                self.noise_amplitude.to_string(),
                "in [0.0, 1.0)",
            ));
        }
        Ok(())
    }
}

/// State variables of one Hodgkin-Huxley neuron
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MembraneState {
    /// Membrane potential (mV)
    pub v: f64,
    /// Activation of the sodium channel
    pub m: f64,
    /// Inactivation of the sodium channel
    pub h: f64,
    /// Activation of the potassium channel
    pub n: f64,
}

impl From<[f64; 4]> for MembraneState {
    fn from([v, m, h, n]: [f64; 4]) -> Self {
        Self { v, m, h, n }
    }
}

impl From<MembraneState> for [f64; 4] {
    fn from(state: MembraneState) -> Self {
        [state.v, state.m, state.h, state.n]
    }
}

/// Pulse bookkeeping of one neuron
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PulseTracker {
    generating: bool,
    times: Vec<f64>,
}

impl PulseTracker {
    /// Record the potential observed at `time`; returns `true` when a new
    /// pulse starts.
    pub fn observe(&mut self, potential: f64, time: f64) -> bool {
        if !self.generating {
            if potential > 0.0 {
                self.generating = true;
                self.times.push(time);
                return true;
            }
        } else if potential < 0.0 {
            self.generating = false;
        }
        false
    }

    /// Whether the neuron is currently inside a pulse
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Start times of every recorded pulse, ascending
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sum of alpha functions over the whole pulse history at time `t`
    pub fn kernel(&self, t: f64, alfa: f64, betta: f64) -> f64 {
        self.times.iter().map(|&time| alpha_function(t - time, alfa, betta)).sum()
    }
}

/// Peripheral oscillator: neuron state plus its temporary link to the
/// second central neuron
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeripheralOscillator {
    /// Neuron state
    pub membrane: MembraneState,
    /// Pulse history
    pub pulses: PulseTracker,
    /// Current strength of the link from the second central neuron
    pub link_weight: f64,
    /// Time the link was last activated
    pub link_activation_time: f64,
    /// Accumulated time spent above the link threshold
    pub link_pulse_counter: f64,
}

impl PeripheralOscillator {
    /// Maintain the temporary link after a macro-step ending at `time`
    pub fn update_link(&mut self, params: &HhnParameters, time: f64, step: f64) {
        if self.link_weight == 0.0 {
            if self.membrane.v > params.threshold {
                self.link_pulse_counter += step;
                if self.link_pulse_counter >= 1.0 / params.eps {
                    self.link_weight = params.w3;
                    self.link_activation_time = time;
                }
            }
        } else {
            let start = self.link_activation_time;
            if !(start < time && time < start + params.deltah) {
                self.link_weight = 0.0;
                self.link_pulse_counter = 0.0;
            }
        }
    }
}

/// One of the two central neurons
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CentralElement {
    /// Neuron state
    pub membrane: MembraneState,
    /// Pulse history
    pub pulses: PulseTracker,
}

/// Mutable part of the network, replaced as a whole after every run
#[derive(Debug, Clone)]
struct HhnState {
    peripheral: Vec<PeripheralOscillator>,
    central: [CentralElement; 2],
    noise: Vec<f64>,
    rng: StdRng,
    /// Model time reached by all previous runs
    elapsed: f64,
}

/// Network entity whose ODE system is integrated
#[derive(Debug, Clone, Copy)]
enum Entity {
    Peripheral(usize),
    Central(usize),
}

/// Hodgkin-Huxley oscillatory network with a central element
#[derive(Debug, Clone)]
pub struct HhnNetwork {
    params: HhnParameters,
    topology: Topology,
    stimulus: Vec<f64>,
    state: HhnState,
    dynamics: Option<DynamicsTrace>,
    cancellation: Option<CancellationToken>,
}

impl HhnNetwork {
    /// Create a network seeded with the default seed.
    ///
    /// Peripheral oscillators are never connected to each other, so
    /// `connection_type` is ignored and only the representation of the
    /// (empty) topology is used. Without explicit `parameters` the network
    /// draws its own perturbed set.
    pub fn new(
        size: usize,
        stimulus: Option<Vec<f64>>,
        parameters: Option<HhnParameters>,
        connection_type: ConnectionType,
        representation: ConnectionRepresentation,
    ) -> Result<Self> {
        if connection_type != ConnectionType::None {
            log::debug!(
                "Ignoring connection type {} for Hodgkin-Huxley network, peripherals are uncoupled",
                connection_type
            );
        }
        let mut builder = HhnBuilder::new(size).representation(representation);
        if let Some(stimulus) = stimulus {
            builder = builder.stimulus(stimulus);
        }
        if let Some(parameters) = parameters {
            builder = builder.parameters(parameters);
        }
        builder.build()
    }

    /// Network parameters
    pub fn params(&self) -> &HhnParameters {
        &self.params
    }

    /// External stimulus of each peripheral oscillator
    pub fn stimulus(&self) -> &[f64] {
        &self.stimulus
    }

    /// Current noise factor of each peripheral oscillator
    pub fn noise(&self) -> &[f64] {
        &self.state.noise
    }

    /// Peripheral oscillators
    pub fn peripheral(&self) -> &[PeripheralOscillator] {
        &self.state.peripheral
    }

    /// The two central neurons
    pub fn central_elements(&self) -> &[CentralElement; 2] {
        &self.state.central
    }

    /// Membrane potential of every peripheral oscillator
    pub fn membrane_potentials(&self) -> Vec<f64> {
        self.state.peripheral.iter().map(|osc| osc.membrane.v).collect()
    }

    /// Model time (ms) reached by all successful runs so far
    pub fn elapsed(&self) -> f64 {
        self.state.elapsed
    }

    /// Current link strength of every peripheral oscillator
    pub fn link_weights(&self) -> Vec<f64> {
        self.state.peripheral.iter().map(|osc| osc.link_weight).collect()
    }

    /// Right-hand side of the ODE system of `entity` at time `t`
    fn derivatives(&self, state: &HhnState, entity: Entity, t: f64, y: &[f64; 4]) -> [f64; 4] {
        let p = &self.params;
        let v = y[0];

        let (i_ext, i_syn) = match entity {
            Entity::Peripheral(index) => {
                let i_ext = self.stimulus[index] * state.noise[index];
                let [first, second] = &state.central;
                let memory1 = first.pulses.kernel(t, p.alfa_inhibitory, p.betta_inhibitory);
                let memory2 = second.pulses.kernel(t, p.alfa_inhibitory, p.betta_inhibitory);
                let link_weight = state.peripheral[index].link_weight;
                let i_syn = p.w2 * (v - p.v_syn_inh) * memory1
                    + link_weight * (v - p.v_syn_inh) * memory2;
                (i_ext, i_syn)
            }
            Entity::Central(0) => {
                let memory: f64 = state
                    .peripheral
                    .iter()
                    .map(|osc| osc.pulses.kernel(t, p.alfa_excitatory, p.betta_excitatory))
                    .sum();
                (p.icn1, p.w1 * (v - p.v_syn_exc) * memory)
            }
            Entity::Central(_) => (p.icn2, 0.0),
        };

        membrane_derivatives(p, y, i_ext, i_syn)
    }

    /// Integrate one entity over the macro-step `[t - step, t]`
    fn integrate(
        &self,
        state: &HhnState,
        entity: Entity,
        t: f64,
        step: f64,
        solver: SolveType,
    ) -> Result<MembraneState> {
        let initial: [f64; 4] = match entity {
            Entity::Peripheral(index) => state.peripheral[index].membrane,
            Entity::Central(index) => state.central[index].membrane,
        }
        .into();

        let next = integrator::integrate(
            solver,
            |time, y| self.derivatives(state, entity, time, y),
            initial,
            t - step,
            step / SUB_STEPS as f64,
            SUB_STEPS,
        )?;

        if next.iter().any(|value| !value.is_finite()) {
            return Err(RuntimeError::numerical_error(format!(
                "non-finite state {:?} for {:?} at t={}",
                next, entity, t
            )));
        }
        Ok(next.into())
    }

    /// Advance a scratch state by one macro-step ending at `t`. Every
    /// entity integrates against the same pre-step snapshot; the results are
    /// committed together afterwards.
    fn advance(
        &self,
        state: &mut HhnState,
        t: f64,
        step: f64,
        solver: SolveType,
    ) -> Result<Vec<f64>> {
        let size = self.stimulus.len();
        let snapshot: &HhnState = state;

        #[cfg(feature = "parallel")]
        let next_peripheral: Result<Vec<MembraneState>> = (0..size)
            .into_par_iter()
            .map(|index| self.integrate(snapshot, Entity::Peripheral(index), t, step, solver))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let next_peripheral: Result<Vec<MembraneState>> = (0..size)
            .map(|index| self.integrate(snapshot, Entity::Peripheral(index), t, step, solver))
            .collect();

        let next_peripheral = next_peripheral?;
        let next_central = [
            self.integrate(snapshot, Entity::Central(0), t, step, solver)?,
            self.integrate(snapshot, Entity::Central(1), t, step, solver)?,
        ];

        let amplitude = self.params.noise_amplitude;
        let rng = &mut state.rng;
        state.noise = (0..size)
            .map(|_| 1.0 + amplitude * rng.gen_range(-1.0..1.0))
            .collect();

        let peripheral = state.peripheral.iter_mut().zip(next_peripheral);
        for (index, (oscillator, membrane)) in peripheral.enumerate() {
            oscillator.membrane = membrane;
            if oscillator.pulses.observe(membrane.v, t) {
                log::trace!("Peripheral oscillator {} pulse at t={}", index, t);
            }

            let linked = oscillator.link_weight != 0.0;
            oscillator.update_link(&self.params, t, step);
            if linked != (oscillator.link_weight != 0.0) {
                log::trace!(
                    "Peripheral oscillator {} link {} at t={}",
                    index,
                    if linked { "released" } else { "activated" },
                    t
                );
            }
        }

        for (index, (element, membrane)) in state.central.iter_mut().zip(next_central).enumerate() {
            element.membrane = membrane;
            if element.pulses.observe(membrane.v, t) {
                log::trace!("Central element {} pulse at t={}", index, t);
            }
        }

        Ok(state
            .peripheral
            .iter()
            .map(|osc| osc.membrane.v)
            .chain(state.central.iter().map(|element| element.membrane.v))
            .collect())
    }

    fn check_cancelled(&self, step: usize) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                log::warn!("Hodgkin-Huxley simulation cancelled at step {}", step);
                Err(RuntimeError::Cancelled { step })
            }
            _ => Ok(()),
        }
    }
}

impl OscillatoryNetwork for HhnNetwork {
    fn size(&self) -> usize {
        self.stimulus.len()
    }

    fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Integrate for `time` ms split into `steps` macro-steps, continuing
    /// from the model time reached by earlier runs. Rows of the trace hold
    /// every peripheral potential followed by the two central neurons.
    fn simulate(
        &mut self,
        steps: usize,
        time: Option<f64>,
        solver: SolveType,
        collect_dynamic: bool,
    ) -> Result<DynamicsTrace> {
        check_steps(steps)?;
        let time = time.ok_or_else(|| {
            RuntimeError::unsupported(
                "simulation without time budget",
                "no stop condition is defined for the model",
            )
        })?;
        if !time.is_finite() || time <= 0.0 {
            return Err(RuntimeError::invalid_parameter("time", time.to_string(), "> 0.0"));
        }
        integrator::ensure_supported(solver)?;

        let step = time / steps as f64;
        log::info!(
            "Starting Hodgkin-Huxley simulation: {} oscillators, {}ms in {} steps with {}",
            self.size(),
            time,
            steps,
            solver
        );

        let mut state = self.state.clone();
        let start = state.elapsed;
        let mut times = Vec::new();
        let mut rows = Vec::new();
        let mut last = (start, Vec::new());

        for index in 0..steps {
            self.check_cancelled(index + 1)?;
            let t = start + (index + 1) as f64 * step;
            let row = self.advance(&mut state, t, step, solver)?;

            if collect_dynamic {
                times.push(t);
                rows.push(row);
            } else {
                last = (t, row);
            }

            if (index + 1) % (steps / 10).max(1) == 0 {
                let progress = ((index + 1) as f32 / steps as f32) * 100.0;
                log::debug!("Simulation progress: {:.1}%", progress);
            }
        }

        let trace = if collect_dynamic {
            DynamicsTrace::full(times, rows)
        } else {
            DynamicsTrace::last_only(last.0, last.1)
        };

        state.elapsed = start + time;
        let total_pulses: usize =
            state.peripheral.iter().map(|osc| osc.pulses.times().len()).sum();
        log::info!(
            "Simulation completed: {} peripheral pulses, central pulses {}/{}",
            total_pulses,
            state.central[0].pulses.times().len(),
            state.central[1].pulses.times().len()
        );

        self.state = state;
        self.dynamics = Some(trace.clone());
        Ok(trace)
    }

    fn dynamics(&self) -> Option<&DynamicsTrace> {
        self.dynamics.as_ref()
    }

    /// Group peripheral oscillators whose last complete pulse coincides;
    /// `tolerance` is relative to the pulse width. Central neurons are
    /// never part of an ensemble.
    fn allocate_sync_ensembles(&self, tolerance: f64) -> Option<Vec<Ensemble>> {
        let trace = self.dynamics.as_ref()?;
        let size = self.size();
        let ignore: HashSet<usize> = [size, size + 1].into_iter().collect();
        Some(ensemble::allocate_amplitude_sync_ensembles(
            trace,
            tolerance,
            AMPLITUDE_THRESHOLD,
            &ignore,
        ))
    }
}

/// Builder for Hodgkin-Huxley networks
#[derive(Debug, Clone)]
pub struct HhnBuilder {
    size: usize,
    stimulus: Option<Vec<f64>>,
    params: Option<HhnParameters>,
    representation: ConnectionRepresentation,
    seed: u64,
    cancellation: Option<CancellationToken>,
}

impl HhnBuilder {
    /// Start a network of `size` peripheral oscillators
    pub fn new(size: usize) -> Self {
        Self {
            size,
            stimulus: None,
            params: None,
            representation: ConnectionRepresentation::Matrix,
            seed: crate::DEFAULT_SEED,
            cancellation: None,
        }
    }

    /// External stimulus, one value per peripheral oscillator
    pub fn stimulus(mut self, stimulus: Vec<f64>) -> Self {
        self.stimulus = Some(stimulus);
        self
    }

    /// Explicit parameters instead of a randomized set
    pub fn parameters(mut self, params: HhnParameters) -> Self {
        self.params = Some(params);
        self
    }

    /// Internal representation of the (empty) topology
    pub fn representation(mut self, representation: ConnectionRepresentation) -> Self {
        self.representation = representation;
        self
    }

    /// Seed for parameter perturbation and stimulus noise
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
    pub fn build(self) -> Result<HhnNetwork> {
        let stimulus = self.stimulus.unwrap_or_else(|| vec![0.0; self.size]);
        if stimulus.len() != self.size {
            return Err(RuntimeError::invalid_config(format!(
                "Number of stimulus values ({}) should be equal to number of oscillators ({})",
                stimulus.len(),
                self.size
            )));
        }

        let topology = Topology::new(self.size, ConnectionType::None, self.representation)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let params = match self.params {
            Some(params) => params,
            None => HhnParameters::randomized(&mut rng),
        };
        params.validate()?;

        let noise = (0..self.size)
            .map(|_| 1.0 + params.noise_amplitude * rng.gen_range(-1.0..1.0))
            .collect();

        let state = HhnState {
            peripheral: vec![PeripheralOscillator::default(); self.size],
            central: [CentralElement::default(), CentralElement::default()],
            noise,
            rng,
            elapsed: 0.0,
        };

        Ok(HhnNetwork {
            params,
            topology,
            stimulus,
            state,
            dynamics: None,
            cancellation: self.cancellation,
        })
    }
}

/// Alpha function `alfa * t * exp(-betta * t)`
pub fn alpha_function(time: f64, alfa: f64, betta: f64) -> f64 {
    alfa * time * (-betta * time).exp()
}

/// `x / (e^x - 1)`, continued with its limit around zero
fn exprel_inverse(x: f64) -> f64 {
    if x.abs() < 1e-7 {
        1.0 - x / 2.0
    } else {
        x / x.exp_m1()
    }
}

/// Opening/closing rates `(alpha, beta)` of the m, h, n gates at `potential`
/// measured from rest
fn gate_rates(potential: f64) -> [(f64, f64); 3] {
    let am = exprel_inverse(2.5 - 0.1 * potential);
    let bm = 4.0 * (-potential / 18.0).exp();

    let ah = 0.07 * (-potential / 20.0).exp();
    let bh = 1.0 / ((3.0 - 0.1 * potential).exp() + 1.0);

    let an = 0.1 * exprel_inverse(1.0 - 0.1 * potential);
    let bn = 0.125 * (-potential / 80.0).exp();

    [(am, bm), (ah, bh), (an, bn)]
}

fn membrane_derivatives(p: &HhnParameters, y: &[f64; 4], i_ext: f64, i_syn: f64) -> [f64; 4] {
    let [v, m, h, n] = *y;

    let i_ion = p.g_na * m.powi(3) * h * (v - p.v_na)
        + p.g_k * n.powi(4) * (v - p.v_k)
        + p.g_l * (v - p.v_l);
    let dv = -i_ion + i_ext - i_syn;

    let [(am, bm), (ah, bh), (an, bn)] = gate_rates(v - p.v_rest);
    let dm = am * (1.0 - m) - bm * m;
    let dh = ah * (1.0 - h) - bh * h;
    let dn = an * (1.0 - n) - bn * n;

    [dv, dm, dh, dn]
}
