//! Oscillatory neural network engines
//!
//! Two models share one contract ([`OscillatoryNetwork`]):
//!
//! - [`PcnnNetwork`], a discrete pulse-coupled network with optional fast
//!   linking, used for image segmentation style workloads;
//! - [`HhnNetwork`], a continuous network of Hodgkin-Huxley neurons coupled
//!   through two central neurons, used for selective attention.
//!
//! Both record their dynamics as a [`DynamicsTrace`] from which synchronous
//! ensembles are allocated. Connectivity comes from `oscnet-topology`.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export essential types from topology
pub use oscnet_topology::{ConnectionRepresentation, ConnectionType, Topology, TopologyError};

// Core modules
pub mod control;
pub mod dynamics;
pub mod ensemble;
pub mod error;
pub mod hhn;
pub mod integrator;
pub mod network;
pub mod pcnn;

// Re-export essential types
pub use control::CancellationToken;
pub use dynamics::DynamicsTrace;
pub use ensemble::Ensemble;
pub use error::{Result, RuntimeError};
pub use hhn::{
    CentralElement, HhnBuilder, HhnNetwork, HhnParameters, MembraneState, PeripheralOscillator,
    PulseTracker,
};
pub use integrator::SolveType;
pub use network::OscillatoryNetwork;
pub use pcnn::{PcnnBuilder, PcnnNetwork, PcnnParameters};

/// Seed used by builders when none is given
pub const DEFAULT_SEED: u64 = 42;
