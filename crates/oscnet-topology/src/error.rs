//! Error types for the topology layer

use thiserror::Error;

/// Result type for topology operations
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors that can occur while building or querying a topology
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A network needs at least one oscillator
    #[error("Network must contain at least one oscillator")]
    EmptyNetwork,

    /// Grid schemes need a square number of oscillators
    #[error("Invalid number of oscillators {size} for grid structure: not a perfect square")]
    NonSquareGrid {
        /// Requested oscillator count
        size: usize,
    },

    /// Oscillator index outside of the network
    #[error("Oscillator index {index} out of range (network size {size})")]
    IndexOutOfRange {
        /// Index that was requested
        index: usize,
        /// Number of oscillators in the network
        size: usize,
    },
}
