//! Error types for the oscillatory network runtime

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the oscillatory network runtime
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Topology layer error
    #[error("Topology error: {source}")]
    Topology {
        #[from]
        /// Source topology error
        source: oscnet_topology::TopologyError,
    },

    /// Invalid network configuration
    #[error("Invalid network configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Operation that the model deliberately does not provide
    #[error("Unsupported operation {operation}: {reason}")]
    UnsupportedOperation {
        /// Operation that was requested
        operation: String,
        /// Why it is not supported
        reason: String,
    },

    /// Numerical computation error
    #[error("Numerical error: {reason}")]
    NumericalError {
        /// Reason for numerical error
        reason: String,
    },

    /// Simulation stopped through its cancellation token
    #[error("Simulation cancelled at step {step}")]
    Cancelled {
        /// Step that observed the cancellation
        step: usize,
    },
}

impl RuntimeError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical_error(reason: impl Into<String>) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Whether the error stems from how the network was configured
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Topology { .. }
                | Self::InvalidConfiguration { .. }
                | Self::InvalidParameter { .. }
        )
    }
}
