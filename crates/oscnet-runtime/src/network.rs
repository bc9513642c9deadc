//! Capabilities shared by every oscillatory network model

use crate::{
    dynamics::DynamicsTrace,
    ensemble::{self, Ensemble},
    error::*,
    integrator::SolveType,
    Topology,
};

/// Common contract of the pulse-coupled and Hodgkin-Huxley networks
pub trait OscillatoryNetwork {
    /// Number of oscillators exposed as network output
    fn size(&self) -> usize;

    /// Connectivity of the network
    fn topology(&self) -> &Topology;

    /// Oscillators that influence `index`
    fn neighbors(&self, index: usize) -> Result<&[usize]> {
        Ok(self.topology().neighbors(index)?)
    }

    /// Run for a fixed budget of `steps` (and `time`, when the model is
    /// continuous). With `collect_dynamic` the whole history is returned,
    /// otherwise only the final snapshot.
    fn simulate(
        &mut self,
        steps: usize,
        time: Option<f64>,
        solver: SolveType,
        collect_dynamic: bool,
    ) -> Result<DynamicsTrace>;

    /// Run until a synchronization `order` is reached.
    ///
    /// None of the models define a stopping criterion, so this always fails
    /// without touching the network.
    fn simulate_dynamic(
        &mut self,
        order: f64,
        solver: SolveType,
        collect_dynamic: bool,
    ) -> Result<DynamicsTrace> {
        let _ = (order, solver, collect_dynamic);
        Err(RuntimeError::unsupported(
            "dynamic simulation",
            "no stop condition is defined for the model",
        ))
    }

    /// Dynamics of the last successful simulation
    fn dynamics(&self) -> Option<&DynamicsTrace>;

    /// Clusters of synchronously active oscillators, `None` when the
    /// recorded dynamics cannot support the allocation
    fn allocate_sync_ensembles(&self, tolerance: f64) -> Option<Vec<Ensemble>>;

    /// Sum of all outputs at each recorded step
    fn time_signal(&self) -> Vec<f64> {
        self.dynamics().map(ensemble::time_signal).unwrap_or_default()
    }
}

/// Reject simulation budgets that cannot produce a single step
pub(crate) fn check_steps(steps: usize) -> Result<()> {
    if steps == 0 {
        return Err(RuntimeError::invalid_parameter("steps", "0", "> 0"));
    }
    Ok(())
}
