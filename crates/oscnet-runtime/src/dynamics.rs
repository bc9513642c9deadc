//! Output dynamics produced by a simulation run

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time-ordered snapshots of every output channel of a network.
///
/// Row `k` holds one value per channel at `time[k]`. When the run did not
/// collect its full history only the final row is present and
/// [`DynamicsTrace::is_full_history`] returns `false`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DynamicsTrace {
    time: Vec<f64>,
    states: Vec<Vec<f64>>,
    full_history: bool,
}

impl DynamicsTrace {
    /// Trace holding the whole history of a run
    pub fn full(time: Vec<f64>, states: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(time.len(), states.len());
        Self {
            time,
            states,
            full_history: true,
        }
    }

    /// Trace holding only the final snapshot of a run
    pub fn last_only(time: f64, state: Vec<f64>) -> Self {
        Self {
            time: vec![time],
            states: vec![state],
            full_history: false,
        }
    }

    /// Time axis
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Snapshots, one row per time point
    pub fn states(&self) -> &[Vec<f64>] {
        &self.states
    }

    /// Whether every step of the run was recorded
    pub fn is_full_history(&self) -> bool {
        self.full_history
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no snapshot was recorded
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of channels per snapshot
    pub fn channel_count(&self) -> usize {
        self.states.first().map_or(0, Vec::len)
    }

    /// Final snapshot
    pub fn last(&self) -> Option<&[f64]> {
        self.states.last().map(Vec::as_slice)
    }

    /// Values of one channel over time
    pub fn channel(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.channel_count() {
            return None;
        }
        Some(self.states.iter().map(|row| row[index]).collect())
    }

    /// Split into time axis and snapshots
    pub fn into_parts(self) -> (Vec<f64>, Vec<Vec<f64>>) {
        (self.time, self.states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_trace() {
        let trace = DynamicsTrace::full(
            vec![0.0, 1.0, 2.0],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        );
        assert!(trace.is_full_history());
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.channel_count(), 2);
        assert_eq!(trace.last(), Some(&[1.0, 1.0][..]));
        assert_eq!(trace.channel(1), Some(vec![0.0, 1.0, 1.0]));
        assert_eq!(trace.channel(2), None);
    }

    #[test]
    fn test_last_only_trace() {
        let trace = DynamicsTrace::last_only(10.0, vec![0.5; 4]);
        assert!(!trace.is_full_history());
        assert_eq!(trace.time(), &[10.0]);
        assert_eq!(trace.channel_count(), 4);
    }
}
