//! Allocation of synchronous ensembles from output dynamics
//!
//! An ensemble is a group of oscillator indices judged to be active together;
//! each ensemble is one output cluster of the network.

use crate::dynamics::DynamicsTrace;
use std::collections::HashSet;

/// Indices of oscillators that are synchronously active
pub type Ensemble = Vec<usize>;

/// Ensembles from a binary output trace, scanning backwards in time.
///
/// Steps are visited from the last one down to, but excluding, the first
/// recorded row. At each step every oscillator whose output equals `active`
/// and that was not claimed by a later step forms one ensemble. Returns
/// `None` when the trace does not hold the full history of the run.
pub fn allocate_output_sync_ensembles(trace: &DynamicsTrace, active: f64) -> Option<Vec<Ensemble>> {
    if !trace.is_full_history() || trace.is_empty() {
        return None;
    }

    let mut claimed = vec![false; trace.channel_count()];
    let mut ensembles = Vec::new();

    for row in trace.states().iter().skip(1).rev() {
        let ensemble: Ensemble = row
            .iter()
            .enumerate()
            .filter(|&(index, &value)| value == active && !claimed[index])
            .map(|(index, _)| index)
            .collect();

        if ensemble.is_empty() {
            continue;
        }
        for &index in &ensemble {
            claimed[index] = true;
        }
        ensembles.push(ensemble);
    }

    Some(ensembles)
}

/// One ensemble per step holding every oscillator whose output equals
/// `active`, in chronological order. Steps with no active oscillator are
/// omitted. Oscillators may appear in many ensembles.
pub fn allocate_spike_ensembles(trace: &DynamicsTrace, active: f64) -> Vec<Ensemble> {
    trace
        .states()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(_, &value)| value == active)
                .map(|(index, _)| index)
                .collect::<Ensemble>()
        })
        .filter(|ensemble| !ensemble.is_empty())
        .collect()
}

/// Sum of all channel values at each recorded step
pub fn time_signal(trace: &DynamicsTrace) -> Vec<f64> {
    trace.states().iter().map(|row| row.iter().sum()).collect()
}

/// Position in time of the last complete pulse of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
struct PulseDescriptor {
    /// Last step of the pulse above threshold
    end: usize,
    /// Step right before the pulse rose above threshold
    start: usize,
}

impl PulseDescriptor {
    fn center(&self) -> f64 {
        self.start as f64 + (self.end as f64 - self.start as f64) / 2.0
    }

    fn width(&self) -> f64 {
        self.end as f64 - self.start as f64
    }
}

/// Locate the last pulse of `channel` that finished before the end of the trace
fn last_pulse(states: &[Vec<f64>], channel: usize, threshold: f64) -> Option<PulseDescriptor> {
    let mut stop = states.len().checked_sub(1)?;

    // a pulse still running at the end has no known duration, skip past it
    if states[stop][channel] > threshold {
        while stop > 0 && states[stop][channel] > threshold {
            stop -= 1;
        }
        if stop == 0 {
            return None;
        }
    }

    let mut end = None;
    for t in (1..=stop).rev() {
        let value = states[t][channel];
        if let Some(last) = end {
            if value < threshold {
                return Some(PulseDescriptor { end: last, start: t });
            }
        } else if value > threshold {
            end = Some(t);
        }
    }

    // pulse opened at the very beginning of the run
    end.map(|end| PulseDescriptor { end, start: 0 })
}

/// Ensembles from continuous amplitudes, grouping channels whose last
/// complete pulse happened at the same time.
///
/// For every channel not in `ignore`, the last pulse exceeding
/// `amplitude_threshold` gives a centre time. Channels are visited in index
/// order; a channel joins the first ensemble whose window
/// `centre ± tolerance * width` (fixed by the ensemble's founding pulse)
/// strictly contains its own centre, otherwise it founds a new ensemble.
/// Channels without any pulse are left out.
pub fn allocate_amplitude_sync_ensembles(
    trace: &DynamicsTrace,
    tolerance: f64,
    amplitude_threshold: f64,
    ignore: &HashSet<usize>,
) -> Vec<Ensemble> {
    let states = trace.states();
    let mut ensembles: Vec<Ensemble> = Vec::new();
    let mut windows: Vec<(f64, f64)> = Vec::new();

    for channel in (0..trace.channel_count()).filter(|c| !ignore.contains(c)) {
        let Some(pulse) = last_pulse(states, channel, amplitude_threshold) else {
            continue;
        };
        let center = pulse.center();

        match windows
            .iter()
            .position(|&(lower, upper)| lower < center && center < upper)
        {
            Some(position) => ensembles[position].push(channel),
            None => {
                let reducer = pulse.width() * tolerance;
                windows.push((center - reducer, center + reducer));
                ensembles.push(vec![channel]);
            }
        }
    }

    ensembles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_trace() -> DynamicsTrace {
        DynamicsTrace::full(
            vec![0.0, 1.0, 2.0],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        )
    }

    #[test]
    fn test_backward_scan_claims_latest_step_first() {
        let ensembles = allocate_output_sync_ensembles(&binary_trace(), 1.0).unwrap();
        assert_eq!(ensembles, vec![vec![0, 1]]);
    }

    #[test]
    fn test_backward_scan_order() {
        let trace = DynamicsTrace::full(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![
                vec![1.0, 1.0, 1.0],
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 0.0],
            ],
        );
        let ensembles = allocate_output_sync_ensembles(&trace, 1.0).unwrap();
        // oscillator 2 only fired at the initial row, which is never scanned
        assert_eq!(ensembles, vec![vec![1], vec![0]]);
    }

    #[test]
    fn test_backward_scan_requires_full_history() {
        let trace = DynamicsTrace::last_only(2.0, vec![1.0, 1.0]);
        assert_eq!(allocate_output_sync_ensembles(&trace, 1.0), None);
    }

    #[test]
    fn test_spike_ensembles() {
        let ensembles = allocate_spike_ensembles(&binary_trace(), 1.0);
        assert_eq!(ensembles, vec![vec![0], vec![1], vec![0, 1]]);
    }

    #[test]
    fn test_time_signal() {
        assert_eq!(time_signal(&binary_trace()), vec![1.0, 1.0, 2.0]);
    }

    fn pulse_channel(len: usize, on: std::ops::Range<usize>) -> Vec<f64> {
        (0..len)
            .map(|t| if on.contains(&t) { 40.0 } else { -65.0 })
            .collect()
    }

    fn transpose(channels: Vec<Vec<f64>>) -> DynamicsTrace {
        let len = channels[0].len();
        let states = (0..len)
            .map(|t| channels.iter().map(|c| c[t]).collect())
            .collect();
        DynamicsTrace::full((0..len).map(|t| t as f64).collect(), states)
    }

    #[test]
    fn test_amplitude_grouping() {
        let trace = transpose(vec![
            pulse_channel(30, 10..14),
            pulse_channel(30, 20..24),
            pulse_channel(30, 10..14),
            pulse_channel(30, 20..25),
        ]);
        let ensembles = allocate_amplitude_sync_ensembles(&trace, 0.2, 20.0, &HashSet::new());
        assert_eq!(ensembles, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn test_amplitude_skips_running_pulse_and_ignored() {
        let trace = transpose(vec![
            // earlier complete pulse, then one still running at the end
            pulse_channel(30, 5..9)
                .into_iter()
                .enumerate()
                .map(|(t, v)| if t >= 27 { 40.0 } else { v })
                .collect(),
            pulse_channel(30, 5..9),
            // never pulses
            vec![-65.0; 30],
            pulse_channel(30, 25..30),
        ]);
        let ignore: HashSet<usize> = [1].into_iter().collect();
        let ensembles = allocate_amplitude_sync_ensembles(&trace, 0.1, 20.0, &ignore);
        assert_eq!(ensembles, vec![vec![0]]);
    }

    #[test]
    fn test_last_pulse_descriptor() {
        let states: Vec<Vec<f64>> = pulse_channel(20, 4..8).into_iter().map(|v| vec![v]).collect();
        let pulse = last_pulse(&states, 0, 20.0).unwrap();
        assert_eq!(pulse, PulseDescriptor { end: 7, start: 3 });
        assert_eq!(pulse.center(), 5.0);
    }
}
