//! Fixed-step integration of small ODE systems

use crate::error::*;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of numerical solver requested for a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolveType {
    /// Forward Euler
    Fast,
    /// Classic fourth-order Runge-Kutta
    #[default]
    Rk4,
    /// Adaptive Runge-Kutta-Fehlberg 4(5)
    Rkf45,
}

impl fmt::Display for SolveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fast => "fast",
            Self::Rk4 => "rk4",
            Self::Rkf45 => "rkf45",
        };
        f.write_str(name)
    }
}

/// Integrate `dy/dt = f(t, y)` from `t0` over `steps` equal steps of `dt`
/// with classic RK4 and return the final state.
pub fn rk4<const N: usize, F>(f: F, initial: [f64; N], t0: f64, dt: f64, steps: usize) -> [f64; N]
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    let mut y = initial;
    for step in 0..steps {
        let t = t0 + step as f64 * dt;
        let half = dt / 2.0;

        let k1 = f(t, &y);
        let k2 = f(t + half, &offset(&y, &k1, half));
        let k3 = f(t + half, &offset(&y, &k2, half));
        let k4 = f(t + dt, &offset(&y, &k3, dt));

        for i in 0..N {
            y[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
    }
    y
}

fn offset<const N: usize>(y: &[f64; N], k: &[f64; N], scale: f64) -> [f64; N] {
    let mut out = *y;
    for i in 0..N {
        out[i] += scale * k[i];
    }
    out
}

/// Integrate with the solver `kind`, rejecting kinds the engines do not provide
pub fn integrate<const N: usize, F>(
    kind: SolveType,
    f: F,
    initial: [f64; N],
    t0: f64,
    dt: f64,
    steps: usize,
) -> Result<[f64; N]>
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    ensure_supported(kind)?;
    Ok(rk4(f, initial, t0, dt, steps))
}

/// Fail for solver kinds that are withheld: forward Euler is too inaccurate
/// for the membrane dynamics and the adaptive solver is not provided.
pub fn ensure_supported(kind: SolveType) -> Result<()> {
    match kind {
        SolveType::Rk4 => Ok(()),
        SolveType::Fast => Err(RuntimeError::unsupported(
            "solver fast",
            "low accuracy leads to large integration error",
        )),
        SolveType::Rkf45 => Err(RuntimeError::unsupported(
            "solver rkf45",
            "adaptive integration is not provided",
        )),
    }
}
