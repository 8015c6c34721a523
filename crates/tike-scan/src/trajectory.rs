// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Discretization of continuous trajectories.

A trajectory is a function of time returning a `[theta, h, v]` position.
[`discrete_trajectory`] samples it so that consecutive measurements are never
more than `dx` apart in reconstruction space and never more than `dt` apart
in time.

Keeping time steps below `dt` is trivial. Spatial steps are kept below `dx`
by bisection: the next candidate is one `dt` later, and whenever it is too
far away the interval is halved, keeping the rejected candidates on a stack
to resume from. A trajectory that jumps cannot be bisected below `dx`, so
the stack depth is bounded.
*/

use crate::coordinates::euclidian_dist;
use crate::error::{ScanError, ScanResult};
use tracing::trace;

/// Default bound on the bisection stack
pub const DEFAULT_MAX_ITER: usize = 16;

/// Measurement positions along a trajectory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscreteTrajectory {
    /// `[theta, h, v]` of each measurement
    pub position: Vec<[f64; 3]>,
    /// Time spent at each position before moving to the next
    pub dwell: Vec<f64>,
    /// Time of each measurement
    pub time: Vec<f64>,
}

impl DiscreteTrajectory {
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Sample `trajectory` over `[tmin, tmax)`.
///
/// # Arguments
/// * `trajectory` - Continuous function of time returning `[theta, h, v]`
/// * `tmin`, `tmax` - Start and end times
/// * `dx` - Maximum spatial step
/// * `dt` - Maximum time step
/// * `max_iter` - Bound on the number of pending bisections
///
/// # Errors
/// * [`ScanError::Discontinuous`] when no step within `dx` is found before
///   the bisection stack exceeds `max_iter`
/// * [`ScanError::InvalidParameter`] when `dt` is below the float resolution
///   of the current time, so time would stop advancing
pub fn discrete_trajectory<F>(
    trajectory: F,
    tmin: f64,
    tmax: f64,
    dx: f64,
    dt: f64,
    max_iter: usize,
) -> ScanResult<DiscreteTrajectory>
where
    F: Fn(f64) -> [f64; 3],
{
    if !(dx > 0.0) || !(dt > 0.0) {
        return Err(ScanError::InvalidParameter(format!(
            "dx and dt must be > 0, got dx = {dx}, dt = {dt}"
        )));
    }
    if !tmin.is_finite() || !tmax.is_finite() {
        return Err(ScanError::InvalidParameter(format!(
            "time bounds must be finite, got [{tmin}, {tmax})"
        )));
    }

    let mut result = DiscreteTrajectory::default();
    let mut pending: Vec<([f64; 3], f64)> = Vec::new();
    let mut t = tmin;
    let mut t_next = (tmin + dt).min(tmax);
    let mut x = trajectory(t);

    while t < tmax {
        let x_next = if pending.len() > max_iter {
            return Err(ScanError::Discontinuous { max_iter });
        } else if let Some((x_next, time)) = pending.pop() {
            t_next = time;
            x_next
        } else {
            trajectory(t_next)
        };

        if euclidian_dist(x_next, x) <= dx {
            if t_next <= t {
                return Err(ScanError::InvalidParameter(format!(
                    "time step {dt} does not advance past t = {t}"
                )));
            }
            result.position.push(x);
            result.time.push(t);
            result.dwell.push(t_next - t);
            x = x_next;
            t = t_next;
            t_next = (t + dt).min(tmax);
        } else {
            pending.push((x_next, t_next));
            t_next = (t_next + t) / 2.0;
            pending.push((trajectory(t_next), t_next));
        }
    }

    trace!(
        "discretized [{}, {}) into {} positions",
        tmin,
        tmax,
        result.len()
    );
    Ok(result)
}
