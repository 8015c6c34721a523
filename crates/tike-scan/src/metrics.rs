// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Path length and speed of sampled scans. Missing axes are treated as zero.

use ndarray::{Array1, ArrayView1};

use crate::error::{ScanError, ScanResult};

/// Length of every step between consecutive samples.
///
/// # Errors
/// [`ScanError::InvalidParameter`] when `y` or `z` is given with a length
/// other than that of `x`.
pub fn lengths(
    x: ArrayView1<'_, f64>,
    y: Option<ArrayView1<'_, f64>>,
    z: Option<ArrayView1<'_, f64>>,
) -> ScanResult<Array1<f64>> {
    for (name, axis) in [("y", y), ("z", z)] {
        if let Some(axis) = axis {
            if axis.len() != x.len() {
                return Err(ScanError::InvalidParameter(format!(
                    "{name} has {} samples but x has {}",
                    axis.len(),
                    x.len()
                )));
            }
        }
    }
    let steps = x.len().saturating_sub(1);
    Ok(Array1::from_shape_fn(steps, |i| {
        let a = x[i + 1] - x[i];
        let b = step(y, i);
        let c = step(z, i);
        (a * a + b * b + c * c).sqrt()
    }))
}

fn step(axis: Option<ArrayView1<'_, f64>>, i: usize) -> f64 {
    axis.map_or(0.0, |a| a[i + 1] - a[i])
}

/// Total length of the path
pub fn distance(
    x: ArrayView1<'_, f64>,
    y: Option<ArrayView1<'_, f64>>,
    z: Option<ArrayView1<'_, f64>>,
) -> ScanResult<f64> {
    Ok(lengths(x, y, z)?.sum())
}

/// Mean speed over a scan lasting `time` seconds
pub fn avgspeed(
    time: f64,
    x: ArrayView1<'_, f64>,
    y: Option<ArrayView1<'_, f64>>,
    z: Option<ArrayView1<'_, f64>>,
) -> ScanResult<f64> {
    Ok(distance(x, y, z)? / time)
}
