// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Coverage maps.

A coverage map tells how much each voxel of an object is seen by a scanning
procedure. Each probe is split into lines, one per non-zero probe cell, and
every line deposits its weight times its intersection length into the voxels
it crosses.

The fourth dimension of the coverage volume partitions line direction
`theta mod pi` into equal angular bins, so a map with more than one bin also
records from which directions each voxel was seen. [`coverage_tensor`] keeps
the same information as a second order direction tensor instead.
*/

use crate::error::{TomoError, TomoResult};
use crate::siddon::trace_slice;
use crate::system::bucket_by_slice;
use ndarray::{Array5, ArrayView2, Axis};
use rayon::prelude::*;
use std::f64::consts::PI;
use tike_structures::{Acquisition, GridGeometry, Ray, Volume};
use tracing::{debug, info};

/// A line of a probe and the weight it deposits per unit length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageLine {
    pub theta: f64,
    pub h: f64,
    pub v: f64,
    pub weight: f64,
}

impl CoverageLine {
    pub fn ray(&self) -> Ray {
        Ray::new(self.theta, self.h, self.v)
    }
}

/// Offsets of the non-zero probe cell centres from the probe min corner.
///
/// Cells are visited `h` major, so the offsets of cell `(a, b)` come before
/// those of `(a, b + 1)`.
pub fn line_offsets(
    probe_grid: ArrayView2<'_, f32>,
    probe_size: [f64; 2],
) -> TomoResult<(Vec<f64>, Vec<f64>)> {
    let (columns, rows) = probe_grid.dim();
    if columns == 0 || rows == 0 {
        return Err(TomoError::InvalidParameter(format!(
            "probe grid must not be empty, got {columns} x {rows}"
        )));
    }
    if probe_size.iter().any(|s| !(*s > 0.0)) {
        return Err(TomoError::InvalidParameter(format!(
            "probe dimensions must be > 0, got {probe_size:?}"
        )));
    }
    let step_h = probe_size[0] / columns as f64;
    let step_v = probe_size[1] / rows as f64;
    let (dh, dv): (Vec<f64>, Vec<f64>) = probe_grid
        .indexed_iter()
        .filter(|(_, value)| **value != 0.0)
        .map(|((a, b), _)| ((a as f64 + 0.5) * step_h, (b as f64 + 0.5) * step_v))
        .unzip();
    info!("probe contributes {} lines", dh.len());
    Ok((dh, dv))
}

/// Split every probe into weighted lines.
///
/// Lines are ordered position major. Each weight is
/// `dwell * line_area / voxel_volume`.
pub fn probe_lines(
    geometry: &GridGeometry,
    probe_grid: ArrayView2<'_, f32>,
    acquisition: &Acquisition,
    dwell: Option<&[f64]>,
) -> TomoResult<Vec<CoverageLine>> {
    if let Some(dwell) = dwell {
        if dwell.len() != acquisition.num_probes() {
            return Err(TomoError::InvalidParameter(format!(
                "dwell must have one entry per probe position: {} != {}",
                dwell.len(),
                acquisition.num_probes()
            )));
        }
    }
    let (dh, dv) = line_offsets(probe_grid, acquisition.probe_size())?;
    let (columns, rows) = acquisition.probe_shape();
    let [size_h, size_v] = acquisition.probe_size();
    let line_area = size_h / columns as f64 * size_v / rows as f64;
    let scale = line_area / geometry.voxel_volume();

    let mut lines = Vec::with_capacity(acquisition.num_probes() * dh.len());
    for m in 0..acquisition.num_probes() {
        let weight = dwell.map_or(1.0, |d| d[m]) * scale;
        for (offset_h, offset_v) in dh.iter().zip(&dv) {
            lines.push(CoverageLine {
                theta: acquisition.theta()[m],
                h: acquisition.h()[m] + offset_h,
                v: acquisition.v()[m] + offset_v,
                weight,
            });
        }
    }
    Ok(lines)
}

/// Return a coverage map using this probe.
///
/// The intersection of each line with each voxel is approximated by the line
/// area times the length of the line inside the voxel.
///
/// # Arguments
/// * `volume` - The `(Z, X, Y, B)` map to accumulate into; `B` is the number
///   of angular bins
/// * `probe_grid` - `(H, V)` probe raster; only non-zero cells emit lines
/// * `probe_size` - Probe side lengths `(h, v)`
/// * `theta`, `h`, `v` - Min corners of the `M` probe positions
/// * `dwell` - Optional `(M,)` multiplier of each position's weight
pub fn coverage(
    mut volume: Volume,
    probe_grid: ArrayView2<'_, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
    dwell: Option<&[f64]>,
) -> TomoResult<Volume> {
    let acquisition = Acquisition::new(probe_grid.dim(), probe_size, theta, h, v)?;
    let lines = probe_lines(volume.geometry(), probe_grid, &acquisition, dwell)?;
    info!("coverage {} element grid", volume.grid().len());
    coverage_lines(&mut volume, &lines);
    Ok(volume)
}

/// Angular bin of `theta` when `[0, pi)` is split into `bins` equal parts
pub fn angle_bin(theta: f64, bins: usize) -> usize {
    let folded = theta.rem_euclid(PI);
    let bin = (folded / PI * bins as f64).floor() as usize;
    bin.min(bins.saturating_sub(1))
}

/// Accumulate `weight * intersection_length` of every line into `volume`.
///
/// Each line lands in the angular bin of its direction.
pub fn coverage_lines(volume: &mut Volume, lines: &[CoverageLine]) {
    let geometry = *volume.geometry();
    let bins = volume.properties();
    let buckets = bucket_by_slice(&geometry, lines.iter().map(|line| line.v));
    debug!(
        "{} of {} lines inside the object",
        buckets.iter().map(Vec::len).sum::<usize>(),
        lines.len()
    );

    volume
        .grid_mut()
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(buckets.par_iter())
        .for_each(|(mut slab, indices)| {
            for &index in indices {
                let line = &lines[index];
                let bin = angle_bin(line.theta, bins);
                trace_slice(&geometry, &line.ray(), |x, y, length| {
                    slab[[x, y, bin]] += (line.weight * length) as f32;
                });
            }
        });
}

/// Accumulate the direction tensor `weight * length * d d^T` of every line.
///
/// `d = (cos theta, sin theta)` is the line direction in the `x, y` plane.
/// The result has shape `(Z, X, Y, 2, 2)`; its eigenvectors give the
/// dominant viewing directions of each voxel.
pub fn coverage_tensor(geometry: &GridGeometry, lines: &[CoverageLine]) -> Array5<f32> {
    let [nz, nx, ny] = geometry.shape;
    let mut tensor = Array5::<f32>::zeros((nz, nx, ny, 2, 2));
    let buckets = bucket_by_slice(geometry, lines.iter().map(|line| line.v));
    info!("coverage tensor {} element grid", tensor.len());

    tensor
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(buckets.par_iter())
        .for_each(|(mut slab, indices)| {
            for &index in indices {
                let line = &lines[index];
                let (c, s) = (line.theta.cos(), line.theta.sin());
                let outer = [[c * c, c * s], [s * c, s * s]];
                trace_slice(geometry, &line.ray(), |x, y, length| {
                    let w = line.weight * length;
                    for (i, row) in outer.iter().enumerate() {
                        for (j, d) in row.iter().enumerate() {
                            slab[[x, y, i, j]] += (w * d) as f32;
                        }
                    }
                });
            }
        });
    tensor
}
