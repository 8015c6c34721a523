// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Probe acquisitions.

An acquisition describes `M` probes collected or projected across an object.
Each probe is a raster of `H` rays wide (horizontal) and `V` rays tall
(vertical), positioned by the `(theta, h, v)` of its min corner. Every probe
has the same side lengths.
*/

use crate::error::{TikeDataError, TikeDataResult};
use crate::ray::Ray;
use serde::{Deserialize, Serialize};

/// Probe side lengths `(h, v)` used when none are given
pub const DEFAULT_PROBE_SIZE: [f64; 2] = [1.0, 1.0];

/// Probe min corner `h` and `v` used when none are given
pub const DEFAULT_PROBE_CORNER: f64 = -0.5;

/// One ray of one probe, with its position in the `(M, H, V)` data layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeRay {
    pub probe: usize,
    pub column: usize,
    pub row: usize,
    pub ray: Ray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    /// Rays per probe `(H, V)`
    probe_shape: (usize, usize),
    /// Side lengths `(h, v)` of every probe
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Vec<f64>,
    v: Vec<f64>,
}

impl Acquisition {
    /// Build an acquisition of `theta.len()` probes.
    ///
    /// Missing `h` or `v` positions default to [`DEFAULT_PROBE_CORNER`].
    pub fn new(
        probe_shape: (usize, usize),
        probe_size: [f64; 2],
        theta: Vec<f64>,
        h: Option<Vec<f64>>,
        v: Option<Vec<f64>>,
    ) -> TikeDataResult<Self> {
        if probe_size.iter().any(|s| !(*s > 0.0) || !s.is_finite()) {
            return Err(TikeDataError::NonPositiveProbeSize(probe_size));
        }
        if probe_shape.0 == 0 || probe_shape.1 == 0 {
            return Err(TikeDataError::EmptyGrid(vec![probe_shape.0, probe_shape.1]));
        }
        let h = h.unwrap_or_else(|| vec![DEFAULT_PROBE_CORNER; theta.len()]);
        let v = v.unwrap_or_else(|| vec![DEFAULT_PROBE_CORNER; theta.len()]);
        if theta.len() != h.len() || theta.len() != v.len() {
            return Err(TikeDataError::PositionCountMismatch {
                theta: theta.len(),
                h: h.len(),
                v: v.len(),
            });
        }
        Ok(Self {
            probe_shape,
            probe_size,
            theta,
            h,
            v,
        })
    }

    /// Single-ray probes, one per position.
    ///
    /// The probe raster is `1 x 1` and the min corners are placed so that each
    /// probe's ray passes exactly through `(theta, h, v)`.
    pub fn pencil_beams(theta: Vec<f64>, h: Vec<f64>, v: Vec<f64>) -> TikeDataResult<Self> {
        let mut acquisition = Self::new((1, 1), [1.0, 1.0], theta, Some(h), Some(v))?;
        // Shift every min corner so the single cell centre lands on the given position.
        for h in acquisition.h.iter_mut() {
            *h -= 0.5;
        }
        for v in acquisition.v.iter_mut() {
            *v -= 0.5;
        }
        Ok(acquisition)
    }

    pub fn num_probes(&self) -> usize {
        self.theta.len()
    }

    pub fn probe_shape(&self) -> (usize, usize) {
        self.probe_shape
    }

    pub fn probe_size(&self) -> [f64; 2] {
        self.probe_size
    }

    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    pub fn h(&self) -> &[f64] {
        &self.h
    }

    pub fn v(&self) -> &[f64] {
        &self.v
    }

    /// Total number of rays, `M * H * V`
    pub fn ray_count(&self) -> usize {
        self.num_probes() * self.probe_shape.0 * self.probe_shape.1
    }

    /// Shape `(M, H, V, P)` of probe data with `properties` channels
    pub fn data_shape(&self, properties: usize) -> [usize; 4] {
        [
            self.num_probes(),
            self.probe_shape.0,
            self.probe_shape.1,
            properties,
        ]
    }

    /// Check that `shape` is `(M, H, V, properties)`
    pub fn check_data_shape(&self, shape: &[usize], properties: usize) -> TikeDataResult<()> {
        let expected = self.data_shape(properties);
        if shape != expected {
            return Err(TikeDataError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: shape.to_vec(),
            });
        }
        Ok(())
    }

    /// Offsets of the ray centres from the probe min corner, `(dh, dv)`
    pub fn cell_offsets(&self) -> (Vec<f64>, Vec<f64>) {
        let (columns, rows) = self.probe_shape;
        let step_h = self.probe_size[0] / columns as f64;
        let step_v = self.probe_size[1] / rows as f64;
        let dh = (0..columns).map(|a| (a as f64 + 0.5) * step_h).collect();
        let dv = (0..rows).map(|b| (b as f64 + 0.5) * step_v).collect();
        (dh, dv)
    }

    /// Every ray in `(M, H, V)` row-major order
    pub fn rays(&self) -> Vec<ProbeRay> {
        let (dh, dv) = self.cell_offsets();
        let mut rays = Vec::with_capacity(self.ray_count());
        for probe in 0..self.num_probes() {
            for (column, offset_h) in dh.iter().enumerate() {
                for (row, offset_v) in dv.iter().enumerate() {
                    rays.push(ProbeRay {
                        probe,
                        column,
                        row,
                        ray: Ray::new(
                            self.theta[probe],
                            self.h[probe] + offset_h,
                            self.v[probe] + offset_v,
                        ),
                    });
                }
            }
        }
        rays
    }

    /// Smallest and largest probe angle
    pub fn angular_range(&self) -> (f64, f64) {
        self.theta
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
                (lo.min(*t), hi.max(*t))
            })
    }
}
