// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Iterative reconstruction.

Both solvers start from an initial guess and refine it against measured probe
data. Rays never leave their `z` slice, so every slice is an independent
sub-problem and slices are solved in parallel.
*/

use crate::error::{TomoError, TomoResult};
use crate::projection::build_system;
use crate::system::Row;
use ndarray::{Array3, ArrayView4, ArrayViewMut3, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tike_structures::{Acquisition, ProbeRay, Volume};
use tracing::{debug, info};

/// Reconstruction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Algebraic Reconstruction Technique
    Art,
    /// Simultaneous Iterative Reconstruction Technique
    #[default]
    Sirt,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Art => "art",
            Algorithm::Sirt => "sirt",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TomoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "art" => Ok(Algorithm::Art),
            "sirt" => Ok(Algorithm::Sirt),
            other => Err(TomoError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Reconstruct with the given `algorithm`
pub fn reconstruct(
    init: &Volume,
    acquisition: &Acquisition,
    data: ArrayView4<'_, f32>,
    algorithm: Algorithm,
    niter: usize,
) -> TomoResult<Volume> {
    match algorithm {
        Algorithm::Art => art(init, acquisition, data, niter),
        Algorithm::Sirt => sirt(init, acquisition, data, niter),
    }
}

/// Reconstruct using the Algebraic Reconstruction Technique.
///
/// Each iteration sweeps the rays in acquisition order and projects the
/// current estimate onto the hyperplane of each measurement (Kaczmarz). Every
/// property channel is solved independently.
///
/// # Arguments
/// * `init` - Initial guess, `(Z, X, Y, P)`
/// * `acquisition` - Probe geometry of the measurements
/// * `data` - Measured probe data, `(M, H, V, P)`
/// * `niter` - Number of sweeps; `0` returns `init` unchanged
pub fn art(
    init: &Volume,
    acquisition: &Acquisition,
    data: ArrayView4<'_, f32>,
    niter: usize,
) -> TomoResult<Volume> {
    acquisition.check_data_shape(data.shape(), init.properties())?;
    let mut result = init.clone();
    if niter == 0 {
        return Ok(result);
    }
    info!(
        "art {} element grid for {} iterations",
        init.grid().len(),
        niter
    );
    let (probe_rays, system) = build_system(init.geometry(), acquisition);
    let properties = init.properties();

    result
        .grid_mut()
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(system.slices().par_iter())
        .for_each(|(mut slab, rows)| {
            for _ in 0..niter {
                for row in rows {
                    let norm = row.norm_squared();
                    if norm <= 0.0 {
                        continue;
                    }
                    let ray = &probe_rays[row.ray];
                    for p in 0..properties {
                        let residual = measured(&data, ray, p) - simulated(&slab, row, p);
                        let step = residual / norm;
                        for entry in &row.entries {
                            slab[[entry.x, entry.y, p]] += step * entry.length;
                        }
                    }
                }
            }
        });

    debug!("art finished {} sweeps over {} rays", niter, system.row_count());
    Ok(result)
}

/// Reconstruct using the Simultaneous Iterative Reconstruction Technique.
///
/// Each iteration applies `x <- x + C A^T R (b - A x)` where `R` and `C` are
/// the inverse row and column sums of the system matrix. Voxels no ray
/// crosses keep their initial value.
///
/// # Arguments
/// * `init` - Initial guess, `(Z, X, Y, P)`
/// * `acquisition` - Probe geometry of the measurements
/// * `data` - Measured probe data, `(M, H, V, P)`
/// * `niter` - Number of iterations; `0` returns `init` unchanged
pub fn sirt(
    init: &Volume,
    acquisition: &Acquisition,
    data: ArrayView4<'_, f32>,
    niter: usize,
) -> TomoResult<Volume> {
    acquisition.check_data_shape(data.shape(), init.properties())?;
    let mut result = init.clone();
    if niter == 0 {
        return Ok(result);
    }
    info!(
        "sirt {} element grid for {} iterations",
        init.grid().len(),
        niter
    );
    let (probe_rays, system) = build_system(init.geometry(), acquisition);
    let [_, nx, ny] = init.geometry().shape;
    let properties = init.properties();
    let column_sums = system.column_sums();

    result
        .grid_mut()
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(system.slices().par_iter())
        .zip(column_sums.axis_iter(Axis(0)).into_par_iter())
        .for_each(|((mut slab, rows), columns)| {
            let mut update = Array3::<f32>::zeros((nx, ny, properties));
            for _ in 0..niter {
                update.fill(0.0);
                for row in rows {
                    let length = row.length_sum();
                    if length <= 0.0 {
                        continue;
                    }
                    let ray = &probe_rays[row.ray];
                    for p in 0..properties {
                        let residual =
                            (measured(&data, ray, p) - simulated(&slab, row, p)) / length;
                        for entry in &row.entries {
                            update[[entry.x, entry.y, p]] += entry.length * residual;
                        }
                    }
                }
                for ((x, y, p), value) in update.indexed_iter() {
                    let column = columns[[x, y]];
                    if column > 0.0 {
                        slab[[x, y, p]] += value / column;
                    }
                }
            }
        });

    debug!("sirt finished {} iterations over {} rays", niter, system.row_count());
    Ok(result)
}

fn measured(data: &ArrayView4<'_, f32>, ray: &ProbeRay, property: usize) -> f32 {
    data[[ray.probe, ray.column, ray.row, property]]
}

/// Projection of the current slab estimate along one row
fn simulated(slab: &ArrayViewMut3<'_, f32>, row: &Row, property: usize) -> f32 {
    row.entries
        .iter()
        .map(|entry| entry.length * slab[[entry.x, entry.y, property]])
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::project_forward;
    use ndarray::Array4;
    use std::f64::consts::PI;
    use tike_structures::TikeDataError;

    fn phantom() -> Volume {
        let mut grid = Array4::<f32>::zeros((2, 8, 8, 1));
        for x in 2..6 {
            for y in 3..7 {
                grid[[0, x, y, 0]] = 1.0;
                grid[[1, x, y, 0]] = 0.5;
            }
        }
        Volume::with_default_bounds(grid).unwrap()
    }

    fn acquisition() -> Acquisition {
        let n = 24;
        let theta: Vec<f64> = (0..n).map(|i| i as f64 * PI / n as f64).collect();
        Acquisition::new(
            (24, 2),
            [1.5, 1.0],
            theta,
            Some(vec![-0.75; n]),
            Some(vec![-0.5; n]),
        )
        .unwrap()
    }

    fn data_error(volume: &Volume, data: &Array4<f32>, acquisition: &Acquisition) -> f32 {
        let simulated = project_forward(volume, acquisition).unwrap();
        (&simulated - data).mapv(|d| d * d).sum().sqrt()
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("art".parse::<Algorithm>().unwrap(), Algorithm::Art);
        assert_eq!(" SIRT ".parse::<Algorithm>().unwrap(), Algorithm::Sirt);
        assert_eq!(
            "fbp".parse::<Algorithm>(),
            Err(TomoError::UnknownAlgorithm("fbp".to_string()))
        );
        assert_eq!(Algorithm::Art.to_string(), "art");
    }

    #[test]
    fn test_zero_iterations_returns_initial_guess() {
        let truth = phantom();
        let acquisition = acquisition();
        let data = project_forward(&truth, &acquisition).unwrap();
        let mut init = Volume::zeros(*truth.geometry(), 1).unwrap();
        init.grid_mut().fill(0.25);
        for algorithm in [Algorithm::Art, Algorithm::Sirt] {
            let result = reconstruct(&init, &acquisition, data.view(), algorithm, 0).unwrap();
            assert_eq!(result, init);
        }
    }

    #[test]
    fn test_art_reduces_data_error() {
        let truth = phantom();
        let acquisition = acquisition();
        let data = project_forward(&truth, &acquisition).unwrap();
        let init = Volume::zeros(*truth.geometry(), 1).unwrap();
        let before = data_error(&init, &data, &acquisition);
        let result = art(&init, &acquisition, data.view(), 5).unwrap();
        let after = data_error(&result, &data, &acquisition);
        assert!(after < 0.2 * before, "before {before}, after {after}");
    }

    #[test]
    fn test_sirt_reduces_data_error() {
        let truth = phantom();
        let acquisition = acquisition();
        let data = project_forward(&truth, &acquisition).unwrap();
        let init = Volume::zeros(*truth.geometry(), 1).unwrap();
        let before = data_error(&init, &data, &acquisition);
        let one = sirt(&init, &acquisition, data.view(), 1).unwrap();
        let many = sirt(&init, &acquisition, data.view(), 30).unwrap();
        let after_one = data_error(&one, &data, &acquisition);
        let after_many = data_error(&many, &data, &acquisition);
        assert!(after_one < before);
        assert!(after_many < after_one);
    }

    #[test]
    fn test_exact_data_is_a_fixed_point() {
        let truth = phantom();
        let acquisition = acquisition();
        let data = project_forward(&truth, &acquisition).unwrap();
        for algorithm in [Algorithm::Art, Algorithm::Sirt] {
            let result = reconstruct(&truth, &acquisition, data.view(), algorithm, 3).unwrap();
            let diff = (&result.grid() - &truth.grid()).mapv(f32::abs);
            assert!(diff.iter().all(|d| *d < 1e-4), "{algorithm} drifted");
        }
    }

    #[test]
    fn test_data_shape_must_match_properties() {
        let truth = phantom();
        let acquisition = acquisition();
        let data = Array4::<f32>::zeros(acquisition.data_shape(2));
        let result = art(&truth, &acquisition, data.view(), 1);
        assert!(matches!(
            result,
            Err(TomoError::Data(TikeDataError::ShapeMismatch { .. }))
        ));
    }
}
