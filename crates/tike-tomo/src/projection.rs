// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Forward and backward projection.

Forward projection simulates data acquisition: every probe ray integrates
each object property along its path. Backward projection is the adjoint:
every voxel receives the sum, over the rays crossing it, of the intersection
length times the probe value.
*/

use crate::error::TomoResult;
use crate::system::SystemMatrix;
use ndarray::{Array4, ArrayView4, Axis};
use rayon::prelude::*;
use tike_structures::{Acquisition, GridGeometry, ProbeRay, Ray, Volume};
use tracing::{debug, info};

/// Trace every ray of `acquisition` through `geometry`
pub(crate) fn build_system(
    geometry: &GridGeometry,
    acquisition: &Acquisition,
) -> (Vec<ProbeRay>, SystemMatrix) {
    let probe_rays = acquisition.rays();
    let rays: Vec<Ray> = probe_rays.iter().map(|r| r.ray).collect();
    let system = SystemMatrix::build(geometry, &rays);
    debug!(
        "traced {} rays: {} cross the object, {} nonzeros",
        system.ray_count(),
        system.row_count(),
        system.nonzeros()
    );
    (probe_rays, system)
}

/// Forward-project probes over an object; i.e. simulate data acquisition.
///
/// # Returns
/// Probe data of shape `(M, H, V, P)`: the line integral of each of the `P`
/// object properties along each ray. Rays that miss the object read zero.
pub fn project_forward(volume: &Volume, acquisition: &Acquisition) -> TomoResult<Array4<f32>> {
    let properties = volume.properties();
    info!(
        "forward projecting {} rays over {} element grid",
        acquisition.ray_count(),
        volume.grid().len()
    );
    let (probe_rays, system) = build_system(volume.geometry(), acquisition);
    let grid = volume.grid();

    let integrals: Vec<(usize, Vec<f32>)> = system
        .slices()
        .par_iter()
        .enumerate()
        .flat_map_iter(|(slice, rows)| {
            let slab = grid.index_axis(Axis(0), slice);
            rows.iter().map(move |row| {
                let mut sums = vec![0f32; properties];
                for entry in &row.entries {
                    for (p, sum) in sums.iter_mut().enumerate() {
                        *sum += entry.length * slab[[entry.x, entry.y, p]];
                    }
                }
                (row.ray, sums)
            })
        })
        .collect();

    let mut data = Array4::<f32>::zeros(acquisition.data_shape(properties));
    for (ray, sums) in integrals {
        let r = &probe_rays[ray];
        for (p, value) in sums.into_iter().enumerate() {
            data[[r.probe, r.column, r.row, p]] = value;
        }
    }
    Ok(data)
}

/// Back-project probe data over an object grid.
///
/// # Arguments
/// * `geometry` - Placement of the `(Z, X, Y)` output grid
/// * `acquisition` - Probe geometry
/// * `data` - Back-projection weights of shape `(M, H, V, P)`
///
/// # Returns
/// An `(Z, X, Y, P)` volume. The value at each grid position is the sum over
/// rays of the intersection length with the ray times the ray's weight.
pub fn project_backward(
    geometry: &GridGeometry,
    acquisition: &Acquisition,
    data: ArrayView4<'_, f32>,
) -> TomoResult<Volume> {
    let properties = data.dim().3;
    acquisition.check_data_shape(data.shape(), properties)?;
    let mut volume = Volume::zeros(*geometry, properties)?;
    info!(
        "back projecting {} rays over {} element grid",
        acquisition.ray_count(),
        volume.grid().len()
    );
    let (probe_rays, system) = build_system(geometry, acquisition);

    volume
        .grid_mut()
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(system.slices().par_iter())
        .for_each(|(mut slab, rows)| {
            for row in rows {
                let r = &probe_rays[row.ray];
                for p in 0..properties {
                    let weight = data[[r.probe, r.column, r.row, p]];
                    if weight == 0.0 {
                        continue;
                    }
                    for entry in &row.entries {
                        slab[[entry.x, entry.y, p]] += entry.length * weight;
                    }
                }
            }
        });
    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tike_structures::{TikeDataError, DEFAULT_PROBE_SIZE};
    use crate::TomoError;

    #[test]
    fn test_forward_projection_of_uniform_object() {
        // 1 x 4 x 4 object of ones; a probe at theta = 0 spanning the object
        let volume = Volume::with_default_bounds(Array4::ones((1, 4, 4, 1))).unwrap();
        let acquisition =
            Acquisition::new((4, 1), DEFAULT_PROBE_SIZE, vec![0.0], None, None).unwrap();
        let data = project_forward(&volume, &acquisition).unwrap();
        assert_eq!(data.shape(), &[1, 4, 1, 1]);
        for column in 0..4 {
            assert!((data[[0, column, 0, 0]] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_forward_projection_per_property() {
        let mut grid = Array4::zeros((1, 2, 2, 2));
        grid[[0, 0, 0, 0]] = 1.0;
        grid[[0, 1, 0, 0]] = 3.0;
        grid[[0, 0, 1, 1]] = 5.0;
        let volume = Volume::with_default_bounds(grid).unwrap();
        // theta = 0 rays along x; columns at h = -0.25 (y row 0) and h = 0.25 (y row 1)
        let acquisition =
            Acquisition::new((2, 1), DEFAULT_PROBE_SIZE, vec![0.0], None, None).unwrap();
        let data = project_forward(&volume, &acquisition).unwrap();
        assert!((data[[0, 0, 0, 0]] - 2.0).abs() < 1e-6);
        assert!((data[[0, 0, 0, 1]]).abs() < 1e-6);
        assert!((data[[0, 1, 0, 0]]).abs() < 1e-6);
        assert!((data[[0, 1, 0, 1]] - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_rays_missing_the_object_read_zero() {
        let volume = Volume::with_default_bounds(Array4::ones((1, 2, 2, 1))).unwrap();
        let acquisition =
            Acquisition::new((1, 1), DEFAULT_PROBE_SIZE, vec![0.0], Some(vec![3.0]), None)
                .unwrap();
        let data = project_forward(&volume, &acquisition).unwrap();
        assert_eq!(data[[0, 0, 0, 0]], 0.0);
    }

    #[test]
    fn test_back_projection_spreads_along_ray() {
        let geometry = *Volume::with_default_bounds(Array4::zeros((1, 4, 4, 1)))
            .unwrap()
            .geometry();
        let acquisition =
            Acquisition::pencil_beams(vec![0.0], vec![0.1], vec![0.0]).unwrap();
        let data = Array4::from_elem((1, 1, 1, 1), 2.0f32);
        let volume = project_backward(&geometry, &acquisition, data.view()).unwrap();
        let grid = volume.grid();
        for x in 0..4 {
            assert!((grid[[0, x, 2, 0]] - 0.5).abs() < 1e-6);
            assert_eq!(grid[[0, x, 1, 0]], 0.0);
        }
    }

    #[test]
    fn test_back_projection_rejects_bad_shape() {
        let geometry = *Volume::with_default_bounds(Array4::zeros((1, 4, 4, 1)))
            .unwrap()
            .geometry();
        let acquisition =
            Acquisition::new((2, 2), DEFAULT_PROBE_SIZE, vec![0.0], None, None).unwrap();
        let data = Array4::<f32>::zeros((1, 2, 3, 1));
        let result = project_backward(&geometry, &acquisition, data.view());
        assert!(matches!(
            result,
            Err(TomoError::Data(TikeDataError::ShapeMismatch { .. }))
        ));
    }
}
