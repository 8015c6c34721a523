// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Object volumes.

An object grid is a `(Z, X, Y, P)` array. The first three dimensions are
spatial; the fourth holds properties at each grid position (refractive
indices, attenuation coefficients, coverage bins, ...).
*/

use crate::error::{TikeDataError, TikeDataResult};
use ndarray::{Array4, ArrayView4, ArrayViewMut4};
use serde::{Deserialize, Serialize};

/// Min corner `(z, x, y)` used when none is given
pub const DEFAULT_OBJECT_MIN: [f64; 3] = [-0.5, -0.5, -0.5];

/// Side lengths `(z, x, y)` used when none are given
pub const DEFAULT_OBJECT_SIZE: [f64; 3] = [1.0, 1.0, 1.0];

/// Placement of a `(Z, X, Y)` voxel grid in reconstruction space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Min corner `(z, x, y)`
    pub min: [f64; 3],
    /// Side lengths `(z, x, y)`
    pub size: [f64; 3],
    /// Number of voxels `(Z, X, Y)`
    pub shape: [usize; 3],
}

impl GridGeometry {
    pub fn new(min: [f64; 3], size: [f64; 3], shape: [usize; 3]) -> TikeDataResult<Self> {
        if size.iter().any(|s| !(*s > 0.0) || !s.is_finite()) {
            return Err(TikeDataError::NonPositiveObjectSize(size));
        }
        if shape.iter().any(|n| *n == 0) {
            return Err(TikeDataError::EmptyGrid(shape.to_vec()));
        }
        if min.iter().any(|m| !m.is_finite()) {
            return Err(TikeDataError::BadParameters(format!(
                "object min corner must be finite, got {:?}",
                min
            )));
        }
        Ok(Self { min, size, shape })
    }

    /// Edge lengths of a single voxel `(dz, dx, dy)`
    pub fn voxel_size(&self) -> [f64; 3] {
        [
            self.size[0] / self.shape[0] as f64,
            self.size[1] / self.shape[1] as f64,
            self.size[2] / self.shape[2] as f64,
        ]
    }

    pub fn voxel_volume(&self) -> f64 {
        self.voxel_size().iter().product()
    }

    /// Max corner `(z, x, y)`
    pub fn max(&self) -> [f64; 3] {
        [
            self.min[0] + self.size[0],
            self.min[1] + self.size[1],
            self.min[2] + self.size[2],
        ]
    }

    /// Index of the `z` slice containing height `z`, if any.
    ///
    /// Slices are half open: `[min, min + dz)`.
    pub fn slice_of(&self, z: f64) -> Option<usize> {
        let offset = (z - self.min[0]) / self.voxel_size()[0];
        if !offset.is_finite() || offset < 0.0 {
            return None;
        }
        let index = offset.floor() as usize;
        (index < self.shape[0]).then_some(index)
    }

    pub fn voxel_count(&self) -> usize {
        self.shape.iter().product()
    }
}

/// An object grid with its placement in reconstruction space
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    grid: Array4<f32>,
    geometry: GridGeometry,
}

impl Volume {
    /// Wrap `grid` with min corner `min` and side lengths `size`
    pub fn new(grid: Array4<f32>, min: [f64; 3], size: [f64; 3]) -> TikeDataResult<Self> {
        let dim = grid.dim();
        if dim.3 == 0 {
            return Err(TikeDataError::EmptyGrid(grid.shape().to_vec()));
        }
        let geometry = GridGeometry::new(min, size, [dim.0, dim.1, dim.2])?;
        Ok(Self { grid, geometry })
    }

    /// Wrap `grid` as a unit cube centred on the origin
    pub fn with_default_bounds(grid: Array4<f32>) -> TikeDataResult<Self> {
        Self::new(grid, DEFAULT_OBJECT_MIN, DEFAULT_OBJECT_SIZE)
    }

    /// An all-zero volume of `P` properties over `geometry`
    pub fn zeros(geometry: GridGeometry, properties: usize) -> TikeDataResult<Self> {
        if properties == 0 {
            return Err(TikeDataError::EmptyGrid(vec![
                geometry.shape[0],
                geometry.shape[1],
                geometry.shape[2],
                0,
            ]));
        }
        let [z, x, y] = geometry.shape;
        Ok(Self {
            grid: Array4::zeros((z, x, y, properties)),
            geometry,
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Number of properties `P` stored at each voxel
    pub fn properties(&self) -> usize {
        self.grid.dim().3
    }

    pub fn grid(&self) -> ArrayView4<'_, f32> {
        self.grid.view()
    }

    pub fn grid_mut(&mut self) -> ArrayViewMut4<'_, f32> {
        self.grid.view_mut()
    }

    pub fn into_grid(self) -> Array4<f32> {
        self.grid
    }

    /// Replace the grid, keeping the placement. The shape must not change.
    pub fn replace_grid(&mut self, grid: Array4<f32>) -> TikeDataResult<()> {
        if grid.shape() != self.grid.shape() {
            return Err(TikeDataError::ShapeMismatch {
                expected: self.grid.shape().to_vec(),
                actual: grid.shape().to_vec(),
            });
        }
        self.grid = grid;
        Ok(())
    }
}
