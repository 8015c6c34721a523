// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Sparse system matrix.

Each row holds the voxels one ray crosses and the intersection lengths.
Rows are bucketed by the `z` slice their ray lies in, keeping acquisition
order within a slice, so slices can be processed independently in parallel.
*/

use crate::siddon::trace;
use rayon::prelude::*;
use tike_structures::{GridGeometry, Ray};

/// One voxel of a row: slice-local `(x, y)` and intersection length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub x: usize,
    pub y: usize,
    pub length: f32,
}

/// The crossings of one ray
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Index of the ray in the list the matrix was built from
    pub ray: usize,
    pub entries: Vec<Entry>,
}

impl Row {
    /// Sum of the intersection lengths
    pub fn length_sum(&self) -> f32 {
        self.entries.iter().map(|e| e.length).sum()
    }

    /// Squared norm of the row
    pub fn norm_squared(&self) -> f32 {
        self.entries.iter().map(|e| e.length * e.length).sum()
    }
}

/// Rays through a volume, grouped by slice
#[derive(Debug, Clone)]
pub struct SystemMatrix {
    geometry: GridGeometry,
    slices: Vec<Vec<Row>>,
    ray_count: usize,
}

impl SystemMatrix {
    /// Trace every ray through `geometry`.
    ///
    /// Rays outside the object, or crossing no voxel, produce no row.
    pub fn build(geometry: &GridGeometry, rays: &[Ray]) -> Self {
        let traced: Vec<Option<(usize, Row)>> = rays
            .par_iter()
            .enumerate()
            .map(|(index, ray)| {
                let mut entries = Vec::new();
                let slice = trace(geometry, ray, |x, y, length| {
                    entries.push(Entry {
                        x,
                        y,
                        length: length as f32,
                    })
                })?;
                (!entries.is_empty()).then_some((slice, Row { ray: index, entries }))
            })
            .collect();

        let mut slices = vec![Vec::new(); geometry.shape[0]];
        for (slice, row) in traced.into_iter().flatten() {
            slices[slice].push(row);
        }

        Self {
            geometry: *geometry,
            slices,
            ray_count: rays.len(),
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Rows of every slice, indexed by slice
    pub fn slices(&self) -> &[Vec<Row>] {
        &self.slices
    }

    /// Number of rays the matrix was built from, including rays without a row
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Number of rays that cross the object
    pub fn row_count(&self) -> usize {
        self.slices.iter().map(Vec::len).sum()
    }

    /// Number of stored `(voxel, length)` entries
    pub fn nonzeros(&self) -> usize {
        self.slices
            .iter()
            .flat_map(|rows| rows.iter())
            .map(|row| row.entries.len())
            .sum()
    }

    /// Sum of the intersection lengths through each voxel, `(Z, X, Y)`
    pub fn column_sums(&self) -> ndarray::Array3<f32> {
        let [nz, nx, ny] = self.geometry.shape;
        let mut sums = ndarray::Array3::<f32>::zeros((nz, nx, ny));
        for (slice, rows) in self.slices.iter().enumerate() {
            for entry in rows.iter().flat_map(|row| row.entries.iter()) {
                sums[[slice, entry.x, entry.y]] += entry.length;
            }
        }
        sums
    }
}

/// Bucket item indices by the slice of their height, dropping items outside
/// the object. Order within a bucket follows `heights`.
pub fn bucket_by_slice<I>(geometry: &GridGeometry, heights: I) -> Vec<Vec<usize>>
where
    I: IntoIterator<Item = f64>,
{
    let mut buckets = vec![Vec::new(); geometry.shape[0]];
    for (index, v) in heights.into_iter().enumerate() {
        if let Some(slice) = geometry.slice_of(v) {
            buckets[slice].push(index);
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GridGeometry {
        GridGeometry::new([0.0, -0.5, -0.5], [2.0, 1.0, 1.0], [2, 4, 4]).unwrap()
    }

    #[test]
    fn test_rows_grouped_by_slice_in_order() {
        let rays = vec![
            Ray::new(0.0, 0.0, 1.5),
            Ray::new(0.0, 0.0, 0.5),
            Ray::new(0.5, 0.1, 1.2),
            Ray::new(0.0, 0.0, 5.0),
            Ray::new(0.0, 2.0, 0.5),
        ];
        let matrix = SystemMatrix::build(&geometry(), &rays);
        assert_eq!(matrix.ray_count(), 5);
        assert_eq!(matrix.row_count(), 3);
        let slice0: Vec<usize> = matrix.slices()[0].iter().map(|r| r.ray).collect();
        let slice1: Vec<usize> = matrix.slices()[1].iter().map(|r| r.ray).collect();
        assert_eq!(slice0, vec![1]);
        assert_eq!(slice1, vec![0, 2]);
    }

    #[test]
    fn test_row_norms() {
        let matrix = SystemMatrix::build(&geometry(), &[Ray::new(0.0, 0.1, 0.5)]);
        let row = &matrix.slices()[0][0];
        assert!((row.length_sum() - 1.0).abs() < 1e-6);
        assert!((row.norm_squared() - 0.25).abs() < 1e-6);
        assert_eq!(matrix.nonzeros(), 4);
    }

    #[test]
    fn test_column_sums() {
        let rays = vec![Ray::new(0.0, 0.1, 0.5), Ray::new(0.0, 0.1, 0.7)];
        let sums = SystemMatrix::build(&geometry(), &rays).column_sums();
        assert!((sums[[0, 0, 2]] - 0.5).abs() < 1e-6);
        assert_eq!(sums[[1, 0, 2]], 0.0);
        assert_eq!(sums[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_bucket_by_slice() {
        let buckets = bucket_by_slice(&geometry(), vec![0.1, 1.9, -1.0, 0.2]);
        assert_eq!(buckets, vec![vec![0, 3], vec![1]]);
    }
}
