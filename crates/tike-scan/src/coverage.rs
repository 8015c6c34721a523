// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Approximate coverage of a discrete procedure.

The intersection between each thick line and each pixel is approximated by
`line_width^2` times the length of the line inside the pixel. The map is
computed in a coordinate system where the pixel size is `1`, over the region
snapped outward to whole pixels.
*/

use crate::error::{ScanError, ScanResult};
use ndarray::{Array3, Array5, Axis};
use tike_structures::{GridGeometry, Volume};
use tike_tomo::coverage::{coverage_lines, coverage_tensor, CoverageLine};
use tracing::{info, warn};

/// Bounds `[[xmin, xmax], [ymin, ymax], [zmin, zmax]]` of a coverage region
pub type Region = [[f64; 2]; 3];

/// Distance from a whole number below which a ratio counts as whole
const SNAP_TOLERANCE: f64 = 1e-9;

/// A coverage map indexed `(X, Y, Z)`
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageMap {
    /// Total weighted intersection per pixel
    Scalar(Array3<f32>),
    /// Second order direction tensor per pixel, `(X, Y, Z, 2, 2)`
    Tensor(Array5<f32>),
}

impl CoverageMap {
    /// Spatial shape `(X, Y, Z)`
    pub fn shape(&self) -> [usize; 3] {
        let s = match self {
            CoverageMap::Scalar(map) => map.shape(),
            CoverageMap::Tensor(map) => map.shape(),
        };
        [s[0], s[1], s[2]]
    }

    /// The scalar map; the trace of each tensor
    pub fn total(&self) -> Array3<f32> {
        match self {
            CoverageMap::Scalar(map) => map.clone(),
            CoverageMap::Tensor(map) => {
                let [nx, ny, nz] = self.shape();
                Array3::from_shape_fn((nx, ny, nz), |(x, y, z)| {
                    map[[x, y, z, 0, 0]] + map[[x, y, z, 1, 1]]
                })
            }
        }
    }
}

fn is_whole(value: f64) -> bool {
    (value - value.round()).abs() < SNAP_TOLERANCE
}

fn snap_down(value: f64) -> f64 {
    if is_whole(value) {
        value.round()
    } else {
        value.floor()
    }
}

fn snap_up(value: f64) -> f64 {
    if is_whole(value) {
        value.round()
    } else {
        value.ceil()
    }
}

/// Approximate procedure coverage with thick lines.
///
/// # Arguments
/// * `procedure` - `[theta, h, v, weight]` rows
/// * `region` - Box to map; bounds should be multiples of `pixel_size`
/// * `pixel_size` - Edge length of the map pixels
/// * `line_width` - Side of the square cross section of each line
/// * `anisotropy` - Return a direction tensor per pixel instead of a scalar
///
/// # Errors
/// * [`ScanError::InvalidRegion`] when a region minimum exceeds its maximum
///
/// A region that is flat along an axis on a whole pixel bound maps to an
/// empty map with a zero length along that axis.
pub fn coverage_approx(
    procedure: &[[f64; 4]],
    region: Region,
    pixel_size: f64,
    line_width: f64,
    anisotropy: bool,
) -> ScanResult<CoverageMap> {
    if !(pixel_size > 0.0) {
        return Err(ScanError::InvalidParameter(format!(
            "pixel_size must be > 0, got {pixel_size}"
        )));
    }
    if region.iter().any(|[lo, hi]| !(lo <= hi)) {
        return Err(ScanError::InvalidRegion(region));
    }
    let scaled = region.map(|[lo, hi]| [lo / pixel_size, hi / pixel_size]);
    if scaled.iter().flatten().any(|bound| !is_whole(*bound)) {
        warn!("Region bounds will be shifted to an integer multiple of the pixel_size");
    }
    let ibox = scaled.map(|[lo, hi]| [snap_down(lo), snap_up(hi)]);
    let shape = ibox.map(|[lo, hi]| (hi - lo) as usize);
    if shape.contains(&0) {
        let [nx, ny, nz] = shape;
        return Ok(if anisotropy {
            CoverageMap::Tensor(Array5::zeros((nx, ny, nz, 2, 2)))
        } else {
            CoverageMap::Scalar(Array3::zeros((nx, ny, nz)))
        });
    }

    // Rotation stays about the origin, so the grid is placed at the snapped
    // min corner instead of shifting the lines.
    let [x, y, z] = ibox;
    let geometry = GridGeometry::new(
        [z[0], x[0], y[0]],
        [z[1] - z[0], x[1] - x[0], y[1] - y[0]],
        [shape[2], shape[0], shape[1]],
    )?;

    let area = line_width * line_width / (pixel_size * pixel_size);
    let lines: Vec<CoverageLine> = procedure
        .iter()
        .map(|[theta, h, v, weight]| CoverageLine {
            theta: *theta,
            h: h / pixel_size,
            v: v / pixel_size,
            weight: weight * area,
        })
        .collect();
    info!(
        "coverage approximation of {} lines over {:?} pixels",
        lines.len(),
        shape
    );

    if anisotropy {
        let tensor = coverage_tensor(&geometry, &lines);
        let map = tensor.permuted_axes([1, 2, 0, 3, 4]);
        Ok(CoverageMap::Tensor(map.as_standard_layout().into_owned()))
    } else {
        let mut volume = Volume::zeros(geometry, 1)?;
        coverage_lines(&mut volume, &lines);
        let map = volume
            .into_grid()
            .index_axis_move(Axis(3), 0)
            .permuted_axes([1, 2, 0]);
        Ok(CoverageMap::Scalar(map.as_standard_layout().into_owned()))
    }
}
