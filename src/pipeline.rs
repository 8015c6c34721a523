// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration driven workflows shared by the command line tools.
//!
//! - [`plan_coverage`]: coverage map of a scan pattern seen through the
//!   configured probe
//! - [`reconstruct_phantom`]: simulate an acquisition of a phantom and
//!   reconstruct it with the configured algorithm

use ndarray::{Array2, Axis};
use serde::Serialize;
use std::f64::consts::PI;
use tracing::{debug, info, warn};

use tike_config::{validate_config, ScanConfig, TikeConfig};
use tike_scan::{
    coverage_approx, CoverageMap, Pattern, Probe, Procedure, Region, ScanParameters, TimeWindow,
};
use tike_structures::{Acquisition, GridGeometry, Volume};
use tike_tomo::Algorithm;

use crate::TikeResult;

/// Summary and values of a planned coverage map
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub pattern: Pattern,
    pub region: Region,
    pub pixel_size: f64,
    pub line_width: f64,
    /// Weighted line positions in the procedure
    pub positions: usize,
    /// `(X, Y, Z)`
    pub shape: [usize; 3],
    pub total: f64,
    /// Share of pixels with non-zero coverage
    pub covered_fraction: f64,
    /// Scalar coverage `(X, Y, Z)` in row-major order
    pub map: Vec<f32>,
    /// `(X, Y, Z, 2, 2)` direction tensors when anisotropy was requested
    pub tensor: Option<Vec<f32>>,
}

/// Outcome of a simulated reconstruction
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructionReport {
    pub algorithm: Algorithm,
    pub niter: usize,
    pub n_angles: usize,
    pub rays: usize,
    /// `(Z, X, Y)`
    pub grid: [usize; 3],
    /// `|x - phantom| / |phantom|`
    pub relative_error: f64,
    /// `|A x - b| / |b|`
    pub data_residual: f64,
    /// Share of voxels crossed by at least one probe line
    pub covered_fraction: f64,
}

/// Scan parameters of the `scan` section
pub fn scan_parameters(scan: &ScanConfig) -> ScanParameters {
    ScanParameters {
        a: scan.amplitudes[0],
        b: scan.amplitudes[1],
        fx: scan.frequencies[0],
        fy: scan.frequencies[1],
        fz: scan.frequencies[2],
        px: scan.phases[0],
        py: scan.phases[1],
        time: scan.time,
        hz: scan.hz,
    }
}

/// Coverage map of the configured scan
///
/// Continuous patterns are discretized to one line width per step.
/// Discontinuous ones (raster, spiral) cannot be bisected across their jumps
/// and are used at their sampling rate instead.
pub fn plan_coverage(config: &TikeConfig) -> TikeResult<CoverageReport> {
    validate_config(config)?;
    let pattern: Pattern = config.scan.pattern.parse()?;
    let params = scan_parameters(&config.scan);
    params.validate()?;
    let rotation = config.scan.rotation_speed;
    let trajectory = move |t: f64| {
        let (h, v) = pattern.position(&params, t);
        [rotation * t, h, v]
    };

    let coverage = &config.coverage;
    let mut probe = Probe::new(config.probe.width, config.probe.aspect);
    let procedure = if pattern.is_continuous() {
        let window = TimeWindow {
            start: 0.0,
            end: config.scan.time,
            step: coverage.dt,
        };
        probe.procedure(trajectory, coverage.pixel_size, window)?
    } else {
        warn!(
            "{} scan is discontinuous; using its {} Hz samples",
            pattern, config.scan.hz
        );
        sampled_procedure(&mut probe, pattern, &params, rotation, coverage.pixel_size)?
    };
    info!(
        "{} pattern gives {} weighted positions",
        pattern,
        procedure.lines.len()
    );

    let map = coverage_approx(
        &procedure.lines,
        coverage.region,
        coverage.pixel_size,
        procedure.line_width,
        coverage.anisotropy,
    )?;
    let scalar = map.total();
    let covered = scalar.iter().filter(|value| **value > 0.0).count();
    let tensor = match &map {
        CoverageMap::Tensor(tensor) => Some(tensor.iter().copied().collect()),
        CoverageMap::Scalar(_) => None,
    };

    Ok(CoverageReport {
        pattern,
        region: coverage.region,
        pixel_size: coverage.pixel_size,
        line_width: procedure.line_width,
        positions: procedure.lines.len(),
        shape: map.shape(),
        total: scalar.iter().map(|v| *v as f64).sum(),
        covered_fraction: covered as f64 / scalar.len().max(1) as f64,
        map: scalar.iter().copied().collect(),
        tensor,
    })
}

/// Procedure from the pattern samples, each held for `1 / hz` seconds
fn sampled_procedure(
    probe: &mut Probe,
    pattern: Pattern,
    params: &ScanParameters,
    rotation: f64,
    pixel_size: f64,
) -> TikeResult<Procedure> {
    let lines = probe.line_offsets(pixel_size)?;
    let path = pattern.generate(params)?;
    let dwell = 1.0 / params.hz;
    let mut rows = Vec::with_capacity(lines.len() * path.t.len());
    for line in &lines {
        for ((t, h), v) in path.t.iter().zip(&path.x).zip(&path.y) {
            rows.push([
                rotation * t + line.offset[0],
                h + line.offset[1],
                v + line.offset[2],
                dwell * line.weight,
            ]);
        }
    }
    Ok(Procedure {
        lines: rows,
        line_width: probe.line_width,
    })
}

/// Grid geometry of the `geometry` section
pub fn object_geometry(config: &TikeConfig) -> TikeResult<GridGeometry> {
    let geometry = &config.geometry;
    Ok(GridGeometry::new(
        geometry.object_min,
        geometry.object_size,
        geometry.grid,
    )?)
}

/// A cylinder along `z` with a denser off-centre rod
///
/// Every property channel holds the same values.
pub fn phantom(geometry: GridGeometry, properties: usize) -> TikeResult<Volume> {
    let mut volume = Volume::zeros(geometry, properties)?;
    let [_, dx, dy] = geometry.voxel_size();
    let centre_x = geometry.min[1] + geometry.size[1] / 2.0;
    let centre_y = geometry.min[2] + geometry.size[2] / 2.0;
    let radius = 0.35 * geometry.size[1].min(geometry.size[2]);
    let rod = (centre_x + 0.4 * radius, centre_y, 0.25 * radius);

    volume
        .grid_mut()
        .indexed_iter_mut()
        .for_each(|((_, ix, iy, _), value)| {
            let x = geometry.min[1] + (ix as f64 + 0.5) * dx;
            let y = geometry.min[2] + (iy as f64 + 0.5) * dy;
            if (x - rod.0).hypot(y - rod.1) < rod.2 {
                *value = 2.0;
            } else if (x - centre_x).hypot(y - centre_y) < radius {
                *value = 1.0;
            }
        });
    Ok(volume)
}

/// `n_angles` probes over a half turn, centred on the object
pub fn simulated_acquisition(config: &TikeConfig) -> TikeResult<Acquisition> {
    let n = config.reconstruction.n_angles;
    let [size_h, size_v] = config.probe.probe_size;
    let [grid_h, grid_v] = config.probe.probe_grid;
    let geometry = &config.geometry;
    let centre_z = geometry.object_min[0] + geometry.object_size[0] / 2.0;

    let theta: Vec<f64> = (0..n).map(|i| i as f64 * PI / n as f64).collect();
    let h = vec![-size_h / 2.0; n];
    let v = vec![centre_z - size_v / 2.0; n];
    Ok(Acquisition::new(
        (grid_h, grid_v),
        [size_h, size_v],
        theta,
        Some(h),
        Some(v),
    )?)
}

fn norm(values: impl Iterator<Item = f32>) -> f64 {
    values.map(|v| (v as f64).powi(2)).sum::<f64>().sqrt()
}

fn difference_norm<'a>(
    a: impl Iterator<Item = &'a f32>,
    b: impl Iterator<Item = &'a f32>,
) -> f64 {
    norm(a.zip(b).map(|(x, y)| x - y))
}

/// Simulate, reconstruct and score a phantom
///
/// Returns the reconstruction and its report.
pub fn reconstruct_phantom(config: &TikeConfig) -> TikeResult<(Volume, ReconstructionReport)> {
    validate_config(config)?;
    let algorithm: Algorithm = config.reconstruction.algorithm.parse()?;
    let niter = config.reconstruction.niter;

    let geometry = object_geometry(config)?;
    let truth = phantom(geometry, 1)?;
    let acquisition = simulated_acquisition(config)?;
    let data = tike_tomo::project_forward(&truth, &acquisition)?;

    let guess = Volume::zeros(geometry, 1)?;
    let result = tike_tomo::reconstruct(&guess, &acquisition, data.view(), algorithm, niter)?;

    let truth_norm = norm(truth.grid().iter().copied()).max(f64::MIN_POSITIVE);
    let relative_error = difference_norm(result.grid().iter(), truth.grid().iter()) / truth_norm;
    let simulated = tike_tomo::project_forward(&result, &acquisition)?;
    let data_norm = norm(data.iter().copied()).max(f64::MIN_POSITIVE);
    let data_residual = difference_norm(simulated.iter(), data.iter()) / data_norm;
    let covered_fraction = covered_fraction(config, geometry, &acquisition)?;
    debug!(
        "{} reconstruction error {:.4}, residual {:.4}",
        algorithm, relative_error, data_residual
    );

    let report = ReconstructionReport {
        algorithm,
        niter,
        n_angles: acquisition.num_probes(),
        rays: acquisition.ray_count(),
        grid: geometry.shape,
        relative_error,
        data_residual,
        covered_fraction,
    };
    Ok((result, report))
}

/// Share of voxels seen in every angular bin by `acquisition`
fn covered_fraction(
    config: &TikeConfig,
    geometry: GridGeometry,
    acquisition: &Acquisition,
) -> TikeResult<f64> {
    let bins = config.coverage.angle_bins;
    let map = Volume::zeros(geometry, bins)?;
    let (columns, rows) = acquisition.probe_shape();
    let probe_grid = Array2::<f32>::ones((columns, rows));
    let map = tike_tomo::coverage(
        map,
        probe_grid.view(),
        acquisition.probe_size(),
        acquisition.theta().to_vec(),
        Some(acquisition.h().to_vec()),
        Some(acquisition.v().to_vec()),
        None,
    )?;
    let seen = map
        .grid()
        .lanes(Axis(3))
        .into_iter()
        .filter(|lane| lane.iter().all(|v| *v > 0.0))
        .count();
    Ok(seen as f64 / geometry.voxel_count() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TikeConfig {
        let mut config = TikeConfig::default();
        config.geometry.grid = [2, 16, 16];
        config.probe.probe_grid = [24, 2];
        config.reconstruction.n_angles = 24;
        config
    }

    #[test]
    fn test_phantom_has_rod_inside_cylinder() {
        let geometry = GridGeometry::new([-0.5; 3], [1.0; 3], [1, 20, 20]).unwrap();
        let volume = phantom(geometry, 2).unwrap();
        let grid = volume.grid();
        assert_eq!(grid[[0, 0, 0, 0]], 0.0);
        assert_eq!(grid[[0, 10, 10, 1]], 1.0);
        assert!(grid.iter().any(|v| *v == 2.0));
        assert_eq!(grid.index_axis(Axis(3), 0), grid.index_axis(Axis(3), 1));
    }

    #[test]
    fn test_simulated_acquisition_spans_half_turn() {
        let config = small_config();
        let acquisition = simulated_acquisition(&config).unwrap();
        assert_eq!(acquisition.num_probes(), 24);
        assert_eq!(acquisition.probe_shape(), (24, 2));
        let (low, high) = acquisition.angular_range();
        assert_eq!(low, 0.0);
        assert!(high < PI);
        assert!(acquisition.h().iter().all(|h| *h == -0.75));
    }

    #[test]
    fn test_scan_parameters_follow_config() {
        let mut scan = ScanConfig::default();
        scan.amplitudes = [0.3, 0.2];
        scan.frequencies = [5.0, 4.0, 0.5];
        let params = scan_parameters(&scan);
        assert_eq!((params.a, params.b), (0.3, 0.2));
        assert_eq!((params.fx, params.fy, params.fz), (5.0, 4.0, 0.5));
        assert_eq!(params.hz, scan.hz);
    }

    #[test]
    fn test_reconstruction_improves_on_zero_guess() {
        let mut config = small_config();
        config.reconstruction.niter = 10;
        let (result, report) = reconstruct_phantom(&config).unwrap();
        assert_eq!(result.grid().dim(), (2, 16, 16, 1));
        assert!(report.relative_error < 1.0, "{report:?}");
        assert!(report.data_residual < 1.0, "{report:?}");
        assert!(report.covered_fraction > 0.5, "{report:?}");
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let mut config = small_config();
        config.reconstruction.algorithm = "fbp".to_string();
        assert!(reconstruct_phantom(&config).is_err());
    }

    #[test]
    fn test_raster_coverage_uses_samples() {
        let mut config = TikeConfig::default();
        config.scan.pattern = "raster".to_string();
        config.scan.time = 0.2;
        config.coverage.pixel_size = 0.2;
        config.probe.width = 0.2;
        let report = plan_coverage(&config).unwrap();
        assert_eq!(report.shape, [5, 5, 5]);
        assert_eq!(report.map.len(), 125);
        assert!(report.total > 0.0);
        assert!(report.tensor.is_none());
    }
}
