// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `tike_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TikeConfig {
    pub system: SystemConfig,
    pub geometry: GeometryConfig,
    pub probe: ProbeConfig,
    pub scan: ScanConfig,
    pub coverage: CoverageConfig,
    pub reconstruction: ReconstructionConfig,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Worker threads for slice parallelism
    pub max_cores: usize,
    pub log_level: String,
    /// Directory the tools write their results to
    pub output_dir: PathBuf,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_cores: 0, // 0 = auto-detect
            log_level: "INFO".to_string(),
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Placement and resolution of the object grid
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Min corner `(z, x, y)`
    pub object_min: [f64; 3],
    /// Side lengths `(z, x, y)`
    pub object_size: [f64; 3],
    /// Voxels `(Z, X, Y)`
    pub grid: [usize; 3],
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            object_min: [-0.5, -0.5, -0.5],
            object_size: [1.0, 1.0, 1.0],
            grid: [4, 32, 32],
        }
    }
}

/// Probe used for coverage planning and simulated acquisitions
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Extent along `h` of the coverage probe
    pub width: f64,
    /// Ratio of the extent along `v` to `width`
    pub aspect: f64,
    /// Side lengths `(h, v)` of an acquisition probe
    pub probe_size: [f64; 2],
    /// Rays `(H, V)` of an acquisition probe
    pub probe_grid: [usize; 2],
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            width: 0.1,
            aspect: 1.0,
            probe_size: [1.5, 1.0],
            probe_grid: [48, 4],
        }
    }
}

/// Scan trajectory
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// "lissajous", "raster" or "spiral"
    pub pattern: String,
    /// Amplitudes `(A, B)` of the `h` and `v` axes
    pub amplitudes: [f64; 2],
    /// Frequencies `(fx, fy, fz)` in Hz
    pub frequencies: [f64; 3],
    /// Phases `(px, py)` in radians
    pub phases: [f64; 2],
    /// Duration in seconds
    pub time: f64,
    /// Sampling rate in Hz
    pub hz: f64,
    /// Rotation speed in radians per second
    pub rotation_speed: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pattern: "lissajous".to_string(),
            amplitudes: [0.4, 0.4],
            frequencies: [3.0, 2.0, 1.0],
            phases: [0.0, 0.0],
            time: 1.0,
            hz: 100.0,
            rotation_speed: 0.0,
        }
    }
}

/// Coverage map settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Edge length of the map pixels
    pub pixel_size: f64,
    /// `[[xmin, xmax], [ymin, ymax], [zmin, zmax]]`
    pub region: [[f64; 2]; 3],
    /// Maximum time step of the discretized trajectory
    pub dt: f64,
    /// Produce a direction tensor per pixel
    pub anisotropy: bool,
    /// Angular bins of an object-space coverage map
    pub angle_bins: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            pixel_size: 0.1,
            region: [[-0.5, 0.5], [-0.5, 0.5], [-0.5, 0.5]],
            dt: 0.01,
            anisotropy: false,
            angle_bins: 1,
        }
    }
}

/// Iterative reconstruction settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// "art" or "sirt"
    pub algorithm: String,
    pub niter: usize,
    /// Probe angles spread over a half turn in simulated acquisitions
    pub n_angles: usize,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            algorithm: "sirt".to_string(),
            niter: 20,
            n_angles: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: TikeConfig = toml::from_str(
            r#"
            [coverage]
            pixel_size = 0.05
            region = [[0.0, 1.0], [0.0, 1.0], [0.0, 0.5]]

            [reconstruction]
            algorithm = "art"
            "#,
        )
        .unwrap();
        assert_eq!(config.coverage.pixel_size, 0.05);
        assert_eq!(config.coverage.region[2], [0.0, 0.5]);
        assert_eq!(config.coverage.dt, 0.01);
        assert_eq!(config.reconstruction.algorithm, "art");
        assert_eq!(config.reconstruction.niter, 20);
        assert_eq!(config.scan, ScanConfig::default());
    }
}
