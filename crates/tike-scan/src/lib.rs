// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! # Tike Scan
//!
//! Planning tools for 3D scanning.
//!
//! ## Coverage Workflow
//!
//! 1. Define a trajectory in `theta, h, v` space, `trajectory(t) -> [theta, h, v]`
//! 2. Split the [`Probe`] cross section into weighted thick lines using its
//!    density profile
//! 3. Offset the trajectory for each line and discretize it with
//!    [`discrete_trajectory`] so that no step is longer than one line width
//! 4. Send the weighted line positions to [`coverage_approx`]
//!
//! ```rust,no_run
//! use tike_scan::{Pattern, Probe, ScanParameters, TimeWindow};
//!
//! let params = ScanParameters { fx: 3.0, fy: 2.0, ..Default::default() };
//! let trajectory = |t: f64| {
//!     let (h, v) = Pattern::Lissajous.position(&params, t);
//!     [0.0, h * 0.4, v * 0.4]
//! };
//! let mut probe = Probe::default();
//! let window = TimeWindow { start: 0.0, end: 1.0, step: 0.01 };
//! let region = [[-0.5, 0.5], [-0.5, 0.5], [-0.5, 0.5]];
//! let map = probe.coverage(trajectory, region, 0.1, window, false)?;
//! # Ok::<(), tike_scan::ScanError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coordinates;
pub mod coverage;
mod error;
pub mod metrics;
pub mod patterns;
pub mod probe;
pub mod trajectory;
pub mod waveforms;

pub use coordinates::{euclidian_dist, thetahv_to_xyz, DEFAULT_RADIUS};
pub use coverage::{coverage_approx, CoverageMap, Region};
pub use error::{ScanError, ScanResult};
pub use metrics::{avgspeed, distance, lengths};
pub use patterns::{lissajous, raster, scan3, spiral, Pattern, ScanParameters, ScanPath};
pub use probe::{Probe, ProbeLine, Procedure, TimeWindow};
pub use trajectory::{discrete_trajectory, DiscreteTrajectory, DEFAULT_MAX_ITER};
pub use waveforms::{
    exposure, f2w, period, sawtooth, scantime, sinusoid, square, staircase, triangle, Waveform,
};
