// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! # Tike Tomography
//!
//! Functions for solving the tomography problem:
//! - **Siddon**: exact ray/voxel intersection lengths
//! - **Coverage**: how much each voxel is seen by a scanning procedure
//! - **Projection**: forward (simulated acquisition) and backward (adjoint) operators
//! - **Solvers**: ART and SIRT iterative reconstruction
//!
//! Every function follows the same interface: an object [`Volume`] of shape
//! `(Z, X, Y, P)` placed by its min corner and side lengths, and an
//! [`Acquisition`] of `M` probes, each a raster of `H x V` rays whose min
//! corner is `(theta, h, v)`. Probe data has shape `(M, H, V, P)`.
//!
//! Rays are horizontal, so each one lies inside a single `z` slice. All
//! kernels group rays by slice and process slices in parallel with rayon.
//!
//! ```rust,no_run
//! use ndarray::Array4;
//! use tike_structures::{Acquisition, Volume};
//! use tike_tomo::{project_forward, reconstruct, Algorithm};
//!
//! let phantom = Volume::with_default_bounds(Array4::ones((4, 16, 16, 1)))?;
//! let theta: Vec<f64> = (0..32).map(|i| i as f64 * std::f64::consts::PI / 32.0).collect();
//! let acquisition = Acquisition::new((32, 4), [1.5, 1.0], theta, Some(vec![-0.75; 32]), None)?;
//!
//! let data = project_forward(&phantom, &acquisition)?;
//! let guess = Volume::zeros(*phantom.geometry(), 1)?;
//! let recon = reconstruct(&guess, &acquisition, data.view(), Algorithm::Sirt, 20)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coverage;
mod error;
pub mod projection;
pub mod siddon;
pub mod solvers;
pub mod system;

pub use coverage::{coverage, coverage_lines, coverage_tensor, line_offsets, CoverageLine};
pub use error::{TomoError, TomoResult};
pub use projection::{project_backward, project_forward};
pub use siddon::{intersections, trace, trace_slice, Crossing};
pub use solvers::{art, reconstruct, sirt, Algorithm};
pub use system::SystemMatrix;

pub use tike_structures::{Acquisition, GridGeometry, Ray, Volume};
