// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! # Tike - tomographic reconstruction and scan planning
//!
//! Tike is a toolbox for tomographic reconstruction of 3D objects from
//! probe measurements. The kernels that do the heavy lifting (Siddon ray
//! tracing, coverage maps, projection operators, ART and SIRT) are written in
//! Rust and parallelized over object slices with rayon.
//!
//! ## Feature Flags
//!
//! - **`full`** (default): every component below
//! - **`scan`**: scan waveforms, trajectories and approximate coverage planning
//! - **`config`**: `tike_configuration.toml` loading and validation
//! - **`observability`**: logging setup and per-crate debug flags
//! - **`cli`**: argument parsing and logging setup shared by the tools
//! - **`file-logging`**: per-run JSON log files for the tools
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use tike::prelude::*;
//!
//! let phantom = Volume::with_default_bounds(ndarray::Array4::ones((2, 16, 16, 1)))?;
//! let theta: Vec<f64> = (0..16).map(|i| i as f64 * std::f64::consts::PI / 16.0).collect();
//! let acquisition = Acquisition::new((24, 2), [1.5, 1.0], theta, Some(vec![-0.75; 16]), None)?;
//!
//! let data = project_forward(&phantom, &acquisition)?;
//! let guess = Volume::zeros(*phantom.geometry(), 1)?;
//! let recon = reconstruct(&guess, &acquisition, data.view(), Algorithm::Art, 5)?;
//! # Ok::<(), tike::TikeError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "cli")]
pub mod cli;
mod error;
#[cfg(all(feature = "scan", feature = "config"))]
pub mod pipeline;

pub use error::{TikeError, TikeResult};

// Re-export foundation
pub use tike_structures as structures;
pub use tike_tomo as tomo;

#[cfg(feature = "scan")]
pub use tike_scan as scan;

#[cfg(feature = "config")]
pub use tike_config as config;

#[cfg(feature = "observability")]
pub use tike_observability as observability;

/// Size the global rayon pool that runs the slice kernels
///
/// `0` keeps rayon's default of one thread per core. The pool can only be
/// configured once per process.
pub fn configure_thread_pool(max_cores: usize) -> TikeResult<()> {
    if max_cores == 0 {
        return Ok(());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(max_cores)
        .thread_name(|i| format!("tike-worker-{}", i))
        .build_global()?;
    tracing::info!("slice kernels limited to {} threads", max_cores);
    Ok(())
}

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::{TikeError, TikeResult};
    pub use tike_structures::{Acquisition, GridGeometry, Ray, Volume};
    pub use tike_tomo::{
        art, coverage, project_backward, project_forward, reconstruct, sirt, Algorithm,
    };

    #[cfg(feature = "scan")]
    pub use tike_scan::{
        coverage_approx, discrete_trajectory, CoverageMap, Pattern, Probe, ScanParameters,
        TimeWindow,
    };

    #[cfg(feature = "config")]
    pub use tike_config::{load_config, validate_config, TikeConfig};
}
