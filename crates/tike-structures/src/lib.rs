// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! # Tike Structures
//!
//! The data types shared by every Tike crate:
//! - **Volume**: an object grid `(Z, X, Y, P)` placed in reconstruction space
//! - **Acquisition**: the geometry of `M` probes in `theta, h, v` space
//! - **Ray**: a single line through the object
//!
//! ## Coordinate Systems
//!
//! `theta, h, v`: `h, v` are the horizontal and vertical directions
//! perpendicular to the probe direction, positive to the right and up.
//! `theta` is the rotation angle around the vertical reconstruction axis `z`.
//! `z` is parallel to `v`, and the right hand rule gives reconstruction space
//! coordinates `z, x, y`. `theta` is measured from the `x` axis, so when
//! `theta = 0`, `h` is parallel to `y`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod acquisition;
mod error;
mod ray;
mod volume;

pub use acquisition::{Acquisition, ProbeRay, DEFAULT_PROBE_SIZE, DEFAULT_PROBE_CORNER};
pub use error::{TikeDataError, TikeDataResult};
pub use ray::Ray;
pub use volume::{GridGeometry, Volume, DEFAULT_OBJECT_MIN, DEFAULT_OBJECT_SIZE};
