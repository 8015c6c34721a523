// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! # tike-observability
//!
//! Logging infrastructure shared by the Tike crates and tools.
//!
//! Every crate logs through `tracing`; this crate decides where those events
//! go. Debug output can be switched on per crate with `--debug-<crate>` flags
//! or the `TIKE_DEBUG` environment variable.
//!
//! ## Features
//! - `file-logging`: per-run log folders with one JSON file per crate

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known Tike crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "tike",
    "tike-config",
    "tike-structures",
    "tike-tomo",
    "tike-scan",
];

/// Tracing target of a crate name (`tike-tomo` logs as `tike_tomo`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
