// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Reconstruction check.
//!
//! Builds a phantom on the configured grid, simulates an acquisition of
//! `reconstruction.n_angles` probes, reconstructs it with the configured
//! algorithm and writes the report (and optionally the volume) as JSON.

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tike::cli::{init_tool_logging, parse_tool_args, ToolArgs};
use tike::pipeline::reconstruct_phantom;
use tracing::info;

/// Reconstruct a simulated phantom with the configured algorithm
///
/// Override keys: max_cores, log_level, output_dir, algorithm, niter, n_angles
#[derive(Parser, Debug)]
#[command(name = "tike_reconstruct", version)]
struct Args {
    #[command(flatten)]
    common: ToolArgs,

    /// Include the reconstructed volume in the output
    #[arg(long)]
    with_volume: bool,
}

fn main() -> Result<()> {
    let (args, debug_flags) = parse_tool_args::<Args>();
    let config = args.common.resolve_config()?;

    let _logging = init_tool_logging(&config, &debug_flags)?;
    tike::configure_thread_pool(config.system.max_cores)?;

    let (volume, report) = reconstruct_phantom(&config)?;
    info!(
        "{} x{}: relative error {:.4}, data residual {:.4}",
        report.algorithm, report.niter, report.relative_error, report.data_residual
    );

    let mut document = json!({ "report": report });
    if args.with_volume {
        let grid = volume.grid();
        document["volume"] = json!({
            "shape": grid.shape(),
            "geometry": volume.geometry(),
            "values": grid.iter().copied().collect::<Vec<f32>>(),
        });
    }

    let output = args.common.output_path(&config, "reconstruction.json");
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    fs::write(&output, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}
