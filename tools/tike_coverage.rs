// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Coverage planner.
//!
//! Loads `tike_configuration.toml`, follows the configured scan pattern with
//! the configured probe and writes the coverage map as JSON to
//! `<output_dir>/coverage.json`.

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tike::cli::{init_tool_logging, parse_tool_args, ToolArgs};
use tike::pipeline::plan_coverage;
use tracing::info;

/// Map how well the configured scan covers its region
///
/// Override keys: max_cores, log_level, output_dir, pattern, scan_time,
/// pixel_size, anisotropy
#[derive(Parser, Debug)]
#[command(name = "tike_coverage", version)]
struct Args {
    #[command(flatten)]
    common: ToolArgs,
}

fn main() -> Result<()> {
    let (args, debug_flags) = parse_tool_args::<Args>();
    let config = args.common.resolve_config()?;

    let _logging = init_tool_logging(&config, &debug_flags)?;
    tike::configure_thread_pool(config.system.max_cores)?;

    let report = plan_coverage(&config)?;
    info!(
        "{} coverage over {:?} pixels, {:.1}% covered",
        report.pattern,
        report.shape,
        100.0 * report.covered_fraction
    );

    let output = args.common.output_path(&config, "coverage.json");
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}
