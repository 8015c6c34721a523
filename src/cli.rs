// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Command line handling shared by the Tike tools.
//!
//! `--debug-<crate>` flags are taken out of the arguments before clap sees
//! them, so every known crate works without declaring one flag per crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, FromArgMatches, Parser};
use tike_config::{load_config_or_defaults, TikeConfig};
use tike_observability::{debug_flags_help, CrateDebugFlags, LoggingConfig};

/// Options common to every tool
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    /// Configuration file [default: $TIKE_CONFIG_PATH, ./tike_configuration.toml
    /// or a parent directory; built-in defaults when none exists]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output file [default: a file in system.output_dir]
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override a configuration value (repeatable), e.g. `--set niter=50`
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,
}

impl ToolArgs {
    pub fn override_map(&self) -> HashMap<String, String> {
        self.overrides.iter().cloned().collect()
    }

    /// Configuration file plus environment and `--set` overrides
    pub fn resolve_config(&self) -> Result<TikeConfig> {
        load_config_or_defaults(self.config.as_deref(), Some(&self.override_map()))
            .context("Failed to load configuration")
    }

    /// `--output`, or `file_name` inside `system.output_dir`
    pub fn output_path(&self, config: &TikeConfig, file_name: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.system.output_dir.join(file_name))
    }
}

/// Parse a `key=value` override
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("override must look like key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("override has no key: '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse `args` into `P`, returning the debug flags separately
///
/// # Errors
///
/// Returns the clap error for unknown or malformed arguments, including the
/// `--help` and `--version` displays.
pub fn try_parse_tool_args<P, I>(args: I) -> Result<(P, CrateDebugFlags), clap::Error>
where
    P: Parser,
    I: IntoIterator<Item = String>,
{
    let (debug_args, rest): (Vec<String>, Vec<String>) = args
        .into_iter()
        .partition(|arg| arg.starts_with("--debug-"));
    let matches = P::command()
        .after_help(debug_flags_help())
        .try_get_matches_from(rest)?;
    let parsed = P::from_arg_matches(&matches)?;
    Ok((parsed, CrateDebugFlags::from_args(debug_args).with_env()))
}

/// Parse the process arguments, exiting with usage on error
pub fn parse_tool_args<P: Parser>() -> (P, CrateDebugFlags) {
    try_parse_tool_args(std::env::args()).unwrap_or_else(|e| e.exit())
}

/// Logging settings of a tool run
///
/// Per-run log folders go to `<system.output_dir>/logs` when file logging is
/// compiled in.
pub fn tool_logging_config(config: &TikeConfig) -> LoggingConfig {
    LoggingConfig {
        log_dir: Some(config.system.output_dir.join("logs")),
        ..LoggingConfig::with_level(&config.system.log_level)
    }
}

/// Keeps the tool's log writers alive until the end of `main`
pub struct ToolLogging {
    #[cfg(feature = "file-logging")]
    guard: tike_observability::LoggingGuard,
}

impl ToolLogging {
    /// Folder of this run's log files
    pub fn log_dir(&self) -> Option<&Path> {
        #[cfg(feature = "file-logging")]
        return Some(self.guard.log_dir());
        #[cfg(not(feature = "file-logging"))]
        None
    }
}

/// Install the tool's logger
///
/// Console only by default; with `file-logging` also per-crate JSON files.
pub fn init_tool_logging(config: &TikeConfig, debug_flags: &CrateDebugFlags) -> Result<ToolLogging> {
    let logging = tool_logging_config(config);
    #[cfg(feature = "file-logging")]
    {
        let guard = tike_observability::init_logging(debug_flags, &logging)?;
        Ok(ToolLogging { guard })
    }
    #[cfg(not(feature = "file-logging"))]
    {
        tike_observability::init_console_logging(debug_flags, &logging)?;
        Ok(ToolLogging {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Parser, Debug)]
    #[command(name = "tike_tool")]
    struct TestArgs {
        #[command(flatten)]
        common: ToolArgs,

        #[arg(long)]
        with_volume: bool,
    }

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("tike_tool")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_overrides_and_debug_flags() {
        let (parsed, flags) = try_parse_tool_args::<TestArgs, _>(args(&[
            "--set",
            "niter=5",
            "--debug-tike-tomo",
            "--set",
            " algorithm = art ",
            "--with-volume",
        ]))
        .unwrap();

        assert!(parsed.with_volume);
        let overrides = parsed.common.override_map();
        assert_eq!(overrides["niter"], "5");
        assert_eq!(overrides["algorithm"], "art");
        assert!(flags.is_enabled("tike-tomo"));
        assert!(parsed.common.config.is_none());
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        assert!(try_parse_tool_args::<TestArgs, _>(args(&["--set", "niter"])).is_err());
        assert!(try_parse_tool_args::<TestArgs, _>(args(&["--set", "=5"])).is_err());
        assert!(try_parse_tool_args::<TestArgs, _>(args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_output_defaults_to_output_dir() {
        let (parsed, _) = try_parse_tool_args::<TestArgs, _>(args(&[])).unwrap();
        let mut config = TikeConfig::default();
        config.system.output_dir = PathBuf::from("results");
        assert_eq!(
            parsed.common.output_path(&config, "coverage.json"),
            PathBuf::from("results/coverage.json")
        );
        assert_eq!(
            tool_logging_config(&config).log_dir,
            Some(PathBuf::from("results/logs"))
        );
    }

    #[test]
    fn test_missing_configured_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("tike.toml");

        std::env::set_var("TIKE_CONFIG_PATH", &missing);
        let result = ToolArgs::default().resolve_config();
        std::env::remove_var("TIKE_CONFIG_PATH");

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("TIKE_CONFIG_PATH"));
    }

    #[test]
    fn test_explicit_config_with_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tike.toml");
        std::fs::write(&path, "[scan]\npattern = \"raster\"\n").unwrap();

        let (parsed, _) = try_parse_tool_args::<TestArgs, _>(args(&[
            "--config",
            path.to_str().unwrap(),
            "--set",
            "pixel_size=0.05",
        ]))
        .unwrap();
        let config = parsed.common.resolve_config().unwrap();
        assert_eq!(config.scan.pattern, "raster");
        assert_eq!(config.coverage.pixel_size, 0.05);
    }
}
