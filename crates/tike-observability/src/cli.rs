// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-tike-tomo`, `--debug-tike-scan`, etc.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Crates with debug logging switched on
///
/// # Example
/// ```rust
/// use tike_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-tike-tomo".to_string()]);
/// assert!(flags.is_enabled("tike-tomo"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}`.
    /// `--debug-all` enables all known crates. Other arguments are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Parse a `TIKE_DEBUG` value: `all` or comma-separated crate names
    pub fn from_env_value(value: &str) -> Self {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value(value);
        flags
    }

    /// Also enable the crates named by `TIKE_DEBUG`
    pub fn with_env(mut self) -> Self {
        if let Ok(value) = env::var("TIKE_DEBUG") {
            self.merge_env_value(&value);
        }
        self
    }

    fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',').map(str::trim) {
            if !crate_name.is_empty() {
                self.enable(crate_name);
            }
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for enabled crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Directive string for `EnvFilter`
    ///
    /// Format: `"tike_tomo=debug,tike_scan=debug,info"`, where the trailing
    /// directive is `default_level`.
    pub fn to_filter_string_with_default(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|name| format!("{}=debug", crate_target(name)))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }

    /// Directive string with an `info` default
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_default("info")
    }
}

/// Debug flags from the process arguments and `TIKE_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    CrateDebugFlags::from_args(env::args()).with_env()
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  TIKE_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  TIKE_DEBUG=all                              Enable debug for all crates

Examples:
  --debug-tike-tomo
  --debug-tike-tomo --debug-tike-scan
  TIKE_DEBUG=tike-tomo,tike-scan
"#,
        KNOWN_CRATES.join(", ")
    )
}
