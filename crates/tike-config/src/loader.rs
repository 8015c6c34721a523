// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, TikeConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "tike_configuration.toml";

/// Find the Tike configuration file
///
/// Search order:
/// 1. `TIKE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./tike_configuration.toml`
/// 3. Parent directories, up to 5 levels
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("TIKE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by TIKE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Tike configuration file '{}' not found in any of these locations:\n{}\n\nSet TIKE_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<TikeConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: TikeConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Load the configuration file, or built-in defaults when there is none
///
/// Defaults are used only when no path is given, `TIKE_CONFIG_PATH` is unset
/// and the search finds no file. Environment and CLI overrides apply either way.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` when `config_path` or
/// `TIKE_CONFIG_PATH` names a missing file, and any error of [`load_config`]
pub fn load_config_or_defaults(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<TikeConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(err) if env::var_os("TIKE_CONFIG_PATH").is_some() => Err(err),
        Err(_) => {
            let mut config = TikeConfig::default();
            apply_environment_overrides(&mut config);
            if let Some(cli) = cli_args {
                apply_cli_overrides(&mut config, cli);
            }
            Ok(config)
        }
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `TIKE_MAX_CORES` -> `system.max_cores`
/// - `TIKE_LOG_LEVEL` -> `system.log_level`
/// - `TIKE_OUTPUT_DIR` -> `system.output_dir`
/// - `TIKE_PIXEL_SIZE` -> `coverage.pixel_size`
/// - `TIKE_ALGORITHM` -> `reconstruction.algorithm`
/// - `TIKE_NITER` -> `reconstruction.niter`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut TikeConfig) {
    if let Ok(value) = env::var("TIKE_MAX_CORES") {
        if let Ok(cores) = value.parse::<usize>() {
            config.system.max_cores = cores;
        }
    }
    if let Ok(value) = env::var("TIKE_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("TIKE_OUTPUT_DIR") {
        config.system.output_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("TIKE_PIXEL_SIZE") {
        if let Ok(size) = value.parse::<f64>() {
            config.coverage.pixel_size = size;
        }
    }
    if let Ok(value) = env::var("TIKE_ALGORITHM") {
        config.reconstruction.algorithm = value;
    }
    if let Ok(value) = env::var("TIKE_NITER") {
        if let Ok(niter) = value.parse::<usize>() {
            config.reconstruction.niter = niter;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"pixel_size": "0.05", "niter": "50"}`)
pub fn apply_cli_overrides(config: &mut TikeConfig, cli_args: &HashMap<String, String>) {
    // System settings
    if let Some(value) = cli_args.get("max_cores") {
        if let Ok(cores) = value.parse::<usize>() {
            config.system.max_cores = cores;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("output_dir") {
        config.system.output_dir = PathBuf::from(value);
    }

    // Scan and coverage
    if let Some(value) = cli_args.get("pattern") {
        config.scan.pattern = value.clone();
    }
    if let Some(value) = cli_args.get("scan_time") {
        if let Ok(time) = value.parse::<f64>() {
            config.scan.time = time;
        }
    }
    if let Some(value) = cli_args.get("pixel_size") {
        if let Ok(size) = value.parse::<f64>() {
            config.coverage.pixel_size = size;
        }
    }
    if let Some(value) = cli_args.get("anisotropy") {
        config.coverage.anisotropy = value.to_lowercase() == "true" || value == "1";
    }

    // Reconstruction
    if let Some(value) = cli_args.get("algorithm") {
        config.reconstruction.algorithm = value.clone();
    }
    if let Some(value) = cli_args.get("niter") {
        if let Ok(niter) = value.parse::<usize>() {
            config.reconstruction.niter = niter;
        }
    }
    if let Some(value) = cli_args.get("n_angles") {
        if let Ok(n) = value.parse::<usize>() {
            config.reconstruction.n_angles = n;
        }
    }
}
