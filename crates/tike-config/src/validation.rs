// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that configuration values are within valid ranges and name known
//! options. Every problem is collected and reported together.

use crate::{ConfigError, ConfigResult, TikeConfig};

const PATTERNS: [&str; 3] = ["lissajous", "raster", "spiral"];
const ALGORITHMS: [&str; 2] = ["art", "sirt"];
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn all_positive(values: &[f64]) -> bool {
    values.iter().all(|v| *v > 0.0 && v.is_finite())
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &TikeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);
    validate_choices(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_required_fields(config: &TikeConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.system.output_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "system.output_dir".to_string(),
        });
    }
}

fn validate_value_ranges(config: &TikeConfig, errors: &mut Vec<ConfigValidationError>) {
    // Geometry
    if !all_positive(&config.geometry.object_size) {
        errors.push(invalid("geometry.object_size", "must be positive"));
    }
    if config.geometry.grid.contains(&0) {
        errors.push(invalid("geometry.grid", "must have at least one voxel per axis"));
    }

    // Probe
    if !all_positive(&[config.probe.width, config.probe.aspect]) {
        errors.push(invalid("probe.width", "width and aspect must be positive"));
    }
    if !all_positive(&config.probe.probe_size) {
        errors.push(invalid("probe.probe_size", "must be positive"));
    }
    if config.probe.probe_grid.contains(&0) {
        errors.push(invalid("probe.probe_grid", "must have at least one ray per axis"));
    }

    // Scan
    if !all_positive(&config.scan.frequencies) {
        errors.push(invalid("scan.frequencies", "must be positive"));
    }
    if !all_positive(&[config.scan.hz]) {
        errors.push(invalid("scan.hz", "must be positive"));
    }
    if !(config.scan.time >= 0.0) {
        errors.push(invalid("scan.time", "must not be negative"));
    }

    // Coverage
    if !all_positive(&[config.coverage.pixel_size]) {
        errors.push(invalid("coverage.pixel_size", "must be positive"));
    }
    if !all_positive(&[config.coverage.dt]) {
        errors.push(invalid("coverage.dt", "must be positive"));
    }
    if config.coverage.region.iter().any(|[lo, hi]| !(lo <= hi)) {
        errors.push(invalid(
            "coverage.region",
            "region minimum must be <= region maximum",
        ));
    }
    if config.coverage.angle_bins == 0 {
        errors.push(invalid("coverage.angle_bins", "must be at least 1"));
    }

    // Reconstruction
    if config.reconstruction.n_angles == 0 {
        errors.push(invalid("reconstruction.n_angles", "must be at least 1"));
    }
}

fn validate_choices(config: &TikeConfig, errors: &mut Vec<ConfigValidationError>) {
    let pattern = config.scan.pattern.to_lowercase();
    if !PATTERNS.contains(&pattern.as_str()) {
        errors.push(invalid(
            "scan.pattern",
            "must be 'lissajous', 'raster' or 'spiral'",
        ));
    }
    let algorithm = config.reconstruction.algorithm.to_lowercase();
    if !ALGORITHMS.contains(&algorithm.as_str()) {
        errors.push(invalid("reconstruction.algorithm", "must be 'art' or 'sirt'"));
    }
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(
            "system.log_level",
            "must be one of trace, debug, info, warn, error",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(config: &TikeConfig) -> String {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TikeConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_algorithm() {
        let mut config = TikeConfig::default();
        config.reconstruction.algorithm = "fbp".to_string();
        let msg = message(&config);
        assert!(msg.contains("reconstruction.algorithm"));
        assert!(msg.contains("'art' or 'sirt'"));
    }

    #[test]
    fn test_choices_are_case_insensitive() {
        let mut config = TikeConfig::default();
        config.reconstruction.algorithm = "ART".to_string();
        config.scan.pattern = "Raster".to_string();
        config.system.log_level = "WARNING".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_inverted_region() {
        let mut config = TikeConfig::default();
        config.coverage.region[1] = [0.5, -0.5];
        assert!(message(&config).contains("coverage.region"));
    }

    #[test]
    fn test_missing_output_dir() {
        let mut config = TikeConfig::default();
        config.system.output_dir = Default::default();
        assert!(message(&config).contains("system.output_dir"));
    }

    #[test]
    fn test_all_problems_reported_together() {
        let mut config = TikeConfig::default();
        config.coverage.pixel_size = 0.0;
        config.geometry.grid = [0, 8, 8];
        config.scan.hz = -1.0;
        let msg = message(&config);
        assert!(msg.contains("coverage.pixel_size"));
        assert!(msg.contains("geometry.grid"));
        assert!(msg.contains("scan.hz"));
        assert_eq!(msg.lines().count(), 4);
    }
}
