// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for Tike tools
//!
//! Console logging is always available. With the `file-logging` feature each
//! run also gets its own timestamped folder with one JSON log per crate.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;
use crate::config::{normalize_level, LogFormat, LoggingConfig};

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// Filter combining the configured level with per-crate debug flags
///
/// `RUST_LOG` wins when set.
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(debug_flags.to_filter_string_with_default(normalize_level(&config.level)))
}

/// Install a console subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(debug_flags, config);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug_flags.any_enabled());
    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install console logger: {}", e))
}

/// Keeps file writers alive; logs are flushed on drop
#[cfg(feature = "file-logging")]
pub struct LoggingGuard {
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: PathBuf,
}

#[cfg(feature = "file-logging")]
impl LoggingGuard {
    /// Folder of the current run
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initialize console logging plus per-run file logging
///
/// Creates a timestamped folder structure:
/// ```text
/// ./logs/
///   └── run_20250101_120000/
///       ├── tike-tomo.log
///       ├── tike-scan.log
///       └── tike.log (combined)
/// ```
#[cfg(feature = "file-logging")]
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{Layer, Registry};

    let base_log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("./logs"));
    let run_folder = base_log_dir.join(format!(
        "{}{}",
        RUN_PREFIX,
        Utc::now().format(RUN_TIMESTAMP)
    ));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(&base_log_dir, config.retention_days, config.retention_runs)?;

    let mut layers = Vec::new();
    let mut file_guards = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(build_filter(debug_flags, config));
    layers.push(console_layer.boxed());

    for crate_name in crate::KNOWN_CRATES {
        let file_appender = rolling::never(&run_folder, format!("{}.log", crate_name));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_guards.push(guard);

        let target = crate::crate_target(crate_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(EnvFilter::new(format!("off,{}=debug", target)))
            .boxed();
        layers.push(file_layer);
    }

    let combined_appender = rolling::never(&run_folder, "tike.log");
    let (combined_non_blocking, combined_guard) = tracing_appender::non_blocking(combined_appender);
    file_guards.push(combined_guard);
    let combined_layer = tracing_subscriber::fmt::layer()
        .with_writer(combined_non_blocking)
        .with_target(true)
        .json()
        .with_filter(build_filter(debug_flags, config))
        .boxed();
    layers.push(combined_layer);

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow!("Failed to install file logger: {}", e))?;

    Ok(LoggingGuard {
        _file_guards: file_guards,
        log_dir: run_folder,
    })
}

fn run_started(path: &Path) -> Option<DateTime<Utc>> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(RUN_PREFIX)?;
    NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`
///
/// Returns the removed folders. Folders that do not look like runs are left alone.
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
) -> Result<Vec<PathBuf>> {
    if !base_log_dir.exists() {
        return Ok(Vec::new());
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(started) = run_started(&path) {
            runs.push((path, started));
        }
    }

    // newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = Vec::new();
    for (index, (path, started)) in runs.into_iter().enumerate() {
        if index >= retention_runs || started < cutoff {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove old log directory {}", path.display()))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_run(base: &Path, started: DateTime<Utc>) -> PathBuf {
        let path = base.join(format!("{}{}", RUN_PREFIX, started.format(RUN_TIMESTAMP)));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_cleanup_keeps_newest_runs() {
        let dir = tempdir().unwrap();
        let now = Utc::now();
        let runs: Vec<PathBuf> = (0..4)
            .map(|i| make_run(dir.path(), now - chrono::Duration::hours(i)))
            .collect();
        std::fs::create_dir_all(dir.path().join("notes")).unwrap();

        let removed = cleanup_old_logs(dir.path(), 30, 2).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(runs[0].exists() && runs[1].exists());
        assert!(!runs[2].exists() && !runs[3].exists());
        assert!(dir.path().join("notes").exists());
    }

    #[test]
    fn test_cleanup_removes_expired_runs() {
        let dir = tempdir().unwrap();
        let now = Utc::now();
        let fresh = make_run(dir.path(), now);
        let stale = make_run(dir.path(), now - chrono::Duration::days(45));

        let removed = cleanup_old_logs(dir.path(), 30, 10).unwrap();

        assert_eq!(removed, vec![stale.clone()]);
        assert!(fresh.exists());
        assert!(!stale.exists());
    }

    #[test]
    fn test_cleanup_of_missing_directory() {
        let dir = tempdir().unwrap();
        let removed = cleanup_old_logs(&dir.path().join("absent"), 30, 10).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_filter_includes_debug_crates() {
        std::env::remove_var("RUST_LOG");
        let flags = CrateDebugFlags::from_args(vec!["--debug-tike-scan".to_string()]);
        let filter = build_filter(&flags, &LoggingConfig::with_level("WARNING"));
        let rendered = filter.to_string();
        assert!(rendered.contains("tike_scan=debug"));
        assert!(rendered.contains("warn"));
    }
}
