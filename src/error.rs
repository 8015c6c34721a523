// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

use tike_structures::TikeDataError;
use tike_tomo::TomoError;

/// Result type of the umbrella crate
pub type TikeResult<T> = Result<T, TikeError>;

/// Any error raised by a Tike component
#[derive(Debug, thiserror::Error)]
pub enum TikeError {
    #[error(transparent)]
    Data(#[from] TikeDataError),

    #[error(transparent)]
    Tomo(#[from] TomoError),

    #[cfg(feature = "scan")]
    #[error(transparent)]
    Scan(#[from] tike_scan::ScanError),

    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] tike_config::ConfigError),

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
