// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

use tike_structures::TikeDataError;
use tike_tomo::TomoError;

/// Result type for scan planning
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while discretizing trajectories or mapping coverage
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to find next step within {max_iter} tries. Probably the function is discontinuous.")]
    Discontinuous { max_iter: usize },

    #[error("Probe ({width} x {height}) is smaller than one line of width {line_width}; use smaller pixels")]
    ProbeTooSmall {
        width: f64,
        height: f64,
        line_width: f64,
    },

    #[error("Region minimum must be <= region maximum, got {0:?}")]
    InvalidRegion([[f64; 2]; 3]),

    #[error(transparent)]
    Data(#[from] TikeDataError),

    #[error(transparent)]
    Tomo(#[from] TomoError),
}
