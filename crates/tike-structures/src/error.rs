// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Error types for Tike data structures

/// Result type for structure construction and validation
pub type TikeDataResult<T> = Result<T, TikeDataError>;

/// Errors raised while building or validating volumes and acquisitions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TikeDataError {
    #[error("Bad parameters: {0}")]
    BadParameters(String),

    #[error("Object dimensions must be > 0, got {0:?}")]
    NonPositiveObjectSize([f64; 3]),

    #[error("Probe dimensions must be > 0, got {0:?}")]
    NonPositiveProbeSize([f64; 2]),

    #[error("Empty grid: shape {0:?}")]
    EmptyGrid(Vec<usize>),

    #[error("The size of theta ({theta}), h ({h}), v ({v}) must be the same as the number of probes")]
    PositionCountMismatch { theta: usize, h: usize, v: usize },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}
