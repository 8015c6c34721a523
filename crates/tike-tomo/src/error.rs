// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

use tike_structures::TikeDataError;

/// Result type for tomography operations
pub type TomoResult<T> = Result<T, TomoError>;

/// Errors that can occur during projection, coverage or reconstruction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TomoError {
    #[error(transparent)]
    Data(#[from] TikeDataError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown reconstruction algorithm: {0} (expected 'art' or 'sirt')")]
    UnknownAlgorithm(String),
}
