// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// A horizontal line through reconstruction space.
///
/// The line is `z = v`, `(x, y) = h * (-sin θ, cos θ) + t * (cos θ, sin θ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Rotation around `z` [radians]
    pub theta: f64,
    /// Horizontal offset from the rotation axis
    pub h: f64,
    /// Height, equal to the `z` coordinate of the line
    pub v: f64,
}

impl Ray {
    pub fn new(theta: f64, h: f64, v: f64) -> Self {
        Self { theta, h, v }
    }

    /// Unit direction of travel in the `x, y` plane
    pub fn direction(&self) -> (f64, f64) {
        let (sin, cos) = self.theta.sin_cos();
        (cos, sin)
    }

    /// The point of the line closest to the rotation axis, in `x, y`
    pub fn origin(&self) -> (f64, f64) {
        let (sin, cos) = self.theta.sin_cos();
        (-self.h * sin, self.h * cos)
    }
}
