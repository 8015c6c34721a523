// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

//! Conversion between probe space `theta, h, v` and reconstruction space.

/// Radius used to place the `h, v` plane in `x, y, z` space.
///
/// Slightly larger than the radius of a unit square centred at the origin.
pub const DEFAULT_RADIUS: f64 = 0.75;

/// Convert `[theta, h, v]` to `[x, y, z]`.
///
/// The point `(radius, h, v)` of the `h, v` plane is rotated by `theta`
/// about `z`.
pub fn thetahv_to_xyz(thv: [f64; 3], radius: f64) -> [f64; 3] {
    let [theta, h, v] = thv;
    let (sin, cos) = theta.sin_cos();
    [radius * cos + h * sin, -radius * sin + h * cos, v]
}

/// Euclidian distance in reconstruction space between two `[theta, h, v]`
/// positions
pub fn euclidian_dist(a: [f64; 3], b: [f64; 3]) -> f64 {
    let pa = thetahv_to_xyz(a, DEFAULT_RADIUS);
    let pb = thetahv_to_xyz(b, DEFAULT_RADIUS);
    pa.iter()
        .zip(pb.iter())
        .map(|(p, q)| (p - q) * (p - q))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_zero_angle_is_identity_with_offset() {
        assert_eq!(thetahv_to_xyz([0.0, 0.2, -0.1], 0.75), [0.75, 0.2, -0.1]);
    }

    #[test]
    fn test_quarter_turn() {
        let [x, y, z] = thetahv_to_xyz([FRAC_PI_2, 0.2, 0.3], 1.0);
        assert!((x - 0.2).abs() < 1e-12);
        assert!((y + 1.0).abs() < 1e-12);
        assert_eq!(z, 0.3);
    }

    #[test]
    fn test_distance_of_pure_rotation() {
        // half a turn moves the plane centre across the diameter
        let d = euclidian_dist([0.0, 0.0, 0.0], [PI, 0.0, 0.0]);
        assert!((d - 2.0 * DEFAULT_RADIUS).abs() < 1e-12);
        assert!((euclidian_dist([0.4, 0.1, 0.0], [0.4, 0.1, 0.5]) - 0.5).abs() < 1e-12);
    }
}
