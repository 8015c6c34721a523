// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Periodic waveforms for driving scan axes.

Every waveform takes an amplitude `A`, a frequency `f` in Hz and a phase `p`
in radians. The phase shifts the waveform later in time by `p / (2 pi f)`.
Sinusoids and triangles are continuous; sawtooth, square and staircase waves
jump and should not be sampled by [`discrete_trajectory`] directly.

[`discrete_trajectory`]: crate::trajectory::discrete_trajectory
*/

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Angular frequency of `f`
pub fn f2w(f: f64) -> f64 {
    2.0 * PI * f
}

pub fn period(f: f64) -> f64 {
    1.0 / f
}

/// Exposure time of one sample at `hz`
pub fn exposure(hz: f64) -> f64 {
    1.0 / hz
}

/// `t * hz` evenly spaced sample times over `[0, t]`, both ends included
pub fn scantime(t: f64, hz: f64) -> Array1<f64> {
    let count = (t * hz + 1e-9).floor().max(0.0) as usize;
    Array1::linspace(0.0, t, count)
}

/// Time shifted by the phase
fn shifted(f: f64, p: f64, t: f64) -> f64 {
    t - p / (2.0 * PI) / f
}

/// `(-1)^q` for an integral `q`
fn alternate(q: f64) -> f64 {
    if q.rem_euclid(2.0) == 0.0 {
        1.0
    } else {
        -1.0
    }
}

pub fn sinusoid(a: f64, f: f64, p: f64, t: f64) -> f64 {
    a * (f2w(f) * t - p.rem_euclid(2.0 * PI)).sin()
}

pub fn triangle(a: f64, f: f64, p: f64, t: f64) -> f64 {
    let half = 0.5 * period(f);
    let ts = shifted(f, p, t);
    let q = (ts / half + 0.5).floor();
    a * (2.0 / half * (ts - half * q) * alternate(q))
}

pub fn sawtooth(a: f64, f: f64, p: f64, t: f64) -> f64 {
    let half = 0.5 * period(f);
    let ts = shifted(f, p, t);
    let q = (ts / half + 0.5).floor();
    a * (2.0 * (ts / half - q))
}

pub fn square(a: f64, f: f64, p: f64, t: f64) -> f64 {
    let ts = shifted(f, p, t);
    a * alternate((2.0 * f * ts).floor())
}

/// Steps of `A / 2f` every half period, starting from `-A`
pub fn staircase(a: f64, f: f64, p: f64, t: f64) -> f64 {
    let ts = shifted(f, p, t);
    a / f / 2.0 * (2.0 * f * ts).floor() - a
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sinusoid,
    Triangle,
    Sawtooth,
    Square,
    Staircase,
}

impl Waveform {
    /// Value at time `t`
    pub fn at(&self, a: f64, f: f64, p: f64, t: f64) -> f64 {
        match self {
            Waveform::Sinusoid => sinusoid(a, f, p, t),
            Waveform::Triangle => triangle(a, f, p, t),
            Waveform::Sawtooth => sawtooth(a, f, p, t),
            Waveform::Square => square(a, f, p, t),
            Waveform::Staircase => staircase(a, f, p, t),
        }
    }

    /// Values at every time in `t`
    pub fn sample(&self, a: f64, f: f64, p: f64, t: ArrayView1<'_, f64>) -> Array1<f64> {
        t.mapv(|t| self.at(a, f, p, t))
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self, Waveform::Sinusoid | Waveform::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_scantime_includes_endpoint() {
        let t = scantime(2.0, 5.0);
        assert_eq!(t.len(), 10);
        assert_eq!(t[0], 0.0);
        assert!((t[9] - 2.0).abs() < TOL);
        assert!((t[1] - 2.0 / 9.0).abs() < TOL);
    }

    #[test]
    fn test_sinusoid_phase_wraps() {
        let a = sinusoid(2.0, 1.0, 0.5, 0.1);
        let b = sinusoid(2.0, 1.0, 0.5 + 4.0 * PI, 0.1);
        assert!((a - b).abs() < TOL);
        assert!((sinusoid(2.0, 1.0, 0.0, 0.25) - 2.0).abs() < TOL);
    }

    #[test]
    fn test_triangle_corners() {
        // period 1: rises from 0 at t = 0 to A at t = 0.25, back to 0 at 0.5
        assert!(triangle(3.0, 1.0, 0.0, 0.0).abs() < TOL);
        assert!((triangle(3.0, 1.0, 0.0, 0.25) - 3.0).abs() < 1e-9);
        assert!((triangle(3.0, 1.0, 0.0, 0.125) - 1.5).abs() < 1e-9);
        assert!((triangle(3.0, 1.0, 0.0, 0.5)).abs() < 1e-9);
        assert!((triangle(3.0, 1.0, 0.0, 0.75) + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sawtooth_ramps_and_drops() {
        // half period 1 at f = 0.5
        assert!((sawtooth(1.0, 0.5, 0.0, 0.25) - 0.5).abs() < TOL);
        assert!((sawtooth(1.0, 0.5, 0.0, 0.49) - 0.98).abs() < 1e-9);
        assert!((sawtooth(1.0, 0.5, 0.0, 0.51) + 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_square_alternates_each_half_period() {
        assert_eq!(square(2.0, 1.0, 0.0, 0.1), 2.0);
        assert_eq!(square(2.0, 1.0, 0.0, 0.6), -2.0);
        assert_eq!(square(2.0, 1.0, 0.0, 1.1), 2.0);
        assert_eq!(square(2.0, 1.0, 0.0, -0.1), -2.0);
    }

    #[test]
    fn test_staircase_steps() {
        assert!((staircase(1.0, 1.0, 0.0, 0.1) + 1.0).abs() < TOL);
        assert!((staircase(1.0, 1.0, 0.0, 0.6) + 0.5).abs() < TOL);
        assert!((staircase(1.0, 1.0, 0.0, 1.1) - 0.0).abs() < TOL);
    }

    #[test]
    fn test_waveform_sample_matches_scalar() {
        let t = scantime(1.0, 20.0);
        let sampled = Waveform::Triangle.sample(1.5, 2.0, 0.3, t.view());
        for (time, value) in t.iter().zip(sampled.iter()) {
            assert_eq!(*value, triangle(1.5, 2.0, 0.3, *time));
        }
        assert!(Waveform::Triangle.is_continuous());
        assert!(!Waveform::Staircase.is_continuous());
    }
}
