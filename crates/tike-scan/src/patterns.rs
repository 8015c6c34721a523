// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Two and three axis scan patterns built from waveforms.

A pattern drives `x` and `y` with one waveform each, sampled at `hz` over
`time` seconds. [`scan3`] adds a rotation axis to a Lissajous pattern.
*/

use crate::error::{ScanError, ScanResult};
use crate::waveforms::{sawtooth, scantime, Waveform};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Amplitudes, frequencies and phases of a scan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParameters {
    /// Amplitude of `x`
    pub a: f64,
    /// Amplitude of `y`
    pub b: f64,
    pub fx: f64,
    pub fy: f64,
    /// Rotation frequency, used by [`scan3`] only
    pub fz: f64,
    pub px: f64,
    pub py: f64,
    /// Duration in seconds
    pub time: f64,
    /// Sampling rate in Hz
    pub hz: f64,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 1.0,
            fx: 1.0,
            fy: 1.0,
            fz: 1.0,
            px: 0.0,
            py: 0.0,
            time: 1.0,
            hz: 100.0,
        }
    }
}

impl ScanParameters {
    pub fn validate(&self) -> ScanResult<()> {
        let positive = [
            ("fx", self.fx),
            ("fy", self.fy),
            ("fz", self.fz),
            ("hz", self.hz),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ScanError::InvalidParameter(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.time >= 0.0) {
            return Err(ScanError::InvalidParameter(format!(
                "time must be >= 0, got {}",
                self.time
            )));
        }
        Ok(())
    }
}

/// Sampled scan positions
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPath {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    /// Rotation angle, present for three axis scans
    pub z: Option<Array1<f64>>,
    pub t: Array1<f64>,
}

/// The shape traced by a two axis scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    #[default]
    Lissajous,
    Raster,
    Spiral,
}

impl Pattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Lissajous => "lissajous",
            Pattern::Raster => "raster",
            Pattern::Spiral => "spiral",
        }
    }

    /// Waveform and frequency scale of each axis
    fn axes(&self) -> [(Waveform, f64); 2] {
        match self {
            Pattern::Lissajous => [(Waveform::Sinusoid, 1.0), (Waveform::Sinusoid, 1.0)],
            Pattern::Raster => [(Waveform::Triangle, 1.0), (Waveform::Staircase, 1.0)],
            Pattern::Spiral => [(Waveform::Sawtooth, 0.5), (Waveform::Sawtooth, 0.5)],
        }
    }

    /// `(x, y)` at time `t`
    pub fn position(&self, params: &ScanParameters, t: f64) -> (f64, f64) {
        let [(wx, sx), (wy, sy)] = self.axes();
        (
            wx.at(params.a, sx * params.fx, params.px, t),
            wy.at(params.b, sy * params.fy, params.py, t),
        )
    }

    /// Sample the pattern over `params.time` seconds at `params.hz`
    pub fn generate(&self, params: &ScanParameters) -> ScanResult<ScanPath> {
        params.validate()?;
        let t = scantime(params.time, params.hz);
        let [(wx, sx), (wy, sy)] = self.axes();
        Ok(ScanPath {
            x: wx.sample(params.a, sx * params.fx, params.px, t.view()),
            y: wy.sample(params.b, sy * params.fy, params.py, t.view()),
            z: None,
            t,
        })
    }

    /// True when both axes move without jumps
    pub fn is_continuous(&self) -> bool {
        self.axes().iter().all(|(w, _)| w.is_continuous())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lissajous" => Ok(Pattern::Lissajous),
            "raster" => Ok(Pattern::Raster),
            "spiral" => Ok(Pattern::Spiral),
            other => Err(ScanError::InvalidParameter(format!(
                "unknown scan pattern '{other}' (expected lissajous, raster or spiral)"
            ))),
        }
    }
}

/// Sinusoids on both axes
pub fn lissajous(params: &ScanParameters) -> ScanResult<ScanPath> {
    Pattern::Lissajous.generate(params)
}

/// A triangle wave on `x` and a staircase on `y`
pub fn raster(params: &ScanParameters) -> ScanResult<ScanPath> {
    Pattern::Raster.generate(params)
}

/// Sawtooth waves at half frequency on both axes
pub fn spiral(params: &ScanParameters) -> ScanResult<ScanPath> {
    Pattern::Spiral.generate(params)
}

/// A Lissajous pattern with a rotation of amplitude `pi` on `z`
pub fn scan3(params: &ScanParameters) -> ScanResult<ScanPath> {
    let mut path = lissajous(params)?;
    path.z = Some(path.t.mapv(|t| sawtooth(PI, 0.5 * params.fz, 0.5 * PI, t)));
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveforms::{sinusoid, staircase, triangle};

    fn params() -> ScanParameters {
        ScanParameters {
            a: 2.0,
            b: 0.5,
            fx: 3.0,
            fy: 2.0,
            fz: 1.0,
            px: 0.2,
            py: 1.1,
            time: 1.0,
            hz: 50.0,
        }
    }

    #[test]
    fn test_lissajous_axes() {
        let p = params();
        let path = lissajous(&p).unwrap();
        assert_eq!(path.t.len(), 50);
        assert!(path.z.is_none());
        for i in [0, 7, 49] {
            let t = path.t[i];
            assert_eq!(path.x[i], sinusoid(2.0, 3.0, 0.2, t));
            assert_eq!(path.y[i], sinusoid(0.5, 2.0, 1.1, t));
        }
    }

    #[test]
    fn test_raster_axes() {
        let p = params();
        let path = raster(&p).unwrap();
        let t = path.t[13];
        assert_eq!(path.x[13], triangle(2.0, 3.0, 0.2, t));
        assert_eq!(path.y[13], staircase(0.5, 2.0, 1.1, t));
        assert!(!Pattern::Raster.is_continuous());
        assert!(Pattern::Lissajous.is_continuous());
    }

    #[test]
    fn test_spiral_uses_half_frequency() {
        let p = params();
        let path = spiral(&p).unwrap();
        let t = path.t[21];
        assert_eq!(path.x[21], sawtooth(2.0, 1.5, 0.2, t));
        assert_eq!(Pattern::Spiral.position(&p, t).1, sawtooth(0.5, 1.0, 1.1, t));
    }

    #[test]
    fn test_scan3_rotation_axis() {
        let path = scan3(&params()).unwrap();
        let z = path.z.unwrap();
        assert_eq!(z.len(), path.t.len());
        // phase pi/2 at half of fz = 1 shifts the ramp by half a period
        assert!((z[0] - sawtooth(PI, 0.5, 0.5 * PI, 0.0)).abs() < 1e-12);
        assert!(z.iter().all(|v| v.abs() <= PI));
    }

    #[test]
    fn test_invalid_parameters() {
        let mut p = params();
        p.hz = 0.0;
        assert!(matches!(lissajous(&p), Err(ScanError::InvalidParameter(_))));
        assert!("zigzag".parse::<Pattern>().is_err());
        assert_eq!("Raster".parse::<Pattern>().unwrap(), Pattern::Raster);
    }
}
