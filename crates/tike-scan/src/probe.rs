// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Probe models for coverage planning.

A [`Probe`] moves through `theta, h, v` space along a user trajectory. Its
cross section is approximated by a square grid of thick lines, each carrying
the probe's density at its centre. Every line follows the trajectory on its
own, so its discretization adapts to how fast that part of the probe moves.
*/

use crate::coverage::{coverage_approx, CoverageMap, Region};
use crate::error::{ScanError, ScanResult};
use crate::trajectory::{discrete_trajectory, DEFAULT_MAX_ITER};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Lines are at most this fraction of the pixel size wide
pub const LINE_WIDTH_FRACTION: f64 = 1.0 / 16.0;

/// Intensity of the beam at `(h, v)` relative to the probe centre
pub type DensityProfile = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// One line of a probe: its `[theta, h, v]` offset from the probe centre and
/// its intensity weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeLine {
    pub offset: [f64; 3],
    pub weight: f64,
}

/// Time window over which a trajectory is sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    /// Start time `tmin`
    pub start: f64,
    /// End time `tmax`, excluded
    pub end: f64,
    /// Maximum time step `dt`
    pub step: f64,
}

/// A discrete procedure: `[theta, h, v, weight]` rows and the width of the
/// lines they describe
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub lines: Vec<[f64; 4]>,
    pub line_width: f64,
}

#[derive(Clone)]
pub struct Probe {
    density_profile: DensityProfile,
    /// Extent along `h`
    pub width: f64,
    /// Ratio of the extent along `v` to `width`
    pub aspect: f64,
    /// Width of the lines last generated by [`Probe::line_offsets`]
    pub line_width: f64,
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("width", &self.width)
            .field("aspect", &self.aspect)
            .field("line_width", &self.line_width)
            .finish_non_exhaustive()
    }
}

impl Default for Probe {
    /// A 1 mm square of uniform intensity
    fn default() -> Self {
        Self::new(0.1, 1.0)
    }
}

impl Probe {
    /// A uniform probe of the given extent
    pub fn new(width: f64, aspect: f64) -> Self {
        Self {
            density_profile: Arc::new(|_, _| 1.0),
            width,
            aspect,
            line_width: 1.0,
        }
    }

    pub fn with_density_profile<F>(mut self, profile: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.density_profile = Arc::new(profile);
        self
    }

    pub fn density(&self, h: f64, v: f64) -> f64 {
        (self.density_profile)(h, v)
    }

    pub fn height(&self) -> f64 {
        self.width * self.aspect
    }

    /// Split the probe into lines no wider than `pixel_size / 16`.
    ///
    /// The line width is shrunk so that a whole number of lines spans the
    /// probe width. Lines are ordered `v` major.
    pub fn line_offsets(&mut self, pixel_size: f64) -> ScanResult<Vec<ProbeLine>> {
        if !(pixel_size > 0.0) {
            return Err(ScanError::InvalidParameter(format!(
                "pixel_size must be > 0, got {pixel_size}"
            )));
        }
        let (width, height) = (self.width, self.height());
        let max_width = pixel_size * LINE_WIDTH_FRACTION;
        if width < max_width || height < max_width {
            return Err(ScanError::ProbeTooSmall {
                width,
                height,
                line_width: max_width,
            });
        }
        let cells = (width / max_width - 1e-9).ceil().max(1.0);
        let line_width = width / cells;
        self.line_width = line_width;

        let gh = centres(width, line_width);
        let gv = centres(height, line_width);
        let lines: Vec<ProbeLine> = gv
            .iter()
            .flat_map(|v| gh.iter().map(move |h| (*h, *v)))
            .map(|(h, v)| ProbeLine {
                offset: [0.0, h, v],
                weight: self.density(h, v),
            })
            .collect();
        debug!(
            "probe {} x {} split into {} lines of width {}",
            width,
            height,
            lines.len(),
            line_width
        );
        Ok(lines)
    }

    /// Return the discrete procedure following `trajectory`.
    ///
    /// Each probe line follows `trajectory(t) + offset` and is discretized
    /// with a spatial step of one line width. The weight of every position is
    /// its dwell time times the line intensity.
    pub fn procedure<F>(
        &mut self,
        trajectory: F,
        pixel_size: f64,
        window: TimeWindow,
    ) -> ScanResult<Procedure>
    where
        F: Fn(f64) -> [f64; 3] + Sync,
    {
        let lines = self.line_offsets(pixel_size)?;
        let dx = self.line_width;
        info!("procedure for {} probe lines", lines.len());

        let per_line: Vec<Vec<[f64; 4]>> = lines
            .par_iter()
            .map(|line| -> ScanResult<Vec<[f64; 4]>> {
                let shifted = |t: f64| {
                    let [theta, h, v] = trajectory(t);
                    [
                        theta + line.offset[0],
                        h + line.offset[1],
                        v + line.offset[2],
                    ]
                };
                let discrete = discrete_trajectory(
                    shifted,
                    window.start,
                    window.end,
                    dx,
                    window.step,
                    DEFAULT_MAX_ITER,
                )?;
                Ok(discrete
                    .position
                    .iter()
                    .zip(&discrete.dwell)
                    .map(|([theta, h, v], dwell)| [*theta, *h, *v, dwell * line.weight])
                    .collect())
            })
            .collect::<ScanResult<_>>()?;

        Ok(Procedure {
            lines: per_line.into_iter().flatten().collect(),
            line_width: dx,
        })
    }

    /// Return a coverage map of `region` using this probe
    pub fn coverage<F>(
        &mut self,
        trajectory: F,
        region: Region,
        pixel_size: f64,
        window: TimeWindow,
        anisotropy: bool,
    ) -> ScanResult<CoverageMap>
    where
        F: Fn(f64) -> [f64; 3] + Sync,
    {
        let procedure = self.procedure(trajectory, pixel_size, window)?;
        coverage_approx(
            &procedure.lines,
            region,
            pixel_size,
            procedure.line_width,
            anisotropy,
        )
    }
}

/// Centres of the lines spanning `extent`, relative to its middle
fn centres(extent: f64, line_width: f64) -> Vec<f64> {
    let count = (extent / line_width + 1e-9).floor().max(1.0) as usize;
    (0..count)
        .map(|i| i as f64 * extent / count as f64 + (line_width - extent) / 2.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_probe() {
        let probe = Probe::default();
        assert_eq!(probe.width, 0.1);
        assert_eq!(probe.aspect, 1.0);
        assert_eq!(probe.density(0.3, -0.2), 1.0);
    }

    #[test]
    fn test_line_offsets_grid() {
        let mut probe = Probe::new(0.1, 0.5);
        let lines = probe.line_offsets(0.4).unwrap();
        // max width 0.025 -> 4 lines across, 2 lines up
        assert!((probe.line_width - 0.025).abs() < 1e-12);
        assert_eq!(lines.len(), 8);
        let h: Vec<f64> = lines[..4].iter().map(|l| l.offset[1]).collect();
        let expected = [-0.0375, -0.0125, 0.0125, 0.0375];
        for (a, b) in h.iter().zip(expected) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!((lines[0].offset[2] + 0.0125).abs() < 1e-12);
        assert!((lines[4].offset[2] - 0.0125).abs() < 1e-12);
        assert!(lines.iter().all(|l| l.offset[0] == 0.0 && l.weight == 1.0));
    }

    #[test]
    fn test_line_width_shrinks_to_fit() {
        let mut probe = Probe::new(0.1, 1.0);
        let lines = probe.line_offsets(0.48).unwrap();
        // 0.1 / 0.03 = 3.33 -> 4 lines of 0.025
        assert!((probe.line_width - 0.025).abs() < 1e-12);
        assert_eq!(lines.len(), 16);
    }

    #[test]
    fn test_probe_smaller_than_line() {
        let mut probe = Probe::new(0.01, 1.0);
        assert!(matches!(
            probe.line_offsets(1.0),
            Err(ScanError::ProbeTooSmall { .. })
        ));
    }

    #[test]
    fn test_density_profile_weights() {
        let mut probe = Probe::new(0.1, 1.0).with_density_profile(|h, v| (-(h * h + v * v)).exp());
        let lines = probe.line_offsets(0.8).unwrap();
        let centre = lines
            .iter()
            .map(|l| l.weight)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(lines.iter().all(|l| l.weight <= centre && l.weight > 0.99));
    }

    #[test]
    fn test_procedure_rows() {
        let mut probe = Probe::new(0.1, 1.0);
        let window = TimeWindow {
            start: 0.0,
            end: 1.0,
            step: 0.5,
        };
        let procedure = probe.procedure(|_| [0.0, 0.0, 0.0], 1.6, window).unwrap();
        // 0.1 wide probe at 0.1 line width: one line, two positions
        assert_eq!(procedure.line_width, 0.1);
        assert_eq!(procedure.lines.len(), 2);
        assert_eq!(procedure.lines[0], [0.0, 0.0, 0.0, 0.5]);
    }
}
