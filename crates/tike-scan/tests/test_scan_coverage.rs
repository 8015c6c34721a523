// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Scan Coverage Integration Tests

Follows the coverage workflow end to end:
- Continuous patterns discretize within the requested spatial and time steps
- A probe held still over a rotation covers the region uniformly in angle
- Scalar and tensor maps of the same procedure agree
*/

use proptest::prelude::*;
use std::f64::consts::PI;
use tike_scan::*;

proptest! {
    #[test]
    fn discretized_lissajous_respects_steps(
        fx in 0.5f64..4.0,
        fy in 0.5f64..4.0,
        px in 0.0f64..(2.0 * PI),
        dx in 0.01f64..0.1,
    ) {
        let params = ScanParameters { a: 0.3, b: 0.2, fx, fy, px, ..Default::default() };
        let trajectory = |t: f64| {
            let (h, v) = Pattern::Lissajous.position(&params, t);
            [0.0, h, v]
        };
        let dt = 0.05;
        let result = discrete_trajectory(trajectory, 0.0, 1.0, dx, dt, DEFAULT_MAX_ITER).unwrap();
        for pair in result.position.windows(2) {
            prop_assert!(euclidian_dist(pair[0], pair[1]) <= dx + 1e-12);
        }
        prop_assert!(result.dwell.iter().all(|d| *d <= dt + 1e-12 && *d > 0.0));
        let total: f64 = result.dwell.iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert_eq!(result.time.len(), result.position.len());
    }
}

#[test]
fn test_rotation_covers_centre_from_every_direction() {
    // A stationary probe centred on the rotation axis, half a turn per second
    let mut probe = Probe::new(0.2, 1.0);
    let trajectory = |t: f64| [PI * t, 0.0, 0.0];
    let window = TimeWindow {
        start: 0.0,
        end: 1.0,
        step: 0.01,
    };
    let region = [[-0.2, 0.2], [-0.2, 0.2], [-0.1, 0.1]];
    let map = probe
        .coverage(trajectory, region, 0.1, window, true)
        .unwrap();
    let CoverageMap::Tensor(tensor) = &map else {
        panic!("expected tensor map");
    };
    assert_eq!(map.shape(), [4, 4, 2]);

    // the centre pixels are seen equally along x and y
    for (x, y) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
        let xx = tensor[[x, y, 0, 0, 0]];
        let yy = tensor[[x, y, 0, 1, 1]];
        assert!(xx > 0.0 && yy > 0.0);
        assert!((xx - yy).abs() / (xx + yy) < 0.1, "xx {xx}, yy {yy}");
    }
}

#[test]
fn test_scalar_map_is_tensor_trace() {
    let params = ScanParameters {
        a: 0.2,
        b: 0.1,
        fx: 2.0,
        fy: 3.0,
        ..Default::default()
    };
    let trajectory = move |t: f64| {
        let (h, v) = Pattern::Lissajous.position(&params, t);
        [0.5 * t, h, v]
    };
    let window = TimeWindow {
        start: 0.0,
        end: 0.5,
        step: 0.02,
    };
    let region = [[-0.4, 0.4], [-0.4, 0.4], [-0.2, 0.2]];

    let mut probe = Probe::new(0.1, 1.0);
    let procedure = probe.procedure(trajectory, 0.8, window).unwrap();
    assert!(!procedure.lines.is_empty());

    let scalar = coverage_approx(&procedure.lines, region, 0.8, procedure.line_width, false)
        .unwrap();
    let tensor = coverage_approx(&procedure.lines, region, 0.8, procedure.line_width, true)
        .unwrap();
    let CoverageMap::Scalar(scalar) = scalar else {
        panic!("expected scalar map");
    };
    let trace = tensor.total();
    for (a, b) in scalar.iter().zip(trace.iter()) {
        assert!((a - b).abs() <= 1e-3 * (1e-6 + a.abs()));
    }
}
