// Copyright 2025 Tike Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Python bindings for the Tike kernels via PyO3.

Every function takes the object as `object_grid (Z, X, Y, P)` float32 with its
`object_min` and `object_size` corners `(z, x, y)`, and the probes as their
`probe_size (h, v)` plus the min corners `theta, h, v` of the `M` positions.
`h` and `v` default to `-0.5` when omitted. Errors surface as `ValueError`.
*/

use ndarray::{Array, Array2, Array4, Dimension};
use numpy::{PyArray1, PyArrayDyn, PyArrayMethods, PyReadonlyArray2, PyReadonlyArray4};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use tike_structures::{Acquisition, GridGeometry, Volume};
use tike_tomo::Algorithm;

type PyGrid<'py> = Bound<'py, PyArrayDyn<f32>>;

fn value_error<E: std::fmt::Display>(e: E) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

// numpy arrays are copied through flat buffers in logical order, so any
// memory layout is accepted.
fn grid4(array: PyReadonlyArray4<'_, f32>) -> PyResult<Array4<f32>> {
    let view = array.as_array();
    let values: Vec<f32> = view.iter().copied().collect();
    Array4::from_shape_vec(view.dim(), values).map_err(value_error)
}

fn grid2(array: PyReadonlyArray2<'_, f32>) -> PyResult<Array2<f32>> {
    let view = array.as_array();
    let values: Vec<f32> = view.iter().copied().collect();
    Array2::from_shape_vec(view.dim(), values).map_err(value_error)
}

fn to_numpy<'py, D: Dimension>(py: Python<'py>, array: Array<f32, D>) -> PyResult<PyGrid<'py>> {
    let shape = array.shape().to_vec();
    let values: Vec<f32> = array.iter().copied().collect();
    PyArray1::from_vec_bound(py, values).reshape(shape)
}

fn volume(
    object_grid: PyReadonlyArray4<'_, f32>,
    object_min: [f64; 3],
    object_size: [f64; 3],
) -> PyResult<Volume> {
    Volume::new(grid4(object_grid)?, object_min, object_size).map_err(value_error)
}

fn acquisition(
    probe_shape: (usize, usize),
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
) -> PyResult<Acquisition> {
    Acquisition::new(probe_shape, probe_size, theta, h, v).map_err(value_error)
}

/// Coverage map of a probe raster scanned over `theta, h, v`
///
/// `object_grid` is the `(Z, X, Y, B)` map to accumulate into, `B` angular
/// bins over a half turn. Only non-zero cells of `probe_grid (H, V)` emit
/// lines. `dwell (M,)` scales each position.
#[pyfunction]
#[pyo3(signature = (object_grid, object_min, object_size, probe_grid, probe_size, theta, h=None, v=None, dwell=None))]
#[allow(clippy::too_many_arguments)]
fn coverage<'py>(
    py: Python<'py>,
    object_grid: PyReadonlyArray4<'py, f32>,
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_grid: PyReadonlyArray2<'py, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
    dwell: Option<Vec<f64>>,
) -> PyResult<PyGrid<'py>> {
    let map = volume(object_grid, object_min, object_size)?;
    let probe_grid = grid2(probe_grid)?;
    let result = py.allow_threads(|| {
        tike_tomo::coverage(map, probe_grid.view(), probe_size, theta, h, v, dwell.as_deref())
    });
    to_numpy(py, result.map_err(value_error)?.into_grid())
}

/// Direction tensor `(Z, X, Y, 2, 2)` of a probe raster scanned over `theta, h, v`
#[pyfunction]
#[pyo3(signature = (object_shape, object_min, object_size, probe_grid, probe_size, theta, h=None, v=None, dwell=None))]
#[allow(clippy::too_many_arguments)]
fn coverage_tensor<'py>(
    py: Python<'py>,
    object_shape: [usize; 3],
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_grid: PyReadonlyArray2<'py, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
    dwell: Option<Vec<f64>>,
) -> PyResult<PyGrid<'py>> {
    let geometry = GridGeometry::new(object_min, object_size, object_shape).map_err(value_error)?;
    let probe_grid = grid2(probe_grid)?;
    let acquisition = acquisition(probe_grid.dim(), probe_size, theta, h, v)?;
    let lines = tike_tomo::coverage::probe_lines(
        &geometry,
        probe_grid.view(),
        &acquisition,
        dwell.as_deref(),
    )
    .map_err(value_error)?;
    let tensor = py.allow_threads(|| tike_tomo::coverage_tensor(&geometry, &lines));
    to_numpy(py, tensor)
}

/// Simulate data acquisition: line integrals `(M, H, V, P)` of the object
#[pyfunction]
#[pyo3(signature = (object_grid, object_min, object_size, probe_shape, probe_size, theta, h=None, v=None))]
#[allow(clippy::too_many_arguments)]
fn project_forward<'py>(
    py: Python<'py>,
    object_grid: PyReadonlyArray4<'py, f32>,
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_shape: (usize, usize),
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
) -> PyResult<PyGrid<'py>> {
    let object = volume(object_grid, object_min, object_size)?;
    let acquisition = acquisition(probe_shape, probe_size, theta, h, v)?;
    let data = py
        .allow_threads(|| tike_tomo::project_forward(&object, &acquisition))
        .map_err(value_error)?;
    to_numpy(py, data)
}

/// Back-project probe weights `(M, H, V, P)` onto a `(Z, X, Y, P)` grid
#[pyfunction]
#[pyo3(signature = (object_shape, object_min, object_size, probe_grid, probe_size, theta, h=None, v=None))]
#[allow(clippy::too_many_arguments)]
fn project_backward<'py>(
    py: Python<'py>,
    object_shape: [usize; 3],
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_grid: PyReadonlyArray4<'py, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
) -> PyResult<PyGrid<'py>> {
    let geometry = GridGeometry::new(object_min, object_size, object_shape).map_err(value_error)?;
    let data = grid4(probe_grid)?;
    let (_, columns, rows, _) = data.dim();
    let acquisition = acquisition((columns, rows), probe_size, theta, h, v)?;
    let result = py
        .allow_threads(|| tike_tomo::project_backward(&geometry, &acquisition, data.view()))
        .map_err(value_error)?;
    to_numpy(py, result.into_grid())
}

#[allow(clippy::too_many_arguments)]
fn run_solver<'py>(
    py: Python<'py>,
    object_grid: PyReadonlyArray4<'py, f32>,
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_grid: PyReadonlyArray4<'py, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
    algorithm: Algorithm,
    niter: usize,
) -> PyResult<PyGrid<'py>> {
    let init = volume(object_grid, object_min, object_size)?;
    let data = grid4(probe_grid)?;
    let (_, columns, rows, _) = data.dim();
    let acquisition = acquisition((columns, rows), probe_size, theta, h, v)?;
    let result = py
        .allow_threads(|| {
            tike_tomo::reconstruct(&init, &acquisition, data.view(), algorithm, niter)
        })
        .map_err(value_error)?;
    to_numpy(py, result.into_grid())
}

/// Reconstruct with the Algebraic Reconstruction Technique
#[pyfunction]
#[pyo3(signature = (object_grid, object_min, object_size, probe_grid, probe_size, theta, h=None, v=None, niter=1))]
#[allow(clippy::too_many_arguments)]
fn art<'py>(
    py: Python<'py>,
    object_grid: PyReadonlyArray4<'py, f32>,
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_grid: PyReadonlyArray4<'py, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
    niter: usize,
) -> PyResult<PyGrid<'py>> {
    run_solver(
        py, object_grid, object_min, object_size, probe_grid, probe_size, theta, h, v,
        Algorithm::Art, niter,
    )
}

/// Reconstruct with the Simultaneous Iterative Reconstruction Technique
#[pyfunction]
#[pyo3(signature = (object_grid, object_min, object_size, probe_grid, probe_size, theta, h=None, v=None, niter=1))]
#[allow(clippy::too_many_arguments)]
fn sirt<'py>(
    py: Python<'py>,
    object_grid: PyReadonlyArray4<'py, f32>,
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_grid: PyReadonlyArray4<'py, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
    niter: usize,
) -> PyResult<PyGrid<'py>> {
    run_solver(
        py, object_grid, object_min, object_size, probe_grid, probe_size, theta, h, v,
        Algorithm::Sirt, niter,
    )
}

/// Reconstruct with `algorithm` ("art" or "sirt")
#[pyfunction]
#[pyo3(signature = (object_grid, object_min, object_size, probe_grid, probe_size, theta, h=None, v=None, algorithm="sirt", niter=1))]
#[allow(clippy::too_many_arguments)]
fn reconstruct<'py>(
    py: Python<'py>,
    object_grid: PyReadonlyArray4<'py, f32>,
    object_min: [f64; 3],
    object_size: [f64; 3],
    probe_grid: PyReadonlyArray4<'py, f32>,
    probe_size: [f64; 2],
    theta: Vec<f64>,
    h: Option<Vec<f64>>,
    v: Option<Vec<f64>>,
    algorithm: &str,
    niter: usize,
) -> PyResult<PyGrid<'py>> {
    let algorithm: Algorithm = algorithm.parse().map_err(value_error)?;
    run_solver(
        py, object_grid, object_min, object_size, probe_grid, probe_size, theta, h, v,
        algorithm, niter,
    )
}

#[pymodule]
fn libtike(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // Coverage
    m.add_function(wrap_pyfunction!(coverage, m)?)?;
    m.add_function(wrap_pyfunction!(coverage_tensor, m)?)?;

    // Projection operators
    m.add_function(wrap_pyfunction!(project_forward, m)?)?;
    m.add_function(wrap_pyfunction!(project_backward, m)?)?;

    // Solvers
    m.add_function(wrap_pyfunction!(art, m)?)?;
    m.add_function(wrap_pyfunction!(sirt, m)?)?;
    m.add_function(wrap_pyfunction!(reconstruct, m)?)?;
    Ok(())
}
