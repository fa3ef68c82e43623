#![allow(clippy::type_complexity)]
#![allow(clippy::useless_conversion)]
#![allow(clippy::too_many_arguments)]

use numpy::ndarray::{Array2, Array3};
use numpy::{PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2, PyReadonlyArray3, ToPyArray};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use mdcorr::adf::{compute_adf, AdfParams, DegeneratePolicy, TypeTriplet};
use mdcorr::rdf::{compute_rdf, RdfParams};
use mdcorr_core::trajectory::{read_lammpstrj, ColumnLayout};
use mdcorr_core::{AtomType, Frame, PeriodicBox, Trajectory};

// ============================================================================
// Helpers: ndarray <-> Trajectory
// ============================================================================

fn to_py_err(e: mdcorr_core::Error) -> PyErr {
    match e {
        mdcorr_core::Error::Io { .. } => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(format!("{} ({} stage)", other, other.stage())),
    }
}

fn array3_to_frames(arr: &numpy::ndarray::ArrayView3<f64>) -> PyResult<Vec<Frame>> {
    let shape = arr.shape();
    if shape[2] != 3 {
        return Err(PyValueError::new_err(format!(
            "positions must have shape (n_frames, n_atoms, 3), got {:?}",
            shape
        )));
    }
    let (n_frames, n_atoms) = (shape[0], shape[1]);
    let mut frames = Vec::with_capacity(n_frames);
    for i in 0..n_frames {
        let positions = (0..n_atoms)
            .map(|j| [arr[[i, j, 0]], arr[[i, j, 1]], arr[[i, j, 2]]])
            .collect();
        frames.push(Frame::new(i as i64, positions));
    }
    Ok(frames)
}

fn box_from_array(box_length: &PyReadonlyArray1<f64>) -> PyResult<PeriodicBox> {
    let b = box_length.as_slice()?;
    if b.len() != 3 {
        return Err(PyValueError::new_err(format!(
            "box_length must have 3 entries, got {}",
            b.len()
        )));
    }
    PeriodicBox::new([b[0], b[1], b[2]]).map_err(to_py_err)
}

fn frames_to_array3(frames: &[Frame], field: impl Fn(&Frame) -> Option<&Vec<[f64; 3]>>) -> Option<Array3<f64>> {
    let n_frames = frames.len();
    let n_atoms = frames.first().map(Frame::n_atoms).unwrap_or(0);
    let mut result = Array3::<f64>::zeros((n_frames, n_atoms, 3));
    for (i, frame) in frames.iter().enumerate() {
        let values = field(frame)?;
        for (j, v) in values.iter().enumerate() {
            result[[i, j, 0]] = v[0];
            result[[i, j, 1]] = v[1];
            result[[i, j, 2]] = v[2];
        }
    }
    Some(result)
}

// ============================================================================
// TRAJECTORY I/O
// ============================================================================

/// Read a LAMMPS text dump.
///
/// Returns a dict with `positions` (n_frames, n_atoms, 3), `forces` (same
/// shape or None), `types` (n_atoms,) int32 or None, `box_length` (3,) and
/// `timesteps` (n_frames,).
#[pyfunction]
#[pyo3(name = "read_lammpstrj", signature = (path, with_types=true))]
fn read_lammpstrj_py<'py>(
    py: Python<'py>,
    path: &str,
    with_types: bool,
) -> PyResult<Bound<'py, PyDict>> {
    let layout = if with_types {
        ColumnLayout::id_type_xyz_forces()
    } else {
        ColumnLayout::id_xyz_forces()
    };
    let traj = read_lammpstrj(path, layout).map_err(to_py_err)?;
    let frames = traj.frames();

    let dict = PyDict::new_bound(py);
    let positions = frames_to_array3(frames, |f| Some(&f.positions))
        .unwrap_or_else(|| Array3::zeros((0, 0, 3)));
    dict.set_item("positions", positions.to_pyarray_bound(py))?;
    match frames_to_array3(frames, |f| f.forces.as_ref()) {
        Some(forces) => dict.set_item("forces", forces.to_pyarray_bound(py))?,
        None => dict.set_item("forces", py.None())?,
    }
    match traj.atom_types() {
        Some(types) => {
            let labels: Vec<i32> = types.iter().map(|t| t.0).collect();
            dict.set_item("types", PyArray1::from_vec_bound(py, labels))?;
        }
        None => dict.set_item("types", py.None())?,
    }
    dict.set_item(
        "box_length",
        PyArray1::from_vec_bound(py, traj.periodic_box().lengths().to_vec()),
    )?;
    let timesteps: Vec<i64> = frames.iter().map(|f| f.timestep).collect();
    dict.set_item("timesteps", PyArray1::from_vec_bound(py, timesteps))?;
    Ok(dict)
}

// ============================================================================
// RDF
// ============================================================================

/// Radial distribution function.
///
/// Returns `(d_values, g_values, coordination_number)`.
#[pyfunction]
#[pyo3(name = "compute_rdf", signature = (positions, box_length, dr=0.02, dmin=0.0, dmax=None, sigma=3.7))]
fn compute_rdf_py<'py>(
    py: Python<'py>,
    positions: PyReadonlyArray3<'py, f64>,
    box_length: PyReadonlyArray1<'py, f64>,
    dr: f64,
    dmin: f64,
    dmax: Option<f64>,
    sigma: f64,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, f64)> {
    let frames = array3_to_frames(&positions.as_array())?;
    let periodic_box = box_from_array(&box_length)?;
    let traj = Trajectory::new(frames, periodic_box, None).map_err(to_py_err)?;
    let params = RdfParams {
        dr,
        dmin,
        dmax,
        sigma,
        parallel: true,
    };

    let result = py
        .allow_threads(|| compute_rdf(&traj, &params))
        .map_err(to_py_err)?;

    Ok((
        result.d_values().to_pyarray_bound(py),
        result.g_values().to_pyarray_bound(py),
        result.coordination_number,
    ))
}

/// Raw RDF pair counts per bin, before normalization.
#[pyfunction]
#[pyo3(name = "rdf_counts", signature = (positions, box_length, dr=0.02, dmin=0.0, dmax=None))]
fn rdf_counts_py<'py>(
    py: Python<'py>,
    positions: PyReadonlyArray3<'py, f64>,
    box_length: PyReadonlyArray1<'py, f64>,
    dr: f64,
    dmin: f64,
    dmax: Option<f64>,
) -> PyResult<Bound<'py, PyArray1<u64>>> {
    let frames = array3_to_frames(&positions.as_array())?;
    let periodic_box = box_from_array(&box_length)?;
    let traj = Trajectory::new(frames, periodic_box, None).map_err(to_py_err)?;
    let params = RdfParams {
        dr,
        dmin,
        dmax,
        parallel: true,
        ..RdfParams::default()
    };
    let raw = py
        .allow_threads(|| mdcorr::rdf::accumulate_rdf(&traj, &params))
        .map_err(to_py_err)?;
    Ok(raw.counts().to_pyarray_bound(py))
}

// ============================================================================
// ADF
// ============================================================================

/// Angular distribution function for the J-I-K triplet (I is the center).
///
/// The type targets are keyword-only: `compute_adf(pos, types, box,
/// target_i=2, target_j=1, target_k=1)`. Returns `(angles, angles_radians, adf, total)`.
#[pyfunction]
#[pyo3(
    name = "compute_adf",
    signature = (positions, types, box_length, dang=0.5, angmin=0.0, angmax=180.0, sigma=6.5, *, target_i, target_j, target_k, strict=false)
)]
fn compute_adf_py<'py>(
    py: Python<'py>,
    positions: PyReadonlyArray3<'py, f64>,
    types: PyReadonlyArray1<'py, i32>,
    box_length: PyReadonlyArray1<'py, f64>,
    dang: f64,
    angmin: f64,
    angmax: f64,
    sigma: f64,
    target_i: i32,
    target_j: i32,
    target_k: i32,
    strict: bool,
) -> PyResult<(
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    u64,
)> {
    let frames = array3_to_frames(&positions.as_array())?;
    let periodic_box = box_from_array(&box_length)?;
    let labels: Vec<AtomType> = types.as_array().iter().map(|&t| AtomType(t)).collect();
    let traj = Trajectory::new(frames, periodic_box, Some(labels)).map_err(to_py_err)?;

    let params = AdfParams {
        dang,
        angmin,
        angmax,
        sigma,
        triplet: TypeTriplet::new(target_j, target_i, target_k),
        degenerate: if strict {
            DegeneratePolicy::Fail
        } else {
            DegeneratePolicy::Skip
        },
        parallel: true,
    };

    let result = py
        .allow_threads(|| compute_adf(&traj, &params))
        .map_err(to_py_err)?;

    Ok((
        result.angles_degrees().to_pyarray_bound(py),
        result.angles_radians().to_pyarray_bound(py),
        result.adf_values().to_pyarray_bound(py),
        result.total(),
    ))
}

/// Pairwise minimum-image distance matrix for one frame, shape (n_atoms, n_atoms).
#[pyfunction]
#[pyo3(name = "minimum_image_distances", signature = (coordinates, box_length))]
fn minimum_image_distances_py<'py>(
    py: Python<'py>,
    coordinates: PyReadonlyArray2<'py, f64>,
    box_length: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let periodic_box = box_from_array(&box_length)?;
    let arr = coordinates.as_array();
    if arr.shape()[1] != 3 {
        return Err(PyValueError::new_err("coordinates must have shape (n_atoms, 3)"));
    }
    let n = arr.shape()[0];
    let coords: Vec<[f64; 3]> = (0..n)
        .map(|i| [arr[[i, 0]], arr[[i, 1]], arr[[i, 2]]])
        .collect();
    let mut out = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = periodic_box.distance(&coords[i], &coords[j]);
            out[[i, j]] = d;
            out[[j, i]] = d;
        }
    }
    Ok(out.to_pyarray_bound(py))
}

#[pymodule]
fn mdcorr_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Trajectory I/O
    m.add_function(wrap_pyfunction!(read_lammpstrj_py, m)?)?;

    // Geometry
    m.add_function(wrap_pyfunction!(minimum_image_distances_py, m)?)?;

    // Correlation functions
    m.add_function(wrap_pyfunction!(compute_rdf_py, m)?)?;
    m.add_function(wrap_pyfunction!(rdf_counts_py, m)?)?;
    m.add_function(wrap_pyfunction!(compute_adf_py, m)?)?;

    Ok(())
}
