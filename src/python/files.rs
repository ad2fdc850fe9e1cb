//! Python access to binary punch files.

use super::to_py_err;
use hgland_core::bpch::{BpchReader, BpchWriter, DataBlock, DataBlockHeader};
use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
use pyo3::prelude::*;
use pythonize::{depythonize_bound, pythonize};
use std::path::PathBuf;

/// Read every block of a bpch file.
///
/// Returns a list of `(header, data)` pairs, where `header` is a dict and
/// `data` a float32 array of shape `(ni, nj, nl)`.
#[pyfunction]
fn read_bpch<'py>(
    py: Python<'py>,
    path: PathBuf,
) -> PyResult<Vec<(PyObject, Bound<'py, PyArray3<f32>>)>> {
    let reader = BpchReader::open(&path).map_err(to_py_err)?;
    let mut blocks = Vec::new();
    for block in reader {
        let block = block.map_err(to_py_err)?;
        let header = pythonize(py, &block.header)?;
        blocks.push((header, block.data.into_pyarray_bound(py)));
    }
    Ok(blocks)
}

/// Headers of every block, without keeping the payloads.
#[pyfunction]
fn bpch_headers(py: Python<'_>, path: PathBuf) -> PyResult<PyObject> {
    let reader = BpchReader::open(&path).map_err(to_py_err)?;
    let headers = reader
        .map(|block| block.map(|b| b.header))
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_py_err)?;
    Ok(pythonize(py, &headers)?)
}

/// Write `(header, data)` pairs to a new bpch file.
#[pyfunction]
fn write_bpch(
    path: PathBuf,
    title: &str,
    blocks: Vec<(Bound<'_, PyAny>, PyReadonlyArray3<'_, f32>)>,
) -> PyResult<()> {
    let mut writer = BpchWriter::create(&path, title).map_err(to_py_err)?;
    for (header, data) in blocks {
        let header: DataBlockHeader = depythonize_bound(header)?;
        let block = DataBlock::new(header, data.as_array().to_owned()).map_err(to_py_err)?;
        writer.write_block(&block).map_err(to_py_err)?;
    }
    writer.finish().map_err(to_py_err)?;
    Ok(())
}

#[pymodule]
pub fn bpch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(read_bpch, m)?)?;
    m.add_function(wrap_pyfunction!(bpch_headers, m)?)?;
    m.add_function(wrap_pyfunction!(write_bpch, m)?)?;
    Ok(())
}
