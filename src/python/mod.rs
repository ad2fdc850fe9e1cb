use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pymodule;

mod calculators;
mod files;

use calculators::emissions;
use files::bpch;

#[pymodule]
#[pyo3(name = "_lib")]
fn hgland(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(emissions))?;
    m.add_wrapped(wrap_pymodule!(bpch))?;

    set_path(m, "hgland._lib.emissions", "emissions")?;
    set_path(m, "hgland._lib.bpch", "bpch")?;

    Ok(())
}

fn set_path(m: &Bound<'_, PyModule>, path: &str, module: &str) -> PyResult<()> {
    let code = format!(
        "\
import sys
sys.modules['{path}'] = {module}
    "
    );
    m.py().run_bound(&code, None, Some(&m.dict()))
}

/// Report a library error as a Python `ValueError`
pub(crate) fn to_py_err(e: hgland_core::errors::HgError) -> PyErr {
    PyValueError::new_err(e.to_string())
}
