//! Python access to the land mercury flux calculators.
//!
//! Every function takes numpy arrays on an `(nx, ny)` grid plus the cell
//! area of each latitude row, and returns new arrays in kg/s. Process
//! parameters may be overridden with a dict; missing keys keep their
//! defaults.

use super::to_py_err;
use hgland_components::deposition::DepositionAccumulator;
use hgland_components::emissions::{
    BiomassBurning, PromptRecycling, SnowpackEmission, SoilInputs, SoilVolatilisation,
    VegetationTranspiration,
};
use hgland_components::reservoir::SnowReservoir;
use hgland_core::grid::{surface_from_lwi, LandGrid, SurfaceType};
use ndarray::{Array2, Array3};
use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
use pyo3::prelude::*;
use serde::de::DeserializeOwned;

fn grid(nx: usize, row_areas_m2: Vec<f64>) -> PyResult<LandGrid> {
    LandGrid::from_row_areas(nx, row_areas_m2).map_err(to_py_err)
}

fn surface(lwi: &PyReadonlyArray2<i32>) -> PyResult<Array2<SurfaceType>> {
    surface_from_lwi(&lwi.as_array().to_owned()).map_err(to_py_err)
}

fn parameters<T: DeserializeOwned + Default>(parameters: Option<Bound<'_, PyAny>>) -> PyResult<T> {
    match parameters {
        Some(parameters) => Ok(pythonize::depythonize_bound(parameters)?),
        None => Ok(T::default()),
    }
}

/// Hg0 from biomass burning, given CO emissions in molecules/cm^2/s.
#[pyfunction]
#[pyo3(signature = (co, row_areas_m2, enabled=true, preindustrial=false, parameters=None))]
fn biomass_burning_flux<'py>(
    py: Python<'py>,
    co: PyReadonlyArray2<'py, f64>,
    row_areas_m2: Vec<f64>,
    enabled: bool,
    preindustrial: bool,
    parameters: Option<Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let co = co.as_array().to_owned();
    let grid = grid(co.nrows(), row_areas_m2)?;
    let component =
        BiomassBurning::from_parameters(self::parameters(parameters)?, enabled, preindustrial);
    let flux = component.calculate(&grid, &co).map_err(to_py_err)?;
    Ok(flux.into_pyarray_bound(py))
}

/// Hg0 carried by transpiration, given the transpiration rate in m/s.
#[pyfunction]
#[pyo3(signature = (lwi, redistribution, transpiration, row_areas_m2, parameters=None))]
fn vegetation_flux<'py>(
    py: Python<'py>,
    lwi: PyReadonlyArray2<'py, i32>,
    redistribution: PyReadonlyArray2<'py, f64>,
    transpiration: PyReadonlyArray2<'py, f64>,
    row_areas_m2: Vec<f64>,
    parameters: Option<Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let surface = surface(&lwi)?;
    let grid = grid(surface.nrows(), row_areas_m2)?;
    let component = VegetationTranspiration::from_parameters(self::parameters(parameters)?, false);
    let flux = component
        .calculate(
            &grid,
            &surface,
            &redistribution.as_array().to_owned(),
            transpiration.as_array(),
        )
        .map_err(to_py_err)?;
    Ok(flux.into_pyarray_bound(py))
}

/// Light-driven soil volatilisation.
#[pyfunction]
#[pyo3(signature = (lwi, lai, suncos, radswg, snow_mm, redistribution, row_areas_m2, parameters=None))]
#[allow(clippy::too_many_arguments)]
fn soil_flux<'py>(
    py: Python<'py>,
    lwi: PyReadonlyArray2<'py, i32>,
    lai: PyReadonlyArray2<'py, f64>,
    suncos: PyReadonlyArray2<'py, f64>,
    radswg: PyReadonlyArray2<'py, f64>,
    snow_mm: PyReadonlyArray2<'py, f64>,
    redistribution: PyReadonlyArray2<'py, f64>,
    row_areas_m2: Vec<f64>,
    parameters: Option<Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let surface = surface(&lwi)?;
    let grid = grid(surface.nrows(), row_areas_m2)?;
    let component = SoilVolatilisation::from_parameters(self::parameters(parameters)?);
    let flux = component
        .calculate(
            &grid,
            SoilInputs {
                surface: surface.view(),
                lai: lai.as_array(),
                suncos: suncos.as_array(),
                radswg: radswg.as_array(),
                snow_depth: snow_mm.as_array(),
                redistribution: redistribution.as_array(),
            },
        )
        .map_err(to_py_err)?;
    Ok(flux.into_pyarray_bound(py))
}

/// Prompt re-emission of one timestep's deposition (kg per cell and category).
#[pyfunction]
#[pyo3(signature = (
    lwi, snow_mm, wet_hg2, dry_hg2, wet_hgp, dry_hgp, dt, row_areas_m2,
    snowpack_active=true, parameters=None
))]
#[allow(clippy::too_many_arguments)]
fn recycling_flux<'py>(
    py: Python<'py>,
    lwi: PyReadonlyArray2<'py, i32>,
    snow_mm: PyReadonlyArray2<'py, f64>,
    wet_hg2: PyReadonlyArray3<'py, f64>,
    dry_hg2: PyReadonlyArray3<'py, f64>,
    wet_hgp: PyReadonlyArray3<'py, f64>,
    dry_hgp: PyReadonlyArray3<'py, f64>,
    dt: f64,
    row_areas_m2: Vec<f64>,
    snowpack_active: bool,
    parameters: Option<Bound<'py, PyAny>>,
) -> PyResult<Bound<'py, PyArray3<f64>>> {
    let surface = surface(&lwi)?;
    let grid = grid(surface.nrows(), row_areas_m2)?;
    let wet_hg2 = wet_hg2.as_array().to_owned();
    let deposition = DepositionAccumulator {
        dry_hg0: Array3::zeros(wet_hg2.raw_dim()),
        wet_hg2,
        dry_hg2: dry_hg2.as_array().to_owned(),
        wet_hgp: wet_hgp.as_array().to_owned(),
        dry_hgp: dry_hgp.as_array().to_owned(),
    };
    let component =
        PromptRecycling::from_parameters(self::parameters(parameters)?, snowpack_active);
    let flux = component
        .calculate(&grid, &surface, snow_mm.as_array(), &deposition, dt)
        .map_err(to_py_err)?;
    Ok(flux.into_pyarray_bound(py))
}

/// Snowpack re-emission. Returns `(flux, reservoir)` with the decayed reservoir.
#[pyfunction]
#[pyo3(signature = (ts, suncos, reservoir, dt, row_areas_m2, enabled=true, parameters=None))]
#[allow(clippy::too_many_arguments)]
fn snowpack_flux<'py>(
    py: Python<'py>,
    ts: PyReadonlyArray2<'py, f64>,
    suncos: PyReadonlyArray2<'py, f64>,
    reservoir: PyReadonlyArray3<'py, f64>,
    dt: f64,
    row_areas_m2: Vec<f64>,
    enabled: bool,
    parameters: Option<Bound<'py, PyAny>>,
) -> PyResult<(Bound<'py, PyArray3<f64>>, Bound<'py, PyArray3<f64>>)> {
    let ts = ts.as_array().to_owned();
    let grid = grid(ts.nrows(), row_areas_m2)?;
    let mut reservoir = SnowReservoir::from_mass(reservoir.as_array().to_owned());
    let component = SnowpackEmission::from_parameters(self::parameters(parameters)?, enabled);
    let flux = component
        .calculate(&grid, &ts, &suncos.as_array().to_owned(), dt, &mut reservoir)
        .map_err(to_py_err)?;
    Ok((
        flux.into_pyarray_bound(py),
        reservoir.into_mass().into_pyarray_bound(py),
    ))
}

#[pymodule]
pub fn emissions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(biomass_burning_flux, m)?)?;
    m.add_function(wrap_pyfunction!(vegetation_flux, m)?)?;
    m.add_function(wrap_pyfunction!(soil_flux, m)?)?;
    m.add_function(wrap_pyfunction!(recycling_flux, m)?)?;
    m.add_function(wrap_pyfunction!(snowpack_flux, m)?)?;
    Ok(())
}
