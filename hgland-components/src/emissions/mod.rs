//! Land mercury emission processes
//!
//! Processes are organised by what they produce:
//!
//! - [`Hg0Source`] implementations ([`BiomassBurning`], [`VegetationTranspiration`],
//!   [`SoilVolatilisation`]) produce a single Hg0 flux field from the current
//!   meteorology and can be composed and serialised as trait objects.
//! - [`SnowpackEmission`] and [`PromptRecycling`] produce per-category fluxes
//!   and work on deposited or stored mercury.
//!
//! Every flux is in kg/s per grid cell. Policy switches (disabled process,
//! preindustrial run, alternate land source) give an all-zero field rather
//! than an error.

mod biomass;
mod recycling;
mod snowpack;
mod soil;
mod vegetation;

pub use biomass::BiomassBurning;
pub use recycling::PromptRecycling;
pub use snowpack::SnowpackEmission;
pub use soil::{SoilInputs, SoilVolatilisation};
pub use vegetation::VegetationTranspiration;

use crate::transpiration::TranspirationClimatology;
use hgland_core::errors::HgResult;
use hgland_core::grid::LandGrid;
use hgland_core::met::MetFields;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything an Hg0 source may read for one timestep
#[derive(Debug, Clone)]
pub struct SourceInputs<'a> {
    pub grid: &'a LandGrid,
    pub month: u32,
    pub met: &'a MetFields,
    /// unit: mm water equivalent
    pub snow_depth: ArrayView2<'a, f64>,
    /// Spatial redistribution of soil mercury, land mean of 1
    pub redistribution: &'a Array2<f64>,
    pub transpiration: &'a TranspirationClimatology,
    /// CO emitted by fires
    /// unit: molecules / cm^2 / s
    pub biomass_co: Option<&'a Array2<f64>>,
}

/// A process emitting Hg0 from the land surface
#[typetag::serde]
pub trait Hg0Source: std::fmt::Debug + Send + Sync {
    /// Short name used to label the process output
    fn name(&self) -> &'static str;

    /// Hg0 flux for every cell
    /// unit: kg/s
    fn emit(&self, inputs: &SourceInputs) -> HgResult<Array2<f64>>;
}

/// An ordered, serialisable set of Hg0 sources
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Hg0Sources {
    sources: Vec<Box<dyn Hg0Source>>,
}

impl Hg0Sources {
    pub fn new(sources: Vec<Box<dyn Hg0Source>>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run every source, keyed by name
    ///
    /// Sources are independent and run in parallel.
    pub fn emit_all(&self, inputs: &SourceInputs) -> HgResult<BTreeMap<&'static str, Array2<f64>>> {
        self.sources
            .par_iter()
            .map(|source| Ok((source.name(), source.emit(inputs)?)))
            .collect()
    }
}

/// Soil mercury concentration for a redistribution factor
/// unit: ng/g
pub(crate) fn soil_hg(baseline: f64, redistribution: f64) -> f64 {
    baseline * redistribution
}
