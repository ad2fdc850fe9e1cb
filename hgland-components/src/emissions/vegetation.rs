//! Vegetation transpiration mercury emissions
//!
//! Soil water carries dissolved mercury up through plants and releases it
//! with the transpiration stream.
//!
//! # Inputs
//!
//! - Surface type (land cells only)
//! - Soil mercury redistribution factor (dimensionless, land mean 1)
//! - Monthly transpiration rate (m/s)
//!
//! # Outputs
//!
//! - Hg0 flux (kg/s)
//!
//! When the land surface is handed to an external land model, this process
//! is switched off and emits nothing.

use super::{soil_hg, Hg0Source, SourceInputs};
use crate::parameters::VegetationParameters;
use hgland_core::errors::HgResult;
use hgland_core::grid::{LandGrid, SurfaceType};
use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

/// Convert ng to kg
const KG_PER_NG: f64 = 1e-12;

/// Transpiration-driven Hg0 source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegetationTranspiration {
    parameters: VegetationParameters,
    /// Land emissions come from an external land model instead
    alternate_source: bool,
}

impl VegetationTranspiration {
    pub fn new(alternate_source: bool) -> Self {
        Self::from_parameters(VegetationParameters::default(), alternate_source)
    }

    pub fn from_parameters(parameters: VegetationParameters, alternate_source: bool) -> Self {
        Self {
            parameters,
            alternate_source,
        }
    }

    /// Soil mercury concentration behind a redistribution factor
    /// unit: ng/g
    pub fn soil_hg(&self, redistribution: f64) -> f64 {
        soil_hg(self.parameters.soil_hg_baseline, redistribution)
    }

    /// Flux from one land cell
    /// unit: kg/s
    pub fn cell_flux(&self, redistribution: f64, transpiration: f64, area_m2: f64) -> f64 {
        let soil_water = self.parameters.soil_water_hg(redistribution);
        // ng/g * m/s * m^2 * g/m^3 = ng/s
        soil_water * transpiration * area_m2 * self.parameters.water_density * KG_PER_NG
    }

    /// Hg0 flux for every cell
    /// unit: kg/s
    pub fn calculate(
        &self,
        grid: &LandGrid,
        surface: &Array2<SurfaceType>,
        redistribution: &Array2<f64>,
        transpiration: ArrayView2<f64>,
    ) -> HgResult<Array2<f64>> {
        let mut flux = grid.zeros();
        if self.alternate_source {
            return Ok(flux);
        }
        grid.check_field("surface", surface)?;
        grid.check_field("redistribution", redistribution)?;
        grid.check_field("transpiration", &transpiration)?;

        Zip::indexed(&mut flux)
            .and(surface)
            .and(redistribution)
            .and(&transpiration)
            .par_for_each(|(_, j), out, surface, &factor, &transp| {
                if surface.is_land() {
                    *out = self.cell_flux(factor, transp, grid.area_m2(j));
                }
            });
        Ok(flux)
    }
}

#[typetag::serde]
impl Hg0Source for VegetationTranspiration {
    fn name(&self) -> &'static str {
        "vegetation"
    }

    fn emit(&self, inputs: &SourceInputs) -> HgResult<Array2<f64>> {
        if self.alternate_source {
            return Ok(inputs.grid.zeros());
        }
        let transpiration = inputs.transpiration.for_month(inputs.month)?;
        self.calculate(
            inputs.grid,
            &inputs.met.surface,
            inputs.redistribution,
            transpiration,
        )
    }
}
