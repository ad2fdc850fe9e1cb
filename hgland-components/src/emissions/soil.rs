//! Soil volatilisation of mercury
//!
//! Light reaching the soil surface drives photoreduction and evasion of soil
//! mercury. The canopy attenuates the light according to LAI and sun angle.
//!
//! # Inputs
//!
//! - LAI, sun-angle cosine, ground solar radiation (W/m^2)
//! - Surface type and snow depth (mm water equivalent)
//! - Soil mercury redistribution factor
//!
//! # Outputs
//!
//! - Hg0 flux (kg/s)
//!
//! Snow at or above the threshold depth shuts emission off completely.
//! The emission depends on light only; no temperature term is applied.

use super::{soil_hg, Hg0Source, SourceInputs};
use crate::parameters::SoilParameters;
use hgland_core::errors::HgResult;
use hgland_core::grid::{LandGrid, SurfaceType};
use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

/// ng/m^2/h -> kg/m^2/s
const NG_PER_HOUR_TO_KG_PER_S: f64 = 1e-12 / 3600.0;

/// Soil Hg0 source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoilVolatilisation {
    parameters: SoilParameters,
}

/// Per-cell soil inputs, all on the same grid
#[derive(Debug, Clone, Copy)]
pub struct SoilInputs<'a> {
    pub surface: ArrayView2<'a, SurfaceType>,
    pub lai: ArrayView2<'a, f64>,
    pub suncos: ArrayView2<'a, f64>,
    /// unit: W/m^2
    pub radswg: ArrayView2<'a, f64>,
    /// unit: mm water equivalent
    pub snow_depth: ArrayView2<'a, f64>,
    pub redistribution: ArrayView2<'a, f64>,
}

impl SoilVolatilisation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(parameters: SoilParameters) -> Self {
        Self { parameters }
    }

    /// Emission rate per unit area of a snow-free land cell
    /// unit: ng/m^2/h
    pub fn emission_rate(&self, lai: f64, suncos: f64, radswg: f64, redistribution: f64) -> f64 {
        let p = &self.parameters;
        let attenuation = p.light_attenuation(lai, suncos);
        let soil = soil_hg(p.soil_hg_baseline, redistribution);
        (p.light_coefficient * radswg * attenuation).exp() * soil * p.scale
    }

    /// Hg0 flux for every cell
    /// unit: kg/s
    pub fn calculate(&self, grid: &LandGrid, inputs: SoilInputs) -> HgResult<Array2<f64>> {
        grid.check_field("surface", &inputs.surface)?;
        grid.check_field("lai", &inputs.lai)?;
        grid.check_field("suncos", &inputs.suncos)?;
        grid.check_field("radswg", &inputs.radswg)?;
        grid.check_field("snow depth", &inputs.snow_depth)?;
        grid.check_field("redistribution", &inputs.redistribution)?;

        let threshold = self.parameters.snow_threshold_mm;
        let mut flux = grid.zeros();
        Zip::indexed(&mut flux)
            .and(inputs.surface)
            .and(inputs.lai)
            .and(inputs.suncos)
            .and(inputs.radswg)
            .par_for_each(|(i, j), out, surface, &lai, &suncos, &radswg| {
                if !surface.is_land() || inputs.snow_depth[[i, j]] >= threshold {
                    return;
                }
                let rate = self.emission_rate(lai, suncos, radswg, inputs.redistribution[[i, j]]);
                *out = rate * grid.area_m2(j) * NG_PER_HOUR_TO_KG_PER_S;
            });
        Ok(flux)
    }
}

#[typetag::serde]
impl Hg0Source for SoilVolatilisation {
    fn name(&self) -> &'static str {
        "soil"
    }

    fn emit(&self, inputs: &SourceInputs) -> HgResult<Array2<f64>> {
        let met = inputs.met;
        self.calculate(
            inputs.grid,
            SoilInputs {
                surface: met.surface.view(),
                lai: met.lai.view(),
                suncos: met.suncos.view(),
                radswg: met.radswg.view(),
                snow_depth: inputs.snow_depth,
                redistribution: inputs.redistribution.view(),
            },
        )
    }
}
