//! Prompt recycling of deposited mercury
//!
//! Part of the Hg(II) and particulate mercury deposited to land or ice in a
//! timestep is reduced and re-emitted as Hg0 straight away. The fraction
//! depends on whether the surface is snow covered:
//!
//! | Surface | Snowpack model on | Snowpack model off |
//! |---|---|---|
//! | snow or ice | 0 | 0.6 |
//! | snow-free land | 0.2 | 0.2 |
//!
//! With the snowpack model on, mercury falling on snow is stored in the
//! snow reservoir instead and released later by [`super::SnowpackEmission`].
//! Water cells never recycle.

use crate::deposition::DepositionAccumulator;
use crate::parameters::PromptRecyclingParameters;
use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::{LandGrid, SurfaceType};
use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};
use serde::{Deserialize, Serialize};

/// Prompt re-emission of deposited Hg(II) and particulate mercury
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRecycling {
    parameters: PromptRecyclingParameters,
    /// Snowpack model is active
    snowpack_active: bool,
}

impl PromptRecycling {
    pub fn new(snowpack_active: bool) -> Self {
        Self::from_parameters(PromptRecyclingParameters::default(), snowpack_active)
    }

    pub fn from_parameters(parameters: PromptRecyclingParameters, snowpack_active: bool) -> Self {
        Self {
            parameters,
            snowpack_active,
        }
    }

    /// Surface counts as snow covered
    pub fn snow_covered(&self, surface: SurfaceType, snow_mm: f64) -> bool {
        surface.is_ice() || snow_mm > self.parameters.snow_threshold_mm
    }

    /// Share of the deposition re-emitted from a land or ice cell
    pub fn reemission_fraction(&self, surface: SurfaceType, snow_mm: f64) -> f64 {
        match (self.snow_covered(surface, snow_mm), self.snowpack_active) {
            (true, true) => 0.0,
            (true, false) => self.parameters.snow_fraction,
            (false, _) => self.parameters.land_fraction,
        }
    }

    /// Mask of snow-covered cells, used to route deposition into the snowpack
    pub fn snow_mask(
        &self,
        surface: &Array2<SurfaceType>,
        snow_depth: ArrayView2<f64>,
    ) -> Array2<bool> {
        let mut covered = Array2::from_elem(surface.raw_dim(), false);
        Zip::from(&mut covered)
            .and(surface)
            .and(&snow_depth)
            .for_each(|c, &surface, &snow| {
                *c = surface != SurfaceType::Water && self.snow_covered(surface, snow)
            });
        covered
    }

    /// Re-emitted Hg0 flux per category
    /// unit: kg/s
    pub fn calculate(
        &self,
        grid: &LandGrid,
        surface: &Array2<SurfaceType>,
        snow_depth: ArrayView2<f64>,
        deposition: &DepositionAccumulator,
        dt: f64,
    ) -> HgResult<Array3<f64>> {
        if !(dt > 0.0) {
            return Err(HgError::Error(format!("Timestep must be positive, got {}", dt)));
        }
        grid.check_field("surface", surface)?;
        grid.check_field("snow depth", &snow_depth)?;
        let n_categories = deposition.n_categories();
        deposition.validate(grid, n_categories)?;

        let deposited = deposition.recyclable();
        let mut flux = grid.zeros_by_category(n_categories);
        Zip::from(flux.lanes_mut(Axis(2)))
            .and(deposited.lanes(Axis(2)))
            .and(surface)
            .and(&snow_depth)
            .par_for_each(|mut flux, deposited, &surface, &snow| {
                if surface == SurfaceType::Water {
                    return;
                }
                let fraction = self.reemission_fraction(surface, snow);
                flux.zip_mut_with(&deposited, |f, &d| *f = fraction * d / dt);
            });
        Ok(flux)
    }
}
