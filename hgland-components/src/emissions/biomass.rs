//! Biomass burning mercury emissions
//!
//! Fire emissions of Hg0 are derived from the CO emitted by the same fires:
//!
//! $$E_{Hg} = \frac{E_{CO} \cdot A_{cm^2}}{N_A} \cdot R_{Hg/CO} \cdot M_{Hg}$$
//!
//! # Inputs
//!
//! - CO emission rate (molecules/cm^2/s)
//!
//! # Outputs
//!
//! - Hg0 flux (kg/s)

use super::{Hg0Source, SourceInputs};
use crate::parameters::BiomassBurningParameters;
use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::LandGrid;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// Biomass burning Hg0 source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomassBurning {
    parameters: BiomassBurningParameters,
    /// Biomass burning emissions are switched on
    enabled: bool,
    /// Preindustrial runs have no biomass burning mercury
    preindustrial: bool,
}

impl BiomassBurning {
    pub fn new(enabled: bool, preindustrial: bool) -> Self {
        Self::from_parameters(BiomassBurningParameters::default(), enabled, preindustrial)
    }

    pub fn from_parameters(
        parameters: BiomassBurningParameters,
        enabled: bool,
        preindustrial: bool,
    ) -> Self {
        Self {
            parameters,
            enabled,
            preindustrial,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && !self.preindustrial
    }

    /// Hg0 flux from one cell's CO emission rate and area
    /// unit: kg/s
    pub fn cell_flux(&self, co_rate: f64, area_cm2: f64) -> f64 {
        let co_moles = co_rate * area_cm2 / self.parameters.avogadro;
        co_moles * self.parameters.hg_co_ratio * self.parameters.hg_molar_mass
    }

    /// Hg0 flux for every cell
    /// unit: kg/s
    pub fn calculate(&self, grid: &LandGrid, co_rate: &Array2<f64>) -> HgResult<Array2<f64>> {
        let mut flux = grid.zeros();
        if !self.is_active() {
            return Ok(flux);
        }
        grid.check_field("biomass CO", co_rate)?;

        Zip::indexed(&mut flux)
            .and(co_rate)
            .par_for_each(|(_, j), out, &co| *out = self.cell_flux(co, grid.area_cm2(j)));
        Ok(flux)
    }
}

#[typetag::serde]
impl Hg0Source for BiomassBurning {
    fn name(&self) -> &'static str {
        "biomass_burning"
    }

    fn emit(&self, inputs: &SourceInputs) -> HgResult<Array2<f64>> {
        if !self.is_active() {
            return Ok(inputs.grid.zeros());
        }
        let co_rate = inputs.biomass_co.ok_or_else(|| HgError::MissingField {
            location: "biomass_burning".to_string(),
            field: "biomass CO emissions".to_string(),
        })?;
        self.calculate(inputs.grid, co_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn unit_cell_grid() -> LandGrid {
        // One cell of exactly 1 cm^2
        LandGrid::from_row_areas(1, vec![1e-4]).unwrap()
    }

    #[test]
    fn test_one_mole_of_co() {
        let component = BiomassBurning::new(true, false);
        let flux = component
            .calculate(&unit_cell_grid(), &array![[6.022e23]])
            .unwrap();
        assert_relative_eq!(flux[[0, 0]], 2.1e-7 * 0.20059, max_relative = 1e-12);
        assert_relative_eq!(flux[[0, 0]], 4.212e-8, max_relative = 1e-3);
    }

    #[test]
    fn test_disabled_or_preindustrial_is_zero() {
        let grid = LandGrid::from_row_areas(2, vec![1e8, 2e8]).unwrap();
        let co = Array2::from_elem((2, 2), 1e12);
        for (enabled, preindustrial) in [(false, false), (true, true), (false, true)] {
            let component = BiomassBurning::new(enabled, preindustrial);
            let flux = component.calculate(&grid, &co).unwrap();
            assert!(
                flux.iter().all(|v| *v == 0.0),
                "enabled={} preindustrial={} should give zero flux",
                enabled,
                preindustrial
            );
        }
    }

    #[test]
    fn test_scales_with_row_area() {
        let grid = LandGrid::from_row_areas(1, vec![1.0, 3.0]).unwrap();
        let component = BiomassBurning::new(true, false);
        let flux = component.calculate(&grid, &array![[1e12, 1e12]]).unwrap();
        assert_relative_eq!(flux[[0, 1]], 3.0 * flux[[0, 0]], max_relative = 1e-12);
    }

    #[test]
    fn test_shape_checked_when_active() {
        let component = BiomassBurning::new(true, false);
        assert!(component
            .calculate(&unit_cell_grid(), &Array2::zeros((2, 2)))
            .is_err());
        // Inactive runs never look at the input
        let component = BiomassBurning::new(false, false);
        assert!(component
            .calculate(&unit_cell_grid(), &Array2::zeros((2, 2)))
            .is_ok());
    }

    #[test]
    fn test_serialization() {
        let component = BiomassBurning::new(true, false);
        let json = serde_json::to_string(&component).unwrap();
        let restored: BiomassBurning = serde_json::from_str(&json).unwrap();
        assert!(restored.is_active());
        assert_eq!(restored.parameters, component.parameters);
    }
}
