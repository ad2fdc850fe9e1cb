//! Vegetation Transpiration Parameters
//!
//! Mercury dissolved in soil water is carried to the atmosphere by the
//! transpiration stream. Soil water concentration is in sorption equilibrium
//! with the soil.

use super::SOIL_HG_BASELINE;
use serde::{Deserialize, Serialize};

/// Parameters for transpiration-driven mercury emissions
///
/// $$E = \frac{C_{soil} \cdot f}{K_{sorb}} \cdot T \cdot A \cdot \rho_w \cdot 10^{-12}$$
///
/// where $f$ is the spatial redistribution factor and $T$ the transpiration
/// rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationParameters {
    /// Soil mercury concentration where the redistribution factor is 1
    /// unit: ng/g
    /// default: 45.0
    pub soil_hg_baseline: f64,

    /// Soil / soil-water sorption equilibrium constant
    /// unit: (ng/g soil) / (ng/g water)
    /// default: 6.3e3
    pub sorption_constant: f64,

    /// Density of water
    /// unit: g/m^3
    /// default: 1.0e6
    pub water_density: f64,
}

impl Default for VegetationParameters {
    fn default() -> Self {
        Self {
            soil_hg_baseline: SOIL_HG_BASELINE,
            sorption_constant: 6.3e3,
            water_density: 1.0e6,
        }
    }
}

impl VegetationParameters {
    /// Soil-water mercury concentration for a redistribution factor
    /// unit: ng/g
    pub fn soil_water_hg(&self, redistribution: f64) -> f64 {
        self.soil_hg_baseline * redistribution / self.sorption_constant
    }
}
