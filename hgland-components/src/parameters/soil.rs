//! Soil Volatilisation Parameters
//!
//! Light-driven evasion of mercury from snow-free soils, following the
//! regression of soil flux on solar radiation reaching the ground.
//!
//! # Open question
//!
//! The regression in the literature also carries a temperature term. It is
//! not applied here: emissions depend on light only.

use super::SOIL_HG_BASELINE;
use serde::{Deserialize, Serialize};

/// Parameters for soil mercury emissions
///
/// $$E = e^{\beta R_g \tau} \cdot C_{soil} \cdot f \cdot s$$
///
/// with canopy attenuation
/// $\tau = e^{-k \cdot LAI / \max(\cos\theta, \mu_{min})}$.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilParameters {
    /// Soil mercury concentration where the redistribution factor is 1
    /// unit: ng/g
    /// default: 45.0
    pub soil_hg_baseline: f64,

    /// Sensitivity of emission to ground solar radiation
    /// unit: m^2/W
    /// default: 1.1e-3
    pub light_coefficient: f64,

    /// Canopy extinction coefficient applied to LAI
    /// unit: dimensionless
    /// default: 0.5
    pub canopy_extinction: f64,

    /// Floor on the solar zenith angle cosine in the attenuation term
    /// unit: dimensionless
    /// default: 0.09
    pub min_suncos: f64,

    /// Tuned emission scale factor
    /// unit: (ng/m^2/h) / (ng/g)
    /// default: 2.4e-2
    pub scale: f64,

    /// Snow at or above this depth shuts off soil emission
    /// unit: mm water equivalent
    /// default: 1.0
    pub snow_threshold_mm: f64,
}

impl Default for SoilParameters {
    fn default() -> Self {
        Self {
            soil_hg_baseline: SOIL_HG_BASELINE,
            light_coefficient: 1.1e-3,
            canopy_extinction: 0.5,
            min_suncos: 0.09,
            scale: 2.4e-2,
            snow_threshold_mm: 1.0,
        }
    }
}

impl SoilParameters {
    /// Fraction of incoming light reaching the soil below the canopy
    pub fn light_attenuation(&self, lai: f64, suncos: f64) -> f64 {
        (-self.canopy_extinction * lai / suncos.max(self.min_suncos)).exp()
    }
}
