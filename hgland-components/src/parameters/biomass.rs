//! Biomass Burning Parameters
//!
//! Mercury from fires is scaled from the CO emitted by the same fires, using a
//! fixed Hg/CO molar emission ratio.

use serde::{Deserialize, Serialize};

/// Parameters for biomass burning mercury emissions
///
/// $$E_{Hg} = \frac{E_{CO} \cdot A}{N_A} \cdot R_{Hg/CO} \cdot M_{Hg}$$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomassBurningParameters {
    /// Hg/CO molar emission ratio of fires
    /// unit: mol/mol
    /// default: 2.1e-7
    pub hg_co_ratio: f64,

    /// Avogadro's number
    /// unit: molecules/mol
    /// default: 6.022e23
    pub avogadro: f64,

    /// Molar mass of mercury
    /// unit: kg/mol
    /// default: 0.20059
    pub hg_molar_mass: f64,
}

impl Default for BiomassBurningParameters {
    fn default() -> Self {
        Self {
            hg_co_ratio: 2.1e-7,
            avogadro: 6.022e23,
            hg_molar_mass: 0.20059,
        }
    }
}
