//! Emission process parameters
//!
//! Each process has a parameter struct with defaults matching the standard
//! GEOS-Chem mercury configuration. All structs accept partial input through
//! `#[serde(default)]`, so a configuration file only needs to name the values
//! it overrides.

mod biomass;
mod recycling;
mod snowpack;
mod soil;
mod vegetation;

pub use biomass::BiomassBurningParameters;
pub use recycling::PromptRecyclingParameters;
pub use snowpack::SnowpackParameters;
pub use soil::SoilParameters;
pub use vegetation::VegetationParameters;

/// Preindustrial background mercury concentration in soil
/// unit: ng/g
pub const SOIL_HG_BASELINE: f64 = 45.0;
