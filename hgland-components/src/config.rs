//! Run configuration
//!
//! A land mercury run is described by a TOML document. Every table is
//! optional and falls back to its defaults:
//!
//! ```toml
//! [simulation]
//! timestep_seconds = 3600.0
//! n_categories = 1
//! met_source = "geos_fp"
//!
//! [switches]
//! biomass_burning = true
//! preindustrial = false
//! snowpack = true
//! land_source = "empirical"
//!
//! [transpiration]
//! path = "mercury/transpiration.bpch"
//!
//! [parameters.soil]
//! scale = 2.4e-2
//! ```

use crate::emissions::{
    BiomassBurning, Hg0Source, Hg0Sources, PromptRecycling, SnowpackEmission, SoilVolatilisation,
    VegetationTranspiration,
};
use crate::gtmm::{BpchDepositionRestart, CoupledLandModel, GtmmBridge};
use crate::parameters::{
    BiomassBurningParameters, PromptRecyclingParameters, SnowpackParameters, SoilParameters,
    VegetationParameters,
};
use crate::transpiration::TranspirationFile;
use hgland_core::bpch::ModelInfo;
use hgland_core::errors::{HgError, HgResult};
use hgland_core::met::MetSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where land Hg0 emissions come from
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandSource {
    /// Built-in vegetation and soil parameterisations
    #[default]
    Empirical,
    /// External land model; vegetation and soil emit nothing
    Gtmm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// unit: s
    pub timestep_seconds: f64,
    /// Mercury categories tracked, including the total
    pub n_categories: usize,
    pub met_source: MetSource,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep_seconds: 3600.0,
            n_categories: 1,
            met_source: MetSource::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Switches {
    pub biomass_burning: bool,
    pub preindustrial: bool,
    pub snowpack: bool,
    pub land_source: LandSource,
}

impl Default for Switches {
    fn default() -> Self {
        Self {
            biomass_burning: true,
            preindustrial: false,
            snowpack: true,
            land_source: LandSource::Empirical,
        }
    }
}

/// File locations for the GTMM coupling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GtmmConfig {
    pub met_directory: PathBuf,
    /// File name with `YYYY` and `MM` tokens
    pub met_file_template: String,
    pub restart_directory: PathBuf,
    /// File name with `YYYY` and `MM` tokens
    pub restart_file_template: String,
    pub model: ModelInfo,
}

impl Default for GtmmConfig {
    fn default() -> Self {
        Self {
            met_directory: PathBuf::from("gtmm"),
            met_file_template: "met.YYYYMM.bpch".to_string(),
            restart_directory: PathBuf::from("gtmm"),
            restart_file_template: "deposition.YYYYMM.bpch".to_string(),
            model: ModelInfo::new("GEOS5", 5.0, 4.0),
        }
    }
}

impl GtmmConfig {
    /// Wire `model` to the configured met stream and restart store
    pub fn build_bridge(&self, model: Box<dyn CoupledLandModel>) -> GtmmBridge {
        let restart = BpchDepositionRestart::new(
            self.restart_directory.clone(),
            &self.restart_file_template,
            self.model.clone(),
        );
        GtmmBridge::new(
            model,
            Box::new(restart),
            self.met_directory.clone(),
            &self.met_file_template,
        )
    }
}

/// Per-process parameter tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessParameters {
    pub biomass: BiomassBurningParameters,
    pub vegetation: VegetationParameters,
    pub soil: SoilParameters,
    pub snowpack: SnowpackParameters,
    pub recycling: PromptRecyclingParameters,
}

/// Complete configuration of the land mercury module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandMercuryConfig {
    pub simulation: SimulationConfig,
    pub switches: Switches,
    pub transpiration: TranspirationFile,
    pub gtmm: GtmmConfig,
    pub parameters: ProcessParameters,
}

impl LandMercuryConfig {
    pub fn from_toml_str(text: &str) -> HgResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| HgError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> HgResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HgError::io(&path.display().to_string(), e))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> HgResult<String> {
        toml::to_string(self).map_err(|e| HgError::Config(e.to_string()))
    }

    pub fn validate(&self) -> HgResult<()> {
        let dt = self.simulation.timestep_seconds;
        if !(dt > 0.0) {
            return Err(HgError::Config(format!(
                "timestep_seconds must be positive, got {}",
                dt
            )));
        }
        if self.simulation.n_categories == 0 {
            return Err(HgError::Config(
                "n_categories must include the total category".to_string(),
            ));
        }
        self.transpiration.validate()
    }

    /// Hg0 sources for this run
    ///
    /// Soil is left out when GTMM provides land emissions; vegetation stays
    /// in the set but emits zero.
    pub fn build_sources(&self) -> Hg0Sources {
        let gtmm = self.switches.land_source == LandSource::Gtmm;
        let mut sources: Vec<Box<dyn Hg0Source>> = vec![
            Box::new(BiomassBurning::from_parameters(
                self.parameters.biomass.clone(),
                self.switches.biomass_burning,
                self.switches.preindustrial,
            )),
            Box::new(VegetationTranspiration::from_parameters(
                self.parameters.vegetation.clone(),
                gtmm,
            )),
        ];
        if !gtmm {
            sources.push(Box::new(SoilVolatilisation::from_parameters(
                self.parameters.soil.clone(),
            )));
        }
        Hg0Sources::new(sources)
    }

    pub fn build_snowpack(&self) -> SnowpackEmission {
        SnowpackEmission::from_parameters(self.parameters.snowpack.clone(), self.switches.snowpack)
    }

    pub fn build_recycling(&self) -> PromptRecycling {
        PromptRecycling::from_parameters(self.parameters.recycling.clone(), self.switches.snowpack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LandMercuryConfig::from_toml_str("").unwrap();
        assert_eq!(config, LandMercuryConfig::default());
        assert_eq!(config.simulation.met_source, MetSource::GeosFp);
        assert_eq!(config.parameters.soil.scale, 2.4e-2);
    }

    #[test]
    fn test_partial_document() {
        let config = LandMercuryConfig::from_toml_str(
            r#"
[simulation]
timestep_seconds = 1800.0
met_source = "geos4"

[switches]
preindustrial = true
land_source = "gtmm"

[transpiration]
path = "data/transp.bpch"

[parameters.vegetation]
sorption_constant = 4.5e3
"#,
        )
        .unwrap();
        assert_eq!(config.simulation.timestep_seconds, 1800.0);
        assert_eq!(config.simulation.n_categories, 1);
        assert_eq!(config.simulation.met_source, MetSource::Geos4);
        assert!(config.switches.preindustrial);
        assert!(config.switches.biomass_burning);
        assert_eq!(config.switches.land_source, LandSource::Gtmm);
        assert_eq!(config.transpiration.path, PathBuf::from("data/transp.bpch"));
        assert_eq!(config.transpiration.category, "TRANSP");
        assert_eq!(config.parameters.vegetation.sorption_constant, 4.5e3);
        assert_eq!(config.parameters.vegetation.soil_hg_baseline, 45.0);
    }

    #[test]
    fn test_invalid_documents() {
        for text in [
            "[simulation]\ntimestep_seconds = 0.0",
            "[simulation]\nn_categories = 0",
            "[switches]\nland_source = \"satellite\"",
            "[transpiration]\nunit = \"kg/m2/s\"",
            "simulation = 3",
        ] {
            assert!(
                matches!(LandMercuryConfig::from_toml_str(text), Err(HgError::Config(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_sources_follow_land_source() {
        let mut config = LandMercuryConfig::default();
        assert_eq!(
            config.build_sources().names(),
            vec!["biomass_burning", "vegetation", "soil"]
        );
        config.switches.land_source = LandSource::Gtmm;
        assert_eq!(config.build_sources().names(), vec!["biomass_burning", "vegetation"]);
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = LandMercuryConfig::default();
        config.switches.snowpack = false;
        config.parameters.snowpack.warm_rate = 2e-6;
        let text = config.to_toml_string().unwrap();
        assert_eq!(LandMercuryConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_sources_round_trip() {
        let sources = LandMercuryConfig::default().build_sources();
        let serialised = toml::to_string(&sources).unwrap();
        let deserialised: Hg0Sources = toml::from_str(&serialised).unwrap();
        assert_eq!(deserialised.names(), sources.names());

        let json = serde_json::to_string(&sources).unwrap();
        assert!(json.contains("SoilVolatilisation"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hgland.toml");
        std::fs::write(&path, "[switches]\nsnowpack = false\n").unwrap();
        let config = LandMercuryConfig::from_file(&path).unwrap();
        assert!(!config.switches.snowpack);
        assert!(!config.build_snowpack().is_enabled());

        assert!(matches!(
            LandMercuryConfig::from_file(&dir.path().join("missing.toml")),
            Err(HgError::Io { .. })
        ));
    }
}
