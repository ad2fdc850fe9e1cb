//! Prompt Recycling Parameters
//!
//! A fraction of freshly deposited Hg(II) and particulate mercury is reduced
//! and re-emitted within the same timestep. Snow and ice surfaces recycle
//! more than bare land, unless the snowpack model tracks that mercury
//! explicitly.

use serde::{Deserialize, Serialize};

/// Parameters for prompt recycling of deposited mercury
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptRecyclingParameters {
    /// Snow deeper than this counts as snow covered
    /// unit: mm water equivalent
    /// default: 1.0
    pub snow_threshold_mm: f64,

    /// Re-emitted fraction on snow or ice when the snowpack model is off
    /// unit: dimensionless
    /// default: 0.6
    pub snow_fraction: f64,

    /// Re-emitted fraction on snow-free land
    /// unit: dimensionless
    /// default: 0.2
    pub land_fraction: f64,
}

impl Default for PromptRecyclingParameters {
    fn default() -> Self {
        Self {
            snow_threshold_mm: 1.0,
            snow_fraction: 0.6,
            land_fraction: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = PromptRecyclingParameters::default();
        assert_eq!(params.snow_fraction, 0.6);
        assert_eq!(params.land_fraction, 0.2);
    }

    #[test]
    fn test_fractions_are_fractions() {
        let params = PromptRecyclingParameters::default();
        for f in [params.snow_fraction, params.land_fraction] {
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_partial_deserialization() {
        let params: PromptRecyclingParameters =
            serde_json::from_str(r#"{"land_fraction": 0.1}"#).unwrap();
        assert_eq!(params.land_fraction, 0.1);
        assert_eq!(params.snow_fraction, 0.6);
    }
}
