//! Meteorological inputs to the land mercury calculators
//!
//! Different meteorological products carry snow in different fields. The
//! field used is chosen once, from [`MetSource`], and accessed through the
//! [`SnowDepthSource`] trait so the calculators never need to know which
//! product is driving the run.

use crate::errors::{HgError, HgResult};
use crate::grid::{LandGrid, SurfaceType};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Per-cell meteorology for the current timestep
#[derive(Debug, Clone)]
pub struct MetFields {
    /// Surface classification
    pub surface: Array2<SurfaceType>,
    /// Ground (surface air) temperature
    /// unit: K
    pub ts: Array2<f64>,
    /// Cosine of the solar zenith angle, negative at night
    pub suncos: Array2<f64>,
    /// Solar radiation at the ground
    /// unit: W / m^2
    pub radswg: Array2<f64>,
    /// Leaf area index
    /// unit: m^2 / m^2
    pub lai: Array2<f64>,
    /// Snow mass (GEOS-5 family `SNOMAS`)
    /// unit: kg / m^2, numerically equal to mm water equivalent
    pub snomas: Option<Array2<f64>>,
    /// Snow water equivalent (GEOS-4 `SNOW`)
    /// unit: mm H2O
    pub snow: Option<Array2<f64>>,
}

impl MetFields {
    /// All-water, zero-valued meteorology on `grid`
    pub fn new(grid: &LandGrid) -> Self {
        Self {
            surface: Array2::from_elem(grid.shape(), SurfaceType::Water),
            ts: grid.zeros(),
            suncos: grid.zeros(),
            radswg: grid.zeros(),
            lai: grid.zeros(),
            snomas: None,
            snow: None,
        }
    }

    /// Check every populated field against the grid extent
    pub fn validate(&self, grid: &LandGrid) -> HgResult<()> {
        grid.check_field("surface", &self.surface)?;
        grid.check_field("ts", &self.ts)?;
        grid.check_field("suncos", &self.suncos)?;
        grid.check_field("radswg", &self.radswg)?;
        grid.check_field("lai", &self.lai)?;
        if let Some(snomas) = &self.snomas {
            grid.check_field("snomas", snomas)?;
        }
        if let Some(snow) = &self.snow {
            grid.check_field("snow", snow)?;
        }
        Ok(())
    }
}

/// Accessor for snow depth in mm water equivalent
pub trait SnowDepthSource: Send + Sync + std::fmt::Debug {
    /// Name of the meteorological field read by this source
    fn field_name(&self) -> &'static str;

    /// Snow depth for every cell
    /// unit: mm water equivalent
    fn snow_depth_mm<'a>(&self, met: &'a MetFields) -> HgResult<ArrayView2<'a, f64>>;
}

/// Snow from the `SNOMAS` field (kg/m^2)
#[derive(Debug, Clone, Copy, Default)]
pub struct SnowMass;

impl SnowDepthSource for SnowMass {
    fn field_name(&self) -> &'static str {
        "SNOMAS"
    }

    fn snow_depth_mm<'a>(&self, met: &'a MetFields) -> HgResult<ArrayView2<'a, f64>> {
        met.snomas
            .as_ref()
            .map(|f| f.view())
            .ok_or_else(|| missing(self.field_name()))
    }
}

/// Snow from the `SNOW` water-equivalent field (mm H2O)
#[derive(Debug, Clone, Copy, Default)]
pub struct SnowWaterEquivalent;

impl SnowDepthSource for SnowWaterEquivalent {
    fn field_name(&self) -> &'static str {
        "SNOW"
    }

    fn snow_depth_mm<'a>(&self, met: &'a MetFields) -> HgResult<ArrayView2<'a, f64>> {
        met.snow
            .as_ref()
            .map(|f| f.view())
            .ok_or_else(|| missing(self.field_name()))
    }
}

fn missing(field: &str) -> HgError {
    HgError::MissingField {
        location: "snow_depth_mm".to_string(),
        field: field.to_string(),
    }
}

/// Meteorological product driving the simulation
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetSource {
    Geos4,
    Geos5,
    Merra,
    #[default]
    GeosFp,
}

static SNOW_MASS: SnowMass = SnowMass;
static SNOW_WATER_EQUIVALENT: SnowWaterEquivalent = SnowWaterEquivalent;

impl MetSource {
    /// The snow accessor for this product
    pub fn snow_depth_source(self) -> &'static dyn SnowDepthSource {
        match self {
            MetSource::Geos4 => &SNOW_WATER_EQUIVALENT,
            MetSource::Geos5 | MetSource::Merra | MetSource::GeosFp => &SNOW_MASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn grid() -> LandGrid {
        LandGrid::from_row_areas(2, vec![1.0]).unwrap()
    }

    #[test]
    fn test_snow_source_selection() {
        assert_eq!(MetSource::Geos4.snow_depth_source().field_name(), "SNOW");
        assert_eq!(MetSource::Merra.snow_depth_source().field_name(), "SNOMAS");
        assert_eq!(MetSource::default().snow_depth_source().field_name(), "SNOMAS");
    }

    #[test]
    fn test_snow_source_reads_its_field() {
        let mut met = MetFields::new(&grid());
        met.snomas = Some(array![[1.0], [2.0]]);
        met.snow = Some(array![[10.0], [20.0]]);

        let depth = MetSource::Geos5.snow_depth_source().snow_depth_mm(&met).unwrap();
        assert_eq!(depth[[1, 0]], 2.0);
        let depth = MetSource::Geos4.snow_depth_source().snow_depth_mm(&met).unwrap();
        assert_eq!(depth[[1, 0]], 20.0);
    }

    #[test]
    fn test_missing_snow_field() {
        let met = MetFields::new(&grid());
        let err = MetSource::GeosFp
            .snow_depth_source()
            .snow_depth_mm(&met)
            .unwrap_err();
        assert!(matches!(err, HgError::MissingField { field, .. } if field == "SNOMAS"));
    }

    #[test]
    fn test_validate_shapes() {
        let grid = grid();
        let mut met = MetFields::new(&grid);
        assert!(met.validate(&grid).is_ok());
        met.snow = Some(Array2::zeros((3, 3)));
        assert!(met.validate(&grid).is_err());
    }

    #[test]
    fn test_met_source_serde() {
        let source: MetSource = serde_json::from_str("\"geos_fp\"").unwrap();
        assert_eq!(source, MetSource::GeosFp);
        assert_eq!(serde_json::to_string(&MetSource::Geos4).unwrap(), "\"geos4\"");
    }
}
