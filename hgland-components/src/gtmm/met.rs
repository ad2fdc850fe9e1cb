//! Monthly meteorology for the coupled land model
//!
//! The met stream is a bpch file with one or more `DAO-FLDS` records per
//! field. Records are identified by their `(category, tracer)` tag, never by
//! their position in the file.

use hgland_core::bpch::{BpchReader, DataBlock};
use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::LandGrid;
use log::{debug, info};
use ndarray::Array2;
use std::path::Path;

/// Category holding the GTMM driving fields
pub const MET_CATEGORY: &str = "DAO-FLDS";

/// Known met record tags
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MetFieldTag {
    /// Ground solar radiation (RADSWG), W/m^2
    SolarRadiation,
    /// Accumulated precipitation (PREACC), mm/day
    Precipitation,
    /// Surface temperature (TS), K
    SurfaceTemperature,
}

impl MetFieldTag {
    /// Decode a record tag; `None` for anything not used by GTMM
    pub fn from_record(category: &str, tracer: i32) -> Option<Self> {
        if category != MET_CATEGORY {
            return None;
        }
        match tracer {
            2 => Some(Self::SolarRadiation),
            3 => Some(Self::Precipitation),
            5 => Some(Self::SurfaceTemperature),
            _ => None,
        }
    }

    pub fn tracer(self) -> i32 {
        match self {
            Self::SolarRadiation => 2,
            Self::Precipitation => 3,
            Self::SurfaceTemperature => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SolarRadiation => "RADSWG",
            Self::Precipitation => "PREACC",
            Self::SurfaceTemperature => "TS",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::SolarRadiation => "W/m2",
            Self::Precipitation => "mm/day",
            Self::SurfaceTemperature => "K",
        }
    }
}

/// Monthly mean met fields for GTMM
#[derive(Debug, Clone, PartialEq)]
pub struct GtmmMet {
    /// unit: K
    pub tsurf: Array2<f64>,
    /// unit: mm/day
    pub precip: Array2<f64>,
    /// unit: W/m^2
    pub solar: Array2<f64>,
}

impl GtmmMet {
    pub fn field(&self, tag: MetFieldTag) -> &Array2<f64> {
        match tag {
            MetFieldTag::SolarRadiation => &self.solar,
            MetFieldTag::Precipitation => &self.precip,
            MetFieldTag::SurfaceTemperature => &self.tsurf,
        }
    }
}

#[derive(Default)]
struct PartialMet {
    tsurf: Option<Array2<f64>>,
    precip: Option<Array2<f64>>,
    solar: Option<Array2<f64>>,
}

impl PartialMet {
    fn slot(&mut self, tag: MetFieldTag) -> &mut Option<Array2<f64>> {
        match tag {
            MetFieldTag::SolarRadiation => &mut self.solar,
            MetFieldTag::Precipitation => &mut self.precip,
            MetFieldTag::SurfaceTemperature => &mut self.tsurf,
        }
    }

    fn take(&mut self, tag: MetFieldTag, location: &str) -> HgResult<Array2<f64>> {
        self.slot(tag).take().ok_or_else(|| HgError::MissingField {
            location: location.to_string(),
            field: format!("{} ({}/{})", tag.name(), MET_CATEGORY, tag.tracer()),
        })
    }
}

/// Collect the GTMM met fields from a stream of blocks
///
/// The last record of each kind wins. Any read error aborts the load.
pub fn collect_gtmm_met<I>(blocks: I, grid: &LandGrid, location: &str) -> HgResult<GtmmMet>
where
    I: IntoIterator<Item = HgResult<DataBlock>>,
{
    let mut met = PartialMet::default();
    for block in blocks {
        let block = block?;
        let header = &block.header;
        let Some(tag) = MetFieldTag::from_record(&header.category, header.tracer) else {
            debug!(
                "{}: ignoring record {}/{}",
                location, header.category, header.tracer
            );
            continue;
        };
        header.check_horizontal(grid.nx(), grid.ny(), location)?;
        *met.slot(tag) = Some(block.surface()?);
    }

    Ok(GtmmMet {
        tsurf: met.take(MetFieldTag::SurfaceTemperature, location)?,
        precip: met.take(MetFieldTag::Precipitation, location)?,
        solar: met.take(MetFieldTag::SolarRadiation, location)?,
    })
}

/// Read a month of GTMM met fields from a bpch file
pub fn read_gtmm_met(path: &Path, grid: &LandGrid) -> HgResult<GtmmMet> {
    let location = format!("GTMM met {}", path.display());
    let reader = BpchReader::open(path)?;
    let met = collect_gtmm_met(reader, grid, &location)?;
    info!("Read GTMM met fields from {}", path.display());
    Ok(met)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hgland_core::bpch::{BpchWriter, DataBlockHeader, ModelInfo};

    fn block(category: &str, tracer: i32, value: f64, shape: (usize, usize)) -> DataBlock {
        let header = DataBlockHeader::new(
            ModelInfo::new("GEOS5", 5.0, 4.0),
            category,
            tracer,
            "",
            0.0,
            744.0,
            [0, 0, 0],
        );
        DataBlock::from_surface(header, &Array2::from_elem(shape, value))
    }

    fn grid() -> LandGrid {
        LandGrid::from_row_areas(2, vec![1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn test_tags() {
        assert_eq!(
            MetFieldTag::from_record("DAO-FLDS", 5),
            Some(MetFieldTag::SurfaceTemperature)
        );
        assert_eq!(
            MetFieldTag::from_record("DAO-FLDS", 3),
            Some(MetFieldTag::Precipitation)
        );
        assert_eq!(
            MetFieldTag::from_record("DAO-FLDS", 2),
            Some(MetFieldTag::SolarRadiation)
        );
        assert_eq!(MetFieldTag::from_record("DAO-FLDS", 4), None);
        assert_eq!(MetFieldTag::from_record("DAO-3D-$", 5), None);
        for tag in [
            MetFieldTag::SolarRadiation,
            MetFieldTag::Precipitation,
            MetFieldTag::SurfaceTemperature,
        ] {
            assert_eq!(MetFieldTag::from_record(MET_CATEGORY, tag.tracer()), Some(tag));
        }
    }

    #[test]
    fn test_unknown_records_skipped_and_last_wins() {
        let shape = (2, 3);
        let blocks = vec![
            block("DAO-FLDS", 5, 250.0, shape),
            block("DAO-FLDS", 3, 2.0, shape),
            // Unknown tags never overwrite a known field
            block("DAO-FLDS", 7, -1.0, (4, 4)),
            block("IJ-AVG-$", 5, -1.0, shape),
            block("DAO-FLDS", 2, 180.0, shape),
            block("DAO-FLDS", 5, 290.0, shape),
        ];
        let met = collect_gtmm_met(blocks.into_iter().map(Ok), &grid(), "test").unwrap();
        assert!(met.tsurf.iter().all(|v| *v == 290.0));
        assert!(met.precip.iter().all(|v| *v == 2.0));
        assert!(met.solar.iter().all(|v| *v == 180.0));
        assert_eq!(met.field(MetFieldTag::SolarRadiation), &met.solar);
    }

    #[test]
    fn test_missing_field() {
        let shape = (2, 3);
        let blocks = vec![block("DAO-FLDS", 5, 250.0, shape), block("DAO-FLDS", 2, 1.0, shape)];
        let err = collect_gtmm_met(blocks.into_iter().map(Ok), &grid(), "test").unwrap_err();
        match err {
            HgError::MissingField { field, .. } => assert!(field.contains("PREACC")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_grid_mismatch() {
        let blocks = vec![block("DAO-FLDS", 5, 250.0, (3, 3))];
        assert!(matches!(
            collect_gtmm_met(blocks.into_iter().map(Ok), &grid(), "test"),
            Err(HgError::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_block_without_levels() {
        let header = DataBlockHeader::new(
            ModelInfo::new("GEOS5", 5.0, 4.0),
            MET_CATEGORY,
            MetFieldTag::SurfaceTemperature.tracer(),
            "K",
            0.0,
            744.0,
            [2, 3, 0],
        );
        let empty = DataBlock::new(header, ndarray::Array3::zeros((2, 3, 0))).unwrap();
        assert!(matches!(
            collect_gtmm_met(vec![Ok(empty)], &grid(), "test"),
            Err(HgError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_read_error_aborts() {
        let blocks = vec![
            Ok(block("DAO-FLDS", 5, 250.0, (2, 3))),
            Err(HgError::UnexpectedEof {
                location: "test: block 2 record 3".to_string(),
            }),
        ];
        assert!(matches!(
            collect_gtmm_met(blocks, &grid(), "test"),
            Err(HgError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("met.bpch");
        let mut writer = BpchWriter::create(&path, "GTMM met").unwrap();
        for (tracer, value) in [(2, 100.0), (3, 1.5), (5, 280.0), (9, 0.0)] {
            writer
                .write_block(&block("DAO-FLDS", tracer, value, (2, 3)))
                .unwrap();
        }
        writer.finish().unwrap();

        let met = read_gtmm_met(&path, &grid()).unwrap();
        assert_eq!(met.tsurf[[1, 2]], 280.0);
        assert_eq!(met.precip[[0, 0]], 1.5);
        assert_eq!(met.solar[[1, 1]], 100.0);
    }
}
