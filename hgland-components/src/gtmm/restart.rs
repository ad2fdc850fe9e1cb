//! Deposition restart store
//!
//! GTMM is driven by the deposition accumulated over the previous month.
//! The store is keyed by `(year, month)`; the bpch implementation keeps one
//! file per month with three `HG-DEP` records.

use crate::deposition::MonthlyDeposition;
use hgland_core::bpch::{BpchReader, BpchWriter, DataBlock, DataBlockHeader, ModelInfo};
use hgland_core::clock::{days_in_month, tau_month_start};
use hgland_core::errors::HgResult;
use hgland_core::grid::LandGrid;
use log::info;
use ndarray::Array2;
use std::path::PathBuf;

/// Category of the deposition restart records
pub const RESTART_CATEGORY: &str = "HG-DEP";
const HG0_DRY_TRACER: i32 = 1;
const HG2_DRY_TRACER: i32 = 2;
const HG2_WET_TRACER: i32 = 3;

/// Persistent store of monthly deposition totals
pub trait DepositionRestart: std::fmt::Debug + Send {
    /// Deposition accumulated over `month` of `year`
    fn read(&self, grid: &LandGrid, year: i32, month: u32) -> HgResult<MonthlyDeposition>;

    /// Store the deposition accumulated over `month` of `year`
    fn write(&self, year: i32, month: u32, deposition: &MonthlyDeposition) -> HgResult<()>;
}

/// Replace the `YYYY` and `MM` tokens of a file name template
pub fn expand_template(template: &str, year: i32, month: u32) -> String {
    template
        .replace("YYYY", &format!("{:04}", year))
        .replace("MM", &format!("{:02}", month))
}

/// Deposition restart kept in monthly bpch files
#[derive(Debug, Clone)]
pub struct BpchDepositionRestart {
    pub directory: PathBuf,
    /// e.g. `gtmm_dep.YYYYMM.bpch`
    pub file_template: String,
    pub model: ModelInfo,
}

impl BpchDepositionRestart {
    pub fn new(directory: impl Into<PathBuf>, file_template: &str, model: ModelInfo) -> Self {
        Self {
            directory: directory.into(),
            file_template: file_template.to_string(),
            model,
        }
    }

    pub fn path(&self, year: i32, month: u32) -> PathBuf {
        self.directory
            .join(expand_template(&self.file_template, year, month))
    }
}

impl DepositionRestart for BpchDepositionRestart {
    fn read(&self, grid: &LandGrid, year: i32, month: u32) -> HgResult<MonthlyDeposition> {
        let path = self.path(year, month);
        let location = format!("deposition restart {}", path.display());
        let tau0 = tau_month_start(year, month)?;

        let read_field = |tracer: i32| -> HgResult<Array2<f64>> {
            // Records may be stored in any order
            let mut reader = BpchReader::open(&path)?;
            let block = reader.find(RESTART_CATEGORY, tracer, Some(tau0))?;
            block.header.check_horizontal(grid.nx(), grid.ny(), &location)?;
            block.surface()
        };
        let deposition = MonthlyDeposition {
            hg0_dry: read_field(HG0_DRY_TRACER)?,
            hg2_dry: read_field(HG2_DRY_TRACER)?,
            hg2_wet: read_field(HG2_WET_TRACER)?,
        };
        info!("Read {}", location);
        Ok(deposition)
    }

    fn write(&self, year: i32, month: u32, deposition: &MonthlyDeposition) -> HgResult<()> {
        let path = self.path(year, month);
        let tau0 = tau_month_start(year, month)?;
        let tau1 = tau0 + 24.0 * f64::from(days_in_month(year, month)?);

        let mut writer = BpchWriter::create(&path, "GTMM deposition restart")?;
        for (tracer, field) in [
            (HG0_DRY_TRACER, &deposition.hg0_dry),
            (HG2_DRY_TRACER, &deposition.hg2_dry),
            (HG2_WET_TRACER, &deposition.hg2_wet),
        ] {
            let header = DataBlockHeader::new(
                self.model.clone(),
                RESTART_CATEGORY,
                tracer,
                "kg",
                tau0,
                tau1,
                [0, 0, 0],
            );
            writer.write_block(&DataBlock::from_surface(header, field))?;
        }
        writer.finish()?;
        info!("Wrote deposition restart {}", path.display());
        Ok(())
    }
}
