//! Bridge to the Global Terrestrial Mercury Model (GTMM)
//!
//! Once a month the bridge gathers what the external land model needs:
//!
//! 1. monthly mean met fields (surface temperature, precipitation, ground
//!    solar radiation) from a bpch met stream,
//! 2. the previous month's Hg deposition from the restart store,
//!
//! hands them to the model, and masks the returned Hg0 emission to land.
//! Any failure along the way aborts the month; no partial result is
//! returned.

mod met;
mod restart;

pub use met::{collect_gtmm_met, read_gtmm_met, GtmmMet, MetFieldTag, MET_CATEGORY};
pub use restart::{expand_template, BpchDepositionRestart, DepositionRestart, RESTART_CATEGORY};

use crate::deposition::MonthlyDeposition;
use hgland_core::errors::HgResult;
use hgland_core::grid::{LandGrid, SurfaceType};
use log::info;
use ndarray::{Array2, Zip};
use std::path::PathBuf;

/// Everything handed to the land model for one month
#[derive(Debug, Clone, Copy)]
pub struct GtmmInputs<'a> {
    pub year: i32,
    pub month: u32,
    pub met: &'a GtmmMet,
    /// Deposition over the previous month
    pub deposition: &'a MonthlyDeposition,
}

/// An external land-surface mercury model
pub trait CoupledLandModel: std::fmt::Debug + Send {
    /// Advance the land model by one month
    ///
    /// Returns the Hg0 emission for every cell (kg/s).
    fn run_month(&mut self, inputs: &GtmmInputs) -> HgResult<Array2<f64>>;
}

/// Monthly driver for a [`CoupledLandModel`]
#[derive(Debug)]
pub struct GtmmBridge {
    model: Box<dyn CoupledLandModel>,
    restart: Box<dyn DepositionRestart>,
    met_directory: PathBuf,
    /// File name of the met stream, with `YYYY` and `MM` tokens
    met_file_template: String,
}

impl GtmmBridge {
    pub fn new(
        model: Box<dyn CoupledLandModel>,
        restart: Box<dyn DepositionRestart>,
        met_directory: impl Into<PathBuf>,
        met_file_template: &str,
    ) -> Self {
        Self {
            model,
            restart,
            met_directory: met_directory.into(),
            met_file_template: met_file_template.to_string(),
        }
    }

    pub fn met_path(&self, year: i32, month: u32) -> PathBuf {
        self.met_directory
            .join(expand_template(&self.met_file_template, year, month))
    }

    pub fn restart(&self) -> &dyn DepositionRestart {
        self.restart.as_ref()
    }

    /// Run the land model for `month`
    ///
    /// `deposition_month` names the restart entry to drive it with, usually
    /// the preceding calendar month. Returns the Hg0 emission (kg/s), zero
    /// over water and ice.
    pub fn run_month(
        &mut self,
        grid: &LandGrid,
        surface: &Array2<SurfaceType>,
        (year, month): (i32, u32),
        deposition_month: (i32, u32),
    ) -> HgResult<Array2<f64>> {
        grid.check_field("surface", surface)?;
        let met = read_gtmm_met(&self.met_path(year, month), grid)?;
        let deposition = self
            .restart
            .read(grid, deposition_month.0, deposition_month.1)?;

        let mut emission = self.model.run_month(&GtmmInputs {
            year,
            month,
            met: &met,
            deposition: &deposition,
        })?;
        grid.check_field("GTMM emission", &emission)?;
        mask_to_land(&mut emission, surface);

        info!(
            "GTMM {:04}-{:02}: land Hg0 emission {:.3e} kg/s",
            year,
            month,
            emission.sum()
        );
        Ok(emission)
    }

    /// Store this month's deposition for the next call
    pub fn save_deposition(
        &self,
        year: i32,
        month: u32,
        deposition: &MonthlyDeposition,
    ) -> HgResult<()> {
        self.restart.write(year, month, deposition)
    }
}

/// Zero every non-land cell
pub fn mask_to_land(field: &mut Array2<f64>, surface: &Array2<SurfaceType>) {
    Zip::from(field).and(surface).par_for_each(|v, surface| {
        if !surface.is_land() {
            *v = 0.0;
        }
    });
}
