//! Per-timestep driver for the land mercury module
//!
//! [`LandMercury`] owns the configured processes and the month-scoped
//! state (transpiration climatology, monthly deposition totals, GTMM
//! output). The snow reservoir and the timestep's deposition stay with the
//! caller and are lent to [`LandMercury::step`].
//!
//! Within a timestep the processes run in a fixed order:
//!
//! 1. Hg0 sources (biomass burning, vegetation, soil)
//! 2. prompt recycling of this timestep's deposition
//! 3. snowpack emission from the reservoir
//! 4. deposition on snow is added to the reservoir (snowpack model only)
//! 5. deposition is added to the monthly totals
//!
//! A new calendar month first reloads the transpiration climatology and,
//! when configured, runs the GTMM bridge.

use crate::config::{LandMercuryConfig, LandSource};
use crate::deposition::{DepositionAccumulator, MonthlyDeposition};
use crate::emissions::{Hg0Sources, PromptRecycling, SnowpackEmission, SourceInputs};
use crate::gtmm::{CoupledLandModel, GtmmBridge};
use crate::reservoir::SnowReservoir;
use crate::transpiration::TranspirationClimatology;
use chrono::NaiveDateTime;
use hgland_core::clock::ModelClock;
use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::{LandGrid, SurfaceType};
use hgland_core::met::{MetFields, SnowDepthSource};
use log::{debug, info};
use ndarray::{Array2, Array3, Axis};
use std::collections::BTreeMap;

/// Land emissions for one timestep
#[derive(Debug, Clone, PartialEq)]
pub struct LandEmissions {
    /// Hg0 flux per source, kg/s
    pub hg0_sources: BTreeMap<&'static str, Array2<f64>>,
    /// Snowpack re-emission per category, kg/s
    pub snowpack: Array3<f64>,
    /// Prompt recycling per category, kg/s
    pub recycled: Array3<f64>,
    /// Land model emission for the current month, kg/s
    pub gtmm: Option<Array2<f64>>,
}

impl LandEmissions {
    /// Sum of every Hg0 pathway (category 0 for the per-category fluxes)
    /// unit: kg/s
    pub fn total_hg0(&self) -> Array2<f64> {
        let mut total = self.snowpack.index_axis(Axis(2), 0).to_owned();
        total += &self.recycled.index_axis(Axis(2), 0);
        for flux in self.hg0_sources.values() {
            total += flux;
        }
        if let Some(gtmm) = &self.gtmm {
            total += gtmm;
        }
        total
    }
}

/// Configured land mercury module
#[derive(Debug)]
pub struct LandMercury {
    config: LandMercuryConfig,
    grid: LandGrid,
    /// Soil mercury redistribution, land mean of 1
    redistribution: Array2<f64>,
    sources: Hg0Sources,
    snowpack: SnowpackEmission,
    recycling: PromptRecycling,
    snow_depth: &'static dyn SnowDepthSource,
    transpiration: TranspirationClimatology,
    monthly_deposition: MonthlyDeposition,
    gtmm: Option<GtmmBridge>,
    gtmm_emission: Option<Array2<f64>>,
    /// Calendar month currently set up, as `(year, month)`
    current_month: Option<(i32, u32)>,
}

impl LandMercury {
    pub fn new(
        config: LandMercuryConfig,
        grid: LandGrid,
        redistribution: Array2<f64>,
    ) -> HgResult<Self> {
        config.validate()?;
        grid.check_field("redistribution", &redistribution)?;

        let transpiration = TranspirationClimatology::new(&grid)?;
        let monthly_deposition = MonthlyDeposition::new(&grid);
        let sources = config.build_sources();
        info!(
            "Land mercury sources: {:?} (snow from {})",
            sources.names(),
            config.simulation.met_source.snow_depth_source().field_name()
        );

        Ok(Self {
            snow_depth: config.simulation.met_source.snow_depth_source(),
            snowpack: config.build_snowpack(),
            recycling: config.build_recycling(),
            sources,
            config,
            grid,
            redistribution,
            transpiration,
            monthly_deposition,
            gtmm: None,
            gtmm_emission: None,
            current_month: None,
        })
    }

    /// Attach the external land model used when the land source is GTMM
    pub fn with_gtmm(mut self, model: Box<dyn CoupledLandModel>) -> Self {
        self.gtmm = Some(self.config.gtmm.build_bridge(model));
        self
    }

    pub fn config(&self) -> &LandMercuryConfig {
        &self.config
    }

    pub fn grid(&self) -> &LandGrid {
        &self.grid
    }

    /// A clock starting at `start` with the configured timestep
    pub fn clock(&self, start: NaiveDateTime) -> HgResult<ModelClock> {
        ModelClock::new(start, self.config.simulation.timestep_seconds)
    }

    pub fn monthly_deposition(&self) -> &MonthlyDeposition {
        &self.monthly_deposition
    }

    pub fn transpiration(&self) -> &TranspirationClimatology {
        &self.transpiration
    }

    /// Prepare month-scoped state for the clock's calendar month
    ///
    /// Does nothing if that month is already set up.
    pub fn start_month(
        &mut self,
        clock: &ModelClock,
        surface: &Array2<SurfaceType>,
    ) -> HgResult<()> {
        let month = (clock.year(), clock.month());
        if self.current_month == Some(month) {
            return Ok(());
        }

        match self.config.switches.land_source {
            LandSource::Empirical => {
                self.transpiration
                    .ensure_month(&self.config.transpiration, month.1)?;
            }
            LandSource::Gtmm => {
                let bridge = self.gtmm.as_mut().ok_or_else(|| {
                    HgError::Config("land_source is gtmm but no land model is attached".to_string())
                })?;
                // Only a completed month is worth a restart entry
                if let Some((year, m)) = self.current_month {
                    bridge.save_deposition(year, m, &self.monthly_deposition)?;
                }
                let emission = bridge.run_month(
                    &self.grid,
                    surface,
                    month,
                    clock.previous_calendar_month(),
                )?;
                self.gtmm_emission = Some(emission);
            }
        }

        self.monthly_deposition.reset();
        self.current_month = Some(month);
        info!("Land mercury set up for {:04}-{:02}", month.0, month.1);
        Ok(())
    }

    /// Compute every land emission for the current timestep
    ///
    /// `deposition` holds this timestep's deposition; `reservoir` is updated
    /// in place.
    ///
    /// Inputs are checked before any state changes. A later failure may
    /// leave the new month set up (see [`start_month`](Self::start_month))
    /// and the reservoir decayed.
    pub fn step(
        &mut self,
        clock: &ModelClock,
        met: &MetFields,
        biomass_co: Option<&Array2<f64>>,
        deposition: &DepositionAccumulator,
        reservoir: &mut SnowReservoir,
    ) -> HgResult<LandEmissions> {
        let n_categories = self.config.simulation.n_categories;
        met.validate(&self.grid)?;
        deposition.validate(&self.grid, n_categories)?;
        reservoir.validate(&self.grid, n_categories)?;
        let snow_depth = self.snow_depth.snow_depth_mm(met)?;
        self.start_month(clock, &met.surface)?;

        let dt = clock.timestep_seconds();

        let inputs = SourceInputs {
            grid: &self.grid,
            month: clock.month(),
            met,
            snow_depth,
            redistribution: &self.redistribution,
            transpiration: &self.transpiration,
            biomass_co,
        };
        let hg0_sources = self.sources.emit_all(&inputs)?;
        let recycled = self
            .recycling
            .calculate(&self.grid, &met.surface, snow_depth, deposition, dt)?;
        let snowpack = self
            .snowpack
            .calculate(&self.grid, &met.ts, &met.suncos, dt, reservoir)?;

        if self.snowpack.is_enabled() {
            let covered = self.recycling.snow_mask(&met.surface, snow_depth);
            reservoir.add_deposition(&deposition.recyclable(), &covered)?;
        }
        self.monthly_deposition.accumulate(deposition);

        debug!(
            "Land mercury step at {}: snow reservoir {:.3e} kg",
            clock.current(),
            reservoir.total()
        );
        Ok(LandEmissions {
            hg0_sources,
            snowpack,
            recycled,
            gtmm: self.gtmm_emission.clone(),
        })
    }
}
