//! Snowpack mercury re-emission
//!
//! Mercury held in snow is photoreduced and released as Hg0 during daylight.
//! The stored mass decays exponentially over a timestep:
//!
//! $$M' = M \cdot e^{-k \Delta t}, \qquad F = \frac{\max(M - M', 0)}{\Delta t}$$
//!
//! where $k$ depends on whether the ground is above the warm threshold.
//! Nothing happens at night, so repeated night-time calls leave the reservoir
//! unchanged.

use crate::parameters::SnowpackParameters;
use crate::reservoir::SnowReservoir;
use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::LandGrid;
use ndarray::{Array2, Array3, Axis, Zip};
use serde::{Deserialize, Serialize};

/// Snowpack re-emission process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowpackEmission {
    parameters: SnowpackParameters,
    /// Snowpack model is active
    enabled: bool,
}

impl SnowpackEmission {
    pub fn new(enabled: bool) -> Self {
        Self::from_parameters(SnowpackParameters::default(), enabled)
    }

    pub fn from_parameters(parameters: SnowpackParameters, enabled: bool) -> Self {
        Self {
            parameters,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decay one stored mass over `dt`
    ///
    /// Returns `(flux, remaining)` in kg/s and kg.
    pub fn decay(&self, mass: f64, ts: f64, dt: f64) -> (f64, f64) {
        let k = self.parameters.decay_rate(ts);
        let remaining = mass * (-k * dt).exp();
        ((mass - remaining).max(0.0) / dt, remaining)
    }

    /// Emit from the reservoir, decaying it in place
    ///
    /// Returns the per-category flux (kg/s). The reservoir is only modified
    /// in daylit cells holding positive mass.
    pub fn calculate(
        &self,
        grid: &LandGrid,
        ts: &Array2<f64>,
        suncos: &Array2<f64>,
        dt: f64,
        reservoir: &mut SnowReservoir,
    ) -> HgResult<Array3<f64>> {
        let n_categories = reservoir.n_categories();
        let mut flux = grid.zeros_by_category(n_categories);
        if !self.enabled {
            return Ok(flux);
        }
        if !(dt > 0.0) {
            return Err(HgError::Error(format!("Timestep must be positive, got {}", dt)));
        }
        grid.check_field("ts", ts)?;
        grid.check_field("suncos", suncos)?;
        reservoir.validate(grid, n_categories)?;

        Zip::from(flux.lanes_mut(Axis(2)))
            .and(reservoir.mass_mut().lanes_mut(Axis(2)))
            .and(ts)
            .and(suncos)
            .par_for_each(|mut flux, mut mass, &ts, &suncos| {
                if suncos < 0.0 {
                    return;
                }
                for (f, m) in flux.iter_mut().zip(mass.iter_mut()) {
                    if *m > 0.0 {
                        let (emitted, remaining) = self.decay(*m, ts, dt);
                        *f = emitted;
                        *m = remaining;
                    }
                }
            });
        Ok(flux)
    }
}
