//! Mercury stored in the snowpack
//!
//! The reservoir is owned by the caller and lent to the snowpack process as
//! `&mut`, so exactly one writer can touch it during a timestep.

use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::LandGrid;
use ndarray::{Array2, Array3, Axis, Zip};

/// Per-cell, per-category mercury mass held in snow
#[derive(Debug, Clone, PartialEq)]
pub struct SnowReservoir {
    /// unit: kg
    mass: Array3<f64>,
}

impl SnowReservoir {
    /// An empty reservoir
    pub fn new(grid: &LandGrid, n_categories: usize) -> Self {
        Self {
            mass: grid.zeros_by_category(n_categories),
        }
    }

    /// Wrap existing masses (e.g. from a restart)
    pub fn from_mass(mass: Array3<f64>) -> Self {
        Self { mass }
    }

    pub fn mass(&self) -> &Array3<f64> {
        &self.mass
    }

    pub fn mass_mut(&mut self) -> &mut Array3<f64> {
        &mut self.mass
    }

    pub fn into_mass(self) -> Array3<f64> {
        self.mass
    }

    pub fn n_categories(&self) -> usize {
        self.mass.len_of(Axis(2))
    }

    /// Total stored mass of category 0
    /// unit: kg
    pub fn total(&self) -> f64 {
        self.mass.index_axis(Axis(2), 0).sum()
    }

    pub fn validate(&self, grid: &LandGrid, n_categories: usize) -> HgResult<()> {
        let expected = [grid.nx(), grid.ny(), n_categories];
        if self.mass.shape() != expected {
            return Err(HgError::ShapeMismatch {
                name: "snow reservoir".to_string(),
                expected: expected.to_vec(),
                found: self.mass.shape().to_vec(),
            });
        }
        Ok(())
    }

    /// Add deposited mass to every cell where `covered` is set
    ///
    /// `deposited` is per cell and category (kg). Both inputs must match the
    /// reservoir's shape.
    pub fn add_deposition(
        &mut self,
        deposited: &Array3<f64>,
        covered: &Array2<bool>,
    ) -> HgResult<()> {
        if deposited.shape() != self.mass.shape() {
            return Err(HgError::ShapeMismatch {
                name: "deposition added to snow".to_string(),
                expected: self.mass.shape().to_vec(),
                found: deposited.shape().to_vec(),
            });
        }
        if covered.shape() != &self.mass.shape()[..2] {
            return Err(HgError::ShapeMismatch {
                name: "snow cover".to_string(),
                expected: self.mass.shape()[..2].to_vec(),
                found: covered.shape().to_vec(),
            });
        }
        Zip::from(self.mass.lanes_mut(Axis(2)))
            .and(deposited.lanes(Axis(2)))
            .and(covered)
            .par_for_each(|mut stored, added, &covered| {
                if covered {
                    stored += &added;
                }
            });
        Ok(())
    }
}
