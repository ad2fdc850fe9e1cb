//! Mercury deposition bookkeeping
//!
//! [`DepositionAccumulator`] collects wet and dry deposition of Hg(II) and
//! particulate mercury over one emission timestep, per mercury category.
//! Prompt recycling reads it; the deposition schemes fill it. Category 0 is
//! the total; higher categories are tagged sub-totals.
//!
//! [`MonthlyDeposition`] sums the totals over a calendar month for the GTMM
//! coupling.

use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::LandGrid;
use ndarray::{Array2, Array3, Axis, Zip};

/// Deposition pathway
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepositionKind {
    WetHg2,
    DryHg2,
    WetHgP,
    DryHgP,
    DryHg0,
}

/// Deposited mass over the current timestep
#[derive(Debug, Clone, PartialEq)]
pub struct DepositionAccumulator {
    /// unit: kg
    pub wet_hg2: Array3<f64>,
    /// unit: kg
    pub dry_hg2: Array3<f64>,
    /// unit: kg
    pub wet_hgp: Array3<f64>,
    /// unit: kg
    pub dry_hgp: Array3<f64>,
    /// Dry deposition of elemental mercury; not recycled, passed to GTMM
    /// unit: kg
    pub dry_hg0: Array3<f64>,
}

impl DepositionAccumulator {
    pub fn new(grid: &LandGrid, n_categories: usize) -> Self {
        let zeros = grid.zeros_by_category(n_categories);
        Self {
            wet_hg2: zeros.clone(),
            dry_hg2: zeros.clone(),
            wet_hgp: zeros.clone(),
            dry_hgp: zeros.clone(),
            dry_hg0: zeros,
        }
    }

    pub fn n_categories(&self) -> usize {
        self.wet_hg2.len_of(Axis(2))
    }

    fn field_mut(&mut self, kind: DepositionKind) -> &mut Array3<f64> {
        match kind {
            DepositionKind::WetHg2 => &mut self.wet_hg2,
            DepositionKind::DryHg2 => &mut self.dry_hg2,
            DepositionKind::WetHgP => &mut self.wet_hgp,
            DepositionKind::DryHgP => &mut self.dry_hgp,
            DepositionKind::DryHg0 => &mut self.dry_hg0,
        }
    }

    /// Add `mass` (kg) deposited in cell `(i, j)` for `category`
    pub fn add(&mut self, kind: DepositionKind, i: usize, j: usize, category: usize, mass: f64) {
        self.field_mut(kind)[[i, j, category]] += mass;
    }

    /// Sum of the four recyclable pathways (Hg(II) and particulate, wet and dry)
    /// unit: kg
    pub fn recyclable(&self) -> Array3<f64> {
        let mut total = self.wet_hg2.clone();
        Zip::from(&mut total)
            .and(&self.dry_hg2)
            .and(&self.wet_hgp)
            .and(&self.dry_hgp)
            .par_for_each(|t, &d2, &wp, &dp| *t += d2 + wp + dp);
        total
    }

    /// Check every pathway against the grid and category count
    pub fn validate(&self, grid: &LandGrid, n_categories: usize) -> HgResult<()> {
        let expected = [grid.nx(), grid.ny(), n_categories];
        for (name, field) in [
            ("wet_hg2", &self.wet_hg2),
            ("dry_hg2", &self.dry_hg2),
            ("wet_hgp", &self.wet_hgp),
            ("dry_hgp", &self.dry_hgp),
            ("dry_hg0", &self.dry_hg0),
        ] {
            if field.shape() != expected {
                return Err(HgError::ShapeMismatch {
                    name: name.to_string(),
                    expected: expected.to_vec(),
                    found: field.shape().to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Zero every pathway, ready for the next timestep
    pub fn reset(&mut self) {
        for field in [
            &mut self.wet_hg2,
            &mut self.dry_hg2,
            &mut self.wet_hgp,
            &mut self.dry_hgp,
            &mut self.dry_hg0,
        ] {
            field.fill(0.0);
        }
    }
}

/// Deposition totals over a calendar month (category 0 only)
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyDeposition {
    /// unit: kg
    pub hg0_dry: Array2<f64>,
    /// Hg(II) plus particulate dry deposition
    /// unit: kg
    pub hg2_dry: Array2<f64>,
    /// Hg(II) plus particulate wet deposition
    /// unit: kg
    pub hg2_wet: Array2<f64>,
}

impl MonthlyDeposition {
    pub fn new(grid: &LandGrid) -> Self {
        Self {
            hg0_dry: grid.zeros(),
            hg2_dry: grid.zeros(),
            hg2_wet: grid.zeros(),
        }
    }

    /// Add one timestep of deposition
    pub fn accumulate(&mut self, step: &DepositionAccumulator) {
        let total = Axis(2);
        Zip::from(&mut self.hg0_dry)
            .and(step.dry_hg0.index_axis(total, 0))
            .par_for_each(|m, &d| *m += d);
        Zip::from(&mut self.hg2_dry)
            .and(step.dry_hg2.index_axis(total, 0))
            .and(step.dry_hgp.index_axis(total, 0))
            .par_for_each(|m, &d2, &dp| *m += d2 + dp);
        Zip::from(&mut self.hg2_wet)
            .and(step.wet_hg2.index_axis(total, 0))
            .and(step.wet_hgp.index_axis(total, 0))
            .par_for_each(|m, &w2, &wp| *m += w2 + wp);
    }

    pub fn reset(&mut self) {
        self.hg0_dry.fill(0.0);
        self.hg2_dry.fill(0.0);
        self.hg2_wet.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> LandGrid {
        LandGrid::from_row_areas(2, vec![1.0, 1.0]).unwrap()
    }

    #[test]
    fn test_recyclable_sums_four_pathways() {
        let mut dep = DepositionAccumulator::new(&grid(), 2);
        dep.add(DepositionKind::WetHg2, 1, 0, 0, 1.0);
        dep.add(DepositionKind::DryHg2, 1, 0, 0, 2.0);
        dep.add(DepositionKind::WetHgP, 1, 0, 0, 3.0);
        dep.add(DepositionKind::DryHgP, 1, 0, 0, 4.0);
        dep.add(DepositionKind::DryHg0, 1, 0, 0, 100.0);
        dep.add(DepositionKind::WetHg2, 1, 0, 1, 0.5);

        let total = dep.recyclable();
        assert_eq!(total[[1, 0, 0]], 10.0);
        assert_eq!(total[[1, 0, 1]], 0.5);
        assert_eq!(total[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_reset() {
        let mut dep = DepositionAccumulator::new(&grid(), 1);
        dep.add(DepositionKind::DryHg0, 0, 1, 0, 1.0);
        dep.add(DepositionKind::WetHgP, 0, 1, 0, 1.0);
        dep.reset();
        assert_eq!(dep, DepositionAccumulator::new(&grid(), 1));
    }

    #[test]
    fn test_validate() {
        let dep = DepositionAccumulator::new(&grid(), 3);
        assert_eq!(dep.n_categories(), 3);
        assert!(dep.validate(&grid(), 3).is_ok());
        assert!(dep.validate(&grid(), 1).is_err());
    }

    #[test]
    fn test_monthly_accumulation_uses_totals() {
        let grid = grid();
        let mut dep = DepositionAccumulator::new(&grid, 2);
        dep.add(DepositionKind::DryHg0, 0, 0, 0, 1.0);
        dep.add(DepositionKind::DryHg2, 0, 0, 0, 2.0);
        dep.add(DepositionKind::DryHgP, 0, 0, 0, 3.0);
        dep.add(DepositionKind::WetHg2, 0, 0, 0, 4.0);
        dep.add(DepositionKind::WetHgP, 0, 0, 0, 5.0);
        // Tagged categories are already part of the total
        dep.add(DepositionKind::WetHg2, 0, 0, 1, 50.0);

        let mut monthly = MonthlyDeposition::new(&grid);
        monthly.accumulate(&dep);
        monthly.accumulate(&dep);
        assert_eq!(monthly.hg0_dry[[0, 0]], 2.0);
        assert_eq!(monthly.hg2_dry[[0, 0]], 10.0);
        assert_eq!(monthly.hg2_wet[[0, 0]], 18.0);

        monthly.reset();
        assert_eq!(monthly, MonthlyDeposition::new(&grid));
    }
}
