//! Mass conservation tests for the snowpack pathway.
//!
//! Mercury entering the snow reservoir must either stay there or leave it as
//! snowpack emission; nothing is created or lost along the way.

use approx::assert_relative_eq;
use hgland_components::deposition::{DepositionAccumulator, DepositionKind};
use hgland_components::emissions::{PromptRecycling, SnowpackEmission};
use hgland_components::reservoir::SnowReservoir;
use hgland_core::grid::{LandGrid, SurfaceType};
use ndarray::{Array2, Array3};

fn grid() -> LandGrid {
    LandGrid::from_row_areas(3, vec![1.0e10, 2.0e10]).unwrap()
}

mod snowpack_conservation {
    use super::*;

    /// Reservoir plus cumulative emission equals initial plus deposited mass.
    #[test]
    fn test_reservoir_mass_balance() {
        let grid = grid();
        let dt = 3600.0;
        let snowpack = SnowpackEmission::new(true);
        let recycling = PromptRecycling::new(true);

        let surface = Array2::from_elem(grid.shape(), SurfaceType::Land);
        let snow = Array2::from_elem(grid.shape(), 10.0);
        let covered = recycling.snow_mask(&surface, snow.view());
        assert!(covered.iter().all(|c| *c));

        let mut reservoir = SnowReservoir::from_mass(Array3::from_elem((3, 2, 2), 1.0));
        let initial = reservoir.mass().sum();
        let mut deposited = 0.0;
        let mut emitted = 0.0;

        let mut deposition = DepositionAccumulator::new(&grid, 2);
        deposition.add(DepositionKind::WetHg2, 0, 0, 0, 0.5);
        deposition.add(DepositionKind::DryHgP, 2, 1, 1, 0.25);

        for hour in 0..48 {
            // Alternate warm days and cold nights
            let daytime = hour % 24 < 12;
            let suncos = Array2::from_elem(grid.shape(), if daytime { 0.6 } else { -0.3 });
            let ts = Array2::from_elem(grid.shape(), if daytime { 275.0 } else { 255.0 });

            let flux = snowpack
                .calculate(&grid, &ts, &suncos, dt, &mut reservoir)
                .unwrap();
            emitted += flux.sum() * dt;

            let step = deposition.recyclable();
            deposited += step.sum();
            reservoir.add_deposition(&step, &covered).unwrap();
        }

        assert!(emitted > 0.0);
        assert_relative_eq!(
            reservoir.mass().sum() + emitted,
            initial + deposited,
            max_relative = 1e-12
        );
    }

    /// The reservoir never goes negative, whatever the temperature.
    #[test]
    fn test_reservoir_non_negative() {
        let grid = grid();
        let snowpack = SnowpackEmission::new(true);
        let mut reservoir = SnowReservoir::from_mass(Array3::from_elem((3, 2, 1), 1.0e-3));
        let ts = Array2::from_elem(grid.shape(), 300.0);
        let suncos = Array2::from_elem(grid.shape(), 1.0);

        for _ in 0..1000 {
            let flux = snowpack
                .calculate(&grid, &ts, &suncos, 86400.0, &mut reservoir)
                .unwrap();
            assert!(flux.iter().all(|f| *f >= 0.0));
        }
        assert!(reservoir.mass().iter().all(|m| *m >= 0.0));
        assert!(reservoir.total() < 1.0e-3);
    }
}

mod recycling_partition {
    use super::*;

    /// With the snowpack off, recycled mass never exceeds what was deposited.
    #[test]
    fn test_recycled_bounded_by_deposition() {
        let grid = grid();
        let dt = 900.0;
        let surface = Array2::from_shape_vec(
            (3, 2),
            vec![
                SurfaceType::Land,
                SurfaceType::Land,
                SurfaceType::Ice,
                SurfaceType::Water,
                SurfaceType::Land,
                SurfaceType::Ice,
            ],
        )
        .unwrap();
        let snow = Array2::from_shape_vec((3, 2), vec![0.0, 5.0, 0.0, 0.0, 0.5, 2.0]).unwrap();

        let mut deposition = DepositionAccumulator::new(&grid, 1);
        for i in 0..3 {
            for j in 0..2 {
                deposition.add(DepositionKind::WetHg2, i, j, 0, 1.0);
                deposition.add(DepositionKind::DryHg2, i, j, 0, 1.0);
            }
        }

        let flux = PromptRecycling::new(false)
            .calculate(&grid, &surface, snow.view(), &deposition, dt)
            .unwrap();
        let recycled = &flux * dt;
        let deposited = deposition.recyclable();
        for (r, d) in recycled.iter().zip(deposited.iter()) {
            assert!(*r <= *d);
            assert!(*r >= 0.0);
        }
        // Snow-free land 0.2, snow 0.6, ice 0.6, water 0
        assert_relative_eq!(recycled[[0, 0, 0]], 0.4, max_relative = 1e-12);
        assert_relative_eq!(recycled[[0, 1, 0]], 1.2, max_relative = 1e-12);
        assert_relative_eq!(recycled[[1, 0, 0]], 1.2, max_relative = 1e-12);
        assert_eq!(recycled[[1, 1, 0]], 0.0);
        assert_relative_eq!(recycled[[2, 0, 0]], 0.4, max_relative = 1e-12);
        assert_relative_eq!(recycled[[2, 1, 0]], 1.2, max_relative = 1e-12);
    }
}
