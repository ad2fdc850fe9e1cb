//! Horizontal grid and surface classification for land mercury calculations
//!
//! Fields are stored as `ndarray` arrays indexed `[i, j]` (longitude, latitude),
//! or `[i, j, n]` when resolved by mercury category. Cell areas only vary with
//! latitude, so [`LandGrid`] stores one area per latitude row.
//!
//! # Examples
//!
//! ```rust
//! use hgland_core::grid::LandGrid;
//!
//! let grid = LandGrid::global(72, 46, true);
//! assert_eq!(grid.shape(), (72, 46));
//!
//! // Polar rows are half as tall, so their cells are much smaller
//! assert!(grid.area_m2(0) < grid.area_m2(23));
//! ```

use crate::errors::{HgError, HgResult};
use ndarray::{Array2, Array3, ArrayBase, Data, Dimension, Zip};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for cell areas
/// unit: m
pub const EARTH_RADIUS_M: f64 = 6.375e6;

/// Regular longitude/latitude grid
///
/// The grid only knows its extent and the area of a cell in each latitude row.
/// All per-cell state lives in arrays owned by the caller.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LandGrid {
    nx: usize,
    ny: usize,
    /// Area of one cell in each latitude row
    /// unit: m^2
    row_area_m2: Vec<f64>,
}

impl LandGrid {
    /// Create a global grid with `nx` longitudes and `ny` latitudes
    ///
    /// With `half_polar` set, the first and last latitude rows are centred on
    /// the poles and span half a latitude interval, as in the GEOS grids.
    pub fn global(nx: usize, ny: usize, half_polar: bool) -> Self {
        let dlon = 2.0 * std::f64::consts::PI / nx as f64;
        let (dlat, south_edge) = if half_polar && ny > 1 {
            let dlat = 180.0 / (ny - 1) as f64;
            (dlat, -90.0 - dlat / 2.0)
        } else {
            (180.0 / ny as f64, -90.0)
        };

        let row_area_m2 = (0..ny)
            .map(|j| {
                let south = (south_edge + j as f64 * dlat).max(-90.0).to_radians();
                let north = (south_edge + (j + 1) as f64 * dlat).min(90.0).to_radians();
                EARTH_RADIUS_M * EARTH_RADIUS_M * dlon * (north.sin() - south.sin())
            })
            .collect();

        Self {
            nx,
            ny,
            row_area_m2,
        }
    }

    /// Create a grid from explicit row areas
    ///
    /// Used for regional or test domains where areas come from elsewhere.
    pub fn from_row_areas(nx: usize, row_area_m2: Vec<f64>) -> HgResult<Self> {
        if nx == 0 || row_area_m2.is_empty() {
            return Err(HgError::Error("Grid must have at least one cell".to_string()));
        }
        if let Some(bad) = row_area_m2.iter().find(|a| !(**a > 0.0)) {
            return Err(HgError::Error(format!(
                "Grid cell areas must be positive, got {}",
                bad
            )));
        }
        Ok(Self {
            nx,
            ny: row_area_m2.len(),
            row_area_m2,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn n_cells(&self) -> usize {
        self.nx * self.ny
    }

    /// Area of a cell in latitude row `j`
    /// unit: m^2
    pub fn area_m2(&self, j: usize) -> f64 {
        self.row_area_m2[j]
    }

    /// Area of a cell in latitude row `j`
    /// unit: cm^2
    pub fn area_cm2(&self, j: usize) -> f64 {
        self.row_area_m2[j] * 1e4
    }

    pub fn row_areas_m2(&self) -> &[f64] {
        &self.row_area_m2
    }

    /// A zero-filled field on this grid
    pub fn zeros(&self) -> Array2<f64> {
        Array2::zeros(self.shape())
    }

    /// A zero-filled field with one slice per mercury category
    pub fn zeros_by_category(&self, n_categories: usize) -> Array3<f64> {
        Array3::zeros((self.nx, self.ny, n_categories))
    }

    /// Check that the horizontal extent of `field` matches this grid
    pub fn check_field<S, D>(&self, name: &str, field: &ArrayBase<S, D>) -> HgResult<()>
    where
        S: Data,
        D: Dimension,
    {
        let shape = field.shape();
        if shape.len() < 2 || shape[0] != self.nx || shape[1] != self.ny {
            let mut expected = vec![self.nx, self.ny];
            expected.extend_from_slice(shape.get(2..).unwrap_or(&[]));
            return Err(HgError::ShapeMismatch {
                name: name.to_string(),
                expected,
                found: shape.to_vec(),
            });
        }
        Ok(())
    }
}

/// Surface classification of a grid cell
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    #[default]
    Water,
    Land,
    Ice,
}

impl SurfaceType {
    /// Decode a land/water/ice code from the meteorology (0 water, 1 land, 2 ice)
    pub fn from_lwi(code: i32) -> HgResult<Self> {
        match code {
            0 => Ok(SurfaceType::Water),
            1 => Ok(SurfaceType::Land),
            2 => Ok(SurfaceType::Ice),
            other => Err(HgError::InvalidSurfaceCode(other)),
        }
    }

    pub fn is_land(self) -> bool {
        self == SurfaceType::Land
    }

    pub fn is_ice(self) -> bool {
        self == SurfaceType::Ice
    }
}

/// Decode a whole field of LWI codes
pub fn surface_from_lwi(lwi: &Array2<i32>) -> HgResult<Array2<SurfaceType>> {
    let mut surface = Array2::from_elem(lwi.raw_dim(), SurfaceType::Water);
    for (out, &code) in surface.iter_mut().zip(lwi.iter()) {
        *out = SurfaceType::from_lwi(code)?;
    }
    Ok(surface)
}

/// Rescale `field` so that its area-weighted mean over land cells is 1
///
/// Spatial redistribution factors (e.g. the soil mercury distribution) are
/// supplied in arbitrary units and normalised once at start-up.
pub fn normalise_land_mean(
    field: &Array2<f64>,
    grid: &LandGrid,
    surface: &Array2<SurfaceType>,
) -> HgResult<Array2<f64>> {
    grid.check_field("redistribution factor", field)?;
    grid.check_field("surface type", surface)?;

    let mut weighted = 0.0;
    let mut area = 0.0;
    for ((i, j), &value) in field.indexed_iter() {
        if surface[[i, j]].is_land() {
            weighted += value * grid.area_m2(j);
            area += grid.area_m2(j);
        }
    }
    if area == 0.0 || weighted <= 0.0 {
        return Err(HgError::Error(
            "Cannot normalise a field with no positive land values".to_string(),
        ));
    }

    let mean = weighted / area;
    let mut normalised = field.clone();
    Zip::from(&mut normalised).par_for_each(|v| *v /= mean);
    Ok(normalised)
}
