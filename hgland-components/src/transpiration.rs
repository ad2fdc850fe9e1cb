//! Monthly transpiration climatology
//!
//! The vegetation emission process needs the transpiration rate for the
//! current calendar month. [`TranspirationClimatology`] owns that field and
//! remembers which month it holds, so a stale field can never be used by
//! accident. The buffer is zero-filled on construction and released when the
//! value is dropped.

use hgland_core::bpch::BpchReader;
use hgland_core::clock::{tau_month_start, CLIMATOLOGY_YEAR};
use hgland_core::errors::{HgError, HgResult};
use hgland_core::grid::LandGrid;
use log::{info, warn};
use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Seconds per day
const SECONDS_PER_DAY: f64 = 86400.0;

/// Where the monthly transpiration records live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspirationFile {
    pub path: PathBuf,
    pub category: String,
    pub tracer: i32,
    /// Expected unit of the stored values, `mm/day` or `m/s`
    pub unit: String,
}

impl TranspirationFile {
    pub fn validate(&self) -> HgResult<()> {
        if to_metres_per_second(&self.unit).is_none() {
            return Err(HgError::Config(format!(
                "unsupported transpiration unit {:?}, expected \"mm/day\" or \"m/s\"",
                self.unit
            )));
        }
        Ok(())
    }
}

/// Factor taking a transpiration rate in `unit` to m/s
fn to_metres_per_second(unit: &str) -> Option<f64> {
    match unit {
        "mm/day" => Some(1e-3 / SECONDS_PER_DAY),
        "m/s" => Some(1.0),
        _ => None,
    }
}

impl Default for TranspirationFile {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mercury/transpiration.bpch"),
            category: "TRANSP".to_string(),
            tracer: 1,
            unit: "mm/day".to_string(),
        }
    }
}

/// Transpiration rate for one calendar month
#[derive(Debug, Clone)]
pub struct TranspirationClimatology {
    /// unit: m/s
    field: Array2<f64>,
    month: Option<u32>,
}

impl TranspirationClimatology {
    /// Allocate a zero-filled climatology on `grid`
    ///
    /// No month is loaded until [`load_month`](Self::load_month) succeeds.
    pub fn new(grid: &LandGrid) -> HgResult<Self> {
        let cells = grid.n_cells();
        let mut buffer: Vec<f64> = Vec::new();
        buffer
            .try_reserve_exact(cells)
            .map_err(|_| HgError::Allocation {
                buffer: "transpiration climatology".to_string(),
                cells,
            })?;
        buffer.resize(cells, 0.0);
        let field = Array2::from_shape_vec(grid.shape(), buffer)
            .map_err(|e| HgError::Error(e.to_string()))?;
        Ok(Self { field, month: None })
    }

    /// Wrap an already converted field (m/s) for `month`
    pub fn from_field(field: Array2<f64>, month: u32) -> Self {
        Self {
            field,
            month: Some(month),
        }
    }

    /// Month currently held, if any
    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// Transpiration rate for `month`
    /// unit: m/s
    ///
    /// Fails if the buffer holds a different month (or none).
    pub fn for_month(&self, month: u32) -> HgResult<ArrayView2<'_, f64>> {
        if self.month != Some(month) {
            return Err(HgError::StaleClimatology {
                loaded: self.month,
                requested: month,
            });
        }
        Ok(self.field.view())
    }

    /// Read `month` from `source`, replacing the current contents
    ///
    /// On error the previous contents are left untouched.
    pub fn load_month(&mut self, source: &TranspirationFile, month: u32) -> HgResult<()> {
        let tau0 = tau_month_start(CLIMATOLOGY_YEAR, month)?;
        let location = format!("transpiration: {}", source.path.display());

        let mut reader = BpchReader::open(&source.path)?;
        let block = reader.find(&source.category, source.tracer, Some(tau0))?;
        let (nx, ny) = self.field.dim();
        block.header.check_horizontal(nx, ny, &location)?;

        // A blank record unit defers to the configured one
        let unit = match block.header.unit.as_str() {
            "" => source.unit.as_str(),
            unit => unit,
        };
        if unit != source.unit {
            warn!(
                "{}: record unit {:?} differs from configured {:?}",
                location, unit, source.unit
            );
        }
        let factor = to_metres_per_second(unit).ok_or_else(|| {
            HgError::malformed(&location, format!("unsupported transpiration unit {:?}", unit))
        })?;

        let raw = block.level(0)?;
        Zip::from(&mut self.field)
            .and(&raw)
            .par_for_each(|out, &v| *out = f64::from(v) * factor);
        self.month = Some(month);

        info!("Loaded transpiration for month {} from {}", month, location);
        Ok(())
    }

    /// Load `month` unless it is already held
    ///
    /// Returns true if the file was read.
    pub fn ensure_month(&mut self, source: &TranspirationFile, month: u32) -> HgResult<bool> {
        if self.month == Some(month) {
            return Ok(false);
        }
        self.load_month(source, month)?;
        Ok(true)
    }

    /// Path-only convenience for [`load_month`](Self::load_month) with the
    /// default record layout
    pub fn load_month_from(&mut self, path: &Path, month: u32) -> HgResult<()> {
        let source = TranspirationFile {
            path: path.to_path_buf(),
            ..Default::default()
        };
        self.load_month(&source, month)
    }
}

/// Write twelve months of uniform `value` (mm/day)
#[cfg(test)]
pub(crate) fn write_test_climatology(path: &Path, nx: usize, ny: usize, value: f64) {
    use hgland_core::bpch::{BpchWriter, DataBlock, DataBlockHeader, ModelInfo};

    let mut writer = BpchWriter::create(path, "transpiration").unwrap();
    for month in 1..=12 {
        let tau0 = tau_month_start(CLIMATOLOGY_YEAR, month).unwrap();
        let header = DataBlockHeader::new(
            ModelInfo::new("GEOS5", 5.0, 4.0),
            "TRANSP",
            1,
            "mm/day",
            tau0,
            tau0 + 24.0,
            [0, 0, 0],
        );
        writer
            .write_block(&DataBlock::from_surface(header, &Array2::from_elem((nx, ny), value)))
            .unwrap();
    }
    writer.finish().unwrap();
}
