use crate::errors::{HgError, HgResult};
use ndarray::{Array2, Array3, ArrayView2, Axis, ShapeBuilder};
use serde::{Deserialize, Serialize};

/// Format tag written at the start of every binary punch file
pub const FORMAT_TAG: &str = "CTM bin 02";

pub(crate) const FORMAT_TAG_LEN: usize = 40;
pub(crate) const TITLE_LEN: usize = 80;
pub(crate) const MODEL_NAME_LEN: usize = 20;
pub(crate) const CATEGORY_LEN: usize = 40;
pub(crate) const UNIT_LEN: usize = 40;
pub(crate) const RESERVED_LEN: usize = 40;

/// Length of the first header record of a data block
pub(crate) const MODEL_RECORD_LEN: usize = MODEL_NAME_LEN + 4 + 4 + 4 + 4;
/// Length of the second header record of a data block
pub(crate) const FIELD_RECORD_LEN: usize =
    CATEGORY_LEN + 4 + UNIT_LEN + 8 + 8 + RESERVED_LEN + 6 * 4 + 4;

/// Coordinate system of a data block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    /// unit: degrees
    pub lon_res: f32,
    /// unit: degrees
    pub lat_res: f32,
    pub half_polar: bool,
    pub center_180: bool,
}

impl ModelInfo {
    /// A half-polar, dateline-centred grid, as used by the GEOS meteorology
    pub fn new(model_name: &str, lon_res: f32, lat_res: f32) -> Self {
        Self {
            model_name: model_name.to_string(),
            lon_res,
            lat_res,
            half_polar: true,
            center_180: true,
        }
    }
}

/// Header of one data block
///
/// A block is identified by its `(category, tracer)` pair and its time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBlockHeader {
    pub model: ModelInfo,
    pub category: String,
    pub tracer: i32,
    pub unit: String,
    /// Start of the averaging period, hours since 1985-01-01
    pub tau0: f64,
    /// End of the averaging period, hours since 1985-01-01
    pub tau1: f64,
    pub reserved: String,
    /// Extent `[ni, nj, nl]`
    pub dim: [i32; 3],
    /// One-based offset of the first cell, `[ifirst, jfirst, lfirst]`
    pub first: [i32; 3],
}

impl DataBlockHeader {
    pub fn new(
        model: ModelInfo,
        category: &str,
        tracer: i32,
        unit: &str,
        tau0: f64,
        tau1: f64,
        dim: [usize; 3],
    ) -> Self {
        Self {
            model,
            category: category.to_string(),
            tracer,
            unit: unit.to_string(),
            tau0,
            tau1,
            reserved: String::new(),
            dim: [dim[0] as i32, dim[1] as i32, dim[2] as i32],
            first: [1, 1, 1],
        }
    }

    pub fn ni(&self) -> usize {
        self.dim[0].max(0) as usize
    }

    pub fn nj(&self) -> usize {
        self.dim[1].max(0) as usize
    }

    pub fn nl(&self) -> usize {
        self.dim[2].max(0) as usize
    }

    /// Number of payload values, or `None` if the declared extent overflows
    pub fn n_values(&self) -> Option<usize> {
        self.ni().checked_mul(self.nj())?.checked_mul(self.nl())
    }

    pub fn matches(&self, category: &str, tracer: i32) -> bool {
        self.category == category && self.tracer == tracer
    }

    /// Fail unless the block covers exactly `nx` by `ny` cells
    pub fn check_horizontal(&self, nx: usize, ny: usize, location: &str) -> HgResult<()> {
        if self.ni() != nx || self.nj() != ny {
            return Err(HgError::GridMismatch {
                location: location.to_string(),
                expected: (nx, ny),
                found: (self.ni(), self.nj()),
            });
        }
        Ok(())
    }
}

/// One data block: header plus payload
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    pub header: DataBlockHeader,
    /// Payload of shape `(ni, nj, nl)`
    pub data: Array3<f32>,
}

impl DataBlock {
    /// Build a block, checking the payload against the declared extent
    pub fn new(header: DataBlockHeader, data: Array3<f32>) -> HgResult<Self> {
        let expected = [header.ni(), header.nj(), header.nl()];
        if data.shape() != expected {
            return Err(HgError::ShapeMismatch {
                name: format!("{}/{}", header.category, header.tracer),
                expected: expected.to_vec(),
                found: data.shape().to_vec(),
            });
        }
        Ok(Self { header, data })
    }

    /// Build a single-level block from a surface field
    ///
    /// The declared extent of `header` is replaced with the field's shape.
    pub fn from_surface(mut header: DataBlockHeader, field: &Array2<f64>) -> Self {
        let (ni, nj) = field.dim();
        header.dim = [ni as i32, nj as i32, 1];
        let data = field.mapv(|v| v as f32).insert_axis(Axis(2));
        Self { header, data }
    }

    /// Decode a payload stored in Fortran (column-major) order
    pub(crate) fn from_fortran_values(header: DataBlockHeader, values: Vec<f32>) -> HgResult<Self> {
        let shape = (header.ni(), header.nj(), header.nl());
        let data = Array3::from_shape_vec(shape.f(), values).map_err(|e| {
            HgError::Error(format!(
                "Payload for {}/{} does not fit {:?}: {}",
                header.category, header.tracer, shape, e
            ))
        })?;
        Ok(Self { header, data })
    }

    /// Payload values in Fortran order
    pub(crate) fn fortran_values(&self) -> impl Iterator<Item = &f32> {
        self.data.view().reversed_axes().into_iter()
    }

    /// One vertical level of the payload
    pub fn level(&self, l: usize) -> HgResult<ArrayView2<'_, f32>> {
        let nl = self.data.len_of(Axis(2));
        if l >= nl {
            return Err(HgError::malformed(
                &format!("{}/{}", self.header.category, self.header.tracer),
                format!("level {} requested but the block has {} levels", l, nl),
            ));
        }
        Ok(self.data.index_axis(Axis(2), l))
    }

    /// The first level widened to `f64`
    pub fn surface(&self) -> HgResult<Array2<f64>> {
        Ok(self.level(0)?.mapv(f64::from))
    }
}

/// Decode a blank-padded fixed-width character field
pub(crate) fn decode_fixed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

/// Encode a string into a blank-padded fixed-width character field
///
/// Longer strings are truncated.
pub(crate) fn encode_fixed(value: &str, width: usize, out: &mut Vec<u8>) {
    let bytes = value.as_bytes();
    let n = bytes.len().min(width);
    out.extend_from_slice(&bytes[..n]);
    out.extend(std::iter::repeat(b' ').take(width - n));
}
