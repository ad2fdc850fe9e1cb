use super::record::*;
use crate::errors::{HgError, HgResult};
use ndarray::Axis;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sequential writer for binary punch files
///
/// Produces the same framing that [`BpchReader`](super::BpchReader) expects.
pub struct BpchWriter<W: Write> {
    inner: W,
    destination: String,
}

impl BpchWriter<BufWriter<File>> {
    /// Create (or truncate) a file and write its header
    pub fn create(path: impl AsRef<Path>, title: &str) -> HgResult<Self> {
        let path = path.as_ref();
        let destination = path.display().to_string();
        let file = File::create(path).map_err(|e| HgError::io(&destination, e))?;
        Self::new(BufWriter::new(file), title, &destination)
    }
}

impl<W: Write> BpchWriter<W> {
    pub fn new(inner: W, title: &str, destination: &str) -> HgResult<Self> {
        let mut writer = Self {
            inner,
            destination: destination.to_string(),
        };
        let mut tag = Vec::with_capacity(FORMAT_TAG_LEN);
        encode_fixed(FORMAT_TAG, FORMAT_TAG_LEN, &mut tag);
        writer.write_record(&tag)?;

        let mut record = Vec::with_capacity(TITLE_LEN);
        encode_fixed(title, TITLE_LEN, &mut record);
        writer.write_record(&record)?;
        Ok(writer)
    }

    /// Append one data block
    ///
    /// Blocks without a vertical level are refused, as the reader would
    /// reject them.
    pub fn write_block(&mut self, block: &DataBlock) -> HgResult<()> {
        let header = &block.header;
        let model = &header.model;
        if block.data.len_of(Axis(2)) == 0 {
            return Err(HgError::malformed(
                &format!("{}: {}/{}", self.destination, header.category, header.tracer),
                "block has no vertical levels",
            ));
        }

        let mut record = Vec::with_capacity(MODEL_RECORD_LEN);
        encode_fixed(&model.model_name, MODEL_NAME_LEN, &mut record);
        record.extend_from_slice(&model.lon_res.to_be_bytes());
        record.extend_from_slice(&model.lat_res.to_be_bytes());
        record.extend_from_slice(&(model.half_polar as i32).to_be_bytes());
        record.extend_from_slice(&(model.center_180 as i32).to_be_bytes());
        self.write_record(&record)?;

        let payload_len = block.data.len() * 4;
        let mut record = Vec::with_capacity(FIELD_RECORD_LEN);
        encode_fixed(&header.category, CATEGORY_LEN, &mut record);
        record.extend_from_slice(&header.tracer.to_be_bytes());
        encode_fixed(&header.unit, UNIT_LEN, &mut record);
        record.extend_from_slice(&header.tau0.to_be_bytes());
        record.extend_from_slice(&header.tau1.to_be_bytes());
        encode_fixed(&header.reserved, RESERVED_LEN, &mut record);
        for d in header.dim.iter().chain(header.first.iter()) {
            record.extend_from_slice(&d.to_be_bytes());
        }
        // Bytes to skip over the payload record, markers included
        record.extend_from_slice(&((payload_len + 8) as i32).to_be_bytes());
        self.write_record(&record)?;

        let mut record = Vec::with_capacity(payload_len);
        for v in block.fortran_values() {
            record.extend_from_slice(&v.to_be_bytes());
        }
        self.write_record(&record)
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> HgResult<W> {
        self.inner
            .flush()
            .map_err(|e| HgError::io(&self.destination, e))?;
        Ok(self.inner)
    }

    fn write_record(&mut self, payload: &[u8]) -> HgResult<()> {
        let len = i32::try_from(payload.len()).map_err(|_| {
            HgError::Error(format!(
                "{}: record of {} bytes is too large",
                self.destination,
                payload.len()
            ))
        })?;
        let marker = len.to_be_bytes();
        self.inner
            .write_all(&marker)
            .and_then(|_| self.inner.write_all(payload))
            .and_then(|_| self.inner.write_all(&marker))
            .map_err(|e| HgError::io(&self.destination, e))
    }
}
