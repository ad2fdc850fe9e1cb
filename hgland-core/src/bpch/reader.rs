use super::record::*;
use crate::errors::{HgError, HgResult};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Sequential reader for binary punch files
///
/// Records are big-endian Fortran unformatted records, each framed by a
/// 4-byte length marker before and after the payload. The file header is
/// validated on construction; data blocks are then read one at a time with
/// [`BpchReader::next_block`] or by iterating the reader.
///
/// A clean end of file between blocks ends the stream. Any other short read
/// is an error, and the reader yields nothing further after an error.
pub struct BpchReader<R> {
    inner: R,
    source: String,
    title: String,
    blocks_read: usize,
    done: bool,
}

impl BpchReader<BufReader<File>> {
    /// Open a file and validate its header
    pub fn open(path: impl AsRef<Path>) -> HgResult<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| HgError::io(&source, e))?;
        Self::new(BufReader::new(file), &source)
    }
}

impl<R: Read> BpchReader<R> {
    /// Wrap a stream and validate its header
    ///
    /// `source` names the stream in error locations.
    pub fn new(inner: R, source: &str) -> HgResult<Self> {
        let mut reader = Self {
            inner,
            source: source.to_string(),
            title: String::new(),
            blocks_read: 0,
            done: false,
        };

        let location = format!("{}: file header", reader.source);
        let tag = reader
            .read_record(&location, Some(FORMAT_TAG_LEN), false)?
            .unwrap_or_default();
        let tag = decode_fixed(&tag);
        if tag != FORMAT_TAG {
            return Err(HgError::UnsupportedFormat { found: tag });
        }

        let location = format!("{}: file title", reader.source);
        let title = reader
            .read_record(&location, Some(TITLE_LEN), false)?
            .unwrap_or_default();
        reader.title = decode_fixed(&title);
        Ok(reader)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Read the next data block, or `None` at a clean end of stream
    pub fn next_block(&mut self) -> HgResult<Option<DataBlock>> {
        if self.done {
            return Ok(None);
        }
        let result = self.read_block();
        match &result {
            Ok(Some(_)) => self.blocks_read += 1,
            _ => self.done = true,
        }
        result
    }

    /// Read forward until a block matching `category`, `tracer` and,
    /// optionally, `tau0` is found
    ///
    /// Blocks before the match are discarded.
    pub fn find(&mut self, category: &str, tracer: i32, tau0: Option<f64>) -> HgResult<DataBlock> {
        while let Some(block) = self.next_block()? {
            let time_matches = tau0.map_or(true, |t| block.header.tau0 == t);
            if block.header.matches(category, tracer) && time_matches {
                return Ok(block);
            }
            debug!(
                "{}: skipping {}/{} at tau0={}",
                self.source, block.header.category, block.header.tracer, block.header.tau0
            );
        }
        Err(HgError::MissingRecord {
            category: category.to_string(),
            tracer,
            tau0: tau0.unwrap_or(f64::NAN),
        })
    }

    fn read_block(&mut self) -> HgResult<Option<DataBlock>> {
        let n = self.blocks_read + 1;

        let location = format!("{}: block {} record 1", self.source, n);
        let Some(model) = self.read_record(&location, Some(MODEL_RECORD_LEN), true)? else {
            return Ok(None);
        };
        let mut fields = FieldCursor::new(&model);
        let model = ModelInfo {
            model_name: fields.text(MODEL_NAME_LEN),
            lon_res: fields.f32(),
            lat_res: fields.f32(),
            half_polar: fields.i32() != 0,
            center_180: fields.i32() != 0,
        };

        let location = format!("{}: block {} record 2", self.source, n);
        let field = self
            .read_record(&location, Some(FIELD_RECORD_LEN), false)?
            .unwrap_or_default();
        let mut fields = FieldCursor::new(&field);
        let header = DataBlockHeader {
            model,
            category: fields.text(CATEGORY_LEN),
            tracer: fields.i32(),
            unit: fields.text(UNIT_LEN),
            tau0: fields.f64(),
            tau1: fields.f64(),
            reserved: fields.text(RESERVED_LEN),
            dim: [fields.i32(), fields.i32(), fields.i32()],
            first: [fields.i32(), fields.i32(), fields.i32()],
        };
        if header.dim.iter().any(|d| *d < 0) {
            return Err(HgError::malformed(
                &location,
                format!("negative extent {:?}", header.dim),
            ));
        }
        if header.nl() == 0 {
            return Err(HgError::malformed(&location, "block has no vertical levels"));
        }
        let payload_len = header
            .n_values()
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                HgError::malformed(&location, format!("extent {:?} is too large", header.dim))
            })?;

        let location = format!("{}: block {} record 3", self.source, n);
        let payload = self
            .read_record(&location, Some(payload_len), false)?
            .unwrap_or_default();
        let values = payload
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        DataBlock::from_fortran_values(header, values).map(Some)
    }

    /// Read one framed record
    ///
    /// Returns `None` only when `allow_eof` is set and the stream ends before
    /// the leading marker.
    fn read_record(
        &mut self,
        location: &str,
        expected_len: Option<usize>,
        allow_eof: bool,
    ) -> HgResult<Option<Vec<u8>>> {
        let mut marker = [0u8; 4];
        let n = read_up_to(&mut self.inner, &mut marker).map_err(|e| HgError::io(location, e))?;
        if n == 0 && allow_eof {
            return Ok(None);
        }
        if n < marker.len() {
            return Err(HgError::UnexpectedEof {
                location: location.to_string(),
            });
        }

        let len = i32::from_be_bytes(marker);
        if len < 0 {
            return Err(HgError::malformed(location, format!("negative record length {}", len)));
        }
        let len = len as usize;
        if let Some(expected) = expected_len {
            if len != expected {
                return Err(HgError::malformed(
                    location,
                    format!("record length {} but {} bytes were expected", len, expected),
                ));
            }
        }

        let mut payload = vec![0u8; len];
        self.inner
            .read_exact(&mut payload)
            .map_err(|e| HgError::io(location, e))?;

        let mut trailer = [0u8; 4];
        self.inner
            .read_exact(&mut trailer)
            .map_err(|e| HgError::io(location, e))?;
        if trailer != marker {
            return Err(HgError::malformed(
                location,
                format!(
                    "trailing marker {} does not match leading marker {}",
                    i32::from_be_bytes(trailer),
                    len
                ),
            ));
        }
        Ok(Some(payload))
    }
}

impl<R: Read> Iterator for BpchReader<R> {
    type Item = HgResult<DataBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

/// Fill `buf` as far as the stream allows, returning the number of bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Positional decoder over a record whose length was already validated
struct FieldCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn text(&mut self, width: usize) -> String {
        let value = decode_fixed(&self.bytes[self.pos..self.pos + width]);
        self.pos += width;
        value
    }

    fn i32(&mut self) -> i32 {
        i32::from_be_bytes(self.take())
    }

    fn f32(&mut self) -> f32 {
        f32::from_be_bytes(self.take())
    }

    fn f64(&mut self) -> f64 {
        f64::from_be_bytes(self.take())
    }
}
