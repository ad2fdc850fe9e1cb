//! Binary punch (bpch) file I/O
//!
//! The bpch format is the legacy sequential record format used for
//! meteorological inputs, climatologies and restart files. A file is a
//! two-record header followed by any number of data blocks:
//!
//! ```text
//! "CTM bin 02"                       (40 chars)
//! title                              (80 chars)
//! -- repeated --
//! modelname lonres latres halfpolar center180
//! category tracer unit tau0 tau1 reserved ni nj nl ifirst jfirst lfirst nskip
//! ni*nj*nl f32 values, Fortran order
//! ```
//!
//! Every record is big-endian and framed by 4-byte length markers.
//!
//! # Examples
//!
//! ```rust
//! use hgland_core::bpch::{BpchReader, BpchWriter, DataBlock, DataBlockHeader, ModelInfo};
//! use ndarray::Array2;
//!
//! let header = DataBlockHeader::new(
//!     ModelInfo::new("GEOS5", 5.0, 4.0), "TRANSP", 1, "mm/day", 0.0, 744.0, [0, 0, 0],
//! );
//! let block = DataBlock::from_surface(header, &Array2::from_elem((2, 3), 1.5));
//!
//! let mut writer = BpchWriter::new(Vec::new(), "example", "memory").unwrap();
//! writer.write_block(&block).unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let mut reader = BpchReader::new(bytes.as_slice(), "memory").unwrap();
//! let read = reader.find("TRANSP", 1, Some(0.0)).unwrap();
//! assert_eq!(read, block);
//! ```

mod reader;
mod record;
mod writer;

pub use reader::BpchReader;
pub use record::{DataBlock, DataBlockHeader, ModelInfo, FORMAT_TAG};
pub use writer::BpchWriter;
