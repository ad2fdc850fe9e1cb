use thiserror::Error;

/// Error type for land mercury operations.
///
/// Every variant is fatal for the operation that raised it: callers must not
/// use partially written output arrays after an `Err`.
#[derive(Error, Debug)]
pub enum HgError {
    #[error("{0}")]
    Error(String),
    #[error("Could not allocate {cells} grid cells for {buffer}")]
    Allocation { buffer: String, cells: usize },
    #[error("I/O error at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unexpected end of stream at {location}")]
    UnexpectedEof { location: String },
    #[error("Malformed record at {location}: {reason}")]
    MalformedRecord { location: String, reason: String },
    #[error("Unsupported binary punch format tag {found:?}")]
    UnsupportedFormat { found: String },
    #[error("Grid mismatch at {location}. Expected {expected:?}, file declares {found:?}")]
    GridMismatch {
        location: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("No record for category {category:?}, tracer {tracer} at tau0={tau0}")]
    MissingRecord {
        category: String,
        tracer: i32,
        tau0: f64,
    },
    #[error("Required field {field} was not found at {location}")]
    MissingField { location: String, field: String },
    #[error("Transpiration climatology is loaded for month {loaded:?}, but month {requested} was requested")]
    StaleClimatology { loaded: Option<u32>, requested: u32 },
    #[error("Invalid land/water/ice code {0}")]
    InvalidSurfaceCode(i32),
    #[error("Shape mismatch for {name}. Expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl HgError {
    /// Wrap an I/O error, tagging it with the location that raised it
    ///
    /// An `UnexpectedEof` from the OS is reported as [`HgError::UnexpectedEof`]
    /// so that short reads are distinguishable from other failures.
    pub fn io(location: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            HgError::UnexpectedEof {
                location: location.to_string(),
            }
        } else {
            HgError::Io {
                location: location.to_string(),
                source,
            }
        }
    }

    pub fn malformed(location: &str, reason: impl Into<String>) -> Self {
        HgError::MalformedRecord {
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type for `Result<T, HgError>`.
pub type HgResult<T> = Result<T, HgError>;
