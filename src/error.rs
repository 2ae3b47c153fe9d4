use std::fmt;
use std::io;

/// Errors produced by the hash file engine.
#[derive(Debug)]
pub enum HashFileError {
    /// Underlying file I/O failed (open, seek, read, write, flush, remove).
    Io(io::Error),
    /// A scratch buffer for a node or header payload could not be allocated.
    AllocationFailure,
    /// A lookup or delete found no matching record.
    NotFound,
    /// The on-disk structure violated an invariant (e.g. a tombstone found
    /// on a logical walk, or a chain that never closes).
    Corruption(String),
    /// A caller-supplied buffer did not match the file's configured width
    /// (e.g. the header data payload size fixed at `init`). This is a
    /// caller usage error, not an on-disk invariant violation.
    InvalidBufferSize { expected: usize, actual: usize },
}

impl fmt::Display for HashFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "hash file I/O error: {err}"),
            Self::AllocationFailure => write!(f, "failed to allocate payload scratch buffer"),
            Self::NotFound => write!(f, "no matching record found"),
            Self::Corruption(detail) => write!(f, "hash file corruption: {detail}"),
            Self::InvalidBufferSize { expected, actual } => {
                write!(f, "buffer is {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for HashFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::AllocationFailure
            | Self::NotFound
            | Self::Corruption(_)
            | Self::InvalidBufferSize { .. } => None,
        }
    }
}

impl From<io::Error> for HashFileError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, HashFileError>;
