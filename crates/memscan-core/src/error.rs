use thiserror::Error;

use crate::value::ValueType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid value: {0:?}")]
    InvalidValue(String),

    #[error("Value {text:?} does not fit in {value_type}")]
    ValueOutOfRange { text: String, value_type: ValueType },

    #[error("Unknown value type: {0}")]
    UnknownValueType(String),

    #[error("No matching values found")]
    NoMatches,

    #[error("Failed to query memory region at address {address:#x}: {message}")]
    RegionQueryFailed { address: u64, message: String },

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Selection is full ({capacity} entries)")]
    SelectionFull { capacity: usize },

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse outcome class reported to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoMatch,
    InvalidInput,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoMatches => ErrorKind::NoMatch,
            Error::InvalidValue(_)
            | Error::ValueOutOfRange { .. }
            | Error::UnknownValueType(_)
            | Error::IndexOutOfBounds { .. }
            | Error::SelectionFull { .. } => ErrorKind::InvalidInput,
            Error::RegionQueryFailed { .. }
            | Error::MemoryReadFailed { .. }
            | Error::ProcessOpenFailed(_) => ErrorKind::Io,
        }
    }

    /// Check if this error only means the search came up empty
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoMatches)
    }
}
