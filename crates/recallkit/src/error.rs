//! Error types for recallkit

use std::fmt;

/// Result type alias for recallkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for engine and service operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cache capacity must be positive
    InvalidCapacity(usize),

    /// Index outside `[0, len)`
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Length of the backing array
        len: usize,
    },

    /// Range bounds not satisfying `left <= right < len`
    InvalidRange {
        /// Inclusive lower bound
        left: usize,
        /// Inclusive upper bound
        right: usize,
        /// Length of the backing array
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCapacity(cap) => {
                write!(f, "Invalid capacity: {} (must be greater than 0)", cap)
            }
            Error::IndexOutOfRange { index, len } => {
                write!(f, "Index out of range: {} (len {})", index, len)
            }
            Error::InvalidRange { left, right, len } => {
                write!(f, "Invalid range: [{}, {}] (len {})", left, right, len)
            }
        }
    }
}

impl std::error::Error for Error {}
