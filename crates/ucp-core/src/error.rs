//! Unified error type for unit commitment instances
//!
//! [`UcpError`] covers everything that can go wrong while building or
//! querying a problem instance: malformed input, violated data invariants and
//! out-of-range accessor calls. Algorithm crates keep their own error enums
//! and convert into this one at API boundaries.
//!
//! # Example
//!
//! ```
//! use ucp_core::{UcpError, UcpResult};
//!
//! fn period_index(j: usize, n_periods: usize) -> UcpResult<usize> {
//!     if j >= n_periods {
//!         return Err(UcpError::OutOfRange { what: "period", index: j, len: n_periods });
//!     }
//!     Ok(j)
//! }
//!
//! assert!(period_index(3, 3).is_err());
//! ```

use thiserror::Error;

/// Unified error type for instance construction and access.
#[derive(Error, Debug)]
pub enum UcpError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing errors in input tables
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data invariant violations (negative costs, min > max, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Accessor called with an index outside the valid range
    #[error("{what} index {index} out of range: valid range is [0, {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using UcpError.
pub type UcpResult<T> = Result<T, UcpError>;

impl From<anyhow::Error> for UcpError {
    fn from(err: anyhow::Error) -> Self {
        UcpError::Other(err.to_string())
    }
}

impl From<String> for UcpError {
    fn from(s: String) -> Self {
        UcpError::Other(s)
    }
}

impl From<&str> for UcpError {
    fn from(s: &str) -> Self {
        UcpError::Other(s.to_string())
    }
}
