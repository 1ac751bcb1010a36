//! Error types shared by the IMF crates.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A rational with a zero or negative denominator where a rate was expected.
    #[error("Invalid rational {num}/{den}")]
    InvalidRational { num: i64, den: i64 },

    /// An edit rate that is not strictly positive.
    #[error("Invalid edit rate {num}/{den}: numerator and denominator must be positive")]
    InvalidEditRate { num: i64, den: i64 },

    /// A UUID string that is neither a bare UUID nor a `urn:uuid:` URN.
    #[error("Invalid UUID URN: {0}")]
    InvalidUrn(String),

    /// Arithmetic left the representable range.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
