//! Error type shared by every part of the codec.

use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while configuring, compressing or decompressing pages.
///
/// All of them are local and synchronous. Compression is deterministic, so
/// retrying a failed call never helps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The codec configuration cannot be realized (word width, low-bit split,
    /// dictionary geometry, stride, page size or packing width).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A destination buffer cannot hold the worst-case output.
    #[error("buffer too small: need {needed} words, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// A compressed buffer has an inconsistent header or area layout.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The data handed to the codec cannot be encoded at all.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }
}
