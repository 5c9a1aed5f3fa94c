//! Error types

use std::io;
use thiserror::Error;

/// Main error type for topology resolution and endpoint dialing
#[derive(Debug, Error)]
pub enum Error {
    /// Requested column is not part of the result metadata
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Column position past the end of the row
    #[error("column index {index} out of bounds ({count} columns)")]
    ColumnIndexOutOfBounds {
        /// Requested position
        index: usize,
        /// Number of columns in the result
        count: usize,
    },

    /// Raw bytes do not match the declared type or protocol version
    #[error("decode error: {0}")]
    Decode(String),

    /// Value or rows result cannot be written in the wire format
    #[error("encode error: {0}")]
    Encode(String),

    /// DNS lookup or metadata bootstrap failed
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Peer certificate chain failed verification
    #[error("TLS trust error: {0}")]
    TlsTrust(String),

    /// Invalid configuration (certificates, keys, server names)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error while dialing an endpoint
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short, stable label for the error kind
    ///
    /// Used as a metrics label, so values must stay low-cardinality.
    pub fn category(&self) -> &'static str {
        match self {
            Error::ColumnNotFound(_) => "column_not_found",
            Error::ColumnIndexOutOfBounds { .. } => "column_index",
            Error::Decode(_) => "decode",
            Error::Encode(_) => "encode",
            Error::Resolution(_) => "resolution",
            Error::TlsTrust(_) => "tls_trust",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
        }
    }

    /// Whether this error came from certificate verification
    pub fn is_trust_failure(&self) -> bool {
        matches!(self, Error::TlsTrust(_))
    }
}
