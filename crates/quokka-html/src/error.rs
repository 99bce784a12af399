//! Fatal scanning errors.
//!
//! Malformed markup is never an error; it is repaired and reported through
//! an [`ErrorReporter`](quokka_common::ErrorReporter). Only failures that stop
//! the scan altogether end up here.

use thiserror::Error;

/// A failure that aborts scanning.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the underlying byte source failed.
    #[error("I/O error while reading input: {0}")]
    Io(#[from] std::io::Error),

    /// The caller declared an input encoding that no decoder supports.
    #[error("unsupported input encoding \"{0}\"")]
    UnsupportedEncoding(String),
}

/// Result alias for fallible scanner and parser operations.
pub type Result<T> = std::result::Result<T, Error>;
