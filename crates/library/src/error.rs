//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Storage failures are attached as
//! children, so logging an [`Error`] with `{:?}` shows the underlying I/O
//! error alongside the path it concerns.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies a sorting failure.
///
/// ### Fatal Errors
/// - [`ErrorKind::Scan`] - nothing gets copied.
///
/// ### Per-file Errors
/// - [`ErrorKind::Bucket`]
/// - [`ErrorKind::Copy`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Listing the source directory tree failed.
    #[display("error while scanning directory {}", _0.display())]
    Scan(#[error(not(source))] PathBuf),
    /// The bucket directory for a file could not be created.
    #[display("failed to create target directory {}", _0.display())]
    Bucket(#[error(not(source))] PathBuf),
    /// A file could not be copied into its bucket.
    #[display("error copying file {}", _0.display())]
    Copy(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if the whole run has to stop, rather than just the one
    /// file the error concerns.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Scan(_))
    }
}
