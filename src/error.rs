//! Fatal Error Types
//!
//! Anything that reaches the caller of [`run`](crate::run) ended the run.
//! Failures confined to a single file are logged and never show up here.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A fatal error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for a run.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Nothing was touched; the output directory was not created.
    #[display("source directory not found or is not a directory: {}", _0.display())]
    InvalidSource(#[error(not(source))] PathBuf),
    #[display("failed to create output directory {}", _0.display())]
    Output(#[error(not(source))] PathBuf),
    /// The source tree could not be listed; no files were copied.
    #[display("error while scanning source directory")]
    Scan,
}
