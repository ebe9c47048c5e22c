//! Filesystem access for bucketeer.
//!
//! Everything that touches the disk lives behind the [`StorageBackend`]
//! trait: listing a source tree, creating bucket directories, and importing
//! files into an output tree with their metadata intact.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
