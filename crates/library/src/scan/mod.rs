//! Discovering work.
//!
//! Scanning is eager: the whole source tree is listed before a single file
//! is copied, so the number of files is known up front and a traversal
//! failure aborts the run before it has touched the output.

use crate::bucket::Bucket;
use crate::error::{ErrorKind, Result};
use bucketeer_storage::{BackendHandle, FileInfo};
use exn::{OptionExt, ResultExt};
use std::path::PathBuf;

/// A single file waiting to be copied into its bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    /// The file as listed by the source backend (path relative to its root).
    pub file: FileInfo,
    pub bucket: Bucket,
    /// `<bucket>/<file name>`, relative to the output root.
    pub destination: PathBuf,
}
impl WorkItem {
    /// Decide where a listed file goes.
    ///
    /// Returns `None` for a path without a final file name, which a backend
    /// listing never produces.
    pub fn new(file: FileInfo) -> Option<Self> {
        let bucket = Bucket::for_path(&file.path);
        let destination = bucket.destination(file.file_name()?);
        Some(Self { file, bucket, destination })
    }
}

/// List every regular file in `source` and plan where each one goes.
///
/// # Errors
/// Any failure while walking the tree is fatal and reported once as
/// [`ErrorKind::Scan`], carrying the source root.
pub async fn discover(source: &BackendHandle) -> Result<Vec<WorkItem>> {
    let root = source.root().to_path_buf();
    tracing::debug!(backend = source.name(), root = %root.display(), "Listing source directory");
    let files = source.list().await.or_raise(|| ErrorKind::Scan(root.clone()))?;
    files
        .into_iter()
        .map(|file| {
            let path = file.path.clone();
            WorkItem::new(file).ok_or_raise(|| ErrorKind::Scan(root.join(path)))
        })
        .collect()
}
