use crate::bucket::Bucket;
use crate::error::{ErrorKind, Result};
use crate::scan::WorkItem;
use bucketeer_storage::BackendHandle;
use exn::ResultExt;
use std::path::PathBuf;

/// The outcome of successfully copying a single file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Copied {
    /// Absolute path of the original file.
    pub source: PathBuf,
    /// Path of the copy, relative to the output root.
    pub destination: PathBuf,
    pub bucket: Bucket,
    pub bytes: u64,
}

/// Copies one file into its bucket in the `output` backend.
///
/// The bucket directory is created first (an existing one is fine), then the
/// file is copied over, replacing any file already at the destination.
/// Contents, permissions, and timestamps are preserved.
///
/// # Errors
/// - [`ErrorKind::Bucket`] with the bucket directory if it can't be created;
///   nothing is copied.
/// - [`ErrorKind::Copy`] with the source file if the copy itself fails.
///
/// Neither is retried.
pub async fn sort_file(source: &BackendHandle, output: &BackendHandle, item: WorkItem) -> Result<Copied> {
    let WorkItem { file, bucket, destination } = item;
    let source_path = source.resolve(&file.path).or_raise(|| ErrorKind::Copy(source.root().join(&file.path)))?;

    let bucket_path = bucket.path();
    output.create_dir(&bucket_path).await.or_raise(|| ErrorKind::Bucket(output.root().join(&bucket_path)))?;

    let name = destination.file_name().unwrap_or_default().to_string_lossy();
    tracing::info!(source = %source_path.display(), "Copying {name} to {bucket}/...");
    let bytes = output.import(&source_path, &destination).await.or_raise(|| ErrorKind::Copy(source_path.clone()))?;

    Ok(Copied { source: source_path, destination, bucket, bytes })
}
