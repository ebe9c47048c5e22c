//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the interface the sorter
//! uses to read a source tree and to populate an output tree.

mod local;

pub use self::local::LocalBackend;
use crate::error::Result;
use crate::models::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;

pub(crate) type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface for storage backends.
///
/// All operations are asynchronous; implementations backed by blocking
/// filesystem calls are expected to offload that work so callers can keep
/// many operations in flight at once.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use bucketeer_storage::{backend::StorageBackend, error::Result};
///
/// async fn stash(backend: &dyn StorageBackend, outside: &Path) -> Result<u64> {
///     backend.create_dir(Path::new("TXT")).await?;
///     backend.import(outside, Path::new("TXT/notes.txt")).await
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Absolute location of the storage root.
    fn root(&self) -> &Path;

    /// List every regular file below the root.
    ///
    /// Default implementation of this method is to collect all the results
    /// from [`list_stream()`](Self::list_stream) into a [`Vec`], failing on
    /// the first error.
    async fn list(&self) -> Result<Vec<FileInfo>> {
        self.list_stream().try_collect().await
    }

    /// Stream metadata for every regular file below the root.
    ///
    /// Directories are descended into but never yielded themselves. Entries
    /// that are neither files nor directories (symlinks included) are
    /// skipped. Yield order is unspecified.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures::TryStreamExt;
    /// # use bucketeer_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream();
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.path.display(), info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream(&self) -> FileInfoStream<'_>;

    /// Resolve a relative storage path into an absolute filesystem path.
    fn resolve(&self, path: &Path) -> Result<PathBuf>;

    /// Create a directory (and any missing parents).
    ///
    /// Succeeds if the directory already exists, so concurrent callers may
    /// race to create the same directory.
    async fn create_dir(&self, path: &Path) -> Result<()>;

    /// Copy a file from an absolute filesystem location into this backend.
    ///
    /// Contents, permission bits, and access/modification times are carried
    /// over. An existing file at `to` is overwritten. Parent directories are
    /// **not** created. Returns the number of bytes copied.
    ///
    /// # Errors
    /// If the times can't be applied once the contents have been written, the
    /// call fails with [`Metadata`](crate::error::ErrorKind::Metadata) and the
    /// destination is left holding the new contents.
    async fn import(&self, from: &Path, to: &Path) -> Result<u64>;
}
