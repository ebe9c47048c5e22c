//! Local filesystem storage backend.
//!
//! Files are accessed through `tokio::fs`, which runs each blocking call on
//! Tokio's blocking thread pool.

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use filetime::FileTime;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use bucketeer_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = LocalBackend::open("source", "/home/me/Downloads")?;
/// let output = LocalBackend::new("output", "/home/me/Sorted")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a backend rooted at `root`, creating the directory (and any
    /// missing parents) if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, exists but is not a
    /// directory, or cannot be created.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::NotADirectory(root));
            }
        } else {
            // Use non-async here; it only happens once per run and it's not
            // worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    /// Open a backend rooted at an existing directory. Nothing is created.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if the root doesn't exist and
    /// [`NotADirectory`](ErrorKind::NotADirectory) if it isn't a directory.
    pub fn open(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        let metadata = std::fs::metadata(&root).map_err(|e| Self::map_io_error(e, &root))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(root));
        }
        Ok(Self { name: name.into(), root })
    }

    /// Get the absolute path for a relative storage path.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Convert an absolute path back to a relative storage path.
    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{:?}` is not within root `{:?}`", absolute, self.root))
        })?;
        Ok(validate_path(relative)?)
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Classify a single directory entry. Kept out of the stream body so that
    /// `?` is usable.
    async fn process_entry(&self, entry: DirEntry) -> Result<WalkEntry> {
        let path = entry.path();
        // DirEntry::metadata() does not traverse symlinks, so a link to a
        // file reports as neither a file nor a directory.
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() {
            return Ok(WalkEntry::File(FileInfo::new(self.relative_path(&path)?, metadata.len())));
        }
        Ok(WalkEntry::Skip)
    }
}

/// Carry access and modification times over from `from` to `to`. Blocking.
fn copy_file_times(from: &Path, to: &Path) -> Result<()> {
    let metadata = std::fs::metadata(from).or_raise(|| ErrorKind::Metadata(to.to_path_buf()))?;
    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(to, accessed, modified).or_raise(|| ErrorKind::Metadata(to.to_path_buf()))
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn list_stream(&self) -> FileInfoStream<'_> {
        let mut stack = vec![self.root.clone()];
        Box::pin(stream! {
            while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue;
                    }
                };
                loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break,
                        Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &current))); break; },
                    };
                    match self.process_entry(entry).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        self.absolute_path(path)
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        // create_dir_all() treats an existing directory as success.
        Ok(fs::create_dir_all(&abs_path).await.map_err(|e| Self::map_io_error(e, &abs_path))?)
    }

    async fn import(&self, from: &Path, to: &Path) -> Result<u64> {
        let abs_path = self.absolute_path(to)?;
        // fs::copy() overwrites the destination and copies permission bits.
        let bytes = fs::copy(from, &abs_path).await.map_err(ErrorKind::Io)?;
        let (from, dest) = (from.to_path_buf(), abs_path.clone());
        tokio::task::spawn_blocking(move || copy_file_times(&from, &dest))
            .await
            .map_err(|e| ErrorKind::BackendError(e.to_string()))??;
        tracing::trace!(backend = %self.name, path = %abs_path.display(), bytes, "Imported file");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("name", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("name", "relative/path").is_err());
        assert!(LocalBackend::open("name", "./relative").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("a/b/output");
        LocalBackend::new("output", &root).unwrap();
        assert!(root.is_dir());
        // Idempotent.
        LocalBackend::new("output", &root).unwrap();
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"data").unwrap();
        let err = LocalBackend::new("output", &file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(_)));
    }

    #[test]
    fn test_open_does_not_create() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing");
        let err = LocalBackend::open("source", &missing).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert!(!missing.exists());

        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"data").unwrap();
        let err = LocalBackend::open("source", &file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(_)));
    }

    #[test]
    fn test_resolve() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let expected = temp_dir.path().join("PDF/report.pdf");
        assert_eq!(backend.resolve(Path::new("PDF/report.pdf")).unwrap(), expected);
        assert!(backend.resolve(Path::new("../etc/passwd")).is_err());
    }

    #[test]
    fn test_relative_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let abs = temp_dir.path().join("nested/photo.jpg");
        assert_eq!(backend.relative_path(&abs).unwrap(), Path::new("nested/photo.jpg"));
        assert!(backend.relative_path(Path::new("/other/file.txt")).is_err());
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::open("name", temp_dir.path()).unwrap();
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_recursive_and_skips_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("a/b/c")).unwrap();
        std::fs::create_dir_all(root.join("empty")).unwrap();
        std::fs::write(root.join("top.txt"), b"1").unwrap();
        std::fs::write(root.join("a/middle.jpg"), b"22").unwrap();
        std::fs::write(root.join("a/b/c/deep"), b"333").unwrap();

        let backend = LocalBackend::open("name", root).unwrap();
        let mut files = backend.list().await.unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(
            files,
            vec![
                FileInfo::new("a/b/c/deep", 3),
                FileInfo::new("a/middle.jpg", 2),
                FileInfo::new("top.txt", 1),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_skips_symlinks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("real.txt"), b"data").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();
        std::fs::create_dir(root.join("dir")).unwrap();
        std::os::unix::fs::symlink(root.join("dir"), root.join("dir-link")).unwrap();

        let backend = LocalBackend::open("name", root).unwrap();
        let files = backend.list().await.unwrap();
        assert_eq!(files, vec![FileInfo::new("real.txt", 4)]);
    }

    #[tokio::test]
    async fn test_list_fails_when_root_vanishes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("source");
        std::fs::create_dir(&root).unwrap();
        let backend = LocalBackend::open("name", &root).unwrap();
        std::fs::remove_dir(&root).unwrap();
        let err = backend.list().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_dir_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.create_dir(Path::new("TXT")).await.unwrap();
        backend.create_dir(Path::new("TXT")).await.unwrap();
        assert!(temp_dir.path().join("TXT").is_dir());
    }

    #[tokio::test]
    async fn test_create_dir_over_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("TXT"), b"in the way").unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert!(backend.create_dir(Path::new("TXT")).await.is_err());
    }

    #[tokio::test]
    async fn test_import_copies_contents_and_times() {
        let source_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("notes.txt");
        std::fs::write(&source, b"Hello, world!").unwrap();
        let then = FileTime::from_system_time(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000));
        filetime::set_file_mtime(&source, then).unwrap();

        let backend = LocalBackend::new("output", output_dir.path()).unwrap();
        backend.create_dir(Path::new("TXT")).await.unwrap();
        let bytes = backend.import(&source, Path::new("TXT/notes.txt")).await.unwrap();
        assert_eq!(bytes, 13);

        let target = output_dir.path().join("TXT/notes.txt");
        assert_eq!(std::fs::read(&target).unwrap(), b"Hello, world!");
        let metadata = std::fs::metadata(&target).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&metadata), then);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_import_copies_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let source_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("run.sh");
        std::fs::write(&source, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o750)).unwrap();

        let backend = LocalBackend::new("output", output_dir.path()).unwrap();
        backend.create_dir(Path::new("SH")).await.unwrap();
        backend.import(&source, Path::new("SH/run.sh")).await.unwrap();
        let mode = std::fs::metadata(output_dir.path().join("SH/run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[tokio::test]
    async fn test_import_overwrites() {
        let source_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("a.txt");
        std::fs::write(&source, b"new").unwrap();
        std::fs::write(output_dir.path().join("a.txt"), b"old contents").unwrap();

        let backend = LocalBackend::new("output", output_dir.path()).unwrap();
        backend.import(&source, Path::new("a.txt")).await.unwrap();
        assert_eq!(std::fs::read(output_dir.path().join("a.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_copy_file_times_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("a.txt");
        std::fs::write(&source, b"data").unwrap();
        let missing = temp_dir.path().join("never-written.txt");
        let err = copy_file_times(&source, &missing).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Metadata(path) if path == &missing));
    }

    #[tokio::test]
    async fn test_import_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("output", temp_dir.path()).unwrap();
        let missing = temp_dir.path().join("vanished.txt");
        assert!(backend.import(&missing, Path::new("copy.txt")).await.is_err());
        assert!(!temp_dir.path().join("copy.txt").exists());
    }

    #[tokio::test]
    async fn test_import_does_not_create_parents() {
        let source_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("a.txt");
        std::fs::write(&source, b"data").unwrap();
        let backend = LocalBackend::new("output", output_dir.path()).unwrap();
        assert!(backend.import(&source, Path::new("TXT/a.txt")).await.is_err());
    }

    #[tokio::test]
    async fn test_path_security() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        assert!(backend.create_dir(Path::new("../escape")).await.is_err());
        assert!(backend.import(Path::new("/etc/hostname"), Path::new("../../file")).await.is_err());
    }
}
