//! Bucket naming.
//!
//! A file's bucket depends on nothing but its name: the final extension,
//! uppercased, or [`NO_EXTENSION_BUCKET`] when there isn't one.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Bucket for files without an extension.
pub const NO_EXTENSION_BUCKET: &str = "NO_EXTENSION";

/// An output subdirectory grouping files by extension.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Uppercased final extension, without the leading dot.
    Extension(String),
    /// The file name has no extension.
    NoExtension,
}
impl Bucket {
    /// Pick the bucket for a file.
    ///
    /// Only the final component of `path` is considered, and only its last
    /// extension: `archive.tar.gz` goes to `GZ`. Dotfiles such as `.bashrc`
    /// and names ending in a dot have no extension.
    ///
    /// ```
    /// use std::path::Path;
    /// use bucketeer_library::Bucket;
    ///
    /// assert_eq!(Bucket::for_path(Path::new("photos/cat.jpeg")).name(), "JPEG");
    /// assert_eq!(Bucket::for_path(Path::new("README")), Bucket::NoExtension);
    /// ```
    pub fn for_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if !ext.is_empty() => Self::Extension(ext.to_string_lossy().to_uppercase()),
            _ => Self::NoExtension,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Extension(ext) => ext.as_str(),
            Self::NoExtension => NO_EXTENSION_BUCKET,
        }
    }

    /// Path of the bucket directory, relative to the output root.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.name())
    }

    /// Where a file called `file_name` ends up, relative to the output root.
    pub fn destination(&self, file_name: &OsStr) -> PathBuf {
        self.path().join(file_name)
    }
}
impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
