//! Relative path validation.
//!
//! Every path handed to a backend is relative to that backend's root. Paths
//! that would climb out of the root, or that collapse to nothing, are
//! rejected before they ever reach the filesystem.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Normalizes a storage path and makes sure it stays below the root.
///
/// `.` components and duplicate separators are dropped, `..` is resolved
/// lexically, and a leading root is ignored. Null bytes are rejected because
/// they truncate paths in the underlying syscalls.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use bucketeer_storage::validate_path;
///
/// assert_eq!(validate_path("TXT/./notes.txt").unwrap(), Path::new("TXT/notes.txt"));
/// assert!(validate_path("../outside.txt").is_err());
/// assert!(validate_path("").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(s) if s.as_encoded_bytes().contains(&0) => {
                exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()))
            },
            Component::Normal(s) => components.push(s),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
