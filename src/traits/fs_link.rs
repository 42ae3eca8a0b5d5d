//! Hard links, symbolic links and link-aware metadata.

use async_trait::async_trait;

use crate::{FsError, Stats, SymlinkType};

/// Link operations for a virtual filesystem.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsLink`.
#[async_trait]
pub trait FsLink: Send + Sync {
    /// Give the inode behind `existing` another name.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if `existing` or the parent of `new` is missing
    /// - `EPERM` if `existing` is a directory, the root, or ends in `.`/`..`
    /// - `EEXIST` if `new` is occupied
    async fn link(&self, existing: &str, new: &str) -> Result<(), FsError>;

    /// Create a symlink at `path` pointing at `target`.
    ///
    /// The target is stored verbatim and never resolved. `kind` is accepted
    /// and ignored.
    ///
    /// # Errors
    ///
    /// - `EEXIST` if `path` is occupied by anything
    /// - `ENOENT` if the parent of `path` is missing
    async fn symlink(
        &self,
        target: &str,
        path: &str,
        kind: Option<SymlinkType>,
    ) -> Result<(), FsError>;

    /// The raw target of a symlink.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not exist
    /// - `EINVAL` if the path is not a symlink
    async fn readlink(&self, path: &str) -> Result<String, FsError>;

    /// Stats of the entry itself; a final symlink is not followed.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not exist
    async fn lstat(&self, path: &str) -> Result<Stats, FsError>;
}
