//! Directory operations.

use async_trait::async_trait;

use crate::{DirListing, FsError, MkdirOptions, ReadDirOptions, RmdirOptions};

/// Directory operations for a virtual filesystem.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsDir`.
#[async_trait]
pub trait FsDir: Send + Sync {
    /// Create a directory.
    ///
    /// In recursive mode, returns the first directory actually created, or
    /// `None` if the path already was a directory.
    ///
    /// # Errors
    ///
    /// - `EEXIST` if the path is occupied (non-recursive), or is a file
    /// - `ENOENT` if the parent is missing (non-recursive)
    /// - `ENOTDIR` if an ancestor is a file
    async fn mkdir(&self, path: &str, opts: MkdirOptions) -> Result<Option<String>, FsError>;

    /// Remove a directory.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not exist
    /// - `ENOTDIR` if the path is not a directory
    /// - `ENOTEMPTY` if it has entries and `opts.recursive` is unset
    /// - `EBUSY` for the root
    async fn rmdir(&self, path: &str, opts: RmdirOptions) -> Result<(), FsError>;

    /// List a directory in sorted order.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not exist
    /// - `ENOTDIR` if the path is not a directory
    async fn readdir(&self, path: &str, opts: ReadDirOptions) -> Result<DirListing, FsError>;
}
