//! Write operations: content, moves and removal.

use async_trait::async_trait;

use crate::{AppendOptions, CopyFlags, FileData, FsError, RmOptions, WriteOptions};

/// Write operations for a virtual filesystem.
///
/// Every method is all-or-nothing: on error the tree is unchanged.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsWrite`.
#[async_trait]
pub trait FsWrite: Send + Sync {
    /// Replace a file's content, creating the file if missing.
    ///
    /// # Errors
    ///
    /// - `EEXIST` if `opts.exclusive` is set and the path exists
    /// - `EISDIR` if the path is a directory
    /// - `ENOENT` if the parent directory is missing
    /// - `EINVAL` if text does not decode in `opts.encoding`
    async fn write_file(
        &self,
        path: &str,
        data: FileData<'_>,
        opts: WriteOptions,
    ) -> Result<(), FsError>;

    /// Append to a file, creating it if missing.
    ///
    /// An existing file keeps its mode and creation time. Appending nothing
    /// to an existing file changes nothing.
    ///
    /// # Errors
    ///
    /// - `EISDIR` if the path is a directory
    /// - `ENOENT` if the parent directory is missing
    async fn append_file(
        &self,
        path: &str,
        data: FileData<'_>,
        opts: AppendOptions,
    ) -> Result<(), FsError>;

    /// Copy a file byte for byte.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if `src` does not exist
    /// - `EISDIR` if `src` or `dest` is a directory
    /// - `EEXIST` if `flags.exclusive` is set and `dest` exists
    async fn copy_file(&self, src: &str, dest: &str, flags: CopyFlags) -> Result<(), FsError>;

    /// Move an entry, and for a directory its whole subtree.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if `old` or the parent of `new` is missing
    /// - `EINVAL` if a directory would move inside itself
    /// - `EISDIR` for a file onto a directory
    /// - `ENOTDIR` for a directory onto a non-directory
    /// - `ENOTEMPTY` for a directory onto a non-empty directory
    /// - `EBUSY` if `old` is the root
    async fn rename(&self, old: &str, new: &str) -> Result<(), FsError>;

    /// Remove a file or symlink entry.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not exist
    /// - `EISDIR` if the path is a directory
    async fn unlink(&self, path: &str) -> Result<(), FsError>;

    /// Remove any entry.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not exist and `opts.force` is unset
    /// - `ENOTEMPTY` / `EISDIR` for a directory without `opts.recursive`
    /// - `EBUSY` for the root
    async fn rm(&self, path: &str, opts: RmOptions) -> Result<(), FsError>;
}
