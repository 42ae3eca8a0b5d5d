//! Read operations.

use async_trait::async_trait;

use crate::{FileContents, FsError, ReadOptions, Stats};

/// Read operations for a virtual filesystem.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods take `&self`;
/// implementations use interior mutability.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsRead`.
#[async_trait]
pub trait FsRead: Send + Sync {
    /// Read a whole file, following symlinks.
    ///
    /// Returns raw bytes unless `opts.encoding` asks for text.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not resolve to an entry
    /// - `EISDIR` if the path is a directory
    /// - `ENOTDIR` if a trailing slash names a file
    async fn read_file(&self, path: &str, opts: ReadOptions) -> Result<FileContents, FsError>;

    /// Stats of the entry a path refers to, following symlinks.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if any hop is missing, including a dangling final link
    /// - `ELOOP` if the symlink chain is too long
    async fn stat(&self, path: &str) -> Result<Stats, FsError>;
}
