//! Permission checks and changes.

use async_trait::async_trait;

use crate::{AccessMode, FsError};

/// Permission operations for a virtual filesystem.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsPermissions`.
#[async_trait]
pub trait FsPermissions: Send + Sync {
    /// Check the configured identity's access to a path, following symlinks.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path or a symlink target is missing
    /// - `EACCES` if the permission bits deny `mode`
    async fn access(&self, path: &str, mode: AccessMode) -> Result<(), FsError>;

    /// Replace the permission bits, following symlinks.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path does not exist
    /// - `EINVAL` if `mode` has bits above `0o7777`
    async fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError>;
}
