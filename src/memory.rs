//! # MemoryFs
//!
//! The in-memory filesystem: one entry store behind a lock plus an injected
//! [`BlobStore`].
//!
//! Each call takes the lock once, runs its synchronous handler to
//! completion, and releases it. Independent instances share nothing.
//!
//! ```rust
//! use anyfs_mem::{FsRead, FsWrite, MemoryFs, ReadOptions, WriteOptions};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let fs = MemoryFs::new();
//! fs.write_file("/hello.txt", "hi".into(), WriteOptions::default()).await?;
//! let bytes = fs.read_file("/hello.txt", ReadOptions::default()).await?;
//! assert_eq!(bytes.into_bytes(), b"hi");
//! # Ok::<(), anyfs_mem::FsError>(())
//! # }).unwrap();
//! ```

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::blob::{BlobStore, MemoryBlobStore};
use crate::store::EntryStore;
use crate::{
    AccessMode, AppendOptions, CopyFlags, DirListing, FileContents, FileData, FsConfig, FsDir,
    FsError, FsLink, FsPermissions, FsRead, FsWrite, Identity, MkdirOptions, ReadDirOptions,
    ReadOptions, RmOptions, RmdirOptions, Stats, SymlinkType, WriteOptions, ops,
};

/// In-memory POSIX filesystem.
///
/// Generic over its blob store; [`MemoryBlobStore`] is the default.
///
/// # Thread Safety
///
/// `MemoryFs` is `Send + Sync` and is meant to be shared behind an `Arc`.
/// Reads run concurrently; mutations are serialized, and each commits
/// before the next one observes the tree.
#[derive(Debug)]
pub struct MemoryFs<B: BlobStore = MemoryBlobStore> {
    store: RwLock<EntryStore>,
    blobs: B,
}

impl MemoryFs<MemoryBlobStore> {
    /// Create an empty filesystem with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FsConfig::default())
    }

    /// Create an empty filesystem with `config`.
    pub fn with_config(config: FsConfig) -> Self {
        Self::with_blob_store(MemoryBlobStore::new(), config)
    }
}

impl Default for MemoryFs<MemoryBlobStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlobStore> MemoryFs<B> {
    /// Create an empty filesystem storing content in `blobs`.
    pub fn with_blob_store(blobs: B, config: FsConfig) -> Self {
        tracing::debug!(umask = config.umask, uid = config.identity.uid, "filesystem created");
        Self {
            store: RwLock::new(EntryStore::new(config)),
            blobs,
        }
    }

    /// The blob store holding file content.
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// The configuration this instance was created with.
    pub fn config(&self) -> FsConfig {
        self.read().config().clone()
    }

    /// Number of path entries, the root included.
    pub fn entry_count(&self) -> usize {
        self.read().len()
    }

    /// Check access for an explicit caller instead of the configured identity.
    ///
    /// # Errors
    ///
    /// - `ENOENT` if the path or a symlink target is missing
    /// - `EACCES` if the permission bits deny `mode`
    pub fn access_as(&self, path: &str, mode: AccessMode, caller: &Identity) -> Result<(), FsError> {
        ops::access(&self.read(), path, mode, caller)
    }

    // Handlers validate before committing and a commit cannot fail, so a
    // poisoned lock still guards a consistent tree.
    fn read(&self) -> RwLockReadGuard<'_, EntryStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntryStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<B: BlobStore> FsRead for MemoryFs<B> {
    async fn read_file(&self, path: &str, opts: ReadOptions) -> Result<FileContents, FsError> {
        ops::read_file(&self.read(), &self.blobs, path, opts)
    }

    async fn stat(&self, path: &str) -> Result<Stats, FsError> {
        ops::stat(&self.read(), path)
    }
}

#[async_trait]
impl<B: BlobStore> FsWrite for MemoryFs<B> {
    async fn write_file(
        &self,
        path: &str,
        data: FileData<'_>,
        opts: WriteOptions,
    ) -> Result<(), FsError> {
        ops::write_file(&mut self.write(), &self.blobs, path, data, opts)
    }

    async fn append_file(
        &self,
        path: &str,
        data: FileData<'_>,
        opts: AppendOptions,
    ) -> Result<(), FsError> {
        ops::append_file(&mut self.write(), &self.blobs, path, data, opts)
    }

    async fn copy_file(&self, src: &str, dest: &str, flags: CopyFlags) -> Result<(), FsError> {
        ops::copy_file(&mut self.write(), &self.blobs, src, dest, flags)
    }

    async fn rename(&self, old: &str, new: &str) -> Result<(), FsError> {
        ops::rename(&mut self.write(), &self.blobs, old, new)
    }

    async fn unlink(&self, path: &str) -> Result<(), FsError> {
        ops::unlink(&mut self.write(), &self.blobs, path)
    }

    async fn rm(&self, path: &str, opts: RmOptions) -> Result<(), FsError> {
        ops::rm(&mut self.write(), &self.blobs, path, opts)
    }
}

#[async_trait]
impl<B: BlobStore> FsDir for MemoryFs<B> {
    async fn mkdir(&self, path: &str, opts: MkdirOptions) -> Result<Option<String>, FsError> {
        ops::mkdir(&mut self.write(), &self.blobs, path, opts)
    }

    async fn rmdir(&self, path: &str, opts: RmdirOptions) -> Result<(), FsError> {
        ops::rmdir(&mut self.write(), &self.blobs, path, opts)
    }

    async fn readdir(&self, path: &str, opts: ReadDirOptions) -> Result<DirListing, FsError> {
        ops::readdir(&self.read(), path, opts)
    }
}

#[async_trait]
impl<B: BlobStore> FsLink for MemoryFs<B> {
    async fn link(&self, existing: &str, new: &str) -> Result<(), FsError> {
        ops::link(&mut self.write(), &self.blobs, existing, new)
    }

    async fn symlink(
        &self,
        target: &str,
        path: &str,
        kind: Option<SymlinkType>,
    ) -> Result<(), FsError> {
        if let Some(kind) = kind {
            tracing::trace!(?kind, path, "symlink type hint ignored");
        }
        ops::symlink(&mut self.write(), &self.blobs, target, path)
    }

    async fn readlink(&self, path: &str) -> Result<String, FsError> {
        ops::readlink(&self.read(), path)
    }

    async fn lstat(&self, path: &str) -> Result<Stats, FsError> {
        ops::lstat(&self.read(), path)
    }
}

#[async_trait]
impl<B: BlobStore> FsPermissions for MemoryFs<B> {
    async fn access(&self, path: &str, mode: AccessMode) -> Result<(), FsError> {
        let store = self.read();
        let caller = store.config().identity;
        ops::access(&store, path, mode, &caller)
    }

    async fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError> {
        ops::chmod(&mut self.write(), &self.blobs, path, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fs;

    #[test]
    fn memory_fs_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryFs>();
    }

    #[test]
    fn memory_fs_implements_fs() {
        fn assert_fs<T: Fs>() {}
        assert_fs::<MemoryFs>();
        assert_fs::<MemoryFs<MemoryBlobStore>>();
    }

    #[test]
    fn new_fs_holds_only_root() {
        let fs = MemoryFs::new();
        assert_eq!(fs.entry_count(), 1);
        assert_eq!(fs.blobs().live_count(), 0);
        assert_eq!(fs.config(), FsConfig::default());
    }

    #[tokio::test]
    async fn write_then_read_through_facade() -> Result<(), FsError> {
        let fs = MemoryFs::new();
        fs.write_file("/hello.txt", "hi".into(), WriteOptions::default())
            .await?;
        let bytes = fs.read_file("/hello.txt", ReadOptions::default()).await?;
        assert_eq!(bytes.into_bytes(), b"hi");
        Ok(())
    }

    #[tokio::test]
    async fn instances_are_independent() {
        let a = MemoryFs::new();
        let b = MemoryFs::new();
        a.write_file("/f", "x".into(), WriteOptions::default())
            .await
            .unwrap();
        assert!(a.stat("/f").await.is_ok());
        assert!(b.stat("/f").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn access_as_overrides_identity() {
        let fs = MemoryFs::new();
        fs.write_file("/f", "x".into(), WriteOptions::default())
            .await
            .unwrap();
        fs.chmod("/f", 0o600).await.unwrap();
        fs.access("/f", AccessMode::READ).await.unwrap();
        let err = fs
            .access_as("/f", AccessMode::READ, &Identity::new(1000, 1000))
            .unwrap_err();
        assert_eq!(err.code(), "EACCES");
    }
}
