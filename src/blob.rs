//! Blob storage collaborator.
//!
//! The engine stores no bytes itself: every inode references one blob by an
//! opaque [`BlobId`], and content is read, written and released through an
//! injected [`BlobStore`]. [`MemoryBlobStore`] is the in-process
//! implementation used by default and in tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::{ErrorKind, FsError};

/// Opaque identifier of a blob, issued by [`BlobStore::put`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlobId(String);

impl BlobId {
    /// Wrap a store-specific identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure reported by a [`BlobStore`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    /// The blob does not exist.
    #[error("blob not found: {id}")]
    NotFound {
        /// The missing blob.
        id: BlobId,
    },

    /// The store cannot hold the requested bytes.
    #[error("blob store full: requested {requested}, available {available}")]
    NoSpace {
        /// Bytes requested.
        requested: u64,
        /// Bytes still available.
        available: u64,
    },

    /// The store refuses writes.
    #[error("blob store is read-only")]
    ReadOnly,

    /// Store-specific failure.
    #[error("blob store error: {0}")]
    Backend(String),
}

impl BlobError {
    /// The POSIX kind a filesystem call reports for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSpace { .. } => ErrorKind::NoSpace,
            Self::ReadOnly => ErrorKind::ReadOnly,
            Self::NotFound { .. } | Self::Backend(_) => ErrorKind::Io,
        }
    }

    /// Attach the failing filesystem call.
    pub fn into_fs_error(self, syscall: &'static str, path: &str) -> FsError {
        tracing::debug!(%self, syscall, path, "blob store failure");
        FsError::new(self.kind(), syscall, path)
    }
}

/// Content storage used by the engine.
///
/// Implementations own persistence, durability and retries. The engine only
/// copies or concatenates blob bytes and never retries a failed call.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self`; stores
/// use interior mutability.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn BlobStore`.
pub trait BlobStore: Send + Sync {
    /// Fetch the bytes of a blob.
    ///
    /// # Errors
    ///
    /// - [`BlobError::NotFound`] if `id` was never issued or was deleted
    fn get(&self, id: &BlobId) -> Result<Vec<u8>, BlobError>;

    /// Store bytes as a new blob.
    ///
    /// # Errors
    ///
    /// - [`BlobError::NoSpace`] if the store is full
    /// - [`BlobError::ReadOnly`] if the store refuses writes
    fn put(&self, data: &[u8]) -> Result<BlobId, BlobError>;

    /// Release a blob.
    ///
    /// # Errors
    ///
    /// - [`BlobError::NotFound`] if `id` is unknown
    fn delete(&self, id: &BlobId) -> Result<(), BlobError>;

    /// Create an independent blob holding the same bytes as `id`.
    ///
    /// Stores with copy-on-write support override this; the default is a
    /// full copy.
    fn duplicate(&self, id: &BlobId) -> Result<BlobId, BlobError> {
        let data = self.get(id)?;
        self.put(&data)
    }

    /// Create a new blob holding the bytes of `id` followed by `data`.
    ///
    /// `id` itself is left untouched.
    fn concat(&self, id: &BlobId, data: &[u8]) -> Result<BlobId, BlobError> {
        let mut combined = self.get(id)?;
        combined.extend_from_slice(data);
        self.put(&combined)
    }
}

/// In-memory [`BlobStore`] with sequential ids.
///
/// An optional byte capacity makes `put` fail with [`BlobError::NoSpace`],
/// and lifecycle counters let callers observe how many blobs were released.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<BlobId, Vec<u8>>>,
    capacity: Option<u64>,
    next_id: AtomicU64,
    released: AtomicU64,
}

impl MemoryBlobStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding at most `bytes` bytes of blob data.
    pub fn with_capacity(bytes: u64) -> Self {
        Self {
            capacity: Some(bytes),
            ..Self::default()
        }
    }

    /// Number of blobs currently stored.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of blobs deleted over the store's lifetime.
    pub fn released_count(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> u64 {
        self.lock().values().map(|data| data.len() as u64).sum()
    }

    /// Returns `true` if `id` is stored.
    pub fn contains(&self, id: &BlobId) -> bool {
        self.lock().contains_key(id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<BlobId, Vec<u8>>> {
        // Every critical section is a single map operation.
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, id: &BlobId) -> Result<Vec<u8>, BlobError> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| BlobError::NotFound { id: id.clone() })
    }

    fn put(&self, data: &[u8]) -> Result<BlobId, BlobError> {
        let mut blobs = self.lock();
        if let Some(capacity) = self.capacity {
            let used: u64 = blobs.values().map(|d| d.len() as u64).sum();
            let available = capacity.saturating_sub(used);
            if data.len() as u64 > available {
                return Err(BlobError::NoSpace {
                    requested: data.len() as u64,
                    available,
                });
            }
        }
        let id = BlobId(format!("{:016x}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        blobs.insert(id.clone(), data.to_vec());
        Ok(id)
    }

    fn delete(&self, id: &BlobId) -> Result<(), BlobError> {
        self.lock()
            .remove(id)
            .map(|_| {
                self.released.fetch_add(1, Ordering::SeqCst);
            })
            .ok_or_else(|| BlobError::NotFound { id: id.clone() })
    }
}
