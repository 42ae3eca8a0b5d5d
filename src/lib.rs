//! # anyfs-mem
//!
//! An in-memory POSIX filesystem engine for the **AnyFS virtual filesystem
//! standard**.
//!
//! Paths map to directory entries, entries point at inodes, and inodes own
//! their content through an injected [`BlobStore`]. Hard links share one
//! inode, symlinks are resolved the way a POSIX kernel resolves them, and
//! every mutation, recursive renames and removals included, commits as a
//! single batch.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anyfs_mem::{FsDir, FsLink, FsRead, FsWrite, MemoryFs, MkdirOptions, ReadOptions, WriteOptions};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let fs = MemoryFs::new();
//!
//! fs.mkdir("/srv/www", MkdirOptions { recursive: true, ..Default::default() }).await?;
//! fs.write_file("/srv/www/index.html", "<h1>hi</h1>".into(), WriteOptions::default()).await?;
//! fs.link("/srv/www/index.html", "/srv/www/home.html").await?;
//!
//! let stats = fs.stat("/srv/www/home.html").await?;
//! assert_eq!(stats.nlink, 2);
//!
//! let body = fs.read_file("/srv/www/home.html", ReadOptions::default()).await?;
//! assert_eq!(body.into_bytes(), b"<h1>hi</h1>");
//! # Ok::<(), anyfs_mem::FsError>(())
//! # }).unwrap();
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`MemoryFs`] | The engine: entry store plus blob store behind one lock |
//! | [`Fs`] | Composite async trait over every operation |
//! | [`FsError`] | POSIX-shaped error: code, errno, syscall and paths |
//! | [`Stats`] | Result of `stat`/`lstat` |
//! | [`Dirent`] | Typed `readdir` entry |
//! | [`BlobStore`] | Content storage seam; [`MemoryBlobStore`] is the default |
//! | [`FsConfig`] | Umask, identity and resolution limits |
//!
//! ---
//!
//! ## Trait Layout
//!
//! ```text
//! FsRead + FsWrite + FsDir + FsLink + FsPermissions = Fs
//!                                                      ↓
//!                                   FsExt (exists, is_file, is_dir, ...)
//! ```
//!
//! [`Fs`] and [`FsExt`] have **blanket implementations**.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Errors render like the
//! kernel messages callers already know:
//!
//! ```rust
//! use anyfs_mem::{ErrorKind, FsError};
//!
//! let err = FsError::new(ErrorKind::NotFound, "open", "/missing.txt");
//! assert_eq!(err.to_string(), "ENOENT: no such file or directory, open '/missing.txt'");
//! assert_eq!(err.errno(), -2);
//!
//! let err = FsError::with_dest(ErrorKind::NotEmpty, "rename", "/a", "/b");
//! assert_eq!(err.to_string(), "ENOTEMPTY: directory not empty, rename '/a' -> '/b'");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. Share a [`MemoryFs`]
//! across tasks with `Arc`; each call commits before the next observes it.
//! Separate instances share no state.
//!
//! ---
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` for every committed
//! mutation, `trace` for rejected preconditions, `warn` when a blob cannot
//! be released after a commit. No subscriber is installed.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Stats`], [`Dirent`], [`FsConfig`], etc., plus `FsExtJson` |

// Private modules
mod blob;
mod error;
mod ext;
mod memory;
mod ops;
mod options;
mod store;
mod traits;
mod types;

pub mod path;

// Public re-exports - error types
pub use error::{ErrorKind, FsError};

// Public re-exports - core types
pub use types::{
    BLOCK_SIZE, Dirent, FileType, Identity, InodeId, Permissions, ROOT_INODE, S_IFDIR, S_IFLNK,
    S_IFMT, S_IFREG, Stats,
};

// Public re-exports - configuration and options
pub use options::{
    AccessMode, AppendOptions, CopyFlags, DirListing, Encoding, FileContents, FileData, FsConfig,
    MkdirOptions, ReadDirOptions, ReadOptions, RmOptions, RmdirOptions, SymlinkType, WriteOptions,
};

// Public re-exports - traits
pub use traits::{Fs, FsDir, FsLink, FsPermissions, FsRead, FsWrite};

// Public re-exports - storage and engine
pub use blob::{BlobError, BlobId, BlobStore, MemoryBlobStore};
pub use memory::MemoryFs;

// Public re-exports - infrastructure
pub use ext::FsExt;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FsExtJson;
