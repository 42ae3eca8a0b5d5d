//! # Filesystem Traits
//!
//! The awaitable operation surface, split by concern.
//!
//! | Trait | Operations |
//! |-------|------------|
//! | [`FsRead`] | `read_file`, `stat` |
//! | [`FsWrite`] | `write_file`, `append_file`, `copy_file`, `rename`, `unlink`, `rm` |
//! | [`FsDir`] | `mkdir`, `rmdir`, `readdir` |
//! | [`FsLink`] | `link`, `symlink`, `readlink`, `lstat` |
//! | [`FsPermissions`] | `access`, `chmod` |
//!
//! [`Fs`] combines all five and has a blanket implementation: implement the
//! component traits and you get `Fs` for free.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Methods take `&self`, so one instance
//! can be shared behind an `Arc` by many tasks.
//!
//! ## Object Safety
//!
//! The traits use `async_trait`, so they are object-safe:
//!
//! ```rust
//! use anyfs_mem::{Fs, FsError, ReadOptions};
//!
//! async fn dump(fs: &dyn Fs, path: &str) -> Result<Vec<u8>, FsError> {
//!     Ok(fs.read_file(path, ReadOptions::default()).await?.into_bytes())
//! }
//! ```

mod fs_dir;
mod fs_link;
mod fs_permissions;
mod fs_read;
mod fs_write;

pub use fs_dir::FsDir;
pub use fs_link::FsLink;
pub use fs_permissions::FsPermissions;
pub use fs_read::FsRead;
pub use fs_write::FsWrite;

/// The complete filesystem interface.
///
/// # Blanket Implementation
///
/// Automatically implemented for any type implementing all five component
/// traits. You never implement `Fs` directly.
///
/// # Example
///
/// ```rust
/// use anyfs_mem::{Fs, FsError, MkdirOptions, WriteOptions};
///
/// // Generic helper that works with any Fs implementation
/// async fn seed<F: Fs>(fs: &F) -> Result<(), FsError> {
///     let recursive = MkdirOptions { recursive: true, ..Default::default() };
///     fs.mkdir("/etc/app", recursive).await?;
///     fs.write_file("/etc/app/config", "key=value".into(), WriteOptions::default()).await?;
///     fs.link("/etc/app/config", "/etc/app/config.bak").await?;
///     Ok(())
/// }
/// ```
pub trait Fs: FsRead + FsWrite + FsDir + FsLink + FsPermissions {}

// Blanket implementation
impl<T: FsRead + FsWrite + FsDir + FsLink + FsPermissions> Fs for T {}
