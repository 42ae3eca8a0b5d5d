//! # Extension Traits
//!
//! Convenience methods for any [`Fs`].
//!
//! ## Overview
//!
//! [`FsExt`] provides commonly-needed helpers that aren't part of the core
//! traits. They are default methods with a blanket implementation, so every
//! `Fs`, trait objects included, gets them for free.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`exists`](FsExt::exists) | Check whether a path resolves to anything |
//! | [`is_file`](FsExt::is_file) | Check if path is a regular file |
//! | [`is_dir`](FsExt::is_dir) | Check if path is a directory |
//! | [`read_to_string`](FsExt::read_to_string) | Read a file as strict UTF-8 |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, `FsExtJson` adds `read_json` and
//! `write_json`.
//!
//! ```toml
//! [dependencies]
//! anyfs-mem = { version = "0.1", features = ["serde"] }
//! ```

use async_trait::async_trait;

use crate::{ErrorKind, Fs, FsError, ReadOptions, Stats};

/// Extension methods for any filesystem.
///
/// # Example
///
/// ```rust
/// use anyfs_mem::{Fs, FsError, FsExt};
///
/// async fn describe<F: Fs>(fs: &F, path: &str) -> Result<&'static str, FsError> {
///     Ok(if fs.is_dir(path).await? {
///         "directory"
///     } else if fs.is_file(path).await? {
///         "file"
///     } else {
///         "missing"
///     })
/// }
/// ```
#[async_trait]
pub trait FsExt: Fs {
    /// Check whether a path resolves, following symlinks.
    ///
    /// A dangling symlink reports `false`. Errors other than `ENOENT`
    /// (such as `ELOOP` or `ENOTDIR`) are returned.
    async fn exists(&self, path: &str) -> Result<bool, FsError> {
        Ok(stat_if_present(self.stat(path).await)?.is_some())
    }

    /// Check if the path points to a regular file, following symlinks.
    ///
    /// Returns `Ok(false)` if the path doesn't exist.
    async fn is_file(&self, path: &str) -> Result<bool, FsError> {
        Ok(stat_if_present(self.stat(path).await)?.is_some_and(|s| s.is_file()))
    }

    /// Check if the path points to a directory, following symlinks.
    ///
    /// Returns `Ok(false)` if the path doesn't exist.
    async fn is_dir(&self, path: &str) -> Result<bool, FsError> {
        Ok(stat_if_present(self.stat(path).await)?.is_some_and(|s| s.is_dir()))
    }

    /// Read a file and require its content to be valid UTF-8.
    ///
    /// # Errors
    ///
    /// - Everything `read_file` reports
    /// - `EINVAL` if the content is not UTF-8
    async fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        let bytes = self.read_file(path, ReadOptions::default()).await?.into_bytes();
        String::from_utf8(bytes).map_err(|_| FsError::new(ErrorKind::InvalidArgument, "open", path))
    }
}

fn stat_if_present(result: Result<Stats, FsError>) -> Result<Option<Stats>, FsError> {
    match result {
        Ok(stats) => Ok(Some(stats)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

// Blanket implementation - any Fs gets FsExt for free
impl<F: Fs + ?Sized> FsExt for F {}

#[cfg(feature = "serde")]
mod json {
    use async_trait::async_trait;
    use serde::{Serialize, de::DeserializeOwned};

    use super::FsExt;
    use crate::{ErrorKind, Fs, FsError, WriteOptions};

    /// JSON helpers, available with the `serde` feature.
    #[async_trait]
    pub trait FsExtJson: Fs {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - Everything `read_to_string` reports
        /// - `EINVAL` if the content is not valid JSON for `T`
        async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FsError> {
            let text = self.read_to_string(path).await?;
            serde_json::from_str(&text).map_err(|err| {
                tracing::debug!(path, error = %err, "json decode failed");
                FsError::new(ErrorKind::InvalidArgument, "open", path)
            })
        }

        /// Serialize a value as pretty-printed JSON and write it.
        ///
        /// # Errors
        ///
        /// - `EINVAL` if `value` cannot be serialized
        /// - Everything `write_file` reports
        async fn write_json<T: Serialize + Sync + ?Sized>(
            &self,
            path: &str,
            value: &T,
        ) -> Result<(), FsError> {
            let json = serde_json::to_string_pretty(value).map_err(|err| {
                tracing::debug!(path, error = %err, "json encode failed");
                FsError::new(ErrorKind::InvalidArgument, "open", path)
            })?;
            self.write_file(path, json.as_str().into(), WriteOptions::default())
                .await
        }
    }

    // Blanket implementation
    impl<F: Fs + ?Sized> FsExtJson for F {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;
