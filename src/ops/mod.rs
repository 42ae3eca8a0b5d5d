//! # Operation Handlers
//!
//! One synchronous handler per filesystem call. Each handler receives the
//! [`EntryStore`] and the [`BlobStore`] explicitly, validates every
//! precondition, then commits a single [`Changeset`].
//!
//! Blob writes needed by a mutation happen after validation and before the
//! commit; blobs released by the commit are deleted afterwards. A failing
//! release is logged and never reported to the caller, since the tree has
//! already changed.

mod content;
mod link;
mod mkdir;
mod readdir;
mod remove;
mod rename;
mod stat;

pub(crate) use content::{append_file, copy_file, read_file, write_file};
pub(crate) use link::{link, readlink, symlink};
pub(crate) use mkdir::mkdir;
pub(crate) use readdir::readdir;
pub(crate) use remove::{rm, rmdir, unlink};
pub(crate) use rename::rename;
pub(crate) use stat::{access, chmod, lstat, stat};

use crate::blob::{BlobId, BlobStore};
use crate::path::{NormalizedPath, normalize};
use crate::store::{Changeset, EntryStore, Resolved, resolve};
use crate::{ErrorKind, FileType, FsError};

/// Build a rejection, traced at the point it is decided.
pub(crate) fn reject(kind: ErrorKind, syscall: &'static str, raw: &str) -> FsError {
    tracing::trace!(code = kind.code(), syscall, path = raw, "rejected");
    FsError::new(kind, syscall, raw)
}

/// Two-path variant of [`reject`].
pub(crate) fn reject_pair(
    kind: ErrorKind,
    syscall: &'static str,
    src: &str,
    dest: &str,
) -> FsError {
    tracing::trace!(code = kind.code(), syscall, path = src, dest, "rejected");
    FsError::with_dest(kind, syscall, src, dest)
}

/// Re-attach an error raised for one side of a two-path call to both paths.
pub(crate) fn pair(err: FsError, src: &str, dest: &str) -> FsError {
    reject_pair(err.kind(), err.syscall(), src, dest)
}

pub(crate) fn normalized(
    store: &EntryStore,
    raw: &str,
    syscall: &'static str,
) -> Result<NormalizedPath, FsError> {
    normalize(raw, syscall, store.config().max_name_len)
}

/// Resolve without following the final component.
///
/// A trailing slash asserts a directory: a final symlink is then followed,
/// and anything but a directory at the end is `ENOTDIR`.
pub(crate) fn locate(
    store: &EntryStore,
    path: &NormalizedPath,
    syscall: &'static str,
    raw: &str,
) -> Result<Resolved, FsError> {
    let mut resolved = resolve(store, path.as_str(), false, syscall, raw)?;
    if path.trailing_slash() && resolved.kind == Some(FileType::Symlink) {
        resolved = resolve(store, path.as_str(), true, syscall, raw)?;
    }
    if path.trailing_slash() && resolved.found() && !resolved.is_dir() {
        return Err(reject(ErrorKind::NotADirectory, syscall, raw));
    }
    Ok(resolved)
}

/// Resolve following every symlink, the final one included.
///
/// With a trailing slash the target must be a directory.
pub(crate) fn locate_target(
    store: &EntryStore,
    path: &NormalizedPath,
    syscall: &'static str,
    raw: &str,
) -> Result<Resolved, FsError> {
    let resolved = resolve(store, path.as_str(), true, syscall, raw)?;
    if path.trailing_slash() && resolved.found() && !resolved.is_dir() {
        return Err(reject(ErrorKind::NotADirectory, syscall, raw));
    }
    Ok(resolved)
}

pub(crate) fn put_blob(
    blobs: &dyn BlobStore,
    data: &[u8],
    syscall: &'static str,
    raw: &str,
) -> Result<BlobId, FsError> {
    blobs.put(data).map_err(|err| err.into_fs_error(syscall, raw))
}

/// Delete blobs written for a mutation that will not be committed.
pub(crate) fn discard(blobs: &dyn BlobStore, ids: &[BlobId]) {
    for id in ids {
        if let Err(err) = blobs.delete(id) {
            tracing::warn!(blob = %id, error = %err, "failed to discard uncommitted blob");
        }
    }
}

/// Apply `changes`, then release every blob the commit orphaned.
pub(crate) fn commit(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    changes: Changeset,
    syscall: &'static str,
    raw: &str,
) {
    let released = store.apply(changes);
    tracing::debug!(syscall, path = raw, released = released.len(), "committed");
    for id in &released {
        if let Err(err) = blobs.delete(id) {
            tracing::warn!(syscall, blob = %id, error = %err, "failed to release blob");
        }
    }
}

/// Stage removal of `path` and, for a directory, every descendant.
///
/// Descendants are removed deepest-first.
pub(crate) fn remove_tree(store: &EntryStore, changes: &mut Changeset, path: &str, kind: FileType) {
    if kind == FileType::Directory {
        let mut doomed: Vec<&str> = store.descendants(path).map(|(p, _)| p).collect();
        doomed.reverse();
        for descendant in doomed {
            changes.remove(descendant);
        }
    }
    changes.remove(path);
}
