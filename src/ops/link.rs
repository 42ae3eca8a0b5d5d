//! Hard links and symbolic links.

use super::{commit, locate, normalized, pair, put_blob, reject, reject_pair};
use crate::blob::BlobStore;
use crate::path::ends_with_dot_component;
use crate::store::{Changeset, DirectoryEntry, EntryStore};
use crate::{ErrorKind, FileType, FsError, Permissions};

/// Add `new` as another name for the inode behind `existing`.
///
/// A symlink is linked as itself, never through its target.
pub(crate) fn link(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    existing: &str,
    new: &str,
) -> Result<(), FsError> {
    const SYSCALL: &str = "link";

    let src_path = normalized(store, existing, SYSCALL).map_err(|e| pair(e, existing, new))?;
    let dest_path = normalized(store, new, SYSCALL).map_err(|e| pair(e, existing, new))?;

    let src = locate(store, &src_path, SYSCALL, existing).map_err(|e| pair(e, existing, new))?;
    let Some(kind) = src.kind else {
        return Err(reject_pair(ErrorKind::NotFound, SYSCALL, existing, new));
    };
    if kind == FileType::Directory || ends_with_dot_component(existing) {
        return Err(reject_pair(ErrorKind::NotPermitted, SYSCALL, existing, new));
    }

    let dest = locate(store, &dest_path, SYSCALL, new).map_err(|e| pair(e, existing, new))?;
    if dest.found() {
        return Err(reject_pair(ErrorKind::AlreadyExists, SYSCALL, existing, new));
    }
    if dest_path.trailing_slash() {
        return Err(reject_pair(ErrorKind::NotFound, SYSCALL, existing, new));
    }

    let Some(entry) = store.get(&src.path).cloned() else {
        return Err(reject_pair(ErrorKind::NotFound, SYSCALL, existing, new));
    };
    let mut changes = Changeset::new();
    changes.insert(dest.path, entry);
    commit(store, blobs, changes, SYSCALL, existing);
    Ok(())
}

/// Create a symlink at `raw` whose target is stored verbatim.
pub(crate) fn symlink(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    target: &str,
    raw: &str,
) -> Result<(), FsError> {
    const SYSCALL: &str = "symlink";

    if target.is_empty() {
        return Err(reject_pair(ErrorKind::NotFound, SYSCALL, target, raw));
    }
    if target.contains('\0') {
        return Err(reject_pair(ErrorKind::InvalidArgument, SYSCALL, target, raw));
    }

    let path = normalized(store, raw, SYSCALL).map_err(|e| pair(e, target, raw))?;
    let slot = locate(store, &path, SYSCALL, raw).map_err(|e| pair(e, target, raw))?;
    if slot.found() {
        return Err(reject_pair(ErrorKind::AlreadyExists, SYSCALL, target, raw));
    }
    if path.trailing_slash() {
        return Err(reject_pair(ErrorKind::NotFound, SYSCALL, target, raw));
    }

    let blob = put_blob(blobs, &[], SYSCALL, raw)?;
    let (id, inode) = store.new_inode(Permissions::from_mode(0o777), blob, target.len() as u64);
    let mut changes = Changeset::new();
    changes
        .create_inode(id, inode)
        .insert(slot.path, DirectoryEntry::symlink(id, target));
    commit(store, blobs, changes, SYSCALL, raw);
    Ok(())
}

/// The raw target of the symlink at `raw`.
pub(crate) fn readlink(store: &EntryStore, raw: &str) -> Result<String, FsError> {
    const SYSCALL: &str = "readlink";

    let path = normalized(store, raw, SYSCALL)?;
    let found = locate(store, &path, SYSCALL, raw)?;
    if !found.found() {
        return Err(reject(ErrorKind::NotFound, SYSCALL, raw));
    }
    store
        .get(&found.path)
        .and_then(|entry| entry.target.clone())
        .ok_or_else(|| reject(ErrorKind::InvalidArgument, SYSCALL, raw))
}
