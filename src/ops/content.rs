//! File content: `copy_file`, `append_file`, `write_file` and `read_file`.
//!
//! All four follow symlinks on every component. Writing to a missing path
//! creates a regular file there, including when the path is a dangling
//! symlink whose target's parent exists.

use super::{commit, discard, locate_target, normalized, pair, put_blob, reject, reject_pair};
use crate::blob::{BlobId, BlobStore};
use crate::options::check_mode;
use crate::path::NormalizedPath;
use crate::store::{Changeset, DirectoryEntry, EntryStore, InodeUpdate, Resolved};
use crate::{
    AppendOptions, CopyFlags, ErrorKind, FileContents, FileData, FileType, FsError, Permissions,
    ReadOptions, WriteOptions,
};

/// Resolve a path that will receive content.
///
/// Directories are `EISDIR`; so is a missing path with a trailing slash,
/// since a regular file cannot be created there.
fn writable_target(
    store: &EntryStore,
    path: &NormalizedPath,
    syscall: &'static str,
    raw: &str,
) -> Result<Resolved, FsError> {
    let target = locate_target(store, path, syscall, raw)?;
    if target.is_dir() || (!target.found() && path.trailing_slash()) {
        return Err(reject(ErrorKind::IsADirectory, syscall, raw));
    }
    Ok(target)
}

/// Stage a brand-new regular file at `path` holding `blob`.
fn create_file(
    store: &mut EntryStore,
    changes: &mut Changeset,
    path: String,
    perms: Permissions,
    blob: BlobId,
    size: u64,
) {
    let (id, inode) = store.new_inode(perms, blob, size);
    changes
        .create_inode(id, inode)
        .insert(path, DirectoryEntry::new(FileType::File, id));
}

/// Copy the bytes of `src` into a new file at `dest`.
///
/// The copy gets a fresh inode with the source's mode and a new creation
/// time; an existing destination file is replaced. Clone flags are
/// accepted as hints and always produce a full copy.
pub(crate) fn copy_file(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    src: &str,
    dest: &str,
    flags: CopyFlags,
) -> Result<(), FsError> {
    const SYSCALL: &str = "copyfile";

    let src_path = normalized(store, src, SYSCALL).map_err(|e| pair(e, src, dest))?;
    let dest_path = normalized(store, dest, SYSCALL).map_err(|e| pair(e, src, dest))?;

    let source = locate_target(store, &src_path, SYSCALL, src).map_err(|e| pair(e, src, dest))?;
    match source.kind {
        None => return Err(reject_pair(ErrorKind::NotFound, SYSCALL, src, dest)),
        Some(FileType::Directory) => {
            return Err(reject_pair(ErrorKind::IsADirectory, SYSCALL, src, dest));
        }
        Some(_) => {}
    }
    let target =
        writable_target(store, &dest_path, SYSCALL, dest).map_err(|e| pair(e, src, dest))?;
    if target.found() && flags.exclusive {
        return Err(reject_pair(ErrorKind::AlreadyExists, SYSCALL, src, dest));
    }

    let (Some(src_entry), Some(src_inode)) = (store.get(&source.path), store.inode_at(&source.path))
    else {
        return Err(reject_pair(ErrorKind::NotFound, SYSCALL, src, dest));
    };
    if store
        .get(&target.path)
        .is_some_and(|existing| existing.inode == src_entry.inode)
    {
        tracing::trace!(src, dest, "copy onto itself");
        return Ok(());
    }
    let perms = src_inode.perms;
    let size = src_inode.size;
    let Some(src_blob) = src_inode.blob.clone() else {
        return Err(reject_pair(ErrorKind::IsADirectory, SYSCALL, src, dest));
    };

    if flags.wants_clone() {
        tracing::trace!(src, dest, force = flags.clone_force, "clone unavailable, copying");
    }
    let blob = blobs
        .duplicate(&src_blob)
        .map_err(|err| pair(err.into_fs_error(SYSCALL, src), src, dest))?;

    let mut changes = Changeset::new();
    if target.found() {
        changes.remove(target.path.clone());
    }
    create_file(store, &mut changes, target.path, perms, blob, size);
    commit(store, blobs, changes, SYSCALL, src);
    Ok(())
}

/// Append to a file, creating it when missing.
pub(crate) fn append_file(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    raw: &str,
    data: FileData<'_>,
    opts: AppendOptions,
) -> Result<(), FsError> {
    const SYSCALL: &str = "open";

    check_mode(opts.mode, SYSCALL, raw)?;
    let bytes = data.to_bytes(opts.encoding, SYSCALL, raw)?;
    let path = normalized(store, raw, SYSCALL)?;
    let target = writable_target(store, &path, SYSCALL, raw)?;

    let mut changes = Changeset::new();
    if target.found() {
        if bytes.is_empty() {
            return Ok(());
        }
        let Some(entry) = store.get(&target.path) else {
            return Err(reject(ErrorKind::NotFound, SYSCALL, raw));
        };
        let id = entry.inode;
        let Some(inode) = store.inode(id) else {
            return Err(reject(ErrorKind::NotFound, SYSCALL, raw));
        };
        let size = inode.size + bytes.len() as u64;
        let blob = match &inode.blob {
            Some(current) => blobs.concat(current, &bytes),
            None => blobs.put(&bytes),
        }
        .map_err(|err| err.into_fs_error(SYSCALL, raw))?;
        changes.update(id, InodeUpdate::Content { blob, size });
    } else {
        let perms = Permissions::from_mode(opts.mode).masked(store.config().umask);
        let blob = put_blob(blobs, &bytes, SYSCALL, raw)?;
        create_file(store, &mut changes, target.path, perms, blob, bytes.len() as u64);
    }

    commit(store, blobs, changes, SYSCALL, raw);
    Ok(())
}

/// Replace a file's content, creating the file when missing.
///
/// An existing file keeps its inode, so every hard link sees the new bytes.
pub(crate) fn write_file(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    raw: &str,
    data: FileData<'_>,
    opts: WriteOptions,
) -> Result<(), FsError> {
    const SYSCALL: &str = "open";

    check_mode(opts.mode, SYSCALL, raw)?;
    let bytes = data.to_bytes(opts.encoding, SYSCALL, raw)?;
    let path = normalized(store, raw, SYSCALL)?;
    let target = writable_target(store, &path, SYSCALL, raw)?;
    if target.found() && opts.exclusive {
        return Err(reject(ErrorKind::AlreadyExists, SYSCALL, raw));
    }

    let existing = store.get(&target.path).map(|entry| entry.inode);
    let blob = put_blob(blobs, &bytes, SYSCALL, raw)?;
    let size = bytes.len() as u64;

    let mut changes = Changeset::new();
    match existing {
        Some(id) if store.inode(id).is_some() => {
            changes.update(id, InodeUpdate::Content { blob, size });
        }
        Some(_) => {
            discard(blobs, &[blob]);
            return Err(reject(ErrorKind::NotFound, SYSCALL, raw));
        }
        None => {
            let perms = Permissions::from_mode(opts.mode).masked(store.config().umask);
            create_file(store, &mut changes, target.path, perms, blob, size);
        }
    }

    commit(store, blobs, changes, SYSCALL, raw);
    Ok(())
}

/// Read a whole file as bytes or as text in the requested encoding.
pub(crate) fn read_file(
    store: &EntryStore,
    blobs: &dyn BlobStore,
    raw: &str,
    opts: ReadOptions,
) -> Result<FileContents, FsError> {
    const SYSCALL: &str = "open";

    let path = normalized(store, raw, SYSCALL)?;
    let target = locate_target(store, &path, SYSCALL, raw)?;
    match target.kind {
        None => return Err(reject(ErrorKind::NotFound, SYSCALL, raw)),
        Some(FileType::Directory) => return Err(reject(ErrorKind::IsADirectory, SYSCALL, raw)),
        Some(_) => {}
    }

    let bytes = match store.inode_at(&target.path).and_then(|inode| inode.blob.as_ref()) {
        Some(blob) => blobs
            .get(blob)
            .map_err(|err| err.into_fs_error(SYSCALL, raw))?,
        None => Vec::new(),
    };
    Ok(match opts.encoding {
        None => FileContents::Bytes(bytes),
        Some(encoding) => FileContents::Text(encoding.encode(&bytes)),
    })
}
