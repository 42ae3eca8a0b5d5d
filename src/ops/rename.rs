//! `rename`: atomic move of an entry and, for directories, its subtree.

use super::{commit, locate, normalized, pair, reject_pair, remove_tree};
use crate::blob::BlobStore;
use crate::path::{is_strict_descendant, parent, rebase};
use crate::store::{Changeset, EntryStore, resolve};
use crate::{ErrorKind, FileType, FsError};

const SYSCALL: &str = "rename";

/// Move `old` to `new`, replacing a compatible entry already at `new`.
///
/// Checks run in a fixed order: source existence, self-nesting, the
/// destination parent, same-entry no-op, then type compatibility with an
/// existing destination. The final component of either path is never
/// followed.
pub(crate) fn rename(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    old: &str,
    new: &str,
) -> Result<(), FsError> {
    let fail = |kind| reject_pair(kind, SYSCALL, old, new);

    let old_path = normalized(store, old, SYSCALL).map_err(|e| pair(e, old, new))?;
    let new_path = normalized(store, new, SYSCALL).map_err(|e| pair(e, old, new))?;

    let src = locate(store, &old_path, SYSCALL, old).map_err(|e| pair(e, old, new))?;
    let Some(kind) = src.kind else {
        return Err(fail(ErrorKind::NotFound));
    };
    if src.is_root() {
        return Err(fail(ErrorKind::Busy));
    }
    let is_dir = kind == FileType::Directory;
    if is_dir && is_strict_descendant(new_path.as_str(), old_path.as_str()) {
        return Err(fail(ErrorKind::InvalidArgument));
    }
    let lands_inside = |dir: String| dir == src.path || is_strict_descendant(&dir, &src.path);
    if is_dir && landing_dir(store, new_path.as_str()).is_some_and(lands_inside) {
        return Err(fail(ErrorKind::InvalidArgument));
    }

    let dest = locate(store, &new_path, SYSCALL, new).map_err(|e| pair(e, old, new))?;
    if is_dir && is_strict_descendant(&dest.path, &src.path) {
        return Err(fail(ErrorKind::InvalidArgument));
    }
    if dest.path == src.path {
        return Ok(());
    }
    if !is_dir && new_path.trailing_slash() {
        return Err(fail(ErrorKind::NotADirectory));
    }

    let mut changes = Changeset::new();
    if let Some(dest_kind) = dest.kind {
        let same_inode = store
            .get(&src.path)
            .zip(store.get(&dest.path))
            .is_some_and(|(a, b)| a.inode == b.inode);
        if same_inode {
            return Ok(());
        }
        match (is_dir, dest_kind == FileType::Directory) {
            (false, true) => return Err(fail(ErrorKind::IsADirectory)),
            (true, false) => return Err(fail(ErrorKind::NotADirectory)),
            (true, true) if store.has_children(&dest.path) => {
                return Err(fail(ErrorKind::NotEmpty));
            }
            _ => {}
        }
        changes.remove(dest.path.clone());
    }

    let Some(top) = store.get(&src.path).cloned() else {
        return Err(fail(ErrorKind::NotFound));
    };
    let mut moved = vec![(src.path.clone(), top)];
    moved.extend(
        store
            .descendants(&src.path)
            .map(|(path, entry)| (path.to_string(), entry.clone())),
    );
    remove_tree(store, &mut changes, &src.path, kind);
    for (path, entry) in moved {
        changes.insert(rebase(&path, &src.path, &dest.path), entry);
    }

    commit(store, blobs, changes, SYSCALL, old);
    Ok(())
}

/// Directory the parent chain of `path` lands in once symlinks are
/// followed, taken at the deepest prefix that still resolves to one.
fn landing_dir(store: &EntryStore, path: &str) -> Option<String> {
    let mut prefix = parent(path)?;
    loop {
        match resolve(store, prefix, true, SYSCALL, prefix) {
            Ok(found) if found.is_dir() => return Some(found.path),
            _ => prefix = parent(prefix)?,
        }
    }
}
