//! `mkdir`, plain and recursive.

use super::{commit, discard, locate, normalized, put_blob, reject};
use crate::blob::{BlobId, BlobStore};
use crate::options::check_mode;
use crate::path::{ROOT, components, join};
use crate::store::{Changeset, DirectoryEntry, EntryStore, resolve};
use crate::{ErrorKind, FileType, FsError, MkdirOptions, Permissions};

const SYSCALL: &str = "mkdir";

/// Create a directory.
///
/// Returns the first directory created in recursive mode, `None` otherwise
/// or when nothing needed creating.
pub(crate) fn mkdir(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    raw: &str,
    opts: MkdirOptions,
) -> Result<Option<String>, FsError> {
    check_mode(opts.mode, SYSCALL, raw)?;
    let path = normalized(store, raw, SYSCALL)?;
    let perms = Permissions::from_mode(opts.mode).masked(store.config().umask);

    if !opts.recursive {
        if path.is_root() {
            return Err(reject(ErrorKind::AlreadyExists, SYSCALL, raw));
        }
        let target = locate(store, &path, SYSCALL, raw)?;
        if target.found() {
            return Err(reject(ErrorKind::AlreadyExists, SYSCALL, raw));
        }
        create_chain(store, blobs, &target.path, &[], perms, raw)?;
        return Ok(None);
    }

    let parts: Vec<&str> = components(path.as_str()).collect();
    let mut base = ROOT.to_string();
    let mut existing = 0;
    while existing < parts.len() {
        let is_last = existing + 1 == parts.len();
        let candidate = join(&base, parts[existing]);
        let Some(entry) = store.get(&candidate) else {
            break;
        };
        let blocked = if is_last {
            ErrorKind::AlreadyExists
        } else {
            ErrorKind::NotADirectory
        };
        match entry.kind {
            FileType::Directory => base = candidate,
            FileType::File => return Err(reject(blocked, SYSCALL, raw)),
            FileType::Symlink => {
                let target = resolve(store, &candidate, true, SYSCALL, raw)?;
                match target.kind {
                    Some(FileType::Directory) => base = target.path,
                    Some(_) => return Err(reject(blocked, SYSCALL, raw)),
                    // A dangling link occupies the name but leads nowhere.
                    None if is_last => return Err(reject(ErrorKind::AlreadyExists, SYSCALL, raw)),
                    None => return Err(reject(ErrorKind::NotFound, SYSCALL, raw)),
                }
            }
        }
        existing += 1;
    }

    if existing == parts.len() {
        return Ok(None);
    }

    let first = join(&base, parts[existing]);
    create_chain(store, blobs, &first, &parts[existing + 1..], perms, raw)?;
    Ok(Some(first))
}

/// Create `first` and then each of `rest` nested below it, in one commit.
fn create_chain(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    first: &str,
    rest: &[&str],
    perms: Permissions,
    raw: &str,
) -> Result<(), FsError> {
    let mut written: Vec<BlobId> = Vec::with_capacity(rest.len() + 1);
    let mut changes = Changeset::new();
    let mut current = first.to_string();

    for depth in 0..=rest.len() {
        if depth > 0 {
            current = join(&current, rest[depth - 1]);
        }
        let blob = match put_blob(blobs, &[], SYSCALL, raw) {
            Ok(blob) => blob,
            Err(err) => {
                discard(blobs, &written);
                return Err(err);
            }
        };
        written.push(blob.clone());
        let (id, inode) = store.new_inode(perms, blob, 0);
        changes
            .create_inode(id, inode)
            .insert(current.clone(), DirectoryEntry::new(FileType::Directory, id));
    }

    commit(store, blobs, changes, SYSCALL, raw);
    Ok(())
}
