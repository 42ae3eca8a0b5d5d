//! Batched mutations of an [`EntryStore`].
//!
//! Handlers validate every precondition against the current store, record
//! the resulting mutations in a [`Changeset`], and hand it to
//! [`EntryStore::apply`]. Applying cannot fail, so a caller either sees the
//! whole batch or none of it.

use std::collections::{BTreeSet, HashSet};
use std::time::SystemTime;

use super::{DirectoryEntry, EntryStore, Inode};
use crate::blob::BlobId;
use crate::path::parent;
use crate::{InodeId, Permissions};

/// Change to an existing inode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InodeUpdate {
    /// Point the inode at new content; the previous blob is released.
    Content { blob: BlobId, size: u64 },
    /// Replace the permission bits.
    Mode(Permissions),
}

/// Mutations committed together by [`EntryStore::apply`].
///
/// Removals are applied before insertions, so moving an entry is a remove
/// of the old path plus an insert of the new one.
#[derive(Debug, Default)]
pub(crate) struct Changeset {
    created: Vec<(InodeId, Inode)>,
    removed: Vec<String>,
    inserted: Vec<(String, DirectoryEntry)>,
    updated: Vec<(InodeId, InodeUpdate)>,
}

impl Changeset {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an inode built by [`EntryStore::new_inode`].
    pub(crate) fn create_inode(&mut self, id: InodeId, inode: Inode) -> &mut Self {
        self.created.push((id, inode));
        self
    }

    pub(crate) fn remove(&mut self, path: impl Into<String>) -> &mut Self {
        self.removed.push(path.into());
        self
    }

    pub(crate) fn insert(&mut self, path: impl Into<String>, entry: DirectoryEntry) -> &mut Self {
        self.inserted.push((path.into(), entry));
        self
    }

    pub(crate) fn update(&mut self, id: InodeId, update: InodeUpdate) -> &mut Self {
        self.updated.push((id, update));
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.removed.is_empty()
            && self.inserted.is_empty()
            && self.updated.is_empty()
    }
}

impl EntryStore {
    /// Commit `changes` and return the blobs no inode references anymore.
    ///
    /// Every removed entry drops its inode's `nlink` by one and every
    /// inserted entry raises it by one. Inodes left at zero are dropped and
    /// their blobs returned to the caller for release. Directories that gain
    /// or lose a child get fresh `mtime`/`ctime`.
    pub(crate) fn apply(&mut self, changes: Changeset) -> Vec<BlobId> {
        let Changeset {
            created,
            removed,
            inserted,
            updated,
        } = changes;

        let now = SystemTime::now();
        let mut released = Vec::new();
        let mut touched: HashSet<InodeId> = HashSet::new();
        let mut changed_paths: BTreeSet<String> = BTreeSet::new();

        for (id, inode) in created {
            touched.insert(id);
            self.inodes.insert(id, inode);
        }

        for path in removed {
            if let Some(entry) = self.entries.remove(&path) {
                if let Some(inode) = self.inodes.get_mut(&entry.inode) {
                    inode.nlink = inode.nlink.saturating_sub(1);
                    inode.ctime = now;
                }
                touched.insert(entry.inode);
            }
            changed_paths.insert(path);
        }

        for (path, entry) in inserted {
            if let Some(inode) = self.inodes.get_mut(&entry.inode) {
                inode.nlink += 1;
                inode.ctime = now;
            }
            touched.insert(entry.inode);
            if let Some(previous) = self.entries.insert(path.clone(), entry) {
                // Handlers remove before they overwrite; keep nlink honest anyway.
                if let Some(inode) = self.inodes.get_mut(&previous.inode) {
                    inode.nlink = inode.nlink.saturating_sub(1);
                }
                touched.insert(previous.inode);
            }
            changed_paths.insert(path);
        }

        for (id, update) in updated {
            let Some(inode) = self.inodes.get_mut(&id) else {
                continue;
            };
            match update {
                InodeUpdate::Content { blob, size } => {
                    if let Some(old) = inode.blob.replace(blob) {
                        released.push(old);
                    }
                    inode.size = size;
                    inode.mtime = now;
                    inode.ctime = now;
                }
                InodeUpdate::Mode(perms) => {
                    inode.perms = perms;
                    inode.ctime = now;
                }
            }
        }

        let parents: BTreeSet<&str> = changed_paths
            .iter()
            .filter_map(|path| parent(path))
            .filter(|dir| !changed_paths.contains(*dir))
            .collect();
        for dir in parents {
            let Some(entry) = self.entries.get(dir) else {
                continue;
            };
            if let Some(inode) = self.inodes.get_mut(&entry.inode) {
                inode.mtime = now;
                inode.ctime = now;
            }
        }

        for id in touched {
            let orphaned = self.inodes.get(&id).is_some_and(|inode| inode.nlink == 0);
            if orphaned {
                if let Some(blob) = self.inodes.remove(&id).and_then(|inode| inode.blob) {
                    released.push(blob);
                }
            }
        }

        released
    }
}
