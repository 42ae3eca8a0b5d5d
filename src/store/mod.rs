//! # Entry Store
//!
//! The authoritative state of one filesystem tree.
//!
//! ## Responsibility
//! - Map every canonical path to exactly one [`DirectoryEntry`]
//! - Keep the inode table that hard-linked entries share
//! - Answer point lookups and prefix scans (children, descendants)
//! - Apply a [`Changeset`] as a single, all-or-nothing commit
//!
//! Entries are kept in a `BTreeMap` keyed by canonical path, so every strict
//! descendant of `/dir` is found by a range scan starting at `/dir/`.

mod changeset;
mod resolve;

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

pub(crate) use changeset::{Changeset, InodeUpdate};
pub(crate) use resolve::{Resolved, resolve};

use crate::blob::BlobId;
use crate::path::{ROOT, child_prefix};
use crate::{BLOCK_SIZE, FileType, FsConfig, InodeId, Permissions, ROOT_INODE, Stats};

static NEXT_DEV: AtomicU64 = AtomicU64::new(1);

/// One path entry. Hard links are distinct entries sharing an inode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirectoryEntry {
    pub(crate) kind: FileType,
    pub(crate) inode: InodeId,
    /// Raw symlink target, stored verbatim.
    pub(crate) target: Option<String>,
}

impl DirectoryEntry {
    pub(crate) fn new(kind: FileType, inode: InodeId) -> Self {
        Self {
            kind,
            inode,
            target: None,
        }
    }

    pub(crate) fn symlink(inode: InodeId, target: impl Into<String>) -> Self {
        Self {
            kind: FileType::Symlink,
            inode,
            target: Some(target.into()),
        }
    }
}

/// Content and metadata shared by every entry that links to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Inode {
    pub(crate) nlink: u64,
    /// `None` only for the root directory, which is never released.
    pub(crate) blob: Option<BlobId>,
    pub(crate) perms: Permissions,
    pub(crate) uid: u32,
    pub(crate) gid: u32,
    pub(crate) size: u64,
    pub(crate) atime: SystemTime,
    pub(crate) mtime: SystemTime,
    pub(crate) ctime: SystemTime,
    pub(crate) birthtime: SystemTime,
}

/// Path → entry map plus inode table.
#[derive(Debug)]
pub(crate) struct EntryStore {
    entries: BTreeMap<String, DirectoryEntry>,
    inodes: HashMap<InodeId, Inode>,
    next_inode: u64,
    dev: u64,
    config: FsConfig,
}

impl EntryStore {
    /// Create a tree holding only the root directory.
    pub(crate) fn new(config: FsConfig) -> Self {
        let now = SystemTime::now();
        let root = Inode {
            nlink: 1,
            blob: None,
            perms: Permissions::from_mode(0o777).masked(config.umask),
            uid: config.identity.uid,
            gid: config.identity.gid,
            size: 0,
            atime: now,
            mtime: now,
            ctime: now,
            birthtime: now,
        };

        let mut entries = BTreeMap::new();
        entries.insert(
            ROOT.to_string(),
            DirectoryEntry::new(FileType::Directory, ROOT_INODE),
        );
        let mut inodes = HashMap::new();
        inodes.insert(ROOT_INODE, root);

        Self {
            entries,
            inodes,
            next_inode: ROOT_INODE.0 + 1,
            dev: NEXT_DEV.fetch_add(1, Ordering::Relaxed),
            config,
        }
    }

    pub(crate) fn config(&self) -> &FsConfig {
        &self.config
    }

    pub(crate) fn get(&self, path: &str) -> Option<&DirectoryEntry> {
        self.entries.get(path)
    }

    pub(crate) fn inode(&self, id: InodeId) -> Option<&Inode> {
        self.inodes.get(&id)
    }

    /// The inode behind the entry at `path`.
    pub(crate) fn inode_at(&self, path: &str) -> Option<&Inode> {
        self.get(path).and_then(|entry| self.inode(entry.inode))
    }

    /// Number of path entries.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Build a fresh inode owned by the configured identity.
    ///
    /// The inode starts with `nlink == 0`; inserting an entry for it in a
    /// [`Changeset`] brings it to life.
    pub(crate) fn new_inode(
        &mut self,
        perms: Permissions,
        blob: BlobId,
        size: u64,
    ) -> (InodeId, Inode) {
        let id = InodeId(self.next_inode);
        self.next_inode += 1;
        let now = SystemTime::now();
        let inode = Inode {
            nlink: 0,
            blob: Some(blob),
            perms,
            uid: self.config.identity.uid,
            gid: self.config.identity.gid,
            size,
            atime: now,
            mtime: now,
            ctime: now,
            birthtime: now,
        };
        (id, inode)
    }

    /// Every strict descendant of `dir`, in path order.
    pub(crate) fn descendants<'a>(
        &'a self,
        dir: &str,
    ) -> impl Iterator<Item = (&'a str, &'a DirectoryEntry)> + use<'a> {
        let prefix = child_prefix(dir);
        self.entries
            .range::<String, _>((Bound::Included(prefix.clone()), Bound::Unbounded))
            .take_while(move |(path, _)| path.starts_with(prefix.as_str()))
            .filter(|(path, _)| path.as_str() != ROOT)
            .map(|(path, entry)| (path.as_str(), entry))
    }

    /// Immediate children of `dir` as `(name, entry)`, sorted by name.
    pub(crate) fn children<'a>(
        &'a self,
        dir: &str,
    ) -> impl Iterator<Item = (&'a str, &'a DirectoryEntry)> + use<'a> {
        let skip = child_prefix(dir).len();
        self.descendants(dir)
            .map(move |(path, entry)| (&path[skip..], entry))
            .filter(|(name, _)| !name.contains('/'))
    }

    pub(crate) fn has_children(&self, dir: &str) -> bool {
        self.descendants(dir).next().is_some()
    }

    /// `stat` view of the entry at `path`, without following it.
    pub(crate) fn stats(&self, path: &str) -> Option<Stats> {
        let entry = self.get(path)?;
        let inode = self.inode(entry.inode)?;
        Some(Stats {
            dev: self.dev,
            ino: entry.inode.0,
            mode: entry.kind.type_bits() | inode.perms.mode(),
            nlink: inode.nlink,
            uid: inode.uid,
            gid: inode.gid,
            size: inode.size,
            blksize: BLOCK_SIZE,
            blocks: inode.size.div_ceil(512),
            atime: inode.atime,
            mtime: inode.mtime,
            ctime: inode.ctime,
            birthtime: inode.birthtime,
        })
    }
}
