//! Symlink-aware path resolution over an [`EntryStore`].

use super::EntryStore;
use crate::path::{ROOT, collapse, components, join};
use crate::{ErrorKind, FileType, FsError};

/// Outcome of [`resolve`]: the real path an operation acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved {
    /// Canonical path with every followed symlink substituted.
    pub(crate) path: String,
    /// Type of the entry at `path`, or `None` if only the final component
    /// is missing.
    pub(crate) kind: Option<FileType>,
}

impl Resolved {
    pub(crate) fn found(&self) -> bool {
        self.kind.is_some()
    }

    pub(crate) fn is_dir(&self) -> bool {
        self.kind == Some(FileType::Directory)
    }

    pub(crate) fn is_root(&self) -> bool {
        self.path == ROOT
    }
}

/// Walk the canonical `path` component by component.
///
/// Intermediate symlinks are always followed; the final one only when
/// `follow_final` is set. A relative target is joined with the directory
/// holding the link, collapsed lexically, and the walk restarts on the
/// result. Errors carry `syscall` and the caller's `raw` path.
///
/// # Errors
///
/// - [`ErrorKind::NotFound`] if an intermediate component is missing
/// - [`ErrorKind::NotADirectory`] if an intermediate component is a file
/// - [`ErrorKind::TooManySymlinks`] after `max_symlink_depth` hops
pub(crate) fn resolve(
    store: &EntryStore,
    path: &str,
    follow_final: bool,
    syscall: &'static str,
    raw: &str,
) -> Result<Resolved, FsError> {
    let max_depth = store.config().max_symlink_depth;
    let mut hops = 0usize;
    let mut current = path.to_string();

    'walk: loop {
        let parts: Vec<String> = components(&current).map(str::to_owned).collect();
        let mut resolved = ROOT.to_string();

        for (i, name) in parts.iter().enumerate() {
            let is_last = i + 1 == parts.len();
            let candidate = join(&resolved, name);

            let Some(entry) = store.get(&candidate) else {
                if is_last {
                    return Ok(Resolved {
                        path: candidate,
                        kind: None,
                    });
                }
                return Err(FsError::new(ErrorKind::NotFound, syscall, raw));
            };

            match (entry.kind, entry.target.as_deref()) {
                (FileType::Directory, _) => resolved = candidate,
                (FileType::Symlink, Some(target)) if follow_final || !is_last => {
                    hops += 1;
                    if hops > max_depth {
                        return Err(FsError::new(ErrorKind::TooManySymlinks, syscall, raw));
                    }

                    let mut next = if target.starts_with('/') {
                        target.to_string()
                    } else {
                        join(&resolved, target)
                    };
                    for rest in &parts[i + 1..] {
                        next.push('/');
                        next.push_str(rest);
                    }
                    current = collapse(&next);
                    continue 'walk;
                }
                (kind, _) if is_last => {
                    return Ok(Resolved {
                        path: candidate,
                        kind: Some(kind),
                    });
                }
                _ => return Err(FsError::new(ErrorKind::NotADirectory, syscall, raw)),
            }
        }

        return Ok(Resolved {
            path: resolved,
            kind: Some(FileType::Directory),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsConfig;
    use crate::blob::BlobId;
    use crate::store::tests::store_with;
    use crate::store::{Changeset, DirectoryEntry};

    fn add_link(store: &mut EntryStore, path: &str, target: &str) {
        let (id, inode) =
            store.new_inode(crate::Permissions::from_mode(0o777), BlobId::new(path), 0);
        let mut changes = Changeset::new();
        changes.create_inode(id, inode);
        changes.insert(path, DirectoryEntry::symlink(id, target));
        store.apply(changes);
    }

    fn fixture() -> EntryStore {
        let mut store = store_with(&[
            ("/d", FileType::Directory),
            ("/d/f", FileType::File),
            ("/file", FileType::File),
        ]);
        add_link(&mut store, "/abs", "/d");
        add_link(&mut store, "/d/rel", "../file");
        add_link(&mut store, "/dangling", "/nowhere");
        add_link(&mut store, "/loop1", "/loop2");
        add_link(&mut store, "/loop2", "/loop1");
        store
    }

    #[test]
    fn root_resolves_to_itself() {
        let store = fixture();
        let r = resolve(&store, "/", true, "stat", "/").unwrap();
        assert!(r.is_root() && r.is_dir());
    }

    #[test]
    fn intermediate_symlinks_are_followed() {
        let store = fixture();
        let r = resolve(&store, "/abs/f", false, "stat", "/abs/f").unwrap();
        assert_eq!(r.path, "/d/f");
        assert_eq!(r.kind, Some(FileType::File));
    }

    #[test]
    fn final_symlink_follow_is_optional() {
        let store = fixture();
        let kept = resolve(&store, "/abs", false, "lstat", "/abs").unwrap();
        assert_eq!(kept.path, "/abs");
        assert_eq!(kept.kind, Some(FileType::Symlink));

        let followed = resolve(&store, "/abs", true, "stat", "/abs").unwrap();
        assert_eq!(followed.path, "/d");
        assert!(followed.is_dir());
    }

    #[test]
    fn relative_targets_use_link_directory() {
        let store = fixture();
        let r = resolve(&store, "/d/rel", true, "stat", "/d/rel").unwrap();
        assert_eq!(r.path, "/file");
    }

    #[test]
    fn dangling_link_reports_missing_target() {
        let store = fixture();
        let r = resolve(&store, "/dangling", true, "stat", "/dangling").unwrap();
        assert_eq!(r.path, "/nowhere");
        assert!(!r.found());
    }

    #[test]
    fn missing_intermediate_is_not_found() {
        let store = fixture();
        let err = resolve(&store, "/nope/x", false, "open", "/nope/x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), "/nope/x");
    }

    #[test]
    fn file_intermediate_is_not_a_directory() {
        let store = fixture();
        let err = resolve(&store, "/file/x", false, "open", "/file/x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
    }

    #[test]
    fn loops_hit_depth_limit() {
        let store = fixture();
        let err = resolve(&store, "/loop1", true, "stat", "/loop1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManySymlinks);

        // Not following the final component never loops.
        assert!(resolve(&store, "/loop1", false, "lstat", "/loop1").is_ok());
    }

    #[test]
    fn depth_limit_is_configurable() {
        let config = FsConfig {
            max_symlink_depth: 0,
            ..FsConfig::default()
        };
        let mut store = EntryStore::new(config);
        add_link(&mut store, "/l", "/");
        let err = resolve(&store, "/l", true, "stat", "/l").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManySymlinks);
    }
}
