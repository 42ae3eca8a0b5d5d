//! `rmdir`, `rm` and `unlink`.

use super::{commit, locate, normalized, reject, remove_tree};
use crate::blob::BlobStore;
use crate::store::{Changeset, EntryStore};
use crate::{ErrorKind, FileType, FsError, RmOptions, RmdirOptions};

/// Remove a directory, and with `recursive` everything below it.
pub(crate) fn rmdir(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    raw: &str,
    opts: RmdirOptions,
) -> Result<(), FsError> {
    const SYSCALL: &str = "rmdir";

    let path = normalized(store, raw, SYSCALL)?;
    let target = locate(store, &path, SYSCALL, raw)?;
    match target.kind {
        None => return Err(reject(ErrorKind::NotFound, SYSCALL, raw)),
        Some(FileType::Directory) => {}
        Some(_) => return Err(reject(ErrorKind::NotADirectory, SYSCALL, raw)),
    }
    if target.is_root() {
        return Err(reject(ErrorKind::Busy, SYSCALL, raw));
    }
    if !opts.recursive && store.has_children(&target.path) {
        return Err(reject(ErrorKind::NotEmpty, SYSCALL, raw));
    }

    let mut changes = Changeset::new();
    remove_tree(store, &mut changes, &target.path, FileType::Directory);
    commit(store, blobs, changes, SYSCALL, raw);
    Ok(())
}

/// Remove any entry. Directories need `recursive`; `force` ignores
/// missing paths.
pub(crate) fn rm(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    raw: &str,
    opts: RmOptions,
) -> Result<(), FsError> {
    const SYSCALL: &str = "rm";

    let path = normalized(store, raw, SYSCALL)?;
    let target = match locate(store, &path, SYSCALL, raw) {
        Err(err) if opts.force && err.is_not_found() => return Ok(()),
        other => other?,
    };
    let Some(kind) = target.kind else {
        if opts.force {
            return Ok(());
        }
        return Err(reject(ErrorKind::NotFound, SYSCALL, raw));
    };

    if target.is_root() {
        return Err(reject(ErrorKind::Busy, SYSCALL, raw));
    }
    if kind == FileType::Directory && !opts.recursive {
        let refusal = if store.has_children(&target.path) {
            ErrorKind::NotEmpty
        } else {
            ErrorKind::IsADirectory
        };
        return Err(reject(refusal, SYSCALL, raw));
    }

    let mut changes = Changeset::new();
    remove_tree(store, &mut changes, &target.path, kind);
    commit(store, blobs, changes, SYSCALL, raw);
    Ok(())
}

/// Remove a file or symlink entry. Symlinks are never followed.
pub(crate) fn unlink(store: &mut EntryStore, blobs: &dyn BlobStore, raw: &str) -> Result<(), FsError> {
    const SYSCALL: &str = "unlink";

    let path = normalized(store, raw, SYSCALL)?;
    let target = locate(store, &path, SYSCALL, raw)?;
    match target.kind {
        None => Err(reject(ErrorKind::NotFound, SYSCALL, raw)),
        Some(FileType::Directory) => Err(reject(ErrorKind::IsADirectory, SYSCALL, raw)),
        Some(_) => {
            let mut changes = Changeset::new();
            changes.remove(target.path);
            commit(store, blobs, changes, SYSCALL, raw);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testing::Fixture;
    use crate::ops::{lstat, stat};

    fn recursive() -> RmdirOptions {
        RmdirOptions { recursive: true }
    }

    #[test]
    fn rmdir_removes_empty_directory() {
        let mut fx = Fixture::new();
        fx.dir("/a");
        rmdir(&mut fx.store, &fx.blobs, "/a", RmdirOptions::default()).unwrap();
        assert!(!fx.exists("/a"));
        assert_eq!(fx.blobs.live_count(), 0);
    }

    #[test]
    fn rmdir_error_kinds() {
        let mut fx = Fixture::new();
        fx.dir("/d").file("/d/f", "x").symlink("/d", "/link");

        let cases = [
            ("/missing", ErrorKind::NotFound),
            ("/d/f", ErrorKind::NotADirectory),
            ("/link", ErrorKind::NotADirectory),
            ("/d", ErrorKind::NotEmpty),
            ("/", ErrorKind::Busy),
        ];
        for (path, kind) in cases {
            let err = rmdir(&mut fx.store, &fx.blobs, path, RmdirOptions::default()).unwrap_err();
            assert_eq!(err.kind(), kind, "{path}");
            assert_eq!(err.syscall(), "rmdir");
        }
        assert!(fx.exists("/d/f"));
    }

    #[test]
    fn rmdir_with_trailing_slash_removes_link_target() {
        let mut fx = Fixture::new();
        fx.dir("/real").symlink("/real", "/alias");
        rmdir(&mut fx.store, &fx.blobs, "/alias/", RmdirOptions::default()).unwrap();
        assert!(!fx.exists("/real"));
        assert!(fx.exists("/alias"));
        assert!(stat(&fx.store, "/alias").unwrap_err().is_not_found());
    }

    #[test]
    fn rmdir_recursive_removes_subtree() {
        let mut fx = Fixture::new();
        fx.dir("/d/e").file("/d/e/f", "x").file("/d/g", "y").file("/dd", "z");
        rmdir(&mut fx.store, &fx.blobs, "/d", recursive()).unwrap();
        for path in ["/d", "/d/e", "/d/e/f", "/d/g"] {
            assert!(!fx.exists(path), "{path}");
        }
        assert!(fx.exists("/dd"));
    }

    #[test]
    fn rm_recursive_releases_every_blob() {
        let mut fx = Fixture::new();
        fx.dir("/d");
        for i in 0..4 {
            fx.file(&format!("/d/f{i}"), "data");
        }
        let released = fx.blobs.released_count();
        let opts = RmOptions {
            recursive: true,
            force: false,
        };
        rm(&mut fx.store, &fx.blobs, "/d", opts).unwrap();
        assert_eq!(fx.blobs.released_count() - released, 5);
        assert_eq!(fx.store.len(), 1);
    }

    #[test]
    fn rm_force_ignores_missing() {
        let mut fx = Fixture::new();
        let force = RmOptions {
            force: true,
            recursive: false,
        };
        rm(&mut fx.store, &fx.blobs, "/missing", force).unwrap();
        rm(&mut fx.store, &fx.blobs, "/missing/deeper", force).unwrap();

        let err = rm(&mut fx.store, &fx.blobs, "/missing", RmOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn rm_directory_needs_recursive() {
        let mut fx = Fixture::new();
        fx.dir("/empty").dir("/full").file("/full/f", "x");

        let err = rm(&mut fx.store, &fx.blobs, "/full", RmOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEmpty);
        let err = rm(&mut fx.store, &fx.blobs, "/empty", RmOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IsADirectory);
        assert!(fx.exists("/empty"));
    }

    #[test]
    fn rm_root_is_busy() {
        let mut fx = Fixture::new();
        let opts = RmOptions {
            force: true,
            recursive: true,
        };
        let err = rm(&mut fx.store, &fx.blobs, "/", opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Busy);
    }

    #[test]
    fn rm_symlink_keeps_target() {
        let mut fx = Fixture::new();
        fx.dir("/d").file("/d/f", "x").symlink("/d", "/link");
        rm(&mut fx.store, &fx.blobs, "/link", RmOptions::default()).unwrap();
        assert!(!fx.exists("/link"));
        assert!(fx.exists("/d/f"));
    }

    #[test]
    fn unlink_file_and_dangling_symlink() {
        let mut fx = Fixture::new();
        fx.file("/f", "x").symlink("/nowhere", "/dangling");
        unlink(&mut fx.store, &fx.blobs, "/f").unwrap();
        unlink(&mut fx.store, &fx.blobs, "/dangling").unwrap();
        assert!(!fx.exists("/f"));
        assert!(!fx.exists("/dangling"));
        assert_eq!(fx.blobs.live_count(), 0);
    }

    #[test]
    fn unlink_error_kinds() {
        let mut fx = Fixture::new();
        fx.dir("/d").file("/f", "x");
        let cases = [
            ("/missing", ErrorKind::NotFound),
            ("/d", ErrorKind::IsADirectory),
            ("/", ErrorKind::IsADirectory),
            ("/f/", ErrorKind::NotADirectory),
        ];
        for (path, kind) in cases {
            let err = unlink(&mut fx.store, &fx.blobs, path).unwrap_err();
            assert_eq!(err.kind(), kind, "{path}");
        }
        assert!(stat(&fx.store, "/f").is_ok());
        assert!(lstat(&fx.store, "/d").is_ok());
    }
}
