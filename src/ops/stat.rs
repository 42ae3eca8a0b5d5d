//! Metadata: `lstat`, `stat`, `access` and `chmod`.

use super::{commit, locate, locate_target, normalized, reject};
use crate::blob::BlobStore;
use crate::options::check_mode;
use crate::store::{Changeset, EntryStore, InodeUpdate};
use crate::{AccessMode, ErrorKind, FileType, FsError, Identity, Permissions, Stats};

/// Stats of the entry itself; a final symlink is not followed.
pub(crate) fn lstat(store: &EntryStore, raw: &str) -> Result<Stats, FsError> {
    const SYSCALL: &str = "lstat";

    let path = normalized(store, raw, SYSCALL)?;
    let found = locate(store, &path, SYSCALL, raw)?;
    store
        .stats(&found.path)
        .ok_or_else(|| reject(ErrorKind::NotFound, SYSCALL, raw))
}

/// Stats of the entry a path finally refers to, following symlinks.
pub(crate) fn stat(store: &EntryStore, raw: &str) -> Result<Stats, FsError> {
    const SYSCALL: &str = "stat";

    let path = normalized(store, raw, SYSCALL)?;
    let found = locate_target(store, &path, SYSCALL, raw)?;
    store
        .stats(&found.path)
        .ok_or_else(|| reject(ErrorKind::NotFound, SYSCALL, raw))
}

/// Check `mode` against the permission bits for `caller`.
///
/// The owner triple applies when the uid matches, the group triple when the
/// gid matches, otherwise the other triple. Uid 0 may always read and write,
/// and may execute anything with an execute bit or any directory.
pub(crate) fn access(
    store: &EntryStore,
    raw: &str,
    mode: AccessMode,
    caller: &Identity,
) -> Result<(), FsError> {
    const SYSCALL: &str = "access";

    let path = normalized(store, raw, SYSCALL)?;
    let found = locate_target(store, &path, SYSCALL, raw)?;
    let (Some(kind), Some(inode)) = (found.kind, store.inode_at(&found.path)) else {
        return Err(reject(ErrorKind::NotFound, SYSCALL, raw));
    };
    if mode.is_exists_only() {
        return Ok(());
    }

    let bits = inode.perms.mode();
    let granted = if caller.is_root() {
        let exec = kind == FileType::Directory || bits & 0o111 != 0;
        0o6 | u32::from(exec)
    } else if caller.uid == inode.uid {
        (bits >> 6) & 0o7
    } else if caller.gid == inode.gid {
        (bits >> 3) & 0o7
    } else {
        bits & 0o7
    };

    let wanted = mode.bits();
    if granted & wanted != wanted {
        return Err(reject(ErrorKind::PermissionDenied, SYSCALL, raw));
    }
    Ok(())
}

/// Replace the permission bits of the entry a path refers to.
pub(crate) fn chmod(
    store: &mut EntryStore,
    blobs: &dyn BlobStore,
    raw: &str,
    mode: u32,
) -> Result<(), FsError> {
    const SYSCALL: &str = "chmod";

    check_mode(mode, SYSCALL, raw)?;
    let path = normalized(store, raw, SYSCALL)?;
    let found = locate_target(store, &path, SYSCALL, raw)?;
    let Some(entry) = store.get(&found.path) else {
        return Err(reject(ErrorKind::NotFound, SYSCALL, raw));
    };

    let mut changes = Changeset::new();
    changes.update(entry.inode, InodeUpdate::Mode(Permissions::from_mode(mode)));
    commit(store, blobs, changes, SYSCALL, raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::readlink;
    use crate::ops::testing::Fixture;
    use crate::{S_IFLNK, S_IFREG};

    fn with_mode(fx: &mut Fixture, path: &str, mode: u32) {
        chmod(&mut fx.store, &fx.blobs, path, mode).unwrap();
    }

    #[test]
    fn lstat_and_stat_differ_on_symlinks() {
        let mut fx = Fixture::new();
        fx.file("/f", "hello").symlink("/f", "/l");

        let link = lstat(&fx.store, "/l").unwrap();
        assert_eq!(link.mode & crate::S_IFMT, S_IFLNK);
        assert_eq!(link.size, 2);

        let target = stat(&fx.store, "/l").unwrap();
        assert_eq!(target.mode, S_IFREG | 0o644);
        assert_eq!(target.size, 5);
        assert_eq!(target, stat(&fx.store, "/f").unwrap());
    }

    #[test]
    fn trailing_slash_follows_final_symlink() {
        let mut fx = Fixture::new();
        fx.dir("/real")
            .file("/f", "x")
            .symlink("/real", "/alias")
            .symlink("/f", "/flink")
            .symlink("/gone", "/dangling");

        let stats = lstat(&fx.store, "/alias/").unwrap();
        assert_eq!(stats, stat(&fx.store, "/real").unwrap());
        assert_eq!(stats.mode & crate::S_IFMT, crate::S_IFDIR);
        assert_eq!(
            readlink(&fx.store, "/alias/").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(lstat(&fx.store, "/flink/").unwrap_err().kind(), ErrorKind::NotADirectory);
        assert_eq!(lstat(&fx.store, "/dangling/").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(lstat(&fx.store, "/alias").unwrap().mode & crate::S_IFMT, S_IFLNK);
    }

    #[test]
    fn stat_error_kinds() {
        let mut fx = Fixture::new();
        fx.file("/f", "x").symlink("/l2", "/l1").symlink("/l1", "/l2");
        assert_eq!(stat(&fx.store, "/missing").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(stat(&fx.store, "/l1").unwrap_err().kind(), ErrorKind::TooManySymlinks);
        assert_eq!(stat(&fx.store, "/f/").unwrap_err().kind(), ErrorKind::NotADirectory);
        assert_eq!(lstat(&fx.store, "/f/x").unwrap_err().kind(), ErrorKind::NotADirectory);
        assert!(lstat(&fx.store, "/l1").is_ok());
    }

    #[test]
    fn access_existence_follows_symlinks() {
        let mut fx = Fixture::new();
        fx.file("/f", "x").symlink("/f", "/ok").symlink("/gone", "/dangling");
        let root = Identity::ROOT;
        access(&fx.store, "/ok", AccessMode::EXISTS, &root).unwrap();
        let err = access(&fx.store, "/dangling", AccessMode::EXISTS, &root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn access_uses_owner_group_other() {
        let mut fx = Fixture::new();
        fx.file("/f", "x");
        with_mode(&mut fx, "/f", 0o640);

        let owner = Identity::new(0, 0);
        let group_member = Identity::new(1000, 0);
        let stranger = Identity::new(1000, 1000);
        let rw = AccessMode {
            read: true,
            write: true,
            execute: false,
        };

        access(&fx.store, "/f", rw, &owner).unwrap();
        access(&fx.store, "/f", AccessMode::READ, &group_member).unwrap();
        assert_eq!(
            access(&fx.store, "/f", AccessMode::WRITE, &group_member).unwrap_err().kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            access(&fx.store, "/f", AccessMode::READ, &stranger).unwrap_err().kind(),
            ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn root_needs_an_execute_bit_on_files() {
        let mut fx = Fixture::new();
        fx.file("/f", "x").dir("/d");
        with_mode(&mut fx, "/f", 0o000);
        with_mode(&mut fx, "/d", 0o000);
        let root = Identity::ROOT;

        access(&fx.store, "/f", AccessMode::READ, &root).unwrap();
        access(&fx.store, "/f", AccessMode::WRITE, &root).unwrap();
        assert_eq!(
            access(&fx.store, "/f", AccessMode::EXECUTE, &root).unwrap_err().kind(),
            ErrorKind::PermissionDenied
        );
        access(&fx.store, "/d", AccessMode::EXECUTE, &root).unwrap();

        with_mode(&mut fx, "/f", 0o001);
        access(&fx.store, "/f", AccessMode::EXECUTE, &root).unwrap();
    }

    #[test]
    fn chmod_follows_symlink_and_touches_ctime() {
        let mut fx = Fixture::new();
        fx.file("/f", "x").symlink("/f", "/l");
        let before = stat(&fx.store, "/f").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));

        chmod(&mut fx.store, &fx.blobs, "/l", 0o600).unwrap();
        let after = stat(&fx.store, "/f").unwrap();
        assert_eq!(after.permissions().mode(), 0o600);
        assert!(after.ctime > before.ctime);
        assert_eq!(after.mtime, before.mtime);
        assert_eq!(lstat(&fx.store, "/l").unwrap().permissions().mode(), 0o777);
    }

    #[test]
    fn chmod_rejects_bad_mode_and_missing_path() {
        let mut fx = Fixture::new();
        fx.file("/f", "x");
        let err = chmod(&mut fx.store, &fx.blobs, "/f", 0o170000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = chmod(&mut fx.store, &fx.blobs, "/missing", 0o644).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
