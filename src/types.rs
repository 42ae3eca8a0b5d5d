//! Core value types: file types, modes, inode identity and stat results.

use std::time::SystemTime;

/// The root directory always has inode 1.
pub const ROOT_INODE: InodeId = InodeId(1);

/// File type bit mask within a full mode value.
pub const S_IFMT: u32 = 0o170_000;
/// Type bits of a regular file.
pub const S_IFREG: u32 = 0o100_000;
/// Type bits of a directory.
pub const S_IFDIR: u32 = 0o040_000;
/// Type bits of a symbolic link.
pub const S_IFLNK: u32 = 0o120_000;

/// Block size reported in [`Stats::blksize`].
pub const BLOCK_SIZE: u64 = 4096;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl FileType {
    /// The `S_IF*` type bits for this file type.
    pub const fn type_bits(self) -> u32 {
        match self {
            Self::File => S_IFREG,
            Self::Directory => S_IFDIR,
            Self::Symlink => S_IFLNK,
        }
    }
}

/// Identity of an inode, shared by every hard link to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InodeId(pub u64);

/// Unix-style permission bits (`rwxrwxrwx` plus setuid/setgid/sticky).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Create permissions from a Unix mode (e.g., 0o755). Type bits are dropped.
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw permission bits.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// Returns `true` if no write bit is set.
    #[inline]
    pub const fn readonly(&self) -> bool {
        (self.0 & 0o222) == 0
    }

    /// Apply a umask, clearing every bit set in `umask`.
    #[inline]
    pub const fn masked(self, umask: u32) -> Self {
        Self(self.0 & !umask & 0o7777)
    }

    /// Default permissions for a new file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// Default permissions for a new directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Numeric owner of an inode, and the caller identity for access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    /// User id.
    pub uid: u32,
    /// Group id.
    pub gid: u32,
}

impl Identity {
    /// The superuser identity (`0:0`).
    pub const ROOT: Self = Self { uid: 0, gid: 0 };

    /// Create an identity from a uid/gid pair.
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Returns `true` for uid 0.
    pub const fn is_root(&self) -> bool {
        self.uid == 0
    }
}

/// Result of `stat`/`lstat`.
///
/// Hard links of the same inode report identical stats.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    /// Device id; constant for one filesystem instance.
    pub dev: u64,
    /// Inode number.
    pub ino: u64,
    /// Full mode: type bits | permission bits.
    pub mode: u32,
    /// Number of path entries referencing the inode.
    pub nlink: u64,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
    /// Size in bytes; for a symlink, the byte length of its target.
    pub size: u64,
    /// Preferred I/O block size.
    pub blksize: u64,
    /// Number of 512-byte blocks.
    pub blocks: u64,
    /// Last access time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub atime: SystemTime,
    /// Last content modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub mtime: SystemTime,
    /// Last status change time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub ctime: SystemTime,
    /// Creation time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub birthtime: SystemTime,
}

impl Stats {
    /// The type of the entry, decoded from the mode bits.
    pub fn file_type(&self) -> FileType {
        match self.mode & S_IFMT {
            S_IFDIR => FileType::Directory,
            S_IFLNK => FileType::Symlink,
            _ => FileType::File,
        }
    }

    /// The permission bits.
    pub fn permissions(&self) -> Permissions {
        Permissions::from_mode(self.mode)
    }

    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    /// Returns `true` if this is a symbolic link.
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.mode & S_IFMT == S_IFLNK
    }
}

/// A typed directory entry returned from `readdir` with `with_file_types`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dirent {
    /// Name of the entry (final component only).
    pub name: String,
    /// Canonical path of the directory containing the entry.
    pub parent_path: String,
    /// Type of the entry itself; symlinks are not followed.
    pub file_type: FileType,
}

impl Dirent {
    /// Full canonical path of the entry.
    pub fn path(&self) -> String {
        crate::path::join(&self.parent_path, &self.name)
    }

    /// Returns `true` if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Returns `true` if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Returns `true` if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with_mode(mode: u32) -> Stats {
        Stats {
            dev: 1,
            ino: 2,
            mode,
            nlink: 1,
            uid: 0,
            gid: 0,
            size: 0,
            blksize: BLOCK_SIZE,
            blocks: 0,
            atime: SystemTime::UNIX_EPOCH,
            mtime: SystemTime::UNIX_EPOCH,
            ctime: SystemTime::UNIX_EPOCH,
            birthtime: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn stats_type_predicates() {
        let file = stats_with_mode(S_IFREG | 0o644);
        assert!(file.is_file() && !file.is_dir() && !file.is_symlink());
        assert_eq!(file.file_type(), FileType::File);

        let dir = stats_with_mode(S_IFDIR | 0o755);
        assert!(dir.is_dir() && !dir.is_file());
        assert_eq!(dir.file_type(), FileType::Directory);

        let link = stats_with_mode(S_IFLNK | 0o777);
        assert!(link.is_symlink() && !link.is_file());
        assert_eq!(link.permissions().mode(), 0o777);
    }

    #[test]
    fn permissions_from_mode_masks_type_bits() {
        let p = Permissions::from_mode(0o100755);
        assert_eq!(p.mode(), 0o755);
    }

    #[test]
    fn permissions_umask() {
        assert_eq!(Permissions::from_mode(0o777).masked(0o022).mode(), 0o755);
        assert_eq!(Permissions::from_mode(0o666).masked(0o022).mode(), 0o644);
        assert_eq!(Permissions::from_mode(0o666).masked(0).mode(), 0o666);
    }

    #[test]
    fn permissions_readonly() {
        assert!(Permissions::from_mode(0o444).readonly());
        assert!(!Permissions::from_mode(0o644).readonly());
    }

    #[test]
    fn file_type_bits() {
        assert_eq!(FileType::File.type_bits(), S_IFREG);
        assert_eq!(FileType::Directory.type_bits(), S_IFDIR);
        assert_eq!(FileType::Symlink.type_bits(), S_IFLNK);
    }

    #[test]
    fn dirent_path_joins_parent() {
        let root_child = Dirent {
            name: "a".into(),
            parent_path: "/".into(),
            file_type: FileType::File,
        };
        assert_eq!(root_child.path(), "/a");

        let nested = Dirent {
            name: "b".into(),
            parent_path: "/a".into(),
            file_type: FileType::Directory,
        };
        assert_eq!(nested.path(), "/a/b");
        assert!(nested.is_dir());
    }

    #[test]
    fn root_inode_is_one() {
        assert_eq!(ROOT_INODE, InodeId(1));
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<Stats>();
        assert_send_sync::<Dirent>();
        assert_send_sync::<Permissions>();
        assert_send_sync::<Identity>();
    }
}
