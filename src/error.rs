//! Error types for the in-memory filesystem engine.

use std::fmt;
use std::io;

/// POSIX error kind of a failed operation.
///
/// Each kind has a stable symbolic code (`ENOENT`, ...) and a negative errno
/// value matching the Linux numbering.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// `ENOENT`: a path component does not exist.
    NotFound,
    /// `EEXIST`: the path is already occupied.
    AlreadyExists,
    /// `EISDIR`: a directory was given where a non-directory was required.
    IsADirectory,
    /// `ENOTDIR`: a non-directory was given where a directory was required.
    NotADirectory,
    /// `EACCES`: permission bits deny the requested access.
    PermissionDenied,
    /// `ENOTEMPTY`: the directory still has entries.
    NotEmpty,
    /// `EINVAL`: the arguments are malformed or contradictory.
    InvalidArgument,
    /// `ELOOP`: too many symbolic links were followed.
    TooManySymlinks,
    /// `ENAMETOOLONG`: a path component exceeds the name limit.
    NameTooLong,
    /// `ENOSPC`: the blob store has no room left.
    NoSpace,
    /// `EROFS`: the blob store refuses writes.
    ReadOnly,
    /// `EBUSY`: the entry is in use (the root directory).
    Busy,
    /// `EMFILE`: too many open files.
    TooManyOpen,
    /// `EXDEV`: the operation would cross filesystems.
    CrossDevice,
    /// `EPERM`: the operation is never permitted on this entry.
    NotPermitted,
    /// `EIO`: the blob store failed.
    Io,
}

impl ErrorKind {
    /// Symbolic POSIX code, e.g. `"ENOENT"`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "ENOENT",
            Self::AlreadyExists => "EEXIST",
            Self::IsADirectory => "EISDIR",
            Self::NotADirectory => "ENOTDIR",
            Self::PermissionDenied => "EACCES",
            Self::NotEmpty => "ENOTEMPTY",
            Self::InvalidArgument => "EINVAL",
            Self::TooManySymlinks => "ELOOP",
            Self::NameTooLong => "ENAMETOOLONG",
            Self::NoSpace => "ENOSPC",
            Self::ReadOnly => "EROFS",
            Self::Busy => "EBUSY",
            Self::TooManyOpen => "EMFILE",
            Self::CrossDevice => "EXDEV",
            Self::NotPermitted => "EPERM",
            Self::Io => "EIO",
        }
    }

    /// Negative errno value, e.g. `-2` for `ENOENT`.
    pub const fn errno(self) -> i32 {
        match self {
            Self::NotFound => -2,
            Self::AlreadyExists => -17,
            Self::IsADirectory => -21,
            Self::NotADirectory => -20,
            Self::PermissionDenied => -13,
            Self::NotEmpty => -39,
            Self::InvalidArgument => -22,
            Self::TooManySymlinks => -40,
            Self::NameTooLong => -36,
            Self::NoSpace => -28,
            Self::ReadOnly => -30,
            Self::Busy => -16,
            Self::TooManyOpen => -24,
            Self::CrossDevice => -18,
            Self::NotPermitted => -1,
            Self::Io => -5,
        }
    }

    /// Human-readable description, as printed by `strerror`.
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotFound => "no such file or directory",
            Self::AlreadyExists => "file already exists",
            Self::IsADirectory => "illegal operation on a directory",
            Self::NotADirectory => "not a directory",
            Self::PermissionDenied => "permission denied",
            Self::NotEmpty => "directory not empty",
            Self::InvalidArgument => "invalid argument",
            Self::TooManySymlinks => "too many symbolic links encountered",
            Self::NameTooLong => "name too long",
            Self::NoSpace => "no space left on device",
            Self::ReadOnly => "read-only file system",
            Self::Busy => "resource busy or locked",
            Self::TooManyOpen => "too many open files",
            Self::CrossDevice => "cross-device link not permitted",
            Self::NotPermitted => "operation not permitted",
            Self::Io => "i/o error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Filesystem error with POSIX kind and call context.
///
/// Every failure names the operation (`syscall`) and the offending path, plus
/// the destination path for two-path operations such as `rename` and `link`.
///
/// # Examples
///
/// ```rust
/// use anyfs_mem::{ErrorKind, FsError};
///
/// let err = FsError::new(ErrorKind::NotFound, "open", "/missing");
/// assert_eq!(err.code(), "ENOENT");
/// assert_eq!(err.errno(), -2);
/// assert_eq!(err.to_string(), "ENOENT: no such file or directory, open '/missing'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {}, {syscall} '{path}'{}", .kind.code(), .kind.description(), DestSuffix(.dest.as_deref()))]
pub struct FsError {
    kind: ErrorKind,
    syscall: &'static str,
    path: String,
    dest: Option<String>,
}

impl FsError {
    /// Create an error for a single-path operation.
    pub fn new(kind: ErrorKind, syscall: &'static str, path: impl Into<String>) -> Self {
        Self {
            kind,
            syscall,
            path: path.into(),
            dest: None,
        }
    }

    /// Create an error for a two-path operation.
    pub fn with_dest(
        kind: ErrorKind,
        syscall: &'static str,
        path: impl Into<String>,
        dest: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            syscall,
            path: path.into(),
            dest: Some(dest.into()),
        }
    }

    /// The POSIX kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Symbolic code, e.g. `"EEXIST"`.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Negative errno value.
    pub fn errno(&self) -> i32 {
        self.kind.errno()
    }

    /// Name of the failing operation, e.g. `"mkdir"`.
    pub fn syscall(&self) -> &'static str {
        self.syscall
    }

    /// Path argument of the failing operation, as the caller passed it.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Destination path for two-path operations.
    pub fn dest(&self) -> Option<&str> {
        self.dest.as_deref()
    }

    /// Returns `true` if this is an `ENOENT` error.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

struct DestSuffix<'a>(Option<&'a str>);

impl fmt::Display for DestSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(dest) => write!(f, " -> '{dest}'"),
            None => Ok(()),
        }
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match error.kind {
            ErrorKind::NotFound => io::ErrorKind::NotFound,
            ErrorKind::AlreadyExists => io::ErrorKind::AlreadyExists,
            ErrorKind::IsADirectory => io::ErrorKind::IsADirectory,
            ErrorKind::NotADirectory => io::ErrorKind::NotADirectory,
            ErrorKind::PermissionDenied | ErrorKind::NotPermitted => {
                io::ErrorKind::PermissionDenied
            }
            ErrorKind::NotEmpty => io::ErrorKind::DirectoryNotEmpty,
            ErrorKind::InvalidArgument | ErrorKind::NameTooLong => io::ErrorKind::InvalidInput,
            ErrorKind::NoSpace => io::ErrorKind::StorageFull,
            ErrorKind::ReadOnly => io::ErrorKind::ReadOnlyFilesystem,
            ErrorKind::Busy => io::ErrorKind::ResourceBusy,
            ErrorKind::CrossDevice => io::ErrorKind::CrossesDevices,
            ErrorKind::TooManySymlinks | ErrorKind::TooManyOpen | ErrorKind::Io => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, error)
    }
}
