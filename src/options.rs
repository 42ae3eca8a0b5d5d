//! Instance configuration and closed per-operation option structures.
//!
//! Every option struct implements [`Default`] with the documented defaults,
//! so callers only spell out what they change:
//!
//! ```rust
//! use anyfs_mem::MkdirOptions;
//!
//! let opts = MkdirOptions { recursive: true, ..Default::default() };
//! assert_eq!(opts.mode, 0o777);
//! ```

use base64::Engine as _;

use crate::{ErrorKind, FsError, Identity};

/// Instance-wide configuration of a [`MemoryFs`](crate::MemoryFs).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FsConfig {
    /// Bits cleared from every requested creation mode.
    pub umask: u32,
    /// Owner of newly created inodes and the caller of `access`.
    pub identity: Identity,
    /// Longest accepted path component, in bytes.
    pub max_name_len: usize,
    /// Symlink hops followed before failing with `ELOOP`.
    pub max_symlink_depth: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            umask: 0o022,
            identity: Identity::ROOT,
            max_name_len: 255,
            max_symlink_depth: 40,
        }
    }
}

/// Options for `mkdir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MkdirOptions {
    /// Requested permission bits, masked by the umask. Default `0o777`.
    pub mode: u32,
    /// Create missing ancestors and tolerate an existing directory.
    pub recursive: bool,
}

impl Default for MkdirOptions {
    fn default() -> Self {
        Self {
            mode: 0o777,
            recursive: false,
        }
    }
}

/// Options for `rmdir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RmdirOptions {
    /// Remove every descendant before the directory itself.
    pub recursive: bool,
}

/// Options for `rm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RmOptions {
    /// Treat a missing path as success.
    pub force: bool,
    /// Required to remove directories.
    pub recursive: bool,
}

/// Flags for `copy_file`.
///
/// Mirrors the `COPYFILE_*` bit values: `EXCL = 1`, `FICLONE = 2`,
/// `FICLONE_FORCE = 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyFlags {
    /// Fail with `EEXIST` if the destination exists.
    pub exclusive: bool,
    /// Copy-on-write hint; never changes observable behavior.
    pub clone: bool,
    /// Request copy-on-write; falls back to a full copy when the blob store
    /// cannot share content.
    pub clone_force: bool,
}

impl CopyFlags {
    /// Bit value of [`CopyFlags::exclusive`].
    pub const EXCL_BIT: u32 = 1;
    /// Bit value of [`CopyFlags::clone`].
    pub const FICLONE_BIT: u32 = 2;
    /// Bit value of [`CopyFlags::clone_force`].
    pub const FICLONE_FORCE_BIT: u32 = 4;

    /// Plain overwrite-allowed copy.
    pub const NONE: Self = Self {
        exclusive: false,
        clone: false,
        clone_force: false,
    };

    /// Fail if the destination exists.
    pub const EXCL: Self = Self {
        exclusive: true,
        clone: false,
        clone_force: false,
    };

    /// Decode a `COPYFILE_*` bit set.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`] if any unknown bit is set.
    pub fn from_bits(bits: u32) -> Result<Self, FsError> {
        let known = Self::EXCL_BIT | Self::FICLONE_BIT | Self::FICLONE_FORCE_BIT;
        if bits & !known != 0 {
            return Err(FsError::new(
                ErrorKind::InvalidArgument,
                "copyfile",
                format!("flags {bits:#x}"),
            ));
        }
        Ok(Self {
            exclusive: bits & Self::EXCL_BIT != 0,
            clone: bits & Self::FICLONE_BIT != 0,
            clone_force: bits & Self::FICLONE_FORCE_BIT != 0,
        })
    }

    /// Encode back into `COPYFILE_*` bits.
    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.exclusive {
            bits |= Self::EXCL_BIT;
        }
        if self.clone {
            bits |= Self::FICLONE_BIT;
        }
        if self.clone_force {
            bits |= Self::FICLONE_FORCE_BIT;
        }
        bits
    }

    pub(crate) fn wants_clone(&self) -> bool {
        self.clone || self.clone_force
    }
}

/// Text codec for file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    /// UTF-8; invalid sequences decode to U+FFFD.
    Utf8,
    /// ISO-8859-1, one char per byte. Reversible.
    Latin1,
    /// Standard base64 with padding. Reversible.
    Base64,
    /// Lowercase hexadecimal. Reversible.
    Hex,
}

impl Encoding {
    /// Render bytes as text.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }

    /// Turn text back into bytes. Returns `None` for malformed input.
    ///
    /// Latin-1 keeps the low byte of each char, like a one-byte-per-char
    /// codec does.
    pub fn decode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Utf8 => Some(text.as_bytes().to_vec()),
            Self::Latin1 => Some(text.chars().map(|c| (u32::from(c) & 0xff) as u8).collect()),
            Self::Base64 => base64::engine::general_purpose::STANDARD.decode(text).ok(),
            Self::Hex => hex::decode(text).ok(),
        }
    }
}

/// Data handed to `write_file`/`append_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileData<'a> {
    /// Raw bytes, stored verbatim.
    Bytes(&'a [u8]),
    /// Text, converted with the operation's encoding (UTF-8 by default).
    Text(&'a str),
}

impl<'a> FileData<'a> {
    pub(crate) fn to_bytes(
        self,
        encoding: Option<Encoding>,
        syscall: &'static str,
        path: &str,
    ) -> Result<Vec<u8>, FsError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.to_vec()),
            Self::Text(text) => encoding
                .unwrap_or(Encoding::Utf8)
                .decode(text)
                .ok_or_else(|| FsError::new(ErrorKind::InvalidArgument, syscall, path)),
        }
    }
}

impl<'a> From<&'a [u8]> for FileData<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for FileData<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for FileData<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for FileData<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for FileData<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

/// Options for `append_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOptions {
    /// Codec for [`FileData::Text`]; `None` means UTF-8.
    pub encoding: Option<Encoding>,
    /// Permission bits when the file is created. Default `0o666`.
    pub mode: u32,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            mode: 0o666,
        }
    }
}

/// Options for `write_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Codec for [`FileData::Text`]; `None` means UTF-8.
    pub encoding: Option<Encoding>,
    /// Permission bits when the file is created. Default `0o666`.
    pub mode: u32,
    /// Fail with `EEXIST` if the path exists.
    pub exclusive: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            mode: 0o666,
            exclusive: false,
        }
    }
}

/// Options for `read_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// `None` returns raw bytes; `Some` returns text in that encoding.
    pub encoding: Option<Encoding>,
}

/// Contents returned by `read_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    /// Raw bytes (no encoding requested).
    Bytes(Vec<u8>),
    /// Encoded text.
    Text(String),
}

impl FileContents {
    /// Raw bytes, or the UTF-8 bytes of the text form.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.into_bytes(),
        }
    }

    /// The text form, if an encoding was requested.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }
}

/// Options for `readdir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadDirOptions {
    /// Return [`Dirent`](crate::Dirent) values instead of names.
    pub with_file_types: bool,
    /// Flatten every descendant, named relative to the listed directory.
    pub recursive: bool,
}

/// Result of `readdir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirListing {
    /// Names (or relative sub-paths when recursive).
    Names(Vec<String>),
    /// Typed entries.
    Entries(Vec<crate::Dirent>),
}

impl DirListing {
    /// Names of the listing; typed entries give their final component.
    pub fn into_names(self) -> Vec<String> {
        match self {
            Self::Names(names) => names,
            Self::Entries(entries) => entries.into_iter().map(|e| e.name).collect(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Entries(entries) => entries.len(),
        }
    }

    /// Returns `true` if the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Access check requested from `access`.
///
/// An all-false mode is the existence check (`F_OK`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMode {
    /// `R_OK`.
    pub read: bool,
    /// `W_OK`.
    pub write: bool,
    /// `X_OK`.
    pub execute: bool,
}

impl AccessMode {
    /// `F_OK`: existence only.
    pub const EXISTS: Self = Self {
        read: false,
        write: false,
        execute: false,
    };
    /// `R_OK`.
    pub const READ: Self = Self {
        read: true,
        write: false,
        execute: false,
    };
    /// `W_OK`.
    pub const WRITE: Self = Self {
        read: false,
        write: true,
        execute: false,
    };
    /// `X_OK`.
    pub const EXECUTE: Self = Self {
        read: false,
        write: false,
        execute: true,
    };

    /// Decode `R_OK = 4 | W_OK = 2 | X_OK = 1`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`] for bits above `0o7`.
    pub fn from_bits(bits: u32) -> Result<Self, FsError> {
        if bits & !0o7 != 0 {
            return Err(FsError::new(
                ErrorKind::InvalidArgument,
                "access",
                format!("mode {bits:#o}"),
            ));
        }
        Ok(Self {
            read: bits & 4 != 0,
            write: bits & 2 != 0,
            execute: bits & 1 != 0,
        })
    }

    /// The `rwx` bits of this mode (`4|2|1`).
    pub fn bits(&self) -> u32 {
        (u32::from(self.read) << 2) | (u32::from(self.write) << 1) | u32::from(self.execute)
    }

    /// Returns `true` for the plain existence check.
    pub fn is_exists_only(&self) -> bool {
        self.bits() == 0
    }
}

/// Link type hint for `symlink`. Accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymlinkType {
    /// Link to a file.
    File,
    /// Link to a directory.
    Dir,
    /// Directory junction.
    Junction,
}

/// Reject a mode carrying bits above `0o7777`.
pub(crate) fn check_mode(mode: u32, syscall: &'static str, path: &str) -> Result<(), FsError> {
    if mode & !0o7777 != 0 {
        return Err(FsError::new(ErrorKind::InvalidArgument, syscall, path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        assert_eq!(MkdirOptions::default().mode, 0o777);
        assert!(!MkdirOptions::default().recursive);
        assert_eq!(AppendOptions::default().mode, 0o666);
        assert_eq!(WriteOptions::default().mode, 0o666);
        assert_eq!(FsConfig::default().umask, 0o022);
        assert_eq!(FsConfig::default().max_symlink_depth, 40);
    }

    #[test]
    fn copy_flags_from_bits() {
        let flags = CopyFlags::from_bits(1 | 4).unwrap();
        assert!(flags.exclusive && flags.clone_force && !flags.clone);
        assert_eq!(flags.bits(), 5);
        assert_eq!(CopyFlags::from_bits(0).unwrap(), CopyFlags::NONE);
    }

    #[test]
    fn copy_flags_reject_unknown_bits() {
        let err = CopyFlags::from_bits(8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn access_mode_from_bits() {
        assert_eq!(AccessMode::from_bits(0).unwrap(), AccessMode::EXISTS);
        assert_eq!(AccessMode::from_bits(4).unwrap(), AccessMode::READ);
        let rw = AccessMode::from_bits(6).unwrap();
        assert!(rw.read && rw.write && !rw.execute);
        assert_eq!(rw.bits(), 6);
        assert!(AccessMode::from_bits(8).is_err());
    }

    #[test]
    fn encodings_are_reversible() {
        let bytes = [0u8, 0xff, 0x80, b'a', b'\n'];
        for encoding in [Encoding::Latin1, Encoding::Base64, Encoding::Hex] {
            let text = encoding.encode(&bytes);
            assert_eq!(encoding.decode(&text).unwrap(), bytes, "{encoding:?}");
        }
    }

    #[test]
    fn utf8_decoding_is_lossy() {
        assert_eq!(Encoding::Utf8.encode(b"hi"), "hi");
        assert_eq!(Encoding::Utf8.encode(&[0xff]), "\u{fffd}");
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(Encoding::Hex.decode("zz").is_none());
        assert!(Encoding::Base64.decode("!!!").is_none());
        let err = FileData::Text("zz")
            .to_bytes(Some(Encoding::Hex), "write", "/f")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn file_data_conversions() {
        assert_eq!(FileData::from("hi"), FileData::Text("hi"));
        assert_eq!(FileData::from(b"hi"), FileData::Bytes(b"hi"));
        let bytes = FileData::from("aGk=")
            .to_bytes(Some(Encoding::Base64), "write", "/f")
            .unwrap();
        assert_eq!(bytes, b"hi");
    }

    #[test]
    fn check_mode_rejects_type_bits() {
        assert!(check_mode(0o755, "mkdir", "/d").is_ok());
        assert!(check_mode(0o100644, "mkdir", "/d").is_err());
    }
}
