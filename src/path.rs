//! # Path Normalization
//!
//! Lexical canonicalization of caller-supplied paths.
//!
//! ## Responsibility
//! - Turn a raw path string into a canonical absolute path: no empty
//!   segments, no `.`, `..` resolved by popping the previous segment
//!   (popping past the root is a no-op)
//! - Record whether the caller asserted a directory with a trailing `/`
//!   (or a final `.`/`..`)
//! - Reject relative paths, embedded NUL bytes and over-long components
//!
//! Normalization never consults the entry store. Symlinks are handled by
//! the resolver in [`crate::store`].
//!
//! ## Usage
//!
//! ```rust
//! use anyfs_mem::path::normalize;
//!
//! let p = normalize("//a/./b/../c/", "open", 255).unwrap();
//! assert_eq!(p.as_str(), "/a/c");
//! assert!(p.trailing_slash());
//! ```

use crate::{ErrorKind, FsError};

/// Path separator.
pub const SEPARATOR: char = '/';

/// The canonical root path.
pub const ROOT: &str = "/";

/// A canonical absolute path plus the caller's directory assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    path: String,
    trailing_slash: bool,
}

impl NormalizedPath {
    /// The canonical path.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// `true` if the raw path ended in `/`, `/.` or `/..` and so must name a
    /// directory.
    pub fn trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.path == ROOT
    }

    /// Consume into the canonical path string.
    pub fn into_string(self) -> String {
        self.path
    }
}

/// Canonicalize `raw` lexically.
///
/// # Errors
///
/// - [`ErrorKind::NotFound`] for an empty path
/// - [`ErrorKind::InvalidArgument`] for a relative path or a NUL byte
/// - [`ErrorKind::NameTooLong`] if any component exceeds `max_name_len` bytes
pub fn normalize(
    raw: &str,
    syscall: &'static str,
    max_name_len: usize,
) -> Result<NormalizedPath, FsError> {
    if raw.is_empty() {
        return Err(FsError::new(ErrorKind::NotFound, syscall, raw));
    }
    if raw.contains('\0') || !raw.starts_with(SEPARATOR) {
        return Err(FsError::new(ErrorKind::InvalidArgument, syscall, raw));
    }

    let mut segments: Vec<&str> = Vec::new();
    let mut last = "";
    for segment in raw.split(SEPARATOR) {
        last = segment;
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => {
                if name.len() > max_name_len {
                    return Err(FsError::new(ErrorKind::NameTooLong, syscall, raw));
                }
                segments.push(name);
            }
        }
    }

    let path = if segments.is_empty() {
        ROOT.to_string()
    } else {
        let mut path = String::with_capacity(raw.len());
        for segment in &segments {
            path.push(SEPARATOR);
            path.push_str(segment);
        }
        path
    };
    let trailing_slash = path != ROOT && matches!(last, "" | "." | "..");

    Ok(NormalizedPath {
        path,
        trailing_slash,
    })
}

/// Canonicalize an absolute path without validating it.
///
/// Used for symlink targets, which are opaque and never rejected.
pub(crate) fn collapse(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    if segments.is_empty() {
        return ROOT.to_string();
    }
    segments.iter().fold(String::with_capacity(raw.len()), |mut path, segment| {
        path.push(SEPARATOR);
        path.push_str(segment);
        path
    })
}

/// Iterate the components of a canonical path.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Parent of a canonical path; `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Final component of a canonical path; `None` for the root.
pub fn file_name(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    path.rsplit(SEPARATOR).next()
}

/// Append `name` to the canonical directory `dir`.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// The prefix shared by every strict descendant of `dir` (`dir` + `/`).
pub fn child_prefix(dir: &str) -> String {
    if dir == ROOT {
        ROOT.to_string()
    } else {
        format!("{dir}/")
    }
}

/// `true` if `path` lies strictly below `ancestor`, on a separator boundary.
pub fn is_strict_descendant(path: &str, ancestor: &str) -> bool {
    path != ancestor && path.starts_with(&child_prefix(ancestor))
}

/// Replace the `old` prefix of `path` with `new`.
///
/// `path` must be `old` itself or a strict descendant of it.
pub fn rebase(path: &str, old: &str, new: &str) -> String {
    if path == old {
        return new.to_string();
    }
    let rest = &path[child_prefix(old).len()..];
    join(new, rest)
}

/// `true` if the final raw component is `.` or `..`.
pub fn ends_with_dot_component(raw: &str) -> bool {
    let trimmed = raw.trim_end_matches(SEPARATOR);
    matches!(trimmed.rsplit(SEPARATOR).next(), Some(".") | Some(".."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> NormalizedPath {
        normalize(raw, "test", 255).unwrap()
    }

    #[test]
    fn normalize_handles_dots() {
        assert_eq!(norm("/a/./b/../c").as_str(), "/a/c");
    }

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(norm("//a///b//").as_str(), "/a/b");
    }

    #[test]
    fn normalize_handles_root() {
        let root = norm("/");
        assert_eq!(root.as_str(), "/");
        assert!(root.is_root());
        assert!(!root.trailing_slash());
    }

    #[test]
    fn normalize_dotdot_past_root_is_noop() {
        assert_eq!(norm("/../../a").as_str(), "/a");
        assert_eq!(norm("/a/../..").as_str(), "/");
    }

    #[test]
    fn normalize_records_trailing_slash() {
        assert!(norm("/a/").trailing_slash());
        assert!(norm("/a/.").trailing_slash());
        assert!(norm("/a/b/..").trailing_slash());
        assert!(!norm("/a").trailing_slash());
    }

    #[test]
    fn normalize_rejects_relative() {
        let err = normalize("a/b", "open", 255).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.path(), "a/b");
    }

    #[test]
    fn normalize_rejects_nul() {
        let err = normalize("/a\0b", "open", 255).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn normalize_rejects_empty() {
        let err = normalize("", "stat", 255).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn normalize_rejects_long_component() {
        let long = format!("/{}", "x".repeat(256));
        let err = normalize(&long, "mkdir", 255).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameTooLong);
        assert!(normalize(&format!("/{}", "x".repeat(255)), "mkdir", 255).is_ok());
    }

    #[test]
    fn parent_and_file_name() {
        assert_eq!(parent("/"), None);
        assert_eq!(parent("/a"), Some("/"));
        assert_eq!(parent("/a/b"), Some("/a"));
        assert_eq!(file_name("/"), None);
        assert_eq!(file_name("/a/b"), Some("b"));
    }

    #[test]
    fn descendant_needs_separator_boundary() {
        assert!(is_strict_descendant("/a/b", "/a"));
        assert!(is_strict_descendant("/a", "/"));
        assert!(!is_strict_descendant("/ab", "/a"));
        assert!(!is_strict_descendant("/a", "/a"));
        assert!(!is_strict_descendant("/", "/"));
    }

    #[test]
    fn rebase_rewrites_prefix() {
        assert_eq!(rebase("/a", "/a", "/x/y"), "/x/y");
        assert_eq!(rebase("/a/b/c", "/a", "/x"), "/x/b/c");
        assert_eq!(rebase("/a/b", "/a", "/"), "/b");
    }

    #[test]
    fn dot_component_detection() {
        assert!(ends_with_dot_component("/a/."));
        assert!(ends_with_dot_component("/a/../"));
        assert!(!ends_with_dot_component("/a/b"));
        assert!(!ends_with_dot_component("/a/.hidden"));
    }

    #[test]
    fn collapse_accepts_anything() {
        assert_eq!(collapse("/a/b/../../../c"), "/c");
        assert_eq!(collapse("/a//./b/"), "/a/b");
        assert_eq!(collapse("/.."), "/");
    }

    #[test]
    fn components_skip_root() {
        let parts: Vec<_> = components("/a/b").collect();
        assert_eq!(parts, vec!["a", "b"]);
        assert_eq!(components("/").count(), 0);
    }
}
