//! `readdir`: sorted listing, optionally typed and recursive.

use super::{locate_target, normalized, reject};
use crate::path::join;
use crate::store::EntryStore;
use crate::{DirListing, Dirent, ErrorKind, FileType, FsError, ReadDirOptions};

/// List a directory.
///
/// Names are sorted bytewise. A recursive listing is a depth-first preorder
/// whose names are relative to the listed directory; symlinked directories
/// are listed as entries and never descended into. Typed entries report
/// parents under the caller's path, not the directory a symlink led to.
pub(crate) fn readdir(
    store: &EntryStore,
    raw: &str,
    opts: ReadDirOptions,
) -> Result<DirListing, FsError> {
    const SYSCALL: &str = "scandir";

    let path = normalized(store, raw, SYSCALL)?;
    let dir = locate_target(store, &path, SYSCALL, raw)?;
    match dir.kind {
        None => return Err(reject(ErrorKind::NotFound, SYSCALL, raw)),
        Some(FileType::Directory) => {}
        Some(_) => return Err(reject(ErrorKind::NotADirectory, SYSCALL, raw)),
    }

    let mut listing = Vec::new();
    collect(store, &dir.path, path.as_str(), "", opts.recursive, &mut listing);

    Ok(if opts.with_file_types {
        DirListing::Entries(
            listing
                .into_iter()
                .map(|item| Dirent {
                    name: item.name,
                    parent_path: item.parent,
                    file_type: item.kind,
                })
                .collect(),
        )
    } else {
        DirListing::Names(listing.into_iter().map(|item| item.relative).collect())
    })
}

struct Item {
    name: String,
    parent: String,
    relative: String,
    kind: FileType,
}

fn collect(
    store: &EntryStore,
    dir: &str,
    shown: &str,
    prefix: &str,
    recursive: bool,
    out: &mut Vec<Item>,
) {
    for (name, entry) in store.children(dir) {
        let relative = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        out.push(Item {
            name: name.to_string(),
            parent: shown.to_string(),
            relative: relative.clone(),
            kind: entry.kind,
        });
        if recursive && entry.kind == FileType::Directory {
            collect(store, &join(dir, name), &join(shown, name), &relative, recursive, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testing::Fixture;

    fn names(fx: &Fixture, path: &str, recursive: bool) -> Vec<String> {
        let opts = ReadDirOptions {
            with_file_types: false,
            recursive,
        };
        readdir(&fx.store, path, opts).unwrap().into_names()
    }

    #[test]
    fn lists_sorted_children() {
        let mut fx = Fixture::new();
        fx.file("/d/../c", "x").dir("/a/inner").file("/b", "y");
        assert_eq!(names(&fx, "/", false), vec!["a", "b", "c"]);
        assert!(names(&fx, "/a/inner", false).is_empty());
    }

    #[test]
    fn recursive_is_depth_first_preorder() {
        let mut fx = Fixture::new();
        fx.dir("/r/a/x").file("/r/a-b", "1").file("/r/a/x/f", "2").file("/r/z", "3");
        assert_eq!(
            names(&fx, "/r", true),
            vec!["a", "a/x", "a/x/f", "a-b", "z"]
        );
    }

    #[test]
    fn recursive_does_not_follow_symlinked_dirs() {
        let mut fx = Fixture::new();
        fx.dir("/r").dir("/other").file("/other/f", "x").symlink("/other", "/r/link");
        assert_eq!(names(&fx, "/r", true), vec!["link"]);
    }

    #[test]
    fn typed_entries() {
        let mut fx = Fixture::new();
        fx.dir("/r/sub").file("/r/sub/f", "x").symlink("/nowhere", "/r/l");
        let opts = ReadDirOptions {
            with_file_types: true,
            recursive: true,
        };
        let DirListing::Entries(entries) = readdir(&fx.store, "/r", opts).unwrap() else {
            panic!("expected typed entries");
        };
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.path(), e.file_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("/r/l".to_string(), FileType::Symlink),
                ("/r/sub".to_string(), FileType::Directory),
                ("/r/sub/f".to_string(), FileType::File),
            ]
        );
        assert_eq!(entries[2].name, "f");
        assert_eq!(entries[2].parent_path, "/r/sub");
    }

    #[test]
    fn typed_entries_keep_the_listed_path() {
        let mut fx = Fixture::new();
        fx.dir("/real/sub").file("/real/sub/f", "x").symlink("/real", "/alias");
        let opts = ReadDirOptions {
            with_file_types: true,
            recursive: true,
        };
        let DirListing::Entries(entries) = readdir(&fx.store, "/alias/", opts).unwrap() else {
            panic!("expected typed entries");
        };
        assert_eq!(entries[0].parent_path, "/alias");
        assert_eq!(entries[0].path(), "/alias/sub");
        assert_eq!(entries[1].parent_path, "/alias/sub");
        assert_eq!(entries[1].path(), "/alias/sub/f");
    }

    #[test]
    fn lists_through_symlink() {
        let mut fx = Fixture::new();
        fx.dir("/real").file("/real/f", "x").symlink("/real", "/alias");
        assert_eq!(names(&fx, "/alias", false), vec!["f"]);
    }

    #[test]
    fn error_kinds() {
        let mut fx = Fixture::new();
        fx.file("/f", "x");
        let opts = ReadDirOptions::default();
        let err = readdir(&fx.store, "/missing", opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.syscall(), "scandir");
        let err = readdir(&fx.store, "/f", opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
    }
}
