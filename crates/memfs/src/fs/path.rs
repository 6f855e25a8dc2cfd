//! Path keys for the storage indexes.
//!
//! Every path is reduced to one rooted spelling before it touches a map:
//! relative paths resolve against `/`, `.` is dropped, `..` pops a segment
//! and stops at the root, and platform separators are resolved by
//! [`Path::components`].

use std::path::{Component, Path, PathBuf};

/// The root directory key.
pub(crate) fn root() -> PathBuf {
    PathBuf::from("/")
}

/// Normalize a path into its index key.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = root();

    for component in path.components() {
        match component {
            Component::Normal(name) => result.push(name),
            Component::ParentDir => {
                result.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }

    result
}

/// Last segment of a normalized path; the root is named `/`.
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

pub(crate) fn is_root(path: &Path) -> bool {
    path.parent().is_none()
}

/// True iff `path` lies strictly below `ancestor`, compared segment by
/// segment (`/dir2/x` is not below `/dir`).
pub fn is_descendant(ancestor: &Path, path: &Path) -> bool {
    path != ancestor && path.starts_with(ancestor)
}

/// Re-root `path` from under `from` to under `to`.
///
/// Returns `None` when `path` is neither `from` nor below it.
pub(crate) fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
    let rel = path.strip_prefix(from).ok()?;
    if rel.as_os_str().is_empty() {
        Some(to.to_path_buf())
    } else {
        Some(to.join(rel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative_and_absolute_agree() {
        assert_eq!(normalize(Path::new("dir/file")), PathBuf::from("/dir/file"));
        assert_eq!(normalize(Path::new("/dir/file")), PathBuf::from("/dir/file"));
    }

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(normalize(Path::new("./a/./b/")), PathBuf::from("/a/b"));
        assert_eq!(normalize(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a//b")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_normalize_parent_stops_at_root() {
        assert_eq!(normalize(Path::new("../../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("")), PathBuf::from("/"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/dir/file")), "file");
        assert_eq!(base_name(Path::new("/")), "/");
    }

    #[test]
    fn test_is_descendant_is_segment_wise() {
        assert!(is_descendant(Path::new("/dir"), Path::new("/dir/x")));
        assert!(is_descendant(Path::new("/"), Path::new("/dir")));
        assert!(!is_descendant(Path::new("/dir"), Path::new("/dir2/x")));
        assert!(!is_descendant(Path::new("/dir"), Path::new("/dir")));
    }

    #[test]
    fn test_rebase() {
        assert_eq!(
            rebase(Path::new("/dir/a/b"), Path::new("/dir"), Path::new("/new")),
            Some(PathBuf::from("/new/a/b"))
        );
        assert_eq!(
            rebase(Path::new("/dir"), Path::new("/dir"), Path::new("/new")),
            Some(PathBuf::from("/new"))
        );
        assert_eq!(
            rebase(Path::new("/dir2"), Path::new("/dir"), Path::new("/new")),
            None
        );
    }
}
