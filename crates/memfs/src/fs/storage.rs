//! Path-tree storage engine.
//!
//! The tree is two flat indexes keyed by normalized path:
//!
//! ```text
//! files:    /            -> N0 (dir)
//!           /dir         -> N1 (dir)
//!           /dir/file    -> N2
//!           /link        -> N2          <- hard link, same node
//! children: /            -> { dir: N1, link: N2 }
//!           /dir         -> { file: N2 }
//! ```
//!
//! `files` answers existence and lookup; `children` answers listing. Every
//! mutation validates first and then updates both, so a failed call leaves
//! the indexes untouched.
//!
//! Storage does no locking. Mutations take `&mut self`; wrap it in a lock
//! (as [`InMemoryFs`](crate::InMemoryFs) does) to share it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::file::{File, OpenFlags};
use super::limits::{FsLimits, FsUsage};
use super::node::{Mode, Node, NodeRef};
use super::path::{self, base_name, is_descendant, is_root, normalize, rebase};
use crate::error::{Error, Result};
use crate::logging::{fs_debug, fs_trace};

/// Permissions of the root directory.
const ROOT_PERM: u32 = 0o755;
/// Permissions of directories created implicitly by `rename`.
const MOVE_PARENT_PERM: u32 = 0o644;

/// In-memory path tree with hard-link aliasing.
///
/// # Example
///
/// ```rust
/// use memfs::{Mode, OpenFlags, Storage};
///
/// let mut storage = Storage::new();
/// let file = storage
///     .create("dir/file", Mode::file(0o644), OpenFlags::read_write())?
///     .expect("new file");
/// file.write_at(b"hello", 0)?;
///
/// storage.link("dir/file", "link")?;
/// storage.remove("dir/file")?;
///
/// let link = storage.get("/link").expect("link survives");
/// assert_eq!(link.contents(), b"hello");
/// # Ok::<(), memfs::Error>(())
/// ```
#[derive(Debug)]
pub struct Storage {
    files: HashMap<PathBuf, NodeRef>,
    children: HashMap<PathBuf, HashMap<String, NodeRef>>,
    limits: FsLimits,
    file_count: u64,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    /// Create storage holding only the root directory, with default limits.
    pub fn new() -> Self {
        Self::with_limits(FsLimits::default())
    }

    /// Create storage holding only the root directory.
    pub fn with_limits(limits: FsLimits) -> Self {
        let root = path::root();
        let mut files = HashMap::new();
        files.insert(root.clone(), NodeRef::new(Node::new(Mode::dir(ROOT_PERM))));
        let mut children = HashMap::new();
        children.insert(root, HashMap::new());

        Self {
            files,
            children,
            limits,
            file_count: 0,
        }
    }

    pub fn limits(&self) -> &FsLimits {
        &self.limits
    }

    /// True iff the path exists.
    pub fn has(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(&normalize(path.as_ref()))
    }

    /// Create a node at `path`, creating missing ancestors as directories
    /// with `mode`'s permission bits.
    ///
    /// Returns `Ok(None)` if `path` already is a directory.
    ///
    /// # Errors
    /// - `AlreadyExists` if `path` is an existing file
    /// - `NotADirectory` if an ancestor is a file
    /// - `ResourceLimit` if the path or file count breaks a limit
    pub fn create(
        &mut self,
        path: impl AsRef<Path>,
        mode: Mode,
        flags: OpenFlags,
    ) -> Result<Option<File>> {
        let path = normalize(path.as_ref());
        if let Some(existing) = self.files.get(&path) {
            if !existing.is_dir() {
                return Err(Error::AlreadyExists(path));
            }
            return Ok(None);
        }

        self.check_insert(&path, mode.is_dir())?;

        let node = NodeRef::new(Node::new(mode));
        self.insert(path.clone(), node.clone());
        self.attach(&path, mode.perm(), &node);

        fs_debug!(path = %path.display(), mode = ?mode, "created node");
        Ok(Some(File::new(base_name(&path), flags, node)))
    }

    /// Look up a path.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<File> {
        let path = normalize(path.as_ref());
        let node = self.files.get(&path)?;
        fs_trace!(path = %path.display(), "lookup");
        Some(File::new(base_name(&path), OpenFlags::default(), node.clone()))
    }

    /// Look up a path that the indexes guarantee exists.
    ///
    /// # Panics
    /// If the path is missing, which means the indexes disagree.
    pub(crate) fn must_get(&self, path: &Path) -> File {
        match self.get(path) {
            Some(file) => file,
            None => panic!("storage indexes out of sync: {} missing", path.display()),
        }
    }

    /// Views of a directory's immediate entries, in no particular order.
    ///
    /// Unknown paths and files have no entries.
    pub fn children(&self, path: impl AsRef<Path>) -> Vec<File> {
        let path = normalize(path.as_ref());
        self.children
            .get(&path)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(name, node)| File::new(name.clone(), OpenFlags::default(), node.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Make `link` another path to the node at `target`.
    ///
    /// Linking a link reaches the same node as the original target.
    ///
    /// # Errors
    /// - `NotFound` if `target` is missing, or `link`'s parent is missing or
    ///   not a directory
    /// - `IsADirectory` if `target` is a directory
    /// - `AlreadyExists` if `link` exists
    pub fn link(&mut self, target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
        let target = normalize(target.as_ref());
        let link = normalize(link.as_ref());

        let node = self
            .files
            .get(&target)
            .cloned()
            .ok_or_else(|| Error::NotFound(target.clone()))?;
        if node.is_dir() {
            return Err(Error::IsADirectory(target));
        }
        if self.files.contains_key(&link) {
            return Err(Error::AlreadyExists(link));
        }

        let parent = link.parent().map_or_else(path::root, Path::to_path_buf);
        if !self.files.get(&parent).is_some_and(NodeRef::is_dir) {
            return Err(Error::NotFound(parent));
        }
        self.check_insert(&link, false)?;

        self.insert(link.clone(), node.clone());
        self.children
            .entry(parent)
            .or_default()
            .insert(base_name(&link), node);

        fs_debug!(target = %target.display(), link = %link.display(), "linked");
        Ok(())
    }

    /// Move `from` and every path below it to the same place under `to`.
    ///
    /// Nodes keep their identity, so links into the moved subtree from
    /// outside it still reach the moved nodes. An existing `to` is replaced
    /// when it is a file (for a file) or an empty directory (for a
    /// directory).
    ///
    /// # Errors
    /// - `NotFound` if `from` is missing
    /// - `InvalidArgument` if either path is the root or `to` is below `from`
    /// - `NotADirectory` if an ancestor of `to` is a file, or a directory is
    ///   moved onto a file
    /// - `IsADirectory` if a file is moved onto a directory
    /// - `NotEmpty` if `to` is a non-empty directory
    pub fn rename(&mut self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
        let from = normalize(from.as_ref());
        let to = normalize(to.as_ref());

        let node = self
            .files
            .get(&from)
            .cloned()
            .ok_or_else(|| Error::NotFound(from.clone()))?;
        if from == to {
            return Ok(());
        }
        if is_root(&from) || is_root(&to) {
            return Err(Error::InvalidArgument(
                "cannot rename the root directory".to_string(),
            ));
        }
        if is_descendant(&from, &to) {
            return Err(Error::InvalidArgument(format!(
                "cannot move {} below itself",
                from.display()
            )));
        }

        let replaces = match self.files.get(&to) {
            None => false,
            Some(existing) if existing.ptr_eq(&node) => return Ok(()),
            Some(existing) => match (node.is_dir(), existing.is_dir()) {
                (false, true) => return Err(Error::IsADirectory(to)),
                (true, false) => return Err(Error::NotADirectory(to)),
                (true, true) if !self.is_empty_dir(&to) => return Err(Error::NotEmpty(to)),
                _ => true,
            },
        };
        self.check_ancestors(&to)?;

        let moves = self.plan_moves(&from, &to);
        for (_, new) in &moves {
            self.limits.validate_path(new)?;
        }

        if replaces {
            self.detach(&to);
        }
        for (old, new) in &moves {
            self.move_entry(old, new);
        }

        fs_debug!(
            from = %from.display(),
            to = %to.display(),
            moved = moves.len(),
            "renamed"
        );
        Ok(())
    }

    /// Remove one path. The node survives while another path links to it.
    ///
    /// # Errors
    /// - `NotFound` if the path is missing
    /// - `NotEmpty` if the path is a directory with entries
    /// - `InvalidArgument` for the root
    pub fn remove(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = normalize(path.as_ref());

        let is_dir = self
            .files
            .get(&path)
            .map(NodeRef::is_dir)
            .ok_or_else(|| Error::NotFound(path.clone()))?;
        if is_root(&path) {
            return Err(Error::InvalidArgument(
                "cannot remove the root directory".to_string(),
            ));
        }
        if is_dir && !self.is_empty_dir(&path) {
            return Err(Error::NotEmpty(path));
        }

        self.detach(&path);
        fs_debug!(path = %path.display(), "removed");
        Ok(())
    }

    /// Usage statistics. Bytes of a node reachable through several links are
    /// counted once.
    pub fn usage(&self) -> FsUsage {
        let mut seen = HashSet::new();
        let mut total_bytes = 0;
        let mut dir_count = 0;

        for node in self.files.values() {
            if node.is_dir() {
                dir_count += 1;
            } else if seen.insert(node.addr()) {
                total_bytes += node.len();
            }
        }

        FsUsage::new(total_bytes, self.file_count, dir_count)
    }

    /// Every known path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn is_empty_dir(&self, path: &Path) -> bool {
        self.children.get(path).is_none_or(HashMap::is_empty)
    }

    /// Check limits and ancestors before inserting `path`.
    fn check_insert(&self, path: &Path, is_dir: bool) -> Result<()> {
        self.limits.validate_path(path)?;
        if !is_dir {
            self.limits.check_file_count(self.file_count)?;
        }
        self.check_ancestors(path)
    }

    /// Fail if the nearest existing ancestor of `path` is not a directory.
    fn check_ancestors(&self, path: &Path) -> Result<()> {
        for ancestor in path.ancestors().skip(1) {
            match self.files.get(ancestor) {
                Some(node) if node.is_dir() => return Ok(()),
                Some(_) => return Err(Error::NotADirectory(ancestor.to_path_buf())),
                None => {}
            }
        }
        Ok(())
    }

    fn insert(&mut self, path: PathBuf, node: NodeRef) {
        if node.is_dir() {
            self.children.entry(path.clone()).or_default();
        } else {
            self.file_count += 1;
        }
        self.files.insert(path, node);
    }

    /// Register `path` in its parent's entries, creating missing ancestors
    /// as directories with `dir_perm`.
    fn attach(&mut self, path: &Path, dir_perm: u32, node: &NodeRef) {
        let Some(parent) = path.parent() else {
            return;
        };

        if !self.files.contains_key(parent) {
            let dir = NodeRef::new(Node::new(Mode::dir(dir_perm)));
            self.insert(parent.to_path_buf(), dir.clone());
            self.attach(parent, dir_perm, &dir);
        }

        self.children
            .entry(parent.to_path_buf())
            .or_default()
            .insert(base_name(path), node.clone());
    }

    /// Drop `path` from both indexes and from its parent's entries.
    fn detach(&mut self, path: &Path) {
        if let Some(node) = self.files.remove(path) {
            if !node.is_dir() {
                self.file_count = self.file_count.saturating_sub(1);
            }
        }
        self.children.remove(path);
        if let Some(parent) = path.parent() {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.remove(&base_name(path));
            }
        }
    }

    /// `from` and its descendants paired with their destinations under
    /// `to`, parents before children.
    fn plan_moves(&self, from: &Path, to: &Path) -> Vec<(PathBuf, PathBuf)> {
        let mut moves: Vec<(PathBuf, PathBuf)> = self
            .files
            .keys()
            .filter_map(|old| rebase(old, from, to).map(|new| (old.clone(), new)))
            .collect();
        moves.sort_by_key(|(old, _)| old.components().count());
        moves
    }

    /// Move a single path. The destination's parent is either an earlier
    /// move or gets created.
    fn move_entry(&mut self, from: &Path, to: &Path) {
        let node = self.must_get(from).node().clone();

        self.files.remove(from);
        if let Some(entries) = self.children.remove(from) {
            self.children.insert(to.to_path_buf(), entries);
        }
        if let Some(parent) = from.parent() {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.remove(&base_name(from));
            }
        }

        self.files.insert(to.to_path_buf(), node.clone());
        self.attach(to, MOVE_PARENT_PERM, &node);
    }

    /// Assert that both indexes agree about the tree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for (path, node) in &self.files {
            for ancestor in path.ancestors().skip(1) {
                let dir = self.files.get(ancestor);
                assert!(
                    dir.is_some_and(NodeRef::is_dir),
                    "{} has no directory ancestor {}",
                    path.display(),
                    ancestor.display()
                );
            }
            if let Some(parent) = path.parent() {
                let entry = self.children.get(parent).and_then(|e| e.get(&base_name(path)));
                assert!(
                    entry.is_some_and(|n| n.ptr_eq(node)),
                    "{} not listed under {}",
                    path.display(),
                    parent.display()
                );
            }
            assert_eq!(node.is_dir(), self.children.contains_key(path));
        }
        for (dir, entries) in &self.children {
            for (name, node) in entries {
                let child = self.files.get(&dir.join(name));
                assert!(
                    child.is_some_and(|n| n.ptr_eq(node)),
                    "{}/{} listed but not indexed",
                    dir.display(),
                    name
                );
            }
        }
        let files = self.files.values().filter(|n| !n.is_dir()).count() as u64;
        assert_eq!(files, self.file_count);
    }
}
