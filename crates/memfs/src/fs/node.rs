//! Nodes: the shared identity behind one or more paths.
//!
//! A hard link is two index entries holding clones of the same [`NodeRef`];
//! there is no separate link type. The node lives as long as the longest
//! surviving path, view or handle.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::content::Content;
use super::traits::FileType;
use crate::error::Result;

/// File type mask (`S_IFMT`).
pub const S_IFMT: u32 = 0o170_000;
/// Directory type bits (`S_IFDIR`).
pub const S_IFDIR: u32 = 0o040_000;
/// Regular file type bits (`S_IFREG`).
pub const S_IFREG: u32 = 0o100_000;
/// Permission bits, including setuid/setgid/sticky.
pub const PERM_MASK: u32 = 0o7777;

/// Type and permission bits in POSIX `st_mode` layout.
///
/// Permission bits are stored and reported, never enforced.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode(u32);

impl Mode {
    /// Mode from raw bits. Bits without a type are a regular file.
    pub const fn from_bits(bits: u32) -> Self {
        if bits & S_IFMT == 0 {
            Self(bits | S_IFREG)
        } else {
            Self(bits)
        }
    }

    /// Regular file with the given permissions.
    pub const fn file(perm: u32) -> Self {
        Self(S_IFREG | (perm & PERM_MASK))
    }

    /// Directory with the given permissions.
    pub const fn dir(perm: u32) -> Self {
        Self(S_IFDIR | (perm & PERM_MASK))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn perm(self) -> u32 {
        self.0 & PERM_MASK
    }

    pub const fn is_dir(self) -> bool {
        self.0 & S_IFMT == S_IFDIR
    }

    pub fn file_type(self) -> FileType {
        if self.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        }
    }

    /// Same type, new permissions.
    pub const fn with_perm(self, perm: u32) -> Self {
        Self((self.0 & !PERM_MASK) | (perm & PERM_MASK))
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mode({:o})", self.0)
    }
}

/// One physical file or directory.
#[derive(Debug)]
pub struct Node {
    mode: Mode,
    content: Content,
}

impl Node {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            content: Content::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn content(&self) -> &Content {
        &self.content
    }
}

/// Shared reference to a [`Node`].
///
/// Clones alias the same node: a write through one clone is visible through
/// every other immediately.
#[derive(Clone)]
pub struct NodeRef(Arc<RwLock<Node>>);

impl NodeRef {
    pub fn new(node: Node) -> Self {
        Self(Arc::new(RwLock::new(node)))
    }

    // A panic while holding the guard leaves the buffer in a valid state
    // (every mutation is a single resize/copy), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Node> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Node> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> Mode {
        self.read().mode
    }

    pub fn is_dir(&self) -> bool {
        self.mode().is_dir()
    }

    pub fn set_perm(&self, perm: u32) {
        let mut node = self.write();
        node.mode = node.mode.with_perm(perm);
    }

    pub fn len(&self) -> u64 {
        self.read().content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.read().content.is_empty()
    }

    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        self.read().content.read_at(buf, offset)
    }

    pub fn write_at(&self, data: &[u8], offset: i64) -> Result<usize> {
        self.write().content.write_at(data, offset)
    }

    pub fn truncate(&self, len: usize) {
        self.write().content.truncate(len);
    }

    /// Swap in new content under one write guard, so readers see either
    /// the old bytes or the new ones.
    pub fn replace_contents(&self, data: &[u8]) {
        self.write().content.replace(data);
    }

    /// Copy of the whole content.
    pub fn contents(&self) -> Vec<u8> {
        self.read().content.as_slice().to_vec()
    }

    /// True if both references point at the same node.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable identity for de-duplicating aliases.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.read();
        f.debug_struct("NodeRef")
            .field("mode", &node.mode)
            .field("len", &node.content.len())
            .finish()
    }
}
