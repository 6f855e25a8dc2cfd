//! File views handed out by lookups and creates.

use super::node::{Mode, NodeRef};
use super::traits::Metadata;
use crate::error::Result;

/// Open flags carried by a view.
///
/// Storage only records them; [`FileHandle`](crate::FileHandle) and the
/// facade interpret them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
    pub create_new: bool,
}

impl OpenFlags {
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    pub fn write_only() -> Self {
        Self {
            write: true,
            ..Self::default()
        }
    }

    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Self::default()
        }
    }

    /// Read-write, creating the file or truncating it if present.
    pub fn create_truncate() -> Self {
        Self {
            create: true,
            truncate: true,
            ..Self::read_write()
        }
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    pub fn is_writable(&self) -> bool {
        self.write || self.append
    }
}

/// A named projection of a node.
///
/// Views are not stored anywhere: two views of the same path are
/// independent values sharing the node.
#[derive(Debug, Clone)]
pub struct File {
    name: String,
    flags: OpenFlags,
    node: NodeRef,
}

impl File {
    pub(crate) fn new(name: impl Into<String>, flags: OpenFlags, node: NodeRef) -> Self {
        Self {
            name: name.into(),
            flags,
            node,
        }
    }

    /// Same view with different flags.
    pub fn with_flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn mode(&self) -> Mode {
        self.node.mode()
    }

    pub fn is_dir(&self) -> bool {
        self.node.is_dir()
    }

    pub fn len(&self) -> u64 {
        self.node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }

    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        self.node.read_at(buf, offset)
    }

    pub fn write_at(&self, data: &[u8], offset: i64) -> Result<usize> {
        self.node.write_at(data, offset)
    }

    pub fn truncate(&self, len: usize) {
        self.node.truncate(len);
    }

    /// Replace the node's content in one step.
    pub fn replace_contents(&self, data: &[u8]) {
        self.node.replace_contents(data);
    }

    /// Copy of the node's whole content.
    pub fn contents(&self) -> Vec<u8> {
        self.node.contents()
    }

    pub fn metadata(&self) -> Metadata {
        let mode = self.mode();
        Metadata {
            name: self.name.clone(),
            file_type: mode.file_type(),
            size: self.len(),
            mode: mode.bits(),
        }
    }

    /// True if both views reach the same node (hard links included).
    pub fn same_node(&self, other: &File) -> bool {
        self.node.ptr_eq(&other.node)
    }

    pub(crate) fn node(&self) -> &NodeRef {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::node::Node;
    use crate::fs::traits::FileType;

    #[test]
    fn test_views_of_one_node_share_bytes() {
        let node = NodeRef::new(Node::new(Mode::file(0o644)));
        let a = File::new("a", OpenFlags::read_write(), node.clone());
        let b = File::new("b", OpenFlags::read_only(), node);

        a.write_at(b"hello", 0).unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(b.read_at(&mut buf, 0).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert!(a.same_node(&b));
        assert_eq!(b.name(), "b");
    }

    #[test]
    fn test_metadata() {
        let node = NodeRef::new(Node::new(Mode::dir(0o755)));
        let meta = File::new("dir", OpenFlags::default(), node).metadata();
        assert_eq!(meta.name, "dir");
        assert_eq!(meta.file_type, FileType::Directory);
        assert_eq!(meta.size, 0);
        assert_eq!(meta.mode, Mode::dir(0o755).bits());
    }

    #[test]
    fn test_flags_builders() {
        let flags = OpenFlags::write_only().append(true).create(true);
        assert!(flags.is_writable());
        assert!(flags.append && flags.create && !flags.read);
        assert!(!OpenFlags::read_only().is_writable());
        assert!(OpenFlags::create_truncate().truncate);
    }
}
