//! Filesystem trait definitions

use async_trait::async_trait;
use std::path::Path;

use super::file::OpenFlags;
use super::handle::FileHandle;
use super::limits::{FsLimits, FsUsage};
use crate::error::Result;

/// Async filesystem trait.
///
/// The capability surface the [`conformance`](crate::conformance) suite
/// exercises. Paths may be relative; implementations resolve them against
/// the root.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Open a file with explicit flags and creation permissions.
    ///
    /// # Errors
    /// - `NotFound` if the path is missing and `flags.create` is unset
    /// - `AlreadyExists` if the path exists and `flags.create_new` is set
    /// - `IsADirectory` if the path names a directory
    async fn open_file(&self, path: &Path, flags: OpenFlags, perm: u32) -> Result<FileHandle>;

    /// Open a file for reading.
    async fn open(&self, path: &Path) -> Result<FileHandle> {
        self.open_file(path, OpenFlags::read_only(), 0).await
    }

    /// Create or truncate a file, opened read-write.
    async fn create(&self, path: &Path, perm: u32) -> Result<FileHandle> {
        self.open_file(path, OpenFlags::create_truncate(), perm).await
    }

    /// Read a file's contents.
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace a file's contents, creating it and its parents if needed.
    async fn write_file(&self, path: &Path, content: &[u8], perm: u32) -> Result<()>;

    /// Create a directory and any missing parents.
    ///
    /// # Errors
    /// - `AlreadyExists` if the path names a file
    /// - `NotADirectory` if an ancestor is a file
    async fn mkdir_all(&self, path: &Path, perm: u32) -> Result<()>;

    /// Get metadata. The name is the last segment of the path used.
    async fn stat(&self, path: &Path) -> Result<Metadata>;

    /// List a directory's immediate entries, sorted by name.
    async fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>>;

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Make `link` a hard link to the node at `target`.
    async fn link(&self, target: &Path, link: &Path) -> Result<()>;

    /// Rename a path together with everything below it.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a file, link or empty directory.
    async fn remove(&self, path: &Path) -> Result<()>;

    /// Change permission bits. Type bits are kept.
    async fn chmod(&self, path: &Path, perm: u32) -> Result<()>;

    /// Get storage usage statistics.
    fn usage(&self) -> FsUsage {
        FsUsage::default()
    }

    /// Get the limits this filesystem enforces.
    fn limits(&self) -> FsLimits {
        FsLimits::unlimited()
    }
}

/// File metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Last segment of the path the node was reached by
    pub name: String,
    /// File type
    pub file_type: FileType,
    /// File size in bytes
    pub size: u64,
    /// Type and permission bits (Unix `st_mode` layout)
    pub mode: u32,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.file_type.is_dir()
    }
}

/// File type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
}

impl FileType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}
