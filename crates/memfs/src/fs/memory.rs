//! In-memory filesystem implementation

use async_trait::async_trait;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::file::OpenFlags;
use super::handle::FileHandle;
use super::limits::{FsLimits, FsUsage};
use super::node::Mode;
use super::path::normalize;
use super::storage::Storage;
use super::traits::{FileSystem, Metadata};
use crate::error::{Error, Result};
use crate::logging::fs_debug;

/// In-memory filesystem.
///
/// A [`Storage`] behind a lock. Every call takes the lock once and releases
/// it before returning, so concurrent callers see each operation as atomic.
pub struct InMemoryFs {
    storage: RwLock<Storage>,
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFs {
    /// Create a new in-memory filesystem holding only `/`.
    pub fn new() -> Self {
        Self::with_limits(FsLimits::default())
    }

    /// Create a new in-memory filesystem with custom limits.
    ///
    /// ```rust
    /// use memfs::{FileSystem, FsLimits, InMemoryFs};
    /// use std::path::Path;
    ///
    /// # tokio_test::block_on(async {
    /// let fs = InMemoryFs::with_limits(FsLimits::new().max_file_size(4));
    /// assert!(fs.write_file(Path::new("/big"), b"12345", 0o644).await.is_err());
    /// # });
    /// ```
    pub fn with_limits(limits: FsLimits) -> Self {
        Self {
            storage: RwLock::new(Storage::with_limits(limits)),
        }
    }

    fn read_storage(&self) -> RwLockReadGuard<'_, Storage> {
        self.storage.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_storage(&self) -> RwLockWriteGuard<'_, Storage> {
        self.storage.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn open_file(&self, path: &Path, flags: OpenFlags, perm: u32) -> Result<FileHandle> {
        let mut storage = self.write_storage();

        let file = match storage.get(path) {
            Some(file) if file.is_dir() => return Err(Error::IsADirectory(normalize(path))),
            Some(_) if flags.create_new => return Err(Error::AlreadyExists(normalize(path))),
            Some(file) => {
                let file = file.with_flags(flags);
                if flags.truncate && flags.is_writable() {
                    file.truncate(0);
                }
                file
            }
            None if !flags.create => return Err(Error::NotFound(normalize(path))),
            None => storage
                .create(path, Mode::file(perm), flags)?
                .ok_or_else(|| Error::IsADirectory(normalize(path)))?,
        };

        fs_debug!(path = %path.display(), ?flags, "opened");
        Ok(FileHandle::new(file, storage.limits()))
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let storage = self.read_storage();
        match storage.get(path) {
            Some(file) if file.is_dir() => Err(Error::IsADirectory(normalize(path))),
            Some(file) => Ok(file.contents()),
            None => Err(Error::NotFound(normalize(path))),
        }
    }

    async fn write_file(&self, path: &Path, content: &[u8], perm: u32) -> Result<()> {
        let mut storage = self.write_storage();
        storage.limits().check_file_size(content.len() as u64)?;

        let file = match storage.get(path) {
            Some(file) if file.is_dir() => return Err(Error::IsADirectory(normalize(path))),
            Some(file) => file,
            None => storage
                .create(path, Mode::file(perm), OpenFlags::create_truncate())?
                .ok_or_else(|| Error::IsADirectory(normalize(path)))?,
        };

        file.replace_contents(content);
        Ok(())
    }

    async fn mkdir_all(&self, path: &Path, perm: u32) -> Result<()> {
        let mut storage = self.write_storage();
        storage.create(path, Mode::dir(perm), OpenFlags::default())?;
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<Metadata> {
        let storage = self.read_storage();
        storage
            .get(path)
            .map(|file| file.metadata())
            .ok_or_else(|| Error::NotFound(normalize(path)))
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<Metadata>> {
        let storage = self.read_storage();
        match storage.get(path) {
            Some(dir) if dir.is_dir() => {}
            Some(_) => return Err(Error::NotADirectory(normalize(path))),
            None => return Err(Error::NotFound(normalize(path))),
        }

        let mut entries: Vec<Metadata> = storage
            .children(path)
            .iter()
            .map(|file| file.metadata())
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.read_storage().has(path))
    }

    async fn link(&self, target: &Path, link: &Path) -> Result<()> {
        self.write_storage().link(target, link)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.write_storage().rename(from, to)
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        self.write_storage().remove(path)
    }

    async fn chmod(&self, path: &Path, perm: u32) -> Result<()> {
        let storage = self.read_storage();
        let file = storage
            .get(path)
            .ok_or_else(|| Error::NotFound(normalize(path)))?;
        file.node().set_perm(perm);
        Ok(())
    }

    fn usage(&self) -> FsUsage {
        self.read_storage().usage()
    }

    fn limits(&self) -> FsLimits {
        self.read_storage().limits().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::traits::FileType;
    use std::io::{Read, Write};

    #[tokio::test]
    async fn test_write_and_read_file() {
        let fs = InMemoryFs::new();

        fs.write_file(Path::new("/tmp/test.txt"), b"hello world", 0o644)
            .await
            .unwrap();

        let content = fs.read_file(Path::new("/tmp/test.txt")).await.unwrap();
        assert_eq!(content, b"hello world");
        assert!(fs.stat(Path::new("/tmp")).await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_write_file_replaces_content() {
        let fs = InMemoryFs::new();
        let path = Path::new("/f");
        fs.write_file(path, b"a long first version", 0o644)
            .await
            .unwrap();
        fs.write_file(path, b"short", 0o600).await.unwrap();

        assert_eq!(fs.read_file(path).await.unwrap(), b"short");
        // Permissions of an existing file are kept.
        assert_eq!(fs.stat(path).await.unwrap().mode, Mode::file(0o644).bits());
    }

    #[tokio::test]
    async fn test_write_file_never_exposes_empty_content_to_open_handle() {
        let fs = std::sync::Arc::new(InMemoryFs::new());
        let path = Path::new("/f");
        fs.write_file(path, b"aaaa", 0o644).await.unwrap();
        let handle = fs.open(path).await.unwrap();

        let writer = std::sync::Arc::clone(&fs);
        let task = std::thread::spawn(move || {
            for i in 0..2_000 {
                let data: &[u8] = if i % 2 == 0 { b"bbbb" } else { b"aaaa" };
                tokio_test::block_on(writer.write_file(Path::new("/f"), data, 0o644)).unwrap();
            }
        });
        for _ in 0..2_000 {
            assert_eq!(handle.file().len(), 4);
        }
        task.join().unwrap();
    }

    #[tokio::test]
    async fn test_mkdir_all_and_read_dir() {
        let fs = InMemoryFs::new();

        fs.mkdir_all(Path::new("/a/b"), 0o755).await.unwrap();
        fs.mkdir_all(Path::new("/a/b"), 0o755).await.unwrap();
        fs.write_file(Path::new("/a/z.txt"), b"z", 0o644)
            .await
            .unwrap();
        fs.write_file(Path::new("/a/c.txt"), b"c", 0o644)
            .await
            .unwrap();

        let entries = fs.read_dir(Path::new("/a")).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c.txt", "z.txt"]);
        assert_eq!(entries[0].file_type, FileType::Directory);
    }

    #[tokio::test]
    async fn test_mkdir_all_over_file_fails() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/f"), b"", 0o644).await.unwrap();
        let err = fs.mkdir_all(Path::new("/f"), 0o755).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_read_dir_errors() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/f"), b"", 0o644).await.unwrap();

        assert!(
            fs.read_dir(Path::new("/missing"))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(matches!(
            fs.read_dir(Path::new("/f")).await.unwrap_err(),
            Error::NotADirectory(_)
        ));
    }

    #[tokio::test]
    async fn test_exists() {
        let fs = InMemoryFs::new();

        assert!(fs.exists(Path::new("/")).await.unwrap());
        assert!(!fs.exists(Path::new("/tmp/nonexistent")).await.unwrap());
    }

    #[tokio::test]
    async fn test_open_missing_without_create() {
        let fs = InMemoryFs::new();
        let err = fs.open(Path::new("/nope")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_open_directory_fails() {
        let fs = InMemoryFs::new();
        fs.mkdir_all(Path::new("/d"), 0o755).await.unwrap();
        assert!(matches!(
            fs.open(Path::new("/d")).await.unwrap_err(),
            Error::IsADirectory(_)
        ));
    }

    #[tokio::test]
    async fn test_create_new_rejects_existing() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/f"), b"x", 0o644).await.unwrap();

        let flags = OpenFlags::write_only().create(true).create_new(true);
        let err = fs
            .open_file(Path::new("/f"), flags, 0o644)
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_create_truncates_existing() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/f"), b"old content", 0o644)
            .await
            .unwrap();

        let mut handle = fs.create(Path::new("/f"), 0o644).await.unwrap();
        handle.write_all(b"new").unwrap();

        assert_eq!(fs.read_file(Path::new("/f")).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_create_makes_parents_with_perm() {
        let fs = InMemoryFs::new();
        fs.create(Path::new("/x/y/file"), 0o640).await.unwrap();

        let dir = fs.stat(Path::new("/x/y")).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir.mode, Mode::dir(0o640).bits());
    }

    #[tokio::test]
    async fn test_append_handle() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/log"), b"one\n", 0o644)
            .await
            .unwrap();

        let flags = OpenFlags::write_only().append(true);
        let mut handle = fs.open_file(Path::new("/log"), flags, 0).await.unwrap();
        handle.write_all(b"two\n").unwrap();

        assert_eq!(fs.read_file(Path::new("/log")).await.unwrap(), b"one\ntwo\n");
    }

    #[tokio::test]
    async fn test_handle_outlives_removed_path() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/f"), b"still here", 0o644)
            .await
            .unwrap();

        let mut handle = fs.open(Path::new("/f")).await.unwrap();
        fs.remove(Path::new("/f")).await.unwrap();

        let mut content = String::new();
        handle.read_to_string(&mut content).unwrap();
        assert_eq!(content, "still here");
    }

    #[tokio::test]
    async fn test_chmod_shares_the_storage_with_readers() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/f"), b"x", 0o644).await.unwrap();

        let reader = fs.read_storage();
        fs.chmod(Path::new("/f"), 0o600).await.unwrap();
        drop(reader);

        assert_eq!(fs.stat(Path::new("/f")).await.unwrap().mode, Mode::file(0o600).bits());
    }

    #[tokio::test]
    async fn test_chmod_keeps_type() {
        let fs = InMemoryFs::new();
        fs.mkdir_all(Path::new("/d"), 0o755).await.unwrap();
        fs.chmod(Path::new("/d"), 0o700).await.unwrap();

        let meta = fs.stat(Path::new("/d")).await.unwrap();
        assert!(meta.is_dir());
        assert_eq!(meta.mode, Mode::dir(0o700).bits());
        assert!(
            fs.chmod(Path::new("/missing"), 0o700)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_chmod_through_link_changes_target() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/f"), b"", 0o644).await.unwrap();
        fs.link(Path::new("/f"), Path::new("/l")).await.unwrap();
        fs.chmod(Path::new("/l"), 0o600).await.unwrap();

        assert_eq!(
            fs.stat(Path::new("/f")).await.unwrap().mode,
            Mode::file(0o600).bits()
        );
    }

    #[tokio::test]
    async fn test_file_size_limit() {
        let fs = InMemoryFs::with_limits(FsLimits::new().max_file_size(8));

        fs.write_file(Path::new("/ok"), b"12345678", 0o644)
            .await
            .unwrap();
        let err = fs
            .write_file(Path::new("/big"), b"123456789", 0o644)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ResourceLimit(_)));
        assert!(!fs.exists(Path::new("/big")).await.unwrap());
        assert_eq!(fs.limits().max_file_size, 8);
    }

    #[tokio::test]
    async fn test_usage() {
        let fs = InMemoryFs::new();
        fs.write_file(Path::new("/d/a"), b"abc", 0o644)
            .await
            .unwrap();
        fs.link(Path::new("/d/a"), Path::new("/b")).await.unwrap();

        let usage = fs.usage();
        assert_eq!(usage.total_bytes, 3);
        assert_eq!(usage.file_count, 2);
        assert_eq!(usage.dir_count, 2);
    }

    #[tokio::test]
    async fn test_trait_object() {
        let fs: Box<dyn FileSystem> = Box::new(InMemoryFs::new());
        fs.write_file(Path::new("/f"), b"dyn", 0o644).await.unwrap();
        assert_eq!(fs.read_file(Path::new("/f")).await.unwrap(), b"dyn");
    }
}
