//! Open file handles with a cursor.

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::file::File;
use super::limits::{FsLimitExceeded, FsLimits};
use super::traits::Metadata;
use crate::error::Error;

/// A [`File`] view plus a read/write position.
///
/// Handles keep their node alive: removing every path to a file does not
/// invalidate a handle already open on it.
///
/// # Example
///
/// ```rust
/// use memfs::{FileSystem, InMemoryFs};
/// use std::io::{Read, Seek, SeekFrom, Write};
/// use std::path::Path;
///
/// # tokio_test::block_on(async {
/// let fs = InMemoryFs::new();
/// let mut handle = fs.create(Path::new("/notes"), 0o644).await?;
/// handle.write_all(b"hello world")?;
/// handle.seek(SeekFrom::Start(6))?;
///
/// let mut rest = String::new();
/// handle.read_to_string(&mut rest)?;
/// assert_eq!(rest, "world");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileHandle {
    file: File,
    position: u64,
    max_file_size: u64,
}

impl FileHandle {
    pub fn new(file: File, limits: &FsLimits) -> Self {
        Self {
            file,
            position: 0,
            max_file_size: limits.max_file_size,
        }
    }

    pub fn name(&self) -> &str {
        self.file.name()
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn metadata(&self) -> Metadata {
        self.file.metadata()
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Shrink or zero-extend the file. The cursor does not move.
    pub fn set_len(&self, len: u64) -> io::Result<()> {
        self.ensure_writable()?;
        self.check_size(len)?;
        let len = usize::try_from(len)
            .map_err(|_| Error::InvalidArgument(format!("length {len} is not addressable")))?;
        self.file.truncate(len);
        Ok(())
    }

    fn ensure_writable(&self) -> io::Result<()> {
        if self.file.flags().is_writable() {
            return Ok(());
        }
        Err(Error::BadFileDescriptor(format!("{} is not open for writing", self.file.name())).into())
    }

    fn check_size(&self, size: u64) -> io::Result<()> {
        if size > self.max_file_size {
            let exceeded = FsLimitExceeded::FileSize {
                size,
                limit: self.max_file_size,
            };
            return Err(Error::from(exceeded).into());
        }
        Ok(())
    }

    fn offset(&self) -> io::Result<i64> {
        i64::try_from(self.position).map_err(|_| {
            Error::InvalidArgument(format!("position {} is not addressable", self.position)).into()
        })
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.file.flags().read {
            return Err(Error::BadFileDescriptor(format!(
                "{} is not open for reading",
                self.file.name()
            ))
            .into());
        }
        let n = self.file.read_at(buf, self.offset()?)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_writable()?;
        if self.file.flags().append {
            self.position = self.file.len();
        }

        let end = self.position.saturating_add(buf.len() as u64);
        if end > self.file.len() {
            self.check_size(end)?;
        }

        let n = self.file.write_at(buf, self.offset()?)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.file.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        match target {
            Some(position) => {
                self.position = position;
                Ok(position)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            )),
        }
    }
}
