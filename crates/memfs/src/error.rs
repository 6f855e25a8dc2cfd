//! Error types for memfs
//!
//! Errors name the normalized path they concern and map onto
//! [`std::io::ErrorKind`] so callers can branch on the category
//! (missing, colliding, non-empty, invalid) instead of on message text.

use crate::fs::FsLimitExceeded;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using memfs's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// memfs error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Path, link target or parent directory does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path collision on create or link.
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Directory still has entries.
    #[error("directory not empty: {}", .0.display())]
    NotEmpty(PathBuf),

    /// A directory was required but the path names a file.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A file was required but the path names a directory.
    #[error("is a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    /// Read or write at an offset below zero.
    #[error("negative offset: {0}")]
    NegativeOffset(i64),

    /// Request that can never succeed, whatever the tree looks like.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Handle was not opened with the access the operation needs.
    #[error("bad file descriptor: {0}")]
    BadFileDescriptor(String),

    /// Filesystem limit exceeded.
    #[error("resource limit exceeded: {0}")]
    ResourceLimit(#[from] FsLimitExceeded),
}

impl Error {
    /// Category of this error as a standard I/O error kind.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Error::NotFound(_) => io::ErrorKind::NotFound,
            Error::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            Error::NotEmpty(_) => io::ErrorKind::DirectoryNotEmpty,
            Error::NotADirectory(_) => io::ErrorKind::NotADirectory,
            Error::IsADirectory(_) => io::ErrorKind::IsADirectory,
            Error::NegativeOffset(_) | Error::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            Error::BadFileDescriptor(_) => io::ErrorKind::PermissionDenied,
            Error::ResourceLimit(FsLimitExceeded::FileSize { .. }) => io::ErrorKind::FileTooLarge,
            Error::ResourceLimit(_) => io::ErrorKind::Other,
        }
    }

    /// True if the error reports a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True if the error reports a path collision.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    /// True if the error reports a non-empty directory.
    pub fn is_not_empty(&self) -> bool {
        matches!(self, Error::NotEmpty(_))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(err.kind(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::NotFound(PathBuf::from("/a")).kind(),
            io::ErrorKind::NotFound
        );
        assert_eq!(
            Error::NotEmpty(PathBuf::from("/d")).kind(),
            io::ErrorKind::DirectoryNotEmpty
        );
        assert_eq!(Error::NegativeOffset(-1).kind(), io::ErrorKind::InvalidInput);
        assert_eq!(
            Error::ResourceLimit(FsLimitExceeded::FileSize { size: 9, limit: 8 }).kind(),
            io::ErrorKind::FileTooLarge
        );
    }

    #[test]
    fn test_into_io_error_keeps_kind_and_message() {
        let err: io::Error = Error::AlreadyExists(PathBuf::from("/link")).into();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(err.to_string(), "already exists: /link");
    }
}
