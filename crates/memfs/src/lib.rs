//! memfs - In-memory path-tree file store with hard links
//!
//! Files, directories, hard links, rename and removal, held entirely in
//! memory behind an async [`FileSystem`] trait. Any other implementation of
//! the trait can be checked against the same behavior with [`conformance`].
//!
//! # Example
//!
//! ```rust
//! use memfs::{FileSystem, InMemoryFs};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let fs = InMemoryFs::new();
//!     fs.write_file(Path::new("/dir/file"), b"hello", 0o644).await?;
//!     fs.link(Path::new("/dir/file"), Path::new("/link")).await?;
//!
//!     fs.rename(Path::new("/dir"), Path::new("/moved")).await?;
//!     assert_eq!(fs.read_file(Path::new("/link")).await?, b"hello");
//!     assert_eq!(fs.read_file(Path::new("/moved/file")).await?, b"hello");
//!     Ok(())
//! }
//! ```
//!
//! # Engine
//!
//! [`Storage`] is the synchronous engine underneath [`InMemoryFs`]. It does
//! no locking of its own and can be used directly when a single owner is
//! enough.
//!
//! # Logging
//!
//! Enable the `logging` feature to emit `tracing` events (target `memfs`)
//! for every mutation.

mod error;
mod fs;
mod logging;

pub mod conformance;

pub use async_trait::async_trait;
pub use error::{Error, Result};
pub use fs::{
    Content, DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILENAME_LENGTH,
    DEFAULT_MAX_PATH_DEPTH, DEFAULT_MAX_PATH_LENGTH, File, FileHandle, FileSystem, FileType,
    FsLimitExceeded, FsLimits, FsUsage, InMemoryFs, Metadata, Mode, Node, NodeRef, OpenFlags,
    PERM_MASK, S_IFDIR, S_IFMT, S_IFREG, Storage, is_descendant, normalize,
};
