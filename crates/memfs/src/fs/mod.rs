//! In-memory filesystem for memfs
//!
//! Layers, bottom to top:
//! - [`Content`]: growable byte buffer with positional I/O
//! - [`NodeRef`]: shared node; hard links are clones of one reference
//! - [`Storage`]: the path tree, two indexes kept in lockstep
//! - [`File`] and [`FileHandle`]: views and cursors over a node
//! - [`InMemoryFs`]: [`FileSystem`] facade over a locked `Storage`

mod content;
mod file;
mod handle;
mod limits;
mod memory;
mod node;
mod path;
mod storage;
mod traits;

pub use content::Content;
pub use file::{File, OpenFlags};
pub use handle::FileHandle;
pub use limits::{
    DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_FILENAME_LENGTH,
    DEFAULT_MAX_PATH_DEPTH, DEFAULT_MAX_PATH_LENGTH, FsLimitExceeded, FsLimits, FsUsage,
};
pub use memory::InMemoryFs;
pub use node::{Mode, Node, NodeRef, PERM_MASK, S_IFDIR, S_IFMT, S_IFREG};
pub use path::{is_descendant, normalize};
pub use storage::Storage;
pub use traits::{FileSystem, FileType, Metadata};
