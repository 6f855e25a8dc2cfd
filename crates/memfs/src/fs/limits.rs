//! Resource limits for the in-memory store.
//!
//! Every path a mutation would add to the tree is checked before the tree is
//! touched, so a rejected call leaves both indexes exactly as they were.

use std::path::{Component, Path};
use thiserror::Error;

/// Default maximum single file size: 10MB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10_000_000;

/// Default maximum number of file paths (links included): 10,000
pub const DEFAULT_MAX_FILE_COUNT: u64 = 10_000;

/// Default maximum path depth (directory nesting): 100
pub const DEFAULT_MAX_PATH_DEPTH: usize = 100;

/// Default maximum filename (single component) length: 255 bytes
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 255;

/// Default maximum total path length: 4096 bytes
pub const DEFAULT_MAX_PATH_LENGTH: usize = 4096;

/// Filesystem resource limits.
///
/// Applied by [`Storage`](crate::Storage) to paths and file counts, and by
/// [`FileHandle`](crate::FileHandle) to file sizes.
///
/// # Example
///
/// ```rust
/// use memfs::{FsLimits, InMemoryFs};
///
/// let limits = FsLimits::new()
///     .max_file_size(1_000_000)
///     .max_file_count(100);
///
/// let fs = InMemoryFs::with_limits(limits);
/// ```
///
/// # Default Limits
///
/// | Limit | Default | Purpose |
/// |-------|---------|---------|
/// | `max_file_size` | 10MB | Single file size |
/// | `max_file_count` | 10,000 | Number of file paths |
/// | `max_path_depth` | 100 | Directory nesting depth |
/// | `max_filename_length` | 255 | Single path component |
/// | `max_path_length` | 4096 | Total path length |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsLimits {
    /// Maximum size of a single file in bytes.
    pub max_file_size: u64,

    /// Maximum number of non-directory paths. Each hard link counts.
    pub max_file_count: u64,

    /// Maximum directory nesting depth.
    pub max_path_depth: usize,

    /// Maximum length of a single path component in bytes.
    pub max_filename_length: usize,

    /// Maximum total path length in bytes.
    pub max_path_length: usize,
}

impl Default for FsLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
        }
    }
}

impl FsLimits {
    /// Create new limits with defaults.
    ///
    /// ```rust
    /// use memfs::FsLimits;
    ///
    /// let limits = FsLimits::new();
    /// assert_eq!(limits.max_file_size, 10_000_000);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Create unlimited limits (no restrictions).
    pub fn unlimited() -> Self {
        Self {
            max_file_size: u64::MAX,
            max_file_count: u64::MAX,
            max_path_depth: usize::MAX,
            max_filename_length: usize::MAX,
            max_path_length: usize::MAX,
        }
    }

    /// Set maximum single file size.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set maximum file count.
    pub fn max_file_count(mut self, count: u64) -> Self {
        self.max_file_count = count;
        self
    }

    /// Set maximum path depth (directory nesting).
    pub fn max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Set maximum filename (single component) length.
    pub fn max_filename_length(mut self, len: usize) -> Self {
        self.max_filename_length = len;
        self
    }

    /// Set maximum total path length.
    pub fn max_path_length(mut self, len: usize) -> Self {
        self.max_path_length = len;
        self
    }

    /// Validate a normalized path against depth, length and character limits.
    pub fn validate_path(&self, path: &Path) -> Result<(), FsLimitExceeded> {
        let path_str = path.to_string_lossy();
        if path_str.len() > self.max_path_length {
            return Err(FsLimitExceeded::PathTooLong {
                length: path_str.len(),
                limit: self.max_path_length,
            });
        }

        let mut depth: usize = 0;
        for component in path.components() {
            if let Component::Normal(name) = component {
                let name_str = name.to_string_lossy();
                if name_str.len() > self.max_filename_length {
                    return Err(FsLimitExceeded::FilenameTooLong {
                        length: name_str.len(),
                        limit: self.max_filename_length,
                    });
                }
                if let Some(bad_char) = find_unsafe_path_char(&name_str) {
                    return Err(FsLimitExceeded::UnsafePathChar {
                        character: bad_char,
                        component: name_str.to_string(),
                    });
                }
                depth += 1;
            }
        }

        if depth > self.max_path_depth {
            return Err(FsLimitExceeded::PathTooDeep {
                depth,
                limit: self.max_path_depth,
            });
        }

        Ok(())
    }

    /// Check if a file size exceeds the limit.
    pub fn check_file_size(&self, size: u64) -> Result<(), FsLimitExceeded> {
        if size > self.max_file_size {
            return Err(FsLimitExceeded::FileSize {
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }

    /// Check if adding a file path would exceed the count limit.
    pub fn check_file_count(&self, current: u64) -> Result<(), FsLimitExceeded> {
        if current >= self.max_file_count {
            return Err(FsLimitExceeded::FileCount {
                current,
                limit: self.max_file_count,
            });
        }
        Ok(())
    }
}

/// Returns a description of the first control or bidi-override character.
fn find_unsafe_path_char(name: &str) -> Option<String> {
    for ch in name.chars() {
        if ch.is_ascii_control() || ('\u{0080}'..='\u{009F}').contains(&ch) {
            return Some(format!("U+{:04X}", ch as u32));
        }
        if ('\u{202A}'..='\u{202E}').contains(&ch) || ('\u{2066}'..='\u{2069}').contains(&ch) {
            return Some(format!("U+{:04X} (bidi override)", ch as u32));
        }
    }
    None
}

/// Error returned when a filesystem limit is exceeded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsLimitExceeded {
    /// Single file size exceeds limit.
    #[error("file too large: {size} bytes exceeds {limit} byte limit")]
    FileSize { size: u64, limit: u64 },

    /// File count would exceed limit.
    #[error("too many files: {current} files at {limit} file limit")]
    FileCount { current: u64, limit: u64 },

    /// Path depth (nesting) exceeds limit.
    #[error("path too deep: {depth} levels exceeds {limit} level limit")]
    PathTooDeep { depth: usize, limit: usize },

    /// Single filename component exceeds length limit.
    #[error("filename too long: {length} bytes exceeds {limit} byte limit")]
    FilenameTooLong { length: usize, limit: usize },

    /// Total path exceeds length limit.
    #[error("path too long: {length} bytes exceeds {limit} byte limit")]
    PathTooLong { length: usize, limit: usize },

    /// Path contains a control or bidi-override character.
    #[error("unsafe character {character} in path component '{component}'")]
    UnsafePathChar { character: String, component: String },
}

/// Current filesystem usage statistics.
///
/// Returned by [`FileSystem::usage()`](crate::FileSystem::usage).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsUsage {
    /// Bytes held by distinct file nodes. Hard links are counted once.
    pub total_bytes: u64,
    /// Number of non-directory paths, links included.
    pub file_count: u64,
    /// Number of directories, root included.
    pub dir_count: u64,
}

impl FsUsage {
    /// Create new usage stats.
    pub fn new(total_bytes: u64, file_count: u64, dir_count: u64) -> Self {
        Self {
            total_bytes,
            file_count,
            dir_count,
        }
    }
}
