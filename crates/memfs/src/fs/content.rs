//! Byte buffer owned by a file node.

use crate::error::{Error, Result};

/// Growable in-memory file content with positional I/O.
///
/// Writes past the end zero-fill the gap. Writes never shrink the buffer;
/// only [`Content::truncate`] does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    bytes: Vec<u8>,
}

impl Content {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The whole content.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Write `data` at `offset`, returning `data.len()`.
    ///
    /// # Errors
    /// - `NegativeOffset` if `offset < 0`
    /// - `InvalidArgument` if `offset + data.len()` is not addressable or
    ///   the buffer cannot grow that far
    pub fn write_at(&mut self, data: &[u8], offset: i64) -> Result<usize> {
        let start = checked_offset(offset)?;
        let end = start
            .checked_add(data.len())
            .ok_or_else(|| Error::InvalidArgument(format!("write past end at offset {offset}")))?;

        if end > self.bytes.len() {
            self.bytes
                .try_reserve(end - self.bytes.len())
                .map_err(|_| Error::InvalidArgument(format!("cannot grow content to {end} bytes")))?;
            self.bytes.resize(end, 0);
        }
        self.bytes[start..end].copy_from_slice(data);
        Ok(data.len())
    }

    /// Read into `buf` from `offset`.
    ///
    /// Returns `Ok(0)` at or past the end. A count smaller than `buf.len()`
    /// means the end of the content was reached.
    ///
    /// # Errors
    /// - `NegativeOffset` if `offset < 0`
    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        let start = checked_offset(offset)?;
        if start >= self.bytes.len() {
            return Ok(0);
        }

        let n = buf.len().min(self.bytes.len() - start);
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        Ok(n)
    }

    /// Replace the whole content with `data`.
    pub fn replace(&mut self, data: &[u8]) {
        self.bytes.clear();
        self.bytes.extend_from_slice(data);
    }

    /// Shrink or zero-extend to exactly `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.resize(len, 0);
    }
}

fn checked_offset(offset: i64) -> Result<usize> {
    if offset < 0 {
        return Err(Error::NegativeOffset(offset));
    }
    usize::try_from(offset)
        .map_err(|_| Error::InvalidArgument(format!("offset {offset} is not addressable")))
}
