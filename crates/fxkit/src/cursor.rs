//! Bounds-checked little-endian reader over an immutable buffer.

use std::ops::{Deref, DerefMut};

use crate::error::{EffectError, Result};
use crate::limits::{MAX_BLOB_BYTES, MAX_STRING_BYTES};

/// Sequential, seekable reader over `bytes`.
///
/// Every read is bounds-checked and reports [`EffectError::Truncated`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Moves to absolute offset `pos`. Seeking to the end of the buffer is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.bytes.len() {
            return Err(self.truncated(pos, 0));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Saves the current position; it is restored when the returned guard is dropped.
    pub fn save(&mut self) -> PositionGuard<'_, 'a> {
        let saved = self.pos;
        PositionGuard {
            cursor: self,
            saved,
        }
    }

    /// Runs `f` with the cursor positioned at `offset`, then restores the current position
    /// whether or not `f` succeeded.
    pub fn peek_at<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut ByteCursor<'a>) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.save();
        guard.seek(offset)?;
        f(&mut *guard)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Reads a `u32` and converts it to a `usize` offset or count.
    pub fn read_u32_usize(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    /// Reads a `u32` count that must be backed by at least `min_record_bytes` per entry in the
    /// rest of the buffer.
    pub fn read_count(&mut self, what: &'static str, min_record_bytes: usize) -> Result<usize> {
        let count = self.read_u32_usize()?;
        let needed = count.saturating_mul(min_record_bytes.max(1));
        if needed > self.remaining() {
            return Err(EffectError::corrupt(
                what,
                format!(
                    "count {count} needs at least {needed} bytes, only {} remain",
                    self.remaining()
                ),
            ));
        }
        Ok(count)
    }

    /// Reads a `u32` length followed by that many bytes, with NUL bytes removed.
    pub fn read_u32_string(&mut self) -> Result<String> {
        let len = self.read_u32_usize()?;
        if len > MAX_STRING_BYTES {
            return Err(EffectError::corrupt(
                "string length",
                format!("{len} exceeds {MAX_STRING_BYTES}"),
            ));
        }
        let raw = self.take(len)?;
        let stripped: Vec<u8> = raw.iter().copied().filter(|&b| b != 0).collect();
        Ok(String::from_utf8_lossy(&stripped).into_owned())
    }

    /// Reads a `u32` size followed by a blob of that size, padded to a multiple of 4 bytes.
    pub fn read_u32_blob_padded(&mut self) -> Result<&'a [u8]> {
        let size = self.read_u32_usize()?;
        if size > MAX_BLOB_BYTES {
            return Err(EffectError::corrupt(
                "blob size",
                format!("{size} exceeds {MAX_BLOB_BYTES}"),
            ));
        }
        let blob = self.take(size)?;
        let padding = (4 - size % 4) % 4;
        self.skip(padding.min(self.remaining()))?;
        Ok(blob)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| self.truncated(self.pos, n))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn truncated(&self, offset: usize, needed: usize) -> EffectError {
        EffectError::Truncated {
            offset,
            needed,
            len: self.bytes.len(),
        }
    }
}

/// Restores the cursor position it was created at when dropped.
#[derive(Debug)]
pub struct PositionGuard<'c, 'a> {
    cursor: &'c mut ByteCursor<'a>,
    saved: usize,
}

impl<'a> Deref for PositionGuard<'_, 'a> {
    type Target = ByteCursor<'a>;

    fn deref(&self) -> &Self::Target {
        self.cursor
    }
}

impl DerefMut for PositionGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor
    }
}

impl Drop for PositionGuard<'_, '_> {
    fn drop(&mut self) {
        self.cursor.pos = self.saved;
    }
}
