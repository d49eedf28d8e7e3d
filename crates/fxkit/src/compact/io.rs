use std::io::Write;

use crate::error::{EffectError, Result};
use crate::limits::COMPACT_MAX_COUNT;

/// Converts a list length to its one-byte count.
pub(super) fn count_u8(what: &'static str, count: usize) -> Result<u8> {
    u8::try_from(count).map_err(|_| EffectError::Capacity {
        what,
        count,
        max: COMPACT_MAX_COUNT,
    })
}

pub(super) trait WriteLeExt: Write {
    fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_all(&[v])?;
        Ok(())
    }

    fn write_u16_le(&mut self, v: u16) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn write_u32_le(&mut self, v: u32) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn write_f64_le(&mut self, v: f64) -> Result<()> {
        self.write_all(&v.to_bits().to_le_bytes())?;
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(u8::from(v))
    }

    /// Writes a list length as a one-byte count.
    fn write_count(&mut self, what: &'static str, count: usize) -> Result<()> {
        let count = count_u8(what, count)?;
        self.write_u8(count)
    }

    /// Writes a `u16` count (preshader literals and instructions).
    fn write_count_u16(&mut self, what: &'static str, count: usize) -> Result<()> {
        let count = u16::try_from(count).map_err(|_| EffectError::Capacity {
            what,
            count,
            max: u16::MAX as usize,
        })?;
        self.write_u16_le(count)
    }

    fn write_len_prefixed_bytes_u32(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| EffectError::Capacity {
            what: "blob bytes",
            count: bytes.len(),
            max: u32::MAX as usize,
        })?;
        self.write_u32_le(len)?;
        self.write_all(bytes)?;
        Ok(())
    }

    /// Writes a string with a one-byte length prefix.
    fn write_str_u8(&mut self, s: &str) -> Result<()> {
        self.write_count("string bytes", s.len())?;
        self.write_all(s.as_bytes())?;
        Ok(())
    }
}

impl<T: Write + ?Sized> WriteLeExt for T {}
