//! A bounds checked cursor for reading little-endian fields out of a byte slice.

use super::errors::UnexpectedEndOfInput;

#[derive(Debug, Clone)]
pub struct ByteReader<'s> {
    source: &'s [u8],
    idx: usize,
}

impl<'s> ByteReader<'s> {
    pub fn new(source: &'s [u8]) -> ByteReader<'s> {
        ByteReader { source, idx: 0 }
    }

    /// Offset of the next unread byte from the start of the source.
    pub fn position(&self) -> usize {
        self.idx
    }

    pub fn remaining(&self) -> usize {
        self.source.len() - self.idx
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consumes `n` bytes and returns them.
    pub fn take(&mut self, n: usize) -> Result<&'s [u8], UnexpectedEndOfInput> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(UnexpectedEndOfInput {
                needed: n,
                remaining,
            });
        }
        let bytes = &self.source[self.idx..self.idx + n];
        self.idx += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), UnexpectedEndOfInput> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, UnexpectedEndOfInput> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, UnexpectedEndOfInput> {
        // take(4) succeeded, so the narrowing can not lose bits
        self.read_le(4).map(|v| v as u32)
    }

    /// Reads a little-endian unsigned integer that is `n` bytes wide, `n <= 8`.
    pub fn read_le(&mut self, n: usize) -> Result<u64, UnexpectedEndOfInput> {
        debug_assert!(n <= 8);
        let raw = self.take(n)?;
        let mut val = 0u64;
        for (i, x) in raw.iter().enumerate() {
            val |= u64::from(*x) << (8 * i);
        }
        Ok(val)
    }

    /// Looks at the next 4 bytes as a little-endian u32 without consuming them.
    pub fn peek_u32_le(&self) -> Option<u32> {
        let raw = self.source.get(self.idx..self.idx + 4)?;
        Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}
