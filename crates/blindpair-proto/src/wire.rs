//! Compact binary primitives shared by every wire message.
//!
//! Encoding is two-pass: each message computes its exact encoded length
//! first, then writes into a buffer allocated once with that capacity.
//! Integers use the compact little-endian format: values up to `0xfc` take a
//! single byte, larger values take a one-byte tag (`0xfd`/`0xfe`/`0xff`)
//! followed by a 2-, 4- or 8-byte little-endian body. Variable-length fields
//! are length-prefixed with a compact uint; fixed-size fields are raw bytes.
//!
//! Decoding is strict. The [`Decoder`] tracks its offset for error
//! reporting, never reads past the end, and [`Decoder::finish`] rejects
//! trailing bytes.

use bytes::Bytes;

use crate::errors::{Result, WireError};

/// Largest value that encodes as a single byte.
const UINT_INLINE_MAX: u64 = 0xfc;

/// Tag byte for a 16-bit body.
const UINT_TAG_U16: u8 = 0xfd;

/// Tag byte for a 32-bit body.
const UINT_TAG_U32: u8 = 0xfe;

/// Tag byte for a 64-bit body.
const UINT_TAG_U64: u8 = 0xff;

/// Encoded size of a compact uint.
pub fn uint_len(n: u64) -> usize {
    if n <= UINT_INLINE_MAX {
        1
    } else if n <= u64::from(u16::MAX) {
        3
    } else if n <= u64::from(u32::MAX) {
        5
    } else {
        9
    }
}

/// Append a compact uint to `buf`.
pub fn write_uint(buf: &mut Vec<u8>, n: u64) {
    if n <= UINT_INLINE_MAX {
        buf.push(n as u8);
    } else if n <= u64::from(u16::MAX) {
        buf.push(UINT_TAG_U16);
        buf.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= u64::from(u32::MAX) {
        buf.push(UINT_TAG_U32);
        buf.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        buf.push(UINT_TAG_U64);
        buf.extend_from_slice(&n.to_le_bytes());
    }
}

/// Encoded size of a length-prefixed buffer.
pub fn buffer_len(b: &[u8]) -> usize {
    uint_len(b.len() as u64) + b.len()
}

/// Append a length-prefixed buffer to `buf`.
pub fn write_buffer(buf: &mut Vec<u8>, b: &[u8]) {
    write_uint(buf, b.len() as u64);
    buf.extend_from_slice(b);
}

/// Strict cursor over an incoming message.
///
/// Every read advances the offset; running out of input yields
/// [`WireError::UnexpectedEof`] with the offset at which the read started.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Wrap a byte slice for decoding.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Take the next `n` bytes, or fail with the current offset.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(WireError::UnexpectedEof { offset: self.pos })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Decode a compact uint.
    pub fn uint(&mut self) -> Result<u64> {
        let tag = self.take(1)?[0];
        match tag {
            UINT_TAG_U16 => {
                let mut body = [0u8; 2];
                body.copy_from_slice(self.take(2)?);
                Ok(u64::from(u16::from_le_bytes(body)))
            },
            UINT_TAG_U32 => {
                let mut body = [0u8; 4];
                body.copy_from_slice(self.take(4)?);
                Ok(u64::from(u32::from_le_bytes(body)))
            },
            UINT_TAG_U64 => {
                let mut body = [0u8; 8];
                body.copy_from_slice(self.take(8)?);
                Ok(u64::from_le_bytes(body))
            },
            inline => Ok(u64::from(inline)),
        }
    }

    /// Decode a raw little-endian u32 (no compact tag).
    pub fn u32_le(&mut self) -> Result<u32> {
        let mut body = [0u8; 4];
        body.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(body))
    }

    /// Decode a fixed 32-byte field.
    pub fn fixed32(&mut self) -> Result<[u8; 32]> {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.take(32)?);
        Ok(out)
    }

    /// Decode a fixed 64-byte field.
    pub fn fixed64(&mut self) -> Result<[u8; 64]> {
        let mut out = [0u8; 64];
        out.copy_from_slice(self.take(64)?);
        Ok(out)
    }

    /// Decode a length-prefixed buffer.
    ///
    /// The length is validated against the remaining input before any copy,
    /// so a forged prefix cannot trigger an oversized allocation.
    pub fn buffer(&mut self) -> Result<Bytes> {
        let len_offset = self.pos;
        let len = self.uint()?;
        if len > self.remaining() as u64 {
            return Err(WireError::UnexpectedEof { offset: len_offset });
        }
        Ok(Bytes::copy_from_slice(self.take(len as usize)?))
    }

    /// Assert the whole input was consumed.
    pub fn finish(self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(WireError::TrailingBytes { remaining: self.remaining() });
        }
        Ok(())
    }
}
