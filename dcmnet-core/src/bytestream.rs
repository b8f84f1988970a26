//! A random-access, cursor-based byte buffer with endian-aware primitives.
//!
//! This is the workhorse underneath the dataset codec and the PDU codec: a
//! single growable buffer doubling as both a reader and a writer, since DICOM
//! parsing routinely needs to save a cursor position, peek ahead (e.g. to
//! measure a sequence's encoded length), then rewind.

use crate::error::{Result, TruncatedSnafu};
use byteordered::{ByteOrdered, Endianness};
use snafu::ensure;

/// Byte order for a single read or write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl From<Endian> for Endianness {
    fn from(endian: Endian) -> Self {
        match endian {
            Endian::Little => Endianness::Little,
            Endian::Big => Endianness::Big,
        }
    }
}

/// A growable, seekable byte buffer used to frame both DICOM data elements
/// and upper-layer PDUs.
///
/// Unlike `std::io::Cursor`, writes always extend the buffer (there is no
/// fixed capacity), and endianness is chosen per call rather than being a
/// property of the stream - the file-meta header is always Explicit VR
/// Little Endian even when the data set that follows is Big Endian.
#[derive(Debug, Clone, Default)]
pub struct ByteStream {
    buf: Vec<u8>,
    pos: usize,
}

impl ByteStream {
    /// Create an empty stream ready for writing.
    pub fn new() -> Self {
        ByteStream {
            buf: Vec::new(),
            pos: 0,
        }
    }

    /// Wrap existing bytes for reading, with the cursor at the start.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        ByteStream { buf: bytes, pos: 0 }
    }

    /// Total number of bytes currently held.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes remaining from the cursor to the end.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute offset. Seeking past the end is
    /// allowed (a subsequent write will extend the buffer); seeking before
    /// the start clamps to zero.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Discard all content and reset the cursor.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }

    /// Append bytes at the end without disturbing the cursor.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Borrow the whole backing buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the stream, returning the backing buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    fn require(&self, n: usize) -> Result<()> {
        ensure!(
            self.remaining() >= n,
            TruncatedSnafu {
                requested: n,
                available: self.remaining(),
                offset: self.pos,
            }
        );
        Ok(())
    }

    /// Read `n` bytes and advance the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8]> {
        self.require(n)?;
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    /// Read exactly one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self, endian: Endian) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(ByteOrdered::runtime(bytes, endian.into()).read_u16().expect("exactly 2 bytes already available"))
    }

    pub fn read_u32(&mut self, endian: Endian) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(ByteOrdered::runtime(bytes, endian.into()).read_u32().expect("exactly 4 bytes already available"))
    }

    /// Write a single byte, extending the buffer if the cursor is at or
    /// past the end.
    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_u16(&mut self, value: u16, endian: Endian) {
        let mut bytes = Vec::with_capacity(2);
        ByteOrdered::runtime(&mut bytes, endian.into()).write_u16(value).expect("writing to a Vec never fails");
        self.write_bytes(&bytes);
    }

    pub fn write_u32(&mut self, value: u32, endian: Endian) {
        let mut bytes = Vec::with_capacity(4);
        ByteOrdered::runtime(&mut bytes, endian.into()).write_u32(value).expect("writing to a Vec never fails");
        self.write_bytes(&bytes);
    }

    /// Write bytes at the cursor, overwriting existing content or extending
    /// the buffer as needed, then advance the cursor.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trip() {
        let mut s = ByteStream::new();
        s.write_u32(0xDEADBEEF, Endian::Big);
        s.write_u16(0x1234, Endian::Little);
        s.write_bytes(b"DICM");
        s.seek(0);
        assert_eq!(s.read_u32(Endian::Big).unwrap(), 0xDEADBEEF);
        assert_eq!(s.read_u16(Endian::Little).unwrap(), 0x1234);
        assert_eq!(s.read_bytes(4).unwrap(), b"DICM");
    }

    #[test]
    fn read_past_end_is_truncated() {
        let mut s = ByteStream::from_bytes(vec![1, 2]);
        assert!(s.read_bytes(3).is_err());
    }

    #[test]
    fn backfill_group_length_pattern() {
        // write a placeholder, write some content, then seek back and
        // backfill - this is exactly how the meta-header group length
        // is computed on write.
        let mut s = ByteStream::new();
        let placeholder_pos = s.position();
        s.write_u32(0, Endian::Little);
        let body_start = s.position();
        s.write_bytes(b"hello world");
        let body_len = (s.position() - body_start) as u32;
        let end = s.position();
        s.seek(placeholder_pos);
        s.write_u32(body_len, Endian::Little);
        s.seek(end);
        s.seek(placeholder_pos);
        assert_eq!(s.read_u32(Endian::Little).unwrap(), 11);
    }

    #[test]
    fn append_does_not_move_cursor() {
        let mut s = ByteStream::from_bytes(vec![1, 2, 3]);
        s.seek(1);
        s.append(&[9, 9]);
        assert_eq!(s.position(), 1);
        assert_eq!(s.as_slice(), &[1, 2, 3, 9, 9]);
    }
}
