use std::io::{Cursor, Read, Write};

use milo_types::{Endian, RevisionSplit, VersionTag};

use crate::error::{StreamError, StreamResult};

/// Default ceiling on a single symbol's byte length.
pub const DEFAULT_MAX_SYMBOL_LEN: u32 = 8 * 1024;

/// Generates a read/write pair for one fixed-size scalar type.
macro_rules! scalar_codec {
    ($read:ident, $write:ident, $ty:ty) => {
        #[doc = concat!("Read a `", stringify!($ty), "` in the stream byte order.")]
        pub fn $read(&mut self) -> StreamResult<$ty> {
            let bytes = self.take::<{ std::mem::size_of::<$ty>() }>()?;
            Ok(match self.endian {
                Endian::Little => <$ty>::from_le_bytes(bytes),
                Endian::Big => <$ty>::from_be_bytes(bytes),
            })
        }

        #[doc = concat!("Write a `", stringify!($ty), "` in the stream byte order.")]
        pub fn $write(&mut self, value: $ty) -> StreamResult<()> {
            let bytes = match self.endian {
                Endian::Little => value.to_le_bytes(),
                Endian::Big => value.to_be_bytes(),
            };
            self.write_bytes(&bytes)
        }
    };
}

/// Seekable, byte-order-aware cursor over an in-memory scene buffer.
///
/// The same type serves both directions: decoders wrap existing bytes with
/// [`BinaryStream::from_bytes`], encoders start from [`BinaryStream::new`]
/// and take the buffer back with [`BinaryStream::into_bytes`]. The stream is
/// owned by exactly one read or write pass at a time.
#[derive(Debug)]
pub struct BinaryStream {
    cursor: Cursor<Vec<u8>>,
    endian: Endian,
    split: RevisionSplit,
    max_symbol_len: u32,
}

impl BinaryStream {
    /// Create an empty stream for writing.
    pub fn new() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Wrap existing bytes for reading, positioned at offset 0.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(data),
            endian: Endian::default(),
            split: RevisionSplit::default(),
            max_symbol_len: DEFAULT_MAX_SYMBOL_LEN,
        }
    }

    /// Set the initial byte order.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Set the policy used to split revision words.
    pub fn with_revision_split(mut self, split: RevisionSplit) -> Self {
        self.split = split;
        self
    }

    /// Set the ceiling on symbol byte lengths.
    pub fn with_max_symbol_len(mut self, max: u32) -> Self {
        self.max_symbol_len = max;
        self
    }

    // ---- Mode ----

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Switch to the opposite byte order and return the new order.
    pub fn flip_endian(&mut self) -> Endian {
        self.endian = self.endian.flipped();
        self.endian
    }

    pub fn revision_split(&self) -> RevisionSplit {
        self.split
    }

    pub fn max_symbol_len(&self) -> u32 {
        self.max_symbol_len
    }

    // ---- Position ----

    /// Current absolute offset.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Move to an absolute offset.
    pub fn seek_to(&mut self, offset: u64) {
        self.cursor.set_position(offset);
    }

    /// Total buffer length.
    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position())
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next `n` bytes without moving the cursor.
    ///
    /// Returns `None` when fewer than `n` bytes remain.
    pub fn peek(&self, n: usize) -> Option<&[u8]> {
        let start = usize::try_from(self.position()).ok()?;
        let end = start.checked_add(n)?;
        self.cursor.get_ref().get(start..end)
    }

    /// The whole underlying buffer.
    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    /// Consume the stream and return the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    // ---- Scalars ----

    fn take<const N: usize>(&mut self) -> StreamResult<[u8; N]> {
        let offset = self.position();
        if self.remaining() < N as u64 {
            return Err(StreamError::UnexpectedEof { offset, wanted: N });
        }
        let mut buf = [0u8; N];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> StreamResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    pub fn write_u8(&mut self, value: u8) -> StreamResult<()> {
        self.write_bytes(&[value])
    }

    /// Read a one-byte boolean; any nonzero byte is `true`.
    pub fn read_bool(&mut self) -> StreamResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn write_bool(&mut self, value: bool) -> StreamResult<()> {
        self.write_u8(u8::from(value))
    }

    scalar_codec!(read_u16, write_u16, u16);
    scalar_codec!(read_i16, write_i16, i16);
    scalar_codec!(read_u32, write_u32, u32);
    scalar_codec!(read_i32, write_i32, i32);
    scalar_codec!(read_f32, write_f32, f32);

    /// Read exactly `len` bytes.
    ///
    /// The length is checked against what remains before anything is
    /// allocated, so a corrupt length can not trigger a huge allocation.
    pub fn read_bytes(&mut self, len: usize) -> StreamResult<Vec<u8>> {
        let offset = self.position();
        if self.remaining() < len as u64 {
            return Err(StreamError::UnexpectedEof {
                offset,
                wanted: len,
            });
        }
        let mut buf = vec![0u8; len];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> StreamResult<()> {
        self.cursor.write_all(bytes)?;
        Ok(())
    }

    /// Read a `u32` count and reject it if it exceeds `max`.
    pub fn read_count(&mut self, what: &'static str, max: u32) -> StreamResult<u32> {
        let count = self.read_u32()?;
        if count > max {
            return Err(StreamError::CountSanityViolation {
                what,
                count: u64::from(count),
                max: u64::from(max),
            });
        }
        Ok(count)
    }

    /// Write a collection length as a `u32` count, rejecting lengths above `max`.
    pub fn write_count(&mut self, what: &'static str, count: usize, max: u32) -> StreamResult<()> {
        let value = u32::try_from(count)
            .ok()
            .filter(|&c| c <= max)
            .ok_or(StreamError::CountSanityViolation {
                what,
                count: count as u64,
                max: u64::from(max),
            })?;
        self.write_u32(value)
    }

    // ---- Revision words ----

    /// Read a combined revision word and split it per the stream policy.
    pub fn read_version_tag(&mut self) -> StreamResult<VersionTag> {
        let word = self.read_u32()?;
        Ok(VersionTag::from_word(word, self.split))
    }

    pub fn write_version_tag(&mut self, tag: VersionTag) -> StreamResult<()> {
        self.write_u32(tag.to_word(self.split))
    }
}

impl Default for BinaryStream {
    fn default() -> Self {
        Self::new()
    }
}
