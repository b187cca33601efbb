/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use core::fmt::Formatter;

use crate::bytestream::ReverseBytes;

/// Errors that may occur when reading from a [`ByteReader`]
pub enum ByteIoError {
    /// Asked for more bytes than the buffer has left
    ///
    /// Contains the number of bytes requested and the number
    /// of bytes that were remaining
    UnexpectedEof(usize, usize),
    /// A seek moved outside the buffer
    SeekError(&'static str),
    Generic(&'static str)
}

impl core::fmt::Debug for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteIoError::UnexpectedEof(requested, remaining) => {
                writeln!(
                    f,
                    "Unexpected end of data, requested {requested} bytes but only {remaining} remain"
                )
            }
            ByteIoError::SeekError(err) => {
                writeln!(f, "Seek error: {err}")
            }
            ByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
        }
    }
}

impl core::fmt::Display for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ByteIoError {}

impl From<&'static str> for ByteIoError {
    fn from(value: &'static str) -> Self {
        ByteIoError::Generic(value)
    }
}

/// A sequential big endian cursor over an in-memory buffer
///
/// Every read either fully succeeds and advances the cursor or fails
/// with [`ByteIoError::UnexpectedEof`] leaving the cursor untouched.
#[derive(Copy, Clone)]
pub struct ByteReader<'a> {
    stream:   &'a [u8],
    position: usize
}

impl<'a> ByteReader<'a> {
    /// Create a new reader positioned at the start of `buf`
    pub const fn new(buf: &'a [u8]) -> ByteReader<'a> {
        ByteReader {
            stream:   buf,
            position: 0
        }
    }
    /// Total length of the underlying buffer
    #[inline]
    pub const fn len(&self) -> usize {
        self.stream.len()
    }
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }
    /// Current cursor offset from the start of the buffer
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }
    /// Move the cursor to an absolute offset
    ///
    /// Offsets past the end are clamped to the end of the buffer
    #[inline]
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.stream.len());
    }
    /// Bytes left between the cursor and the end of the buffer
    #[inline]
    pub const fn remaining(&self) -> usize {
        // Must be saturating to prevent underflow
        self.stream.len().saturating_sub(self.position)
    }
    #[inline]
    pub const fn is_eof(&self) -> bool {
        self.position >= self.stream.len()
    }
    /// Return true if at least `bytes` more bytes can be read
    #[inline]
    pub const fn has(&self, bytes: usize) -> bool {
        self.remaining() >= bytes
    }
    /// Skip `n` bytes ahead of the stream.
    pub fn skip(&mut self, bytes: usize) -> Result<(), ByteIoError> {
        if !self.has(bytes) {
            return Err(ByteIoError::UnexpectedEof(bytes, self.remaining()));
        }
        self.position += bytes;
        Ok(())
    }
    /// Move the cursor `bytes` back
    pub fn rewind(&mut self, bytes: usize) -> Result<(), ByteIoError> {
        self.position = self
            .position
            .checked_sub(bytes)
            .ok_or(ByteIoError::SeekError("Rewind moved before the start of the buffer"))?;
        Ok(())
    }
    /// Look at the next byte without consuming it
    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        self.stream.get(self.position).copied()
    }
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, ByteIoError> {
        match self.stream.get(self.position) {
            Some(byte) => {
                self.position += 1;
                Ok(*byte)
            }
            None => Err(ByteIoError::UnexpectedEof(1, 0))
        }
    }
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, ByteIoError> {
        Ok(self.read_u8()? as i8)
    }
    /// Read exactly `n` bytes, returning a slice borrowed from the
    /// underlying buffer
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ByteIoError> {
        let end = self
            .position
            .checked_add(n)
            .ok_or(ByteIoError::UnexpectedEof(n, self.remaining()))?;

        match self.stream.get(self.position..end) {
            Some(bytes) => {
                self.position = end;
                Ok(bytes)
            }
            None => Err(ByteIoError::UnexpectedEof(n, self.remaining()))
        }
    }
    /// Read a fixed size array, e.g. a four byte signature
    #[inline]
    pub fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], ByteIoError> {
        let mut byte_store: [u8; N] = [0; N];
        byte_store.copy_from_slice(self.read_bytes(N)?);
        Ok(byte_store)
    }
    /// Split off a reader over the next `n` bytes and advance past them
    ///
    /// The returned reader starts at position zero of its own window
    pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>, ByteIoError> {
        Ok(ByteReader::new(self.read_bytes(n)?))
    }
    /// Everything between the cursor and the end of the buffer,
    /// the cursor is not moved
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        self.stream.get(self.position..).unwrap_or(&[])
    }

    /// Read a Pascal string, a one byte length followed by that many
    /// bytes.
    ///
    /// The whole record (length byte and string bytes) is padded to
    /// an even number of bytes, so an empty string occupies two bytes
    /// and a one byte string occupies two bytes.
    ///
    /// Bytes are mapped one to one into chars (Latin-1).
    pub fn read_pascal_string(&mut self) -> Result<String, ByteIoError> {
        self.read_pascal_string_aligned(2)
    }

    /// Read a Pascal string whose record is padded to a multiple of `align`
    /// bytes
    ///
    /// An `align` of 0 or 1 reads the string without padding.
    pub fn read_pascal_string_aligned(&mut self, align: usize) -> Result<String, ByteIoError> {
        let length = usize::from(self.read_u8()?);
        let bytes = self.read_bytes(length)?;
        let name = bytes.iter().map(|x| char::from(*x)).collect::<String>();

        if align > 1 {
            let record = length + 1;
            let padding = (align - record % align) % align;
            // some writers drop the final pad byte at the end of a block
            self.skip(padding.min(self.remaining()))?;
        }
        Ok(name)
    }

    /// Read an ASCII float terminated by a space or a new line.
    ///
    /// Leading spaces are skipped, the terminator is not consumed.
    /// Empty or malformed input yields `0.0`.
    pub fn read_descriptor_float(&mut self) -> f32 {
        while self.peek_u8() == Some(b' ') {
            self.position += 1;
        }
        let start = self.position;

        while let Some(byte) = self.peek_u8() {
            if byte == b' ' || byte == b'\n' {
                break;
            }
            self.position += 1;
        }
        core::str::from_utf8(&self.stream[start..self.position])
            .ok()
            .and_then(|x| x.trim().parse::<f32>().ok())
            .unwrap_or(0.0)
    }

    /// Advance the cursor until just past the next occurrence of `pattern`
    ///
    /// Returns true when found. When the pattern does not occur between the
    /// cursor and the end of the buffer the cursor is left at the end and
    /// false is returned.
    pub fn seek_to(&mut self, pattern: &[u8]) -> bool {
        if pattern.is_empty() {
            return true;
        }
        let haystack = self.remaining_bytes();

        match haystack.windows(pattern.len()).position(|x| x == pattern) {
            Some(offset) => {
                self.position += offset + pattern.len();
                true
            }
            None => {
                self.position = self.stream.len();
                false
            }
        }
    }
}

macro_rules! read_single_type {
    ($name:tt, $int_type:tt, $unsigned:tt) => {
        impl<'a> ByteReader<'a> {
            #[doc = concat!("Read a big endian ", stringify!($int_type))]
            #[inline]
            pub fn $name(&mut self) -> Result<$int_type, ByteIoError> {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let bytes = self.read_bytes(SIZE_OF_VAL)?;
                // bytes land least significant first, then get reversed
                let mut value: $unsigned = 0;

                for (shift, byte) in bytes.iter().enumerate() {
                    value |= <$unsigned>::from(*byte) << (8 * shift);
                }
                Ok(value.reverse_bytes() as $int_type)
            }
        }
    };
}

read_single_type!(read_u16, u16, u16);
read_single_type!(read_i16, i16, u16);
read_single_type!(read_u32, u32, u32);
read_single_type!(read_i32, i32, u32);
read_single_type!(read_u64, u64, u64);
read_single_type!(read_i64, i64, u64);

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::bytestream::{ByteIoError, ByteReader, ByteWriter};

    #[test]
    fn read_big_endian_integers() {
        let data = [
            0x12, 0x34, 0xFF, 0xFE, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x02,
            0x03, 0x04, 0x05, 0x06, 0x07, 0x08
        ];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_i16().unwrap(), -2);
        assert_eq!(reader.read_u32().unwrap(), 256);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert_eq!(reader.read_u64().unwrap(), 0x0102_0304_0506_0708);
        assert!(reader.is_eof());
    }

    #[test]
    fn read_signed_64() {
        let data = (-5_i64).to_be_bytes();
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_i64().unwrap(), -5);
    }

    #[test]
    fn eof_does_not_advance() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = ByteReader::new(&data);

        reader.skip(1).unwrap();
        let err = reader.read_u32().unwrap_err();

        assert!(matches!(err, ByteIoError::UnexpectedEof(4, 2)));
        assert_eq!(reader.position(), 1);
        assert!(reader.read_bytes(3).is_err());
        assert_eq!(reader.read_u16().unwrap(), 0x0203);
        assert!(matches!(reader.read_u8(), Err(ByteIoError::UnexpectedEof(1, 0))));
    }

    #[test]
    fn pascal_string_record_is_even() {
        for length in [0_usize, 1, 2, 255] {
            let name: Vec<u8> = (0..length).map(|x| b'a' + (x % 26) as u8).collect();

            let mut writer = ByteWriter::new();
            writer.write_u8(length as u8);
            writer.write_all(&name);
            if (length + 1) % 2 != 0 {
                writer.write_u8(0);
            }
            // sentinel after the record
            writer.write_u8(0xAB);
            let bytes = writer.into_inner();

            let mut reader = ByteReader::new(&bytes);
            let decoded = reader.read_pascal_string().unwrap();

            assert_eq!(decoded.as_bytes(), &name[..]);
            assert_eq!(reader.position() % 2, 0, "length {length}");
            assert_eq!(reader.read_u8().unwrap(), 0xAB);
        }
    }

    #[test]
    fn pascal_string_aligned_to_four() {
        // length 5 + "Hello" = 6 bytes, padded to 8
        let data = [5, b'H', b'e', b'l', b'l', b'o', 0, 0, 0x7F];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_pascal_string_aligned(4).unwrap(), "Hello");
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn pascal_string_unpadded() {
        let data = [2, b'a', b'b', 1, b'c'];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_pascal_string_aligned(1).unwrap(), "ab");
        assert_eq!(reader.read_pascal_string_aligned(1).unwrap(), "c");
        assert!(reader.is_eof());
    }

    #[test]
    fn descriptor_float_stops_at_space() {
        let data = b"  0.5 1.0 0.25\n/Next";
        let mut reader = ByteReader::new(data);

        assert_eq!(reader.read_descriptor_float(), 0.5);
        reader.skip(1).unwrap();
        assert_eq!(reader.read_descriptor_float(), 1.0);
        assert_eq!(reader.read_descriptor_float(), 0.25);
        assert_eq!(reader.peek_u8(), Some(b'\n'));
    }

    #[test]
    fn descriptor_float_lenient() {
        let mut reader = ByteReader::new(b"abc\n");
        assert_eq!(reader.read_descriptor_float(), 0.0);

        let mut reader = ByteReader::new(b"");
        assert_eq!(reader.read_descriptor_float(), 0.0);

        let mut reader = ByteReader::new(b"12");
        assert_eq!(reader.read_descriptor_float(), 12.0);
        assert!(reader.is_eof());
    }

    #[test]
    fn seek_to_restarts_after_partial_match() {
        let data = b"//Te/Text rest";
        let mut reader = ByteReader::new(data);

        assert!(reader.seek_to(b"/Text"));
        assert_eq!(reader.position(), 9);
        assert_eq!(reader.read_u8().unwrap(), b' ');
    }

    #[test]
    fn seek_to_missing_goes_to_end() {
        let data = b"nothing to see";
        let mut reader = ByteReader::new(data);

        assert!(!reader.seek_to(b"/FontSize "));
        assert!(reader.is_eof());
        assert_eq!(reader.read_descriptor_float(), 0.0);
    }

    #[test]
    fn sub_reader_window() {
        let data = [0, 0, 0, 2, 0xAA, 0xBB, 0xCC];
        let mut reader = ByteReader::new(&data);
        let length = reader.read_u32().unwrap() as usize;
        let mut sub = reader.sub_reader(length).unwrap();

        assert_eq!(sub.len(), 2);
        assert_eq!(sub.read_u16().unwrap(), 0xAABB);
        assert!(sub.read_u8().is_err());
        assert_eq!(reader.read_u8().unwrap(), 0xCC);
    }

    #[test]
    fn rewind_and_clamp() {
        let data = [1, 2, 3, 4];
        let mut reader = ByteReader::new(&data);

        reader.set_position(100);
        assert_eq!(reader.position(), 4);
        reader.rewind(2).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 3);
        assert!(reader.rewind(10).is_err());
    }
}
