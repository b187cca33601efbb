/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

/// A growable big endian byte writer
///
/// Used to assemble PSD structures in tests and benchmarks,
/// writes never fail since the backing storage is a [`Vec`]
#[derive(Default, Clone)]
pub struct ByteWriter {
    buffer: Vec<u8>
}

impl ByteWriter {
    /// Create a new empty writer
    pub fn new() -> ByteWriter {
        ByteWriter { buffer: Vec::new() }
    }
    /// Create a new writer with space for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> ByteWriter {
        ByteWriter {
            buffer: Vec::with_capacity(capacity)
        }
    }
    /// Return the number of bytes the writer has written
    ///
    /// ```
    /// use psdkit_core::bytestream::ByteWriter;
    /// let mut stream = ByteWriter::new();
    /// stream.write_u16_be(3);
    /// assert_eq!(stream.position(),2);
    /// ```
    pub fn position(&self) -> usize {
        self.buffer.len()
    }
    #[inline]
    pub fn write_u8(&mut self, byte: u8) {
        self.buffer.push(byte);
    }
    #[inline]
    pub fn write_i8(&mut self, byte: i8) {
        self.buffer.push(byte as u8);
    }
    /// Write all bytes from `buf`
    pub fn write_all(&mut self, buf: &[u8]) {
        self.buffer.extend_from_slice(buf);
    }
    /// Write a Pascal string, padding the record to a multiple of `align`
    /// bytes
    ///
    /// Strings longer than 255 bytes are truncated
    pub fn write_pascal_string(&mut self, string: &[u8], align: usize) {
        let length = string.len().min(255);
        self.write_u8(length as u8);
        self.write_all(&string[..length]);

        if align > 1 {
            let record = length + 1;
            let padding = (align - record % align) % align;
            self.buffer.resize(self.buffer.len() + padding, 0);
        }
    }
    /// Overwrite four bytes at `position` with a big endian u32
    ///
    /// Used to back-patch a length field once the size of the block it
    /// prefixes is known. Does nothing if the range is out of bounds.
    pub fn patch_u32_be(&mut self, position: usize, value: u32) {
        if let Some(space) = self.buffer.get_mut(position..position + 4) {
            space.copy_from_slice(&value.to_be_bytes());
        }
    }
    /// Consume the writer returning the written bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}

macro_rules! write_single_type {
    ($name:tt, $int_type:tt) => {
        impl ByteWriter {
            #[doc = concat!("Write a ", stringify!($int_type), " in big endian")]
            #[inline]
            pub fn $name(&mut self, value: $int_type) {
                self.buffer.extend_from_slice(&value.to_be_bytes());
            }
        }
    };
}

write_single_type!(write_u16_be, u16);
write_single_type!(write_i16_be, i16);
write_single_type!(write_u32_be, u32);
write_single_type!(write_i32_be, i32);
write_single_type!(write_u64_be, u64);
