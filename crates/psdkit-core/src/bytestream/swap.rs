/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Reverse the byte order of an integer using shifts and masks only.
pub trait ReverseBytes: Sized {
    /// Return `self` with its bytes in the opposite order
    ///
    /// ```
    /// use psdkit_core::bytestream::ReverseBytes;
    /// assert_eq!(0x1234_u16.reverse_bytes(), 0x3412);
    /// ```
    fn reverse_bytes(self) -> Self;
}

impl ReverseBytes for u16 {
    #[inline(always)]
    fn reverse_bytes(self) -> Self {
        (self & 0x00FF) << 8 | (self & 0xFF00) >> 8
    }
}

impl ReverseBytes for u32 {
    #[inline(always)]
    fn reverse_bytes(self) -> Self {
        (self & 0x0000_00FF) << 24
            | (self & 0x0000_FF00) << 8
            | (self & 0x00FF_0000) >> 8
            | (self & 0xFF00_0000) >> 24
    }
}

impl ReverseBytes for u64 {
    #[inline(always)]
    #[rustfmt::skip]
    fn reverse_bytes(self) -> Self {
        (self & 0x0000_0000_0000_00FF) << 56
            | (self & 0x0000_0000_0000_FF00) << 40
            | (self & 0x0000_0000_00FF_0000) << 24
            | (self & 0x0000_0000_FF00_0000) << 8
            | (self & 0x0000_00FF_0000_0000) >> 8
            | (self & 0x0000_FF00_0000_0000) >> 24
            | (self & 0x00FF_0000_0000_0000) >> 40
            | (self & 0xFF00_0000_0000_0000) >> 56
    }
}
