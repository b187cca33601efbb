/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Document bit depth, information and manipulations

/// The document bit depth.
///
/// PSD documents this library understands store samples
/// in one of three depths, each plane sample occupies
/// either one or two bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum BitDepth {
    /// One bit depth, used by bitmap documents.
    ///
    /// Planes of such documents are addressed one byte per column,
    /// the same way eight bit planes are.
    One,
    /// Eight bit depth.
    ///
    /// Samples use [`u8`] and the whole range from 0-255.
    Eight,
    /// Sixteen bit depth
    ///
    /// Samples use two bytes each, stored high byte first
    /// exactly as they appear in the file.
    Sixteen
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::Eight
    }
}

impl BitDepth {
    /// Map the depth field of a PSD header to a bit depth
    ///
    /// Returns `None` for depths other than 1, 8 and 16
    pub const fn from_int(depth: u16) -> Option<BitDepth> {
        match depth {
            1 => Some(Self::One),
            8 => Some(Self::Eight),
            16 => Some(Self::Sixteen),
            _ => None
        }
    }

    /// The depth as stored in the header
    pub const fn bits(self) -> u16 {
        match self {
            Self::One => 1,
            Self::Eight => 8,
            Self::Sixteen => 16
        }
    }

    /// Number of bytes a single sample occupies in a plane
    ///
    /// ```
    /// use psdkit_core::bit_depth::BitDepth;
    /// assert_eq!(BitDepth::Sixteen.size_of(), 2);
    /// assert_eq!(BitDepth::One.size_of(), 1);
    /// ```
    pub const fn size_of(self) -> usize {
        match self {
            Self::One | Self::Eight => 1,
            Self::Sixteen => 2
        }
    }

    /// Number of bytes making up one row of a plane `width` pixels wide
    pub const fn columns(self, width: usize) -> usize {
        width * self.size_of()
    }
}
